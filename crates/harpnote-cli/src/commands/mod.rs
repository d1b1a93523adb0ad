//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod layout;
pub mod practice;
pub mod render;
