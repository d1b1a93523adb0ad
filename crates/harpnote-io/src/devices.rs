//! Output device enumeration via cpal.

use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::Result;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (sample_rate, channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((48000, 2));

    Some(AudioDevice {
        is_default: default_name == Some(name.as_str()),
        name,
        default_sample_rate: sample_rate,
        channels,
    })
}

/// List all output devices on the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let devices = match host.output_devices() {
        Ok(devices) => devices
            .filter_map(|d| describe(&d, default_name.as_deref()))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to enumerate output devices");
            Vec::new()
        }
    };

    Ok(devices)
}

/// The default output device, if the host has one.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let name = device_name(&d).ok();
        describe(&d, name.as_deref())
    }))
}
