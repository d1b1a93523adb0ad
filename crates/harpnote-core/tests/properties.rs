//! Property-based tests for harpnote-core DSP primitives.

use harpnote_core::{OnePole, cents_to_ratio};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The one-pole output is a convex blend of its history and input, so it
    /// never leaves the range spanned by a bounded input.
    #[test]
    fn one_pole_output_stays_within_input_bounds(
        freq in 20.0f32..20000.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut lp = OnePole::new(48000.0, freq);
        prop_assert!(lp.alpha() > 0.0 && lp.alpha() <= 1.0);

        for &sample in &input {
            let out = lp.process(sample);
            prop_assert!(
                out.is_finite() && (-1.0..=1.0).contains(&out),
                "cutoff {} produced {} for input {}",
                freq, out, sample
            );
        }
    }

    /// Symmetric detune offsets multiply back to unity.
    #[test]
    fn detune_ratios_are_reciprocal(cents in 0.0f32..100.0f32) {
        let up = cents_to_ratio(cents);
        let down = cents_to_ratio(-cents);
        prop_assert!((up * down - 1.0).abs() < 1e-5);
        prop_assert!(up >= 1.0);
    }
}
