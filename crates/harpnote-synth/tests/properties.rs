//! Property-based tests for the envelope and oscillator invariants.

use harpnote_synth::{EnvelopeState, OscillatorBank, RetriggerPolicy, SawOscillator, ToneEnvelope};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Gate {
    On,
    Off,
    Hold(u16),
}

fn gate_strategy() -> impl Strategy<Value = Gate> {
    prop_oneof![
        Just(Gate::On),
        Just(Gate::Off),
        (1u16..2000).prop_map(Gate::Hold),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever gate sequence arrives, the level stays inside [0, 1].
    #[test]
    fn envelope_level_stays_in_unit_range(
        gates in prop::collection::vec(gate_strategy(), 1..40),
        continue_policy in any::<bool>(),
    ) {
        let mut env = ToneEnvelope::new(48000.0);
        if continue_policy {
            env.set_retrigger(RetriggerPolicy::Continue);
        }
        for gate in gates {
            match gate {
                Gate::On => env.gate_on(),
                Gate::Off => env.gate_off(),
                Gate::Hold(samples) => {
                    for _ in 0..samples {
                        let level = env.advance();
                        prop_assert!((0.0..=1.0).contains(&level), "level {}", level);
                    }
                }
            }
        }
        if env.state() == EnvelopeState::Idle {
            prop_assert_eq!(env.advance(), 0.0);
        }
    }

    /// Phases stay in [0, 1) for any frequency up to Nyquist.
    #[test]
    fn oscillator_phase_stays_in_unit_interval(
        sample_rate in prop::sample::select(vec![22050.0f32, 44100.0, 48000.0, 96000.0]),
        fraction in 0.0001f32..=0.5,
        steps in 1usize..5000,
    ) {
        let mut osc = SawOscillator::new(sample_rate);
        osc.set_frequency(sample_rate * fraction);
        for _ in 0..steps {
            let sample = osc.advance();
            prop_assert!((-1.0..=1.0).contains(&sample));
            let phase = osc.phase();
            prop_assert!((0.0..1.0).contains(&phase), "phase {}", phase);
        }
    }

    /// Bank output is an average, so it never leaves [-1, 1].
    #[test]
    fn bank_output_is_bounded(freq in 20.0f32..4000.0, steps in 1usize..4000) {
        let mut bank = OscillatorBank::new(48000.0);
        bank.set_frequency(freq);
        for _ in 0..steps {
            let sample = bank.advance();
            prop_assert!((-1.0..=1.0).contains(&sample), "sample {}", sample);
        }
        for phase in bank.phases() {
            prop_assert!((0.0..1.0).contains(&phase));
        }
    }
}
