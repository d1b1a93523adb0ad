//! Integration tests for harpnote-synth.
//!
//! Tests cover the render step composition, cross-thread note control and
//! the retrigger policies seen through the engine.

use std::thread;

use harpnote_synth::{
    ATTACK_SECONDS, EngineConfig, EnvelopeState, FILTER_CUTOFF_HZ, OUTPUT_GAIN, OnePole,
    OscillatorBank, RELEASE_SECONDS, RetriggerPolicy, ToneEngine, ToneEnvelope, midi_to_freq,
};

const SR: f32 = 48000.0;

// ---------------------------------------------------------------------------
// 1. Render step composition
// ---------------------------------------------------------------------------

#[test]
fn render_step_matches_manual_composition() {
    let (control, mut renderer) = ToneEngine::build(EngineConfig::with_sample_rate(SR));
    control.note_on(440.0);

    let mut bank = OscillatorBank::new(SR);
    bank.set_frequency(440.0);
    let mut env = ToneEnvelope::new(SR);
    env.gate_on();
    let mut filter = OnePole::new(SR, FILTER_CUTOFF_HZ);

    for i in 0..2000 {
        let amplitude = env.advance();
        let expected = filter.process(bank.advance()) * amplitude * OUTPUT_GAIN;
        let actual = renderer.render_step();
        assert!(
            (actual - expected).abs() < 1e-6,
            "sample {}: engine {} != manual {}",
            i,
            actual,
            expected
        );
    }
}

#[test]
fn first_sample_after_note_on_is_quiet() {
    let (control, mut renderer) = ToneEngine::build(EngineConfig::default());
    control.note_on(midi_to_freq(60));
    let first = renderer.render_step();
    // Phases start at zero and the envelope only just left zero
    assert_eq!(first, 0.0);
}

#[test]
fn stereo_buffer_duplicates_mono_signal() {
    let (control, mut renderer) = ToneEngine::build(EngineConfig::default());
    control.note_on(392.0);

    let mut stereo = vec![0.0f32; 2 * 1000];
    renderer.process(&mut stereo, 2);

    let nonzero = stereo.chunks(2).filter(|f| f[0] != 0.0).count();
    assert!(nonzero > 900, "expected signal in most frames, got {}", nonzero);
    for frame in stereo.chunks(2) {
        assert_eq!(frame[0], frame[1]);
    }
}

// ---------------------------------------------------------------------------
// 2. Cross-thread control
// ---------------------------------------------------------------------------

#[test]
fn commands_from_another_thread_arrive_in_order() {
    let config = EngineConfig {
        queue_capacity: 256,
        ..EngineConfig::default()
    };
    let (control, mut renderer) = ToneEngine::build(config);

    let worker = {
        let control = control.clone();
        thread::spawn(move || {
            for i in 1..=50 {
                assert!(control.note_on(100.0 * i as f32));
                assert!(control.note_off());
            }
            control.note_on(1234.0)
        })
    };
    assert!(worker.join().expect("worker panicked"));

    renderer.render_step();
    assert_eq!(control.frequency(), 1234.0);
    assert_eq!(control.envelope_state(), EnvelopeState::Attack);
    assert_eq!(control.dropped_commands(), 0);
}

#[test]
fn full_cycle_reports_states() {
    let (control, mut renderer) = ToneEngine::build(EngineConfig::default());
    let attack = (ATTACK_SECONDS * SR) as usize;
    let release = (RELEASE_SECONDS * SR) as usize;
    let mut block = vec![0.0f32; 64];

    assert_eq!(control.envelope_state(), EnvelopeState::Idle);
    control.note_on(440.0);
    renderer.process(&mut block, 1);
    assert_eq!(control.envelope_state(), EnvelopeState::Attack);

    let mut rendered = 64;
    while rendered < attack + 64 {
        renderer.process(&mut block, 1);
        rendered += 64;
    }
    assert_eq!(control.envelope_state(), EnvelopeState::Sustain);

    control.note_off();
    let mut rendered = 0;
    while rendered < release + 64 {
        renderer.process(&mut block, 1);
        rendered += 64;
    }
    assert_eq!(control.envelope_state(), EnvelopeState::Idle);
    renderer.process(&mut block, 1);
    assert!(block.iter().all(|&s| s == 0.0));
}

// ---------------------------------------------------------------------------
// 3. Retrigger policies
// ---------------------------------------------------------------------------

fn retrigger_jump(policy: RetriggerPolicy) -> f32 {
    let config = EngineConfig {
        retrigger: policy,
        ..EngineConfig::default()
    };
    let (control, mut renderer) = ToneEngine::build(config);
    let mut block = vec![0.0f32; 4800];

    control.note_on(440.0);
    renderer.process(&mut block, 1);
    control.note_off();
    let mut short = vec![0.0f32; 480];
    renderer.process(&mut short, 1);
    let before = control.level();

    control.note_on(440.0);
    renderer.render_step();
    let mut one = [0.0f32; 1];
    renderer.process(&mut one, 1);
    before - control.level()
}

#[test]
fn restart_policy_drops_level_on_retrigger() {
    let jump = retrigger_jump(RetriggerPolicy::Restart);
    assert!(jump > 0.8, "restart should fall back near zero, jump {}", jump);
}

#[test]
fn continue_policy_keeps_level_on_retrigger() {
    let jump = retrigger_jump(RetriggerPolicy::Continue);
    assert!(jump <= 0.0, "continue should never drop the level, jump {}", jump);
}
