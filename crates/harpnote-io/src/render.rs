//! Offline rendering of a planned take.
//!
//! Commands are issued to a private engine at exact frame positions, so the
//! output is sample-accurate and independent of wall-clock timing.

use std::time::Duration;

use harpnote_session::PlaybackStep;
use harpnote_synth::{EngineConfig, ToneCommand, ToneEngine};

/// Silence rendered after the last note-off so the release can ring out.
pub const RENDER_TAIL: Duration = Duration::from_millis(250);

/// Render `steps` to an interleaved buffer with `channels` channels.
///
/// The buffer runs until the last release plus [`RENDER_TAIL`].
pub fn render_steps(steps: &[PlaybackStep], config: EngineConfig, channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    let sample_rate = f64::from(config.sample_rate);
    let to_frame = |d: Duration| (d.as_secs_f64() * sample_rate).round() as usize;

    // Stable sort keeps each note-off ahead of a note-on on the same frame
    let mut cues: Vec<(usize, ToneCommand)> = steps
        .iter()
        .flat_map(|step| {
            [
                (
                    to_frame(step.onset),
                    ToneCommand::NoteOn {
                        frequency: step.frequency,
                    },
                ),
                (to_frame(step.release), ToneCommand::NoteOff),
            ]
        })
        .collect();
    cues.sort_by_key(|&(frame, _)| frame);

    let end = cues.last().map_or(0, |&(frame, _)| frame) + to_frame(RENDER_TAIL);
    let (control, mut renderer) = ToneEngine::build(EngineConfig {
        queue_capacity: config.queue_capacity.max(cues.len()),
        ..config
    });

    let mut out = vec![0.0f32; end * channels];
    let mut cursor = 0;
    for (frame, command) in cues {
        if frame > cursor {
            renderer.process(&mut out[cursor * channels..frame * channels], channels);
            cursor = frame;
        }
        match command {
            ToneCommand::NoteOn { frequency } => control.note_on(frequency),
            ToneCommand::NoteOff => control.note_off(),
        };
    }
    renderer.process(&mut out[cursor * channels..], channels);

    tracing::debug!(
        steps = steps.len(),
        frames = end,
        channels,
        "offline render finished"
    );
    out
}
