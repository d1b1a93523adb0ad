//! Offline rendering of a written take.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use harpnote_config::{CHANNEL_RANGE, SAMPLE_RATE_RANGE};
use harpnote_io::{SampleDepth, WavSpec, render_steps, write_wav};
use harpnote_session::plan;

use super::common::{MAX_TAKE, format_secs, load_settings, parse_take, resolve_tuning};

#[derive(Args)]
pub struct RenderArgs {
    /// Notes as LABEL@START:DURATION in seconds, e.g. "-1@0:0.2 +3@0.5:0.3"
    take: String,

    /// Output WAV file
    #[arg(short, long)]
    out: PathBuf,

    /// Key to render in (defaults to the settings file)
    #[arg(short, long)]
    key: Option<String>,

    /// Index of the first note to render
    #[arg(long, default_value = "0")]
    from: usize,

    /// Sample rate (defaults to the settings file)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output channels
    #[arg(long, default_value = "1")]
    channels: u16,

    /// Bits per sample: 16, 24 or 32 (float)
    #[arg(long, default_value = "32")]
    bits: u16,
}

pub fn run(args: RenderArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let tuning = resolve_tuning(args.key.as_deref(), &settings)?;
    let log = parse_take(&args.take)?;

    if !CHANNEL_RANGE.contains(&args.channels) {
        anyhow::bail!(
            "--channels must be between {} and {}",
            CHANNEL_RANGE.start(),
            CHANNEL_RANGE.end()
        );
    }

    let depth = SampleDepth::from_bits(args.bits)
        .with_context(|| format!("--bits must be 16, 24 or 32, not {}", args.bits))?;

    let steps = plan(log.entries(), args.from, tuning).with_context(|| {
        format!(
            "nothing to render from note {} ({} note(s) in take)",
            args.from,
            log.len()
        )
    })?;

    // Overlapping notes play back to back, so the run can outlast the take
    let length = steps.last().map(|step| step.release).unwrap_or_default();
    if length > MAX_TAKE {
        anyhow::bail!(
            "take plays for {}s, past the {}s limit",
            format_secs(length),
            MAX_TAKE.as_secs()
        );
    }

    let mut engine = settings.engine_config();
    if let Some(rate) = args.sample_rate {
        if !SAMPLE_RATE_RANGE.contains(&rate) {
            anyhow::bail!("--sample-rate {rate} is outside {SAMPLE_RATE_RANGE:?} Hz");
        }
        engine.sample_rate = rate as f32;
    }
    let sample_rate = engine.sample_rate as u32;

    tracing::info!(
        notes = steps.len(),
        key = %tuning,
        sample_rate,
        "rendering take"
    );

    let samples = render_steps(&steps, engine, args.channels);
    let spec = WavSpec {
        channels: args.channels,
        sample_rate,
        depth,
    };
    write_wav(&args.out, &samples, spec)
        .with_context(|| format!("writing {}", args.out.display()))?;

    let frames = samples.len() / usize::from(args.channels);
    let length = std::time::Duration::from_secs_f64(frames as f64 / f64::from(sample_rate));
    println!(
        "Rendered {} note(s), {}s, to {}",
        steps.len(),
        format_secs(length),
        args.out.display()
    );
    Ok(())
}
