//! Interactive practice shell.
//!
//! Each line of input is one command. Notes are struck with `+N` (blow) or
//! `-N` (draw) and held until `.` or the next note.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use crossbeam_channel::{bounded, select, unbounded};
use harpnote_io::{BackendStreamConfig, CpalBackend, ToneOutput};
use harpnote_session::{LabelStyle, NoteLabel, PracticeSession, Tuning};
use harpnote_synth::ToneEngine;

use super::common::{format_secs, load_settings, resolve_tuning};

/// Longest note `hold` accepts, in seconds.
const MAX_HOLD_SECS: f64 = 30.0;

const HELP: &str = "\
commands:
  +N / -N          strike and hold blow / draw hole N
  .                release the held note
  hold LABEL SECS  hold a note for SECS seconds
  play [FROM]      replay the log from entry FROM
  stop             stop playback
  list             show the log
  edit I LABEL     change the note of entry I
  del I            delete entry I
  clear            clear the log
  mode edit|live   edit mode sounds notes without recording
  key NAME         change key, e.g. key A3
  labels holes|notes
  quit";

#[derive(Args)]
pub struct PracticeArgs {
    /// Harmonica key, e.g. C4 or Bb3 (defaults to the settings file)
    #[arg(short, long)]
    key: Option<String>,

    /// Label style: holes or notes (defaults to the settings file)
    #[arg(short, long)]
    labels: Option<LabelStyle>,

    /// Output device name
    #[arg(short, long)]
    output: Option<String>,

    /// Sample rate
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Buffer size
    #[arg(long)]
    buffer_size: Option<u32>,
}

pub fn run(args: PracticeArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let tuning = resolve_tuning(args.key.as_deref(), &settings)?;
    let style = args.labels.unwrap_or(settings.labels);

    let stream_config = BackendStreamConfig {
        sample_rate: args.sample_rate.unwrap_or(settings.audio.sample_rate),
        buffer_size: args.buffer_size.unwrap_or(settings.audio.buffer_size),
        channels: settings.audio.channels,
        device_name: args
            .output
            .or_else(|| settings.audio.output_device.clone()),
    };

    let mut engine = settings.engine_config();
    engine.sample_rate = stream_config.sample_rate as f32;
    let (control, renderer) = ToneEngine::build(engine);

    let backend = CpalBackend::new();
    let output = ToneOutput::start_or_silent(&backend, &stream_config, renderer);
    match &output {
        Some(output) => tracing::info!(
            sample_rate = output.sample_rate(),
            channels = output.channels(),
            "audio output started"
        ),
        None => println!("No audio output; notes will be recorded silently."),
    }

    let session = PracticeSession::new(control);
    session.set_tuning(tuning);
    let mut shell = Shell::new(session, style);

    let (interrupt_tx, interrupt) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;

    let (line_tx, lines) = unbounded();
    std::thread::Builder::new()
        .name("harpnote-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("spawning input thread")?;

    println!("Practicing in {}. Type 'help' for commands.", tuning.key_name());
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        select! {
            recv(lines) -> line => {
                let Ok(line) = line else { break };
                if shell.execute(&line, &mut stdout)? == Flow::Quit {
                    break;
                }
            }
            recv(interrupt) -> _ => {
                println!("\nStopping...");
                break;
            }
        }
    }

    drop(shell);
    drop(output);
    Ok(())
}

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Command interpreter around a [`PracticeSession`].
struct Shell {
    session: PracticeSession,
    style: LabelStyle,
}

impl Shell {
    fn new(session: PracticeSession, style: LabelStyle) -> Self {
        Self { session, style }
    }

    /// Run one command line, writing any response to `out`.
    ///
    /// Bad input is reported to `out`; only write failures are errors.
    fn execute(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        match self.dispatch(line, out) {
            Ok(flow) => Ok(flow),
            Err(e) if e.is::<std::io::Error>() => Err(e),
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = words.collect();

        match (command, args.as_slice()) {
            (strike, []) if strike.starts_with(['+', '-']) => {
                let label: NoteLabel = strike.parse()?;
                self.session.note_start(label);
            }
            (".", []) => self.session.note_end(),
            ("hold", [label, secs]) => {
                let label: NoteLabel = label.parse()?;
                let secs: f64 = secs
                    .parse()
                    .with_context(|| format!("'{secs}' is not a number of seconds"))?;
                if !(0.0..=MAX_HOLD_SECS).contains(&secs) {
                    anyhow::bail!("hold time must be between 0 and {MAX_HOLD_SECS} seconds");
                }
                self.session.note_start(label);
                std::thread::sleep(Duration::from_secs_f64(secs));
                self.session.note_end();
            }
            ("play", rest) => {
                let from = match rest {
                    [] => 0,
                    [from] => parse_index(from)?,
                    _ => anyhow::bail!("usage: play [FROM]"),
                };
                if !self.session.play(from) {
                    writeln!(out, "nothing to play from {from}")?;
                }
            }
            ("stop", []) => self.session.cancel_playback(),
            ("list", []) => self.list(out)?,
            ("edit", [index, label]) => {
                let index = parse_index(index)?;
                let label: NoteLabel = label.parse()?;
                if !self.session.edit(index, label) {
                    writeln!(out, "cannot edit entry {index}")?;
                }
            }
            ("del", [index]) => {
                let index = parse_index(index)?;
                if !self.session.delete(index) {
                    writeln!(out, "cannot delete entry {index}")?;
                }
            }
            ("clear", []) => self.session.clear(),
            ("mode", ["edit"]) => self.session.set_editing(true),
            ("mode", ["live"]) => self.session.set_editing(false),
            ("key", [name]) => {
                let tuning: Tuning = name.parse()?;
                self.session.set_tuning(tuning);
                writeln!(out, "key {}", tuning.key_name())?;
            }
            ("labels", [style]) => self.style = style.parse()?,
            ("help", []) => writeln!(out, "{HELP}")?,
            ("quit" | "exit", []) => return Ok(Flow::Quit),
            _ => anyhow::bail!("unknown command '{}' (try 'help')", line.trim()),
        }

        Ok(Flow::Continue)
    }

    fn list(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let entries = self.session.entries();
        if entries.is_empty() {
            writeln!(out, "(empty)")?;
            return Ok(());
        }

        let tuning = self.session.tuning();
        let sounding = self.session.sounding_index();
        for (index, entry) in entries.iter().enumerate() {
            let marker = if sounding == Some(index) { '>' } else { ' ' };
            let duration = entry
                .duration()
                .map_or_else(|| "held".to_string(), format_secs);
            writeln!(
                out,
                "{marker}{index:>3}  {:>4}  at {}  for {}",
                tuning.display(entry.label(), self.style),
                format_secs(entry.start()),
                duration
            )?;
        }
        Ok(())
    }
}

fn parse_index(s: &str) -> anyhow::Result<usize> {
    s.parse()
        .with_context(|| format!("'{s}' is not an entry number"))
}
