//! Hole chart for a key.

use std::path::Path;

use clap::Args;
use harpnote_session::{Breath, NoteLabel, Tuning};

use super::common::{load_settings, resolve_tuning};

#[derive(Args)]
pub struct LayoutArgs {
    /// Key to chart, e.g. C4 or Bb3 (defaults to the settings file)
    #[arg(short, long)]
    key: Option<String>,

    /// Show MIDI note numbers instead of names
    #[arg(long)]
    midi: bool,
}

pub fn run(args: LayoutArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let settings = load_settings(config)?;
    let tuning = resolve_tuning(args.key.as_deref(), &settings)?;
    print!("{}", chart(tuning, args.midi));
    Ok(())
}

fn chart(tuning: Tuning, midi: bool) -> String {
    let cell = |label: NoteLabel| {
        if midi {
            tuning.midi_of(label).to_string()
        } else {
            tuning.note_name(label)
        }
    };

    let mut out = format!("Richter harmonica in {}\n\n", tuning.key_name());
    out.push_str("Hole ");
    for label in NoteLabel::row(Breath::Blow) {
        out.push_str(&format!("{:>5}", label.hole()));
    }
    out.push('\n');

    for (name, breath) in [("Blow ", Breath::Blow), ("Draw ", Breath::Draw)] {
        out.push_str(name);
        for label in NoteLabel::row(breath) {
            out.push_str(&format!("{:>5}", cell(label)));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_in_c() {
        let text = chart(Tuning::default(), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Richter harmonica in C4");
        assert!(lines[2].starts_with("Hole "));
        assert!(lines[3].starts_with("Blow    C4   E4   G4   C5"), "{}", lines[3]);
        assert!(lines[4].starts_with("Draw    D4   G4   B4   D5"), "{}", lines[4]);
    }

    #[test]
    fn test_chart_midi_numbers() {
        let text = chart(Tuning::new(55).unwrap(), true);
        assert!(text.contains("Richter harmonica in G3"));
        assert!(text.lines().nth(3).unwrap().starts_with("Blow    55   59   62"));
    }
}
