//! Audio output device listing.

use clap::{Args, Subcommand};
use harpnote_io::{default_output_device, list_output_devices};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all output devices
    List,

    /// Show the default output device
    Info,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let devices = list_output_devices()?;

            if devices.is_empty() {
                println!("No audio output devices found.");
                return Ok(());
            }

            println!("Output Devices");
            println!("==============\n");
            for (idx, device) in devices.iter().enumerate() {
                let marker = if device.is_default { " (default)" } else { "" };
                println!(
                    "  [{}] {} ({} Hz, {} ch){}",
                    idx, device.name, device.default_sample_rate, device.channels, marker
                );
            }
            println!();
            println!("Use the name with --output or set audio.output_device in settings.toml.");
        }

        DevicesCommand::Info => match default_output_device()? {
            Some(device) => {
                println!("Default output: {}", device.name);
                println!("  Sample rate: {} Hz", device.default_sample_rate);
                println!("  Channels:    {}", device.channels);
            }
            None => println!("No default output device."),
        },
    }

    Ok(())
}
