pub mod diagnose;
pub mod run;
pub mod simulate;

use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{path::find_config_file, LoadError, RelayConfig};

use self::{
    diagnose::handle_diagnose,
    run::handle_run,
    simulate::{handle_simulate, SimulateCommand},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Enable debug logging and log every relayed event
    #[arg(long, global = true)]
    pub debug: bool,
    /// Mouse input device (e.g. /dev/input/event4). Discovered by name if unset.
    #[arg(long, global = true)]
    pub mouse_input: Option<String>,
    /// Keyboard input device (e.g. /dev/input/event5). Discovered by name if unset.
    #[arg(long, global = true)]
    pub keyboard_input: Option<String>,
    /// Mouse HID gadget device
    #[arg(long, global = true)]
    pub mouse_output: Option<String>,
    /// Keyboard HID gadget device
    #[arg(long, global = true)]
    pub keyboard_output: Option<String>,
    /// Start even if USB host or gadget support was not detected
    #[arg(long, global = true)]
    pub skip_host_check: bool,
}

impl Args {
    /// The command to execute. Running the relay is the default.
    pub fn command(&self) -> Commands {
        self.cmd.clone().unwrap_or(Commands::Run)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start relaying input devices (default)
    Run,
    /// Check the system and list the devices the relay would use
    Diagnose {
        /// Print events from the discovered input devices until Ctrl+C
        #[arg(long)]
        echo: bool,
    },
    /// Write test reports to the HID gadget devices
    Simulate {
        #[command(subcommand)]
        cmd: SimulateCommand,
    },
}

/// Load the config file (if any) and apply the overrides given on the command
/// line.
pub fn load_config(args: &Args) -> Result<RelayConfig, LoadError> {
    let path = args.config.clone().or_else(find_config_file);
    let mut config = match path {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            RelayConfig::from_yaml_path(path)?
        }
        None => {
            log::debug!("No config file found, using defaults");
            RelayConfig::default()
        }
    };

    if args.debug {
        config.debug = true;
    }
    if let Some(input) = args.mouse_input.as_ref() {
        config.mouse.input = Some(input.clone());
    }
    if let Some(input) = args.keyboard_input.as_ref() {
        config.keyboard.input = Some(input.clone());
    }
    if let Some(output) = args.mouse_output.as_ref() {
        config.mouse.output = output.clone();
    }
    if let Some(output) = args.keyboard_output.as_ref() {
        config.keyboard.output = output.clone();
    }

    Ok(config)
}

/// Load the config and execute the given command
pub async fn main_cli(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;
    match args.command() {
        Commands::Run => handle_run(config, args.skip_host_check).await?,
        Commands::Diagnose { echo } => handle_diagnose(&config, echo).await?,
        Commands::Simulate { cmd } => handle_simulate(&config, cmd).await?,
    }

    Ok(())
}
