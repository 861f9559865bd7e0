//! Phrasebook Setup CLI
//!
//! Binary entry point for credential setup. Two modes:
//! - No arguments: interactive prompt sequence
//! - Arguments: joined into one compact command string, e.g.
//!   `phrasebook 'init(usr:john, pwd:1234, host:db.local)'`, and run
//!   non-interactively
//!
//! Errors print to stderr and exit non-zero. The password is never echoed.

use anyhow::Result;
use clap::Parser;

use phrasebook::settings::command::resolve_from_command;
use phrasebook::settings::{default_artifact_path, resolve_and_persist, InitOptions};

/// Phrasebook - MySQL credential setup for the pattern store
#[derive(Parser)]
#[command(name = "phrasebook")]
#[command(about = "Collect and persist MySQL credentials for the dialogue pattern store")]
#[command(version)]
struct Cli {
    /// Compact setup command, e.g. `init(usr:john, pwd:1234)`.
    /// Omit to run the interactive prompt sequence.
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

fn run(cli: Cli) -> Result<()> {
    if cli.command.is_empty() {
        println!("Phrasebook credential setup");
        println!("Credentials will be saved to {}", default_artifact_path()?.display());
        resolve_and_persist(InitOptions::default())?;
    } else {
        let command = cli.command.join(" ");
        resolve_from_command(&command, None)?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
