use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use l528_harness::{acceptance, e2e, integration};

#[derive(Parser, Debug)]
#[command(name = "l528-harness")]
#[command(about = "Acceptance and differential test harness for the l528 toolchain.", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run the directive-based end-to-end suite.
    E2e(e2e::E2eArgs),
    /// Parse every corpus program and report syntax errors.
    Integration(integration::IntegrationArgs),
    /// Run the corpus through both backends and compare their output.
    Acceptance(acceptance::AcceptanceArgs),
}

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::E2e(args) => e2e::cmd_e2e(args),
        Command::Integration(args) => integration::cmd_integration(args),
        Command::Acceptance(args) => acceptance::cmd_acceptance(args),
    }
}
