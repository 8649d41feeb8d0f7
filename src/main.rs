use anyhow::Result;
use clap::{Parser, Subcommand};

use calx::commands::run;
use calx::commands::sample;

#[derive(Parser)]
#[command(
    name = "calx",
    version,
    about = concat!("calx: point-overlap queries over calendar events\nVersion: ", env!("CARGO_PKG_VERSION")),
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command script against an in-memory calendar
    Run(run::RunArgs),

    /// Generate a random command script
    Sample(sample::SampleArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            run::run(&args)?
        }
        Commands::Sample(args) => {
            sample::run(&args)?
        }
    }

    Ok(())
}
