use anyhow::{Result, bail};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::{
    io::{BufWriter, Write},
    path::PathBuf,
};

use crate::open_output;

/// Arguments
#[derive(Parser, Debug)]
#[command(
    about = "Generate a random command script",
    long_about = "Writes a random but well-formed CLEAR/ADD/QUERY script for exercising the calendar."
)]
pub struct SampleArgs {
    /// Output script file (stdout if not provided)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of ADD commands
    #[arg(short = 'n', long = "events", default_value_t = 1000)]
    pub events: usize,

    /// Number of QUERY commands
    #[arg(short = 'q', long = "queries", default_value_t = 100)]
    pub queries: usize,

    /// Time horizon: start times are drawn from [0, span)
    #[arg(short = 's', long = "span", default_value_t = 100_000)]
    pub span: i64,

    /// Maximum event duration
    #[arg(short = 'd', long = "max-duration", default_value_t = 1_000)]
    pub max_duration: i64,

    /// RNG seed for reproducible scripts
    #[arg(long = "seed", value_name = "NUM")]
    pub seed: Option<u64>,

    /// Verbose logs
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    pub verbose: bool,
}

pub fn run(args: &SampleArgs) -> Result<()> {
    if args.span <= 0 {
        bail!("--span must be positive, got {}", args.span);
    }
    if args.max_duration <= 0 {
        bail!("--max-duration must be positive, got {}", args.max_duration);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut out = BufWriter::new(open_output(&args.output)?);

    for i in 0..args.events {
        let start = rng.random_range(0..args.span);
        let len = rng.random_range(1..=args.max_duration);
        writeln!(out, "ADD ev{i:05} {start} {}", start + len)?;
    }
    for _ in 0..args.queries {
        writeln!(out, "QUERY {}", rng.random_range(0..args.span))?;
    }
    out.flush()?;

    if args.verbose {
        eprintln!(
            "[INFO] wrote {} ADD and {} QUERY command(s)",
            args.events, args.queries
        );
    }

    Ok(())
}
