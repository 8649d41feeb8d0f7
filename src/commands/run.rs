use anyhow::Result;
use clap::Parser;
use std::io::{BufWriter, Read};

use crate::script::engine::Engine;
use crate::{CommonArgs, open_output, safe_mmap_readonly};

#[derive(Parser, Debug)]
#[command(
    about = "Execute a calendar command script",
    long_about = "Runs CLEAR/ADD/QUERY commands from a script against an in-memory calendar and writes the protocol output."
)]
pub struct RunArgs {
    /// Common input/output arguments
    #[clap(flatten)]
    pub common: CommonArgs,

    /// Emit one JSON record per QUERY instead of protocol text
    #[arg(short = 'j', long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let out = BufWriter::new(open_output(&args.common.output)?);
    let mut engine = Engine::new(out, args.json);

    let stats = match &args.common.input {
        Some(path) => {
            let script_buf = safe_mmap_readonly(path)?;
            engine.run_script(&script_buf)?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            engine.run_script(&buf)?
        }
    };

    if args.common.verbose {
        eprintln!(
            "[INFO] executed {} add(s), {} query(ies), {} clear(s); {} event(s) live",
            stats.adds,
            stats.queries,
            stats.clears,
            engine.calendar().len()
        );
    }

    Ok(())
}
