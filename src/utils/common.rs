use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use std::{
    fs::File,
    io::{Write, stdout},
    path::{Path, PathBuf},
};

/// Arguments shared by script-driven subcommands.
#[derive(Debug, Clone, Parser)]
pub struct CommonArgs {
    /// Input script file (stdin if not provided)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (stdout if not provided)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    pub verbose: bool,
}

pub fn safe_mmap_readonly(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to mmap file: {:?}", path))
}

/// Opens the chosen output sink: the file when given, stdout otherwise.
pub fn open_output(path: &Option<PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            Box::new(File::create(p).with_context(|| format!("Failed to create file: {:?}", p))?)
        }
        None => Box::new(stdout()),
    })
}
