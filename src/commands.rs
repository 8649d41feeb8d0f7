pub mod run;
pub mod sample;

pub use run::{RunArgs, run as run_script};
pub use sample::{SampleArgs, run as run_sample};
