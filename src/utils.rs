pub mod common;

pub use common::{CommonArgs, open_output, safe_mmap_readonly};
