// src/lib.rs
pub mod calendar;
pub mod commands;
pub mod script;
pub mod tree;
pub mod utils;

pub use calendar::Calendar;
pub use script::{Command, Engine, ScriptStats, parse_line};
pub use tree::{ALPHA, BalancedTree, Event, IntervalIndex, NodeId, TreeValue};
pub use utils::common::{CommonArgs, open_output, safe_mmap_readonly};
