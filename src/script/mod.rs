pub mod engine;
pub mod parser;

pub use engine::{Engine, ScriptStats};
pub use parser::{Command, parse_line};
