use anyhow::{Result, bail};
use lexical_core::parse;

/// One line of the command protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Add { name: String, start: i64, finish: i64 },
    Query { at: i64 },
}

/// Parses a single command line.
///
/// Grammar: `CLEAR` | `ADD <name> <start> <finish>` | `QUERY <t>`, fields
/// whitespace-separated, times as (possibly negative) integers. Blank and
/// `#` lines are the caller's concern.
pub fn parse_line(line: &str) -> Result<Command> {
    let mut fields = line.split_whitespace();
    let Some(word) = fields.next() else {
        bail!("empty command line");
    };
    let cmd = match word {
        "CLEAR" => Command::Clear,
        "ADD" => {
            let (Some(name), Some(start), Some(finish)) =
                (fields.next(), fields.next(), fields.next())
            else {
                bail!("ADD expects <name> <start> <finish>: {line}");
            };
            Command::Add {
                name: name.to_string(),
                start: parse_time(start)?,
                finish: parse_time(finish)?,
            }
        }
        "QUERY" => {
            let Some(at) = fields.next() else {
                bail!("QUERY expects <t>: {line}");
            };
            Command::Query {
                at: parse_time(at)?,
            }
        }
        other => bail!("unknown command '{other}': {line}"),
    };
    if fields.next().is_some() {
        bail!("trailing fields after {word}: {line}");
    }
    Ok(cmd)
}

fn parse_time(field: &str) -> Result<i64> {
    match parse::<i64>(field.as_bytes()) {
        Ok(v) => Ok(v),
        Err(_) => bail!("expected an integer time, got '{field}'"),
    }
}
