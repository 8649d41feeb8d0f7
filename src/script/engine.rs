use std::io::Write;

use anyhow::{Context, Result};
use memchr::memchr;
use serde::Serialize;

use crate::{Calendar, Event};

use super::parser::{Command, parse_line};

/// Per-query record emitted in JSON mode.
#[derive(Debug, Serialize)]
struct QueryRecord<'a> {
    at: i64,
    matches: Vec<&'a str>,
}

/// Command counters reported after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptStats {
    pub adds: usize,
    pub queries: usize,
    pub clears: usize,
}

/// Applies protocol commands to a calendar and writes the protocol output:
/// `ADD`/`CLEAR` lines echoed verbatim, `QUERY <t>: <names...>` per query.
/// In JSON mode the echo is suppressed and each query emits one
/// [`QueryRecord`] line instead.
pub struct Engine<W: Write> {
    calendar: Calendar,
    out: W,
    json: bool,
    stats: ScriptStats,
}

impl<W: Write> Engine<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            calendar: Calendar::new(),
            out,
            json,
            stats: ScriptStats::default(),
        }
    }

    /// Executes every command in `buf`, one per line. Blank lines and lines
    /// starting with `#` are skipped. Errors carry the 1-based line number.
    pub fn run_script(&mut self, buf: &[u8]) -> Result<ScriptStats> {
        let mut offset = 0;
        let mut line_no = 0;
        while offset < buf.len() {
            let nl = memchr(b'\n', &buf[offset..])
                .map(|pos| pos + offset)
                .unwrap_or(buf.len());
            let raw = &buf[offset..nl];
            offset = nl + 1;
            line_no += 1;

            if raw.is_empty() || raw[0] == b'#' {
                continue;
            }
            let line = std::str::from_utf8(raw)
                .with_context(|| format!("line {line_no}: not valid UTF-8"))?
                .trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let cmd = parse_line(line).with_context(|| format!("line {line_no}"))?;
            self.execute(&cmd, line)
                .with_context(|| format!("line {line_no}"))?;
        }
        self.out.flush()?;
        Ok(self.stats)
    }

    /// Runs one command. `raw` is the original line, echoed for ADD/CLEAR.
    pub fn execute(&mut self, cmd: &Command, raw: &str) -> Result<()> {
        match cmd {
            Command::Clear => {
                self.calendar.clear();
                self.stats.clears += 1;
                if !self.json {
                    writeln!(self.out, "{raw}")?;
                }
            }
            Command::Add {
                name,
                start,
                finish,
            } => {
                self.calendar.add(Event::new(name.clone(), *start, *finish));
                self.stats.adds += 1;
                if !self.json {
                    writeln!(self.out, "{raw}")?;
                }
            }
            Command::Query { at } => {
                self.stats.queries += 1;
                let hits = self.calendar.query(*at);
                if self.json {
                    let record = QueryRecord {
                        at: *at,
                        matches: hits.iter().map(|ev| ev.name.as_str()).collect(),
                    };
                    let json = serde_json::to_string(&record)?;
                    writeln!(self.out, "{json}")?;
                } else {
                    write!(self.out, "QUERY {at}:")?;
                    for ev in hits {
                        write!(self.out, " {}", ev.name)?;
                    }
                    writeln!(self.out)?;
                }
            }
        }
        Ok(())
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn stats(&self) -> ScriptStats {
        self.stats
    }
}
