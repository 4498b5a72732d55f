//! Structured form of a VdM sequence.

use serde::{Deserialize, Serialize};

use super::vocab::{Beam, Ip, Plane, Unit};

pub const INITIALIZE_TRIM: &str = "INITIALIZE_TRIM";
pub const SECONDS_WAIT: &str = "SECONDS_WAIT";
pub const RELATIVE_TRIM: &str = "RELATIVE_TRIM";
pub const ABSOLUTE_TRIM: &str = "ABSOLUTE_TRIM";
pub const START_FIT: &str = "START_FIT";
pub const END_FIT: &str = "END_FIT";
pub const END_SEQUENCE: &str = "END_SEQUENCE";

/// Number of tokens in one trim tuple.
pub const TRIM_TUPLE_LEN: usize = 5;

/// A parsed sequence. Line order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence {
    pub lines: Vec<Line>,
}

/// One physical line of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Line {
    Empty,
    Comment { text: String },
    Command(Command),
}

/// A command line without its line number; numbers are positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// One `(IP, BEAM, PLANE, AMOUNT, UNIT)` group of a trim command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimTuple {
    pub ip: Ip,
    pub beam: Beam,
    pub plane: Plane,
    pub amount: f64,
    pub unit: Unit,
}

impl Sequence {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Command lines in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.lines.iter().filter_map(|line| match line {
            Line::Command(cmd) => Some(cmd),
            _ => None,
        })
    }

    /// Every trim tuple of every well-formed trim command, in order.
    pub fn trim_tuples(&self) -> Vec<TrimTuple> {
        self.commands().filter_map(Command::trim_tuples).flatten().collect()
    }
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn is_trim(&self) -> bool {
        self.name == RELATIVE_TRIM || self.name == ABSOLUTE_TRIM
    }

    /// Decode the trim tuples of a trim command.
    ///
    /// Returns `None` for non-trim commands and for arguments that do not
    /// decode against the default vocabularies.
    pub fn trim_tuples(&self) -> Option<Vec<TrimTuple>> {
        if !self.is_trim() || self.args.is_empty() || self.args.len() % TRIM_TUPLE_LEN != 0 {
            return None;
        }
        self.args
            .chunks(TRIM_TUPLE_LEN)
            .map(|t| {
                let amount: f64 = t[3].parse().ok()?;
                if !amount.is_finite() {
                    return None;
                }
                Some(TrimTuple {
                    ip: t[0].parse().ok()?,
                    beam: t[1].parse().ok()?,
                    plane: t[2].parse().ok()?,
                    amount,
                    unit: t[4].parse().ok()?,
                })
            })
            .collect()
    }
}

impl Line {
    pub fn comment(text: impl Into<String>) -> Self {
        Line::Comment { text: text.into() }
    }

    pub fn command(name: impl Into<String>, args: Vec<String>) -> Self {
        Line::Command(Command::new(name, args))
    }

    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Line::Command(cmd) => Some(cmd),
            _ => None,
        }
    }
}
