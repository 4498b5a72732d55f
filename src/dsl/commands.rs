//! Command dispatch table.
//!
//! Each command name maps to a pure handler that checks the command's
//! arguments against the current [`ParseState`] and returns the next state.
//! Handlers never mutate the state they are given.

use std::str::FromStr;

use phf::{phf_map, Map};

use super::ast::{
    END_FIT, END_SEQUENCE, INITIALIZE_TRIM, SECONDS_WAIT, START_FIT, TRIM_TUPLE_LEN,
};
use super::error::ParseError;
use super::state::{FitBlock, ParseState};
use super::vocab::{Beam, FitType, Ip, Plane, UnknownWord, Unit};

/// Validates one command: `(args, state, physical line) -> next state`.
pub type Handler = fn(&[String], &ParseState, usize) -> Result<ParseState, ParseError>;

#[derive(Clone, Copy)]
pub struct CommandInfo {
    pub handler: Handler,
    /// Short argument synopsis used in messages and help output.
    pub usage: &'static str,
}

pub static COMMANDS: Map<&'static str, CommandInfo> = phf_map! {
    "INITIALIZE_TRIM" => CommandInfo {
        handler: initialize_trim,
        usage: "IP(<ip>) BEAM(<beam>,...) PLANE(<plane>,...) UNITS(<unit>,...)",
    },
    "SECONDS_WAIT" => CommandInfo {
        handler: seconds_wait,
        usage: "<seconds>",
    },
    "RELATIVE_TRIM" => CommandInfo {
        handler: trim,
        usage: "(<ip> <beam> <plane> <amount> <unit>)...",
    },
    "ABSOLUTE_TRIM" => CommandInfo {
        handler: trim,
        usage: "(<ip> <beam> <plane> <amount> <unit>)...",
    },
    "START_FIT" => CommandInfo {
        handler: start_fit,
        usage: "<plane> <fit type>",
    },
    "END_FIT" => CommandInfo {
        handler: end_fit,
        usage: "",
    },
    "END_SEQUENCE" => CommandInfo {
        handler: end_sequence,
        usage: "",
    },
    "MESSAGE" => CommandInfo {
        handler: message,
        usage: "<text>",
    },
};

/// Look up the handler for a command name.
pub fn lookup(name: &str) -> Option<&'static CommandInfo> {
    COMMANDS.get(name)
}

fn initialize_trim(
    args: &[String],
    state: &ParseState,
    line: usize,
) -> Result<ParseState, ParseError> {
    if state.current_line_num != 0 {
        return Err(ParseError::state(
            format!("{INITIALIZE_TRIM} is only allowed as the first command"),
            line,
        ));
    }
    if args.len() != 4 {
        return Err(ParseError::arity(
            format!(
                "{INITIALIZE_TRIM} takes 4 arguments (IP, BEAM, PLANE, UNITS), found {}",
                args.len()
            ),
            line,
        ));
    }

    let ips = bracket_list(&args[0], "IP", line)?;
    let beams = bracket_list(&args[1], "BEAM", line)?;
    let planes = bracket_list(&args[2], "PLANE", line)?;
    let units = bracket_list(&args[3], "UNITS", line)?;

    if ips.len() != 1 {
        return Err(ParseError::arity(
            format!("exactly one IP must be declared, found {}", ips.len()),
            line,
        ));
    }

    Ok(ParseState {
        ips: declared_subset::<Ip>(&ips, line)?,
        beams: declared_subset::<Beam>(&beams, line)?,
        planes: declared_subset::<Plane>(&planes, line)?,
        units: declared_subset::<Unit>(&units, line)?,
        ..state.clone()
    })
}

fn seconds_wait(
    args: &[String],
    state: &ParseState,
    line: usize,
) -> Result<ParseState, ParseError> {
    expect_arity(SECONDS_WAIT, args, 1, line)?;
    finite_number(&args[0], line)?;
    Ok(state.clone())
}

fn trim(
    args: &[String],
    state: &ParseState,
    line: usize,
) -> Result<ParseState, ParseError> {
    if args.is_empty() || args.len() % TRIM_TUPLE_LEN != 0 {
        return Err(ParseError::arity(
            format!(
                "trim arguments come in groups of {TRIM_TUPLE_LEN} (IP BEAM PLANE AMOUNT UNIT), found {}",
                args.len()
            ),
            line,
        ));
    }
    for tuple in args.chunks(TRIM_TUPLE_LEN) {
        allowed(&tuple[0], &state.ips, line)?;
        allowed(&tuple[1], &state.beams, line)?;
        allowed(&tuple[2], &state.planes, line)?;
        finite_number(&tuple[3], line)?;
        allowed(&tuple[4], &state.units, line)?;
    }
    Ok(state.clone())
}

fn start_fit(
    args: &[String],
    state: &ParseState,
    line: usize,
) -> Result<ParseState, ParseError> {
    if let Some(open) = &state.fit {
        return Err(ParseError::state(
            format!(
                "{START_FIT} inside the {} fit block opened on line {}",
                open.plane, open.line
            ),
            line,
        ));
    }
    expect_arity(START_FIT, args, 2, line)?;
    let plane = allowed(&args[0], &state.planes, line)?;
    word::<FitType>(&args[1], line)?;

    Ok(ParseState {
        planes: vec![plane],
        fit: Some(FitBlock {
            plane,
            saved_planes: state.planes.clone(),
            line,
        }),
        ..state.clone()
    })
}

fn end_fit(
    args: &[String],
    state: &ParseState,
    line: usize,
) -> Result<ParseState, ParseError> {
    let Some(open) = &state.fit else {
        return Err(ParseError::state(
            format!("{END_FIT} without a matching {START_FIT}"),
            line,
        ));
    };
    expect_arity(END_FIT, args, 0, line)?;
    Ok(ParseState {
        planes: open.saved_planes.clone(),
        fit: None,
        ..state.clone()
    })
}

fn end_sequence(
    args: &[String],
    state: &ParseState,
    line: usize,
) -> Result<ParseState, ParseError> {
    expect_arity(END_SEQUENCE, args, 0, line)?;
    Ok(ParseState {
        has_ended: true,
        ..state.clone()
    })
}

fn message(
    _args: &[String],
    state: &ParseState,
    _line: usize,
) -> Result<ParseState, ParseError> {
    Ok(state.clone())
}

fn expect_arity(name: &str, args: &[String], count: usize, line: usize) -> Result<(), ParseError> {
    if args.len() == count {
        return Ok(());
    }
    let expected = match count {
        0 => "no arguments".to_string(),
        1 => "1 argument".to_string(),
        n => format!("{n} arguments"),
    };
    Err(ParseError::arity(
        format!("{name} takes {expected}, found {}", args.len()),
        line,
    ))
}

fn finite_number(token: &str, line: usize) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::numeric(
            format!("'{token}' is not a finite number"),
            line,
        )),
    }
}

fn word<T: FromStr<Err = UnknownWord>>(token: &str, line: usize) -> Result<T, ParseError> {
    token
        .parse()
        .map_err(|e: UnknownWord| ParseError::vocabulary(e.to_string(), line))
}

/// Parse `token` and check it against the currently allowed members.
fn allowed<T>(token: &str, allowed: &[T], line: usize) -> Result<T, ParseError>
where
    T: FromStr<Err = UnknownWord> + Copy + PartialEq + std::fmt::Display,
{
    let value = word::<T>(token, line)?;
    if allowed.contains(&value) {
        return Ok(value);
    }
    let declared: Vec<String> = allowed.iter().map(ToString::to_string).collect();
    Err(ParseError::vocabulary(
        format!("{token} is not allowed here (allowed: {})", declared.join(", ")),
        line,
    ))
}

/// Split `LABEL(a,b,...)` into its members.
fn bracket_list<'t>(
    token: &'t str,
    label: &str,
    line: usize,
) -> Result<Vec<&'t str>, ParseError> {
    let inner = token
        .strip_prefix(label)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| {
            ParseError::lexical(format!("expected {label}(...), found '{token}'"), line)
        })?;
    Ok(inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect())
}

/// Decode a declared list into distinct vocabulary members, first use first.
fn declared_subset<T>(words: &[&str], line: usize) -> Result<Vec<T>, ParseError>
where
    T: FromStr<Err = UnknownWord> + Copy + PartialEq,
{
    let mut members = Vec::new();
    for w in words {
        let value = word::<T>(w, line)?;
        if !members.contains(&value) {
            members.push(value);
        }
    }
    if members.is_empty() {
        return Err(ParseError::vocabulary(
            "each declared list needs at least one member",
            line,
        ));
    }
    Ok(members)
}
