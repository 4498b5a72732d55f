//! Command validator. Runs classified lines through the command state machine.

use super::ast::{Command, Line, INITIALIZE_TRIM};
use super::commands;
use super::error::{Diagnostics, ParseError};
use super::lexer::SourceLine;
use super::state::ParseState;

/// Validate `lines` in order, recording at most one error per source line.
///
/// `last_line` is the physical line that document-level errors such as a
/// missing `END_SEQUENCE` are attached to. Errors on synthesized lines share
/// a physical line with the source, so they are recorded after the source
/// errors and never displace them. Returns the final state.
pub fn validate(
    lines: &[SourceLine],
    last_line: usize,
    diagnostics: &mut Diagnostics,
) -> ParseState {
    let mut state = ParseState::new();
    let mut synthesized_errors = Vec::new();

    for source in lines {
        let Line::Command(cmd) = &source.kind else {
            continue;
        };
        // Rejected command lines never get here but still hold a number.
        state.current_line_num = source.ordinal;
        match step(&state, cmd, source.line) {
            Ok(next) => state = next,
            Err(e) if source.synthesized => synthesized_errors.push(e),
            Err(e) => diagnostics.push_first(e),
        }
        log::trace!(
            "line {}: {} (fitting: {}, ended: {})",
            source.line,
            cmd.name,
            state.is_fitting(),
            state.has_ended
        );
        state.current_line_num += 1;
    }

    for e in synthesized_errors {
        diagnostics.push(e);
    }
    if let Some(open) = &state.fit {
        diagnostics.push(ParseError::state(
            "missing END_FIT for this START_FIT",
            open.line,
        ));
    }
    if !state.has_ended {
        diagnostics.push(ParseError::state("missing END_SEQUENCE", last_line));
    }

    state
}

fn step(state: &ParseState, cmd: &Command, line: usize) -> Result<ParseState, ParseError> {
    if state.has_ended {
        return Err(ParseError::state(
            format!("{} after END_SEQUENCE", cmd.name),
            line,
        ));
    }
    let info = commands::lookup(&cmd.name).ok_or_else(|| {
        ParseError::unknown_command(format!("unknown command '{}'", cmd.name), line)
    })?;
    if state.current_line_num == 0 && cmd.name != INITIALIZE_TRIM {
        return Err(ParseError::state(
            format!("sequence must begin with INITIALIZE_TRIM, found {}", cmd.name),
            line,
        ));
    }
    (info.handler)(&cmd.args, state, line)
}
