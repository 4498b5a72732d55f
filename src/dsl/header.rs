//! Header synthesis for bare command bodies.
//!
//! A body is a run of numbered commands (starting at 1) without the
//! `INITIALIZE_TRIM` header or the closing `END_SEQUENCE`. The header is
//! derived from the values the body's trims reference.

use super::ast::{Command, END_SEQUENCE, INITIALIZE_TRIM, TRIM_TUPLE_LEN};
use super::error::ParseError;
use super::lexer::SourceLine;

/// Physical line that errors on the synthesized header are reported against.
pub const HEADER_LINE: usize = 0;

/// Distinct values referenced by trim tuples, in order of first use.
#[derive(Debug, Default, PartialEq)]
struct Referenced<'a> {
    ips: Vec<&'a str>,
    beams: Vec<&'a str>,
    planes: Vec<&'a str>,
    units: Vec<&'a str>,
}

fn note<'a>(seen: &mut Vec<&'a str>, value: &'a str) {
    if !seen.contains(&value) {
        seen.push(value);
    }
}

fn collect_references(body: &[SourceLine]) -> Referenced<'_> {
    let mut refs = Referenced::default();
    let trims = body
        .iter()
        .filter_map(|l| l.kind.as_command())
        .filter(|cmd| cmd.is_trim());
    for cmd in trims {
        for tuple in cmd.args.chunks_exact(TRIM_TUPLE_LEN) {
            note(&mut refs.ips, &tuple[0]);
            note(&mut refs.beams, &tuple[1]);
            note(&mut refs.planes, &tuple[2]);
            note(&mut refs.units, &tuple[4]);
        }
    }
    refs
}

/// Build the `INITIALIZE_TRIM` command declaring everything `body` uses.
pub fn synthesize_header(body: &[SourceLine]) -> Result<Command, ParseError> {
    let refs = collect_references(body);
    let lists = [
        ("IP", &refs.ips),
        ("BEAM", &refs.beams),
        ("PLANE", &refs.planes),
        ("UNITS", &refs.units),
    ];

    let mut args = Vec::with_capacity(lists.len());
    for (label, values) in lists {
        if values.is_empty() {
            return Err(ParseError::vocabulary(
                format!("cannot synthesize INITIALIZE_TRIM: no trim references a {label} value"),
                HEADER_LINE,
            ));
        }
        args.push(format!("{label}({})", values.join(",")));
    }
    Ok(Command::new(INITIALIZE_TRIM, args))
}

/// Wrap `body` in a synthesized header and, unless it already has one, an
/// `END_SEQUENCE` numbered `end_ordinal` and attributed to `last_line`.
///
/// When no header can be synthesized the body is returned without one,
/// together with the reason, so it can still be validated against the
/// default vocabularies.
pub fn wrap_body(
    body: Vec<SourceLine>,
    end_ordinal: usize,
    last_line: usize,
) -> (Vec<SourceLine>, Option<ParseError>) {
    let header = synthesize_header(&body);
    let has_end = body
        .iter()
        .filter_map(|l| l.kind.as_command())
        .any(|cmd| cmd.name == END_SEQUENCE);

    let mut lines = Vec::with_capacity(body.len() + 2);
    let error = match header {
        Ok(cmd) => {
            lines.push(SourceLine::synthesized(HEADER_LINE, 0, cmd));
            None
        }
        Err(e) => Some(e),
    };
    lines.extend(body);
    if !has_end {
        lines.push(SourceLine::synthesized(
            last_line,
            end_ordinal,
            Command::new(END_SEQUENCE, Vec::new()),
        ));
    }
    (lines, error)
}
