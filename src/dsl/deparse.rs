//! Deparser: renders a [`Sequence`] back to canonical text.

use serde_json::Value;

use super::ast::{Line, Sequence};
use super::error::{Diagnostics, ParseError};

/// Render `sequence` as canonical text.
///
/// Command lines are renumbered from 0 in order, whatever numbers the source
/// carried. Every line, including the last, ends with `\n`.
pub fn deparse(sequence: &Sequence) -> String {
    let mut out = String::new();
    let mut number = 0usize;

    for line in &sequence.lines {
        match line {
            Line::Empty => {}
            Line::Comment { text } => {
                out.push_str("# ");
                out.push_str(text);
            }
            Line::Command(cmd) => {
                out.push_str(&number.to_string());
                out.push(' ');
                out.push_str(&cmd.name);
                for arg in &cmd.args {
                    out.push(' ');
                    out.push_str(arg);
                }
                number += 1;
            }
        }
        out.push('\n');
    }

    out
}

/// Render a JSON array of line entities, as exchanged with editor front ends.
///
/// Entities whose kind is not `empty`, `comment` or `command`, or that are
/// otherwise malformed, are reported as structural errors keyed by their
/// index in the array.
pub fn deparse_entities(json: &str) -> Result<String, Diagnostics> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ParseError::structural(format!("invalid JSON: {e}"), 0))?;
    let Value::Array(entities) = value else {
        return Err(ParseError::structural("expected an array of line entities", 0).into());
    };

    let mut diagnostics = Diagnostics::new();
    let mut lines = Vec::with_capacity(entities.len());
    for (index, entity) in entities.into_iter().enumerate() {
        match serde_json::from_value::<Line>(entity) {
            Ok(line) => lines.push(line),
            Err(e) => diagnostics.push(ParseError::structural(
                format!("unrecognized entity: {e}"),
                index,
            )),
        }
    }

    let sequence = diagnostics.into_result(Sequence::new(lines))?;
    Ok(deparse(&sequence))
}
