//! Line classifier for VdM sequences.
//!
//! Splits source text into typed [`Line`]s and checks that command lines are
//! numbered consecutively.

use super::ast::{Command, Line};
use super::error::ParseError;

/// A classified line together with its 0-based physical line index.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub line: usize,
    /// Sequence number this line's command holds, counting rejected command
    /// lines too. For blanks and comments, the number of the next command.
    pub ordinal: usize,
    pub kind: Line,
    /// Inserted by header synthesis rather than read from the source.
    pub synthesized: bool,
}

impl SourceLine {
    pub fn new(line: usize, ordinal: usize, kind: Line) -> Self {
        Self {
            line,
            ordinal,
            kind,
            synthesized: false,
        }
    }

    /// A command that does not come from the source text.
    pub fn synthesized(line: usize, ordinal: usize, command: Command) -> Self {
        Self {
            line,
            ordinal,
            kind: Line::Command(command),
            synthesized: true,
        }
    }
}

/// Outcome of classifying one physical line.
///
/// A numbering mismatch still yields the command so that validation can keep
/// its state consistent.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Ok(SourceLine),
    Misnumbered(SourceLine, ParseError),
    Rejected(ParseError),
}

pub struct Lexer<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    next_number: usize,
}

impl<'a> Lexer<'a> {
    /// Classify `source`, expecting the first command line to be numbered
    /// `first_number`.
    pub fn new(source: &'a str, first_number: usize) -> Self {
        Self {
            lines: source.lines().enumerate(),
            next_number: first_number,
        }
    }

    /// The number the next command line must carry.
    pub fn next_number(&self) -> usize {
        self.next_number
    }

    fn classify(&mut self, line: usize, text: &str) -> Classified {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Classified::Ok(SourceLine::new(line, self.next_number, Line::Empty));
        }
        if let Some(rest) = trimmed.strip_prefix('#') {
            return Classified::Ok(SourceLine::new(
                line,
                self.next_number,
                Line::comment(rest.trim()),
            ));
        }

        // Every command-like line consumes a number, valid or not.
        let expected = self.next_number;
        self.next_number += 1;

        let mut tokens = trimmed.split_whitespace();
        let Some(number_token) = tokens.next() else {
            return Classified::Rejected(ParseError::lexical("empty command line", line));
        };
        let Some(number) = line_number(number_token) else {
            return Classified::Rejected(ParseError::lexical(
                format!("expected line number, found '{number_token}'"),
                line,
            ));
        };
        let Some(name) = tokens.next() else {
            return Classified::Rejected(ParseError::lexical(
                format!("missing command after line number {number}"),
                line,
            ));
        };

        let source_line = SourceLine::new(
            line,
            expected,
            Line::Command(Command::new(name, tokens.map(str::to_string).collect())),
        );
        if number == expected {
            Classified::Ok(source_line)
        } else {
            Classified::Misnumbered(
                source_line,
                ParseError::numbering(
                    format!("expected line number {expected}, found {number}"),
                    line,
                ),
            )
        }
    }
}

/// A line number in canonical form: plain digits, no sign, no leading zeros.
fn line_number(token: &str) -> Option<usize> {
    let canonical = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if canonical {
        token.parse().ok()
    } else {
        None
    }
}

impl Iterator for Lexer<'_> {
    type Item = Classified;

    fn next(&mut self) -> Option<Self::Item> {
        let (line, text) = self.lines.next()?;
        Some(self.classify(line, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;

    fn classify(src: &str) -> Vec<Classified> {
        Lexer::new(src, 0).collect()
    }

    #[test]
    fn blank_and_whitespace_lines_are_empty() {
        let lines = classify("\n   \n\t");
        assert_eq!(lines.len(), 3);
        for c in lines {
            assert!(matches!(c, Classified::Ok(SourceLine { kind: Line::Empty, .. })));
        }
    }

    #[test]
    fn comment_text_is_trimmed() {
        let lines = classify("#   horizontal scan  ");
        assert_eq!(
            lines[0],
            Classified::Ok(SourceLine::new(0, 0, Line::comment("horizontal scan")))
        );
    }

    #[test]
    fn command_tokens_split_on_whitespace_runs() {
        let lines = classify("0   SECONDS_WAIT \t 2.5");
        let Classified::Ok(SourceLine {
            kind: Line::Command(cmd),
            ..
        }) = &lines[0]
        else {
            panic!("expected command, got {:?}", lines[0]);
        };
        assert_eq!(cmd.name, "SECONDS_WAIT");
        assert_eq!(cmd.args, vec!["2.5"]);
    }

    #[test]
    fn comments_and_blanks_do_not_consume_numbers() {
        let lines = classify("0 A\n# note\n\n1 B");
        assert!(lines.iter().all(|c| matches!(c, Classified::Ok(_))));
    }

    #[test]
    fn skipped_number_is_numbering_error() {
        let lines = classify("0 A\n1 B\n5 C\n3 D");
        match &lines[2] {
            Classified::Misnumbered(src, err) => {
                assert_eq!(src.line, 2);
                assert_eq!(err.kind, ErrorKind::NumberingError);
                assert_eq!(err.line, 2);
            }
            other => panic!("expected numbering error, got {other:?}"),
        }
        // The bad number still consumed slot 2, so 3 is accepted.
        assert!(matches!(lines[3], Classified::Ok(_)));
    }

    #[test]
    fn first_number_offset() {
        let lines: Vec<_> = Lexer::new("1 A\n2 B", 1).collect();
        assert!(lines.iter().all(|c| matches!(c, Classified::Ok(_))));
    }

    #[test]
    fn missing_number_is_lexical_error() {
        let lines = classify("END_SEQUENCE");
        match &lines[0] {
            Classified::Rejected(err) => assert_eq!(err.kind, ErrorKind::LexicalError),
            other => panic!("expected lexical error, got {other:?}"),
        }
    }

    #[test]
    fn number_without_command_is_lexical_error() {
        let lines = classify("0");
        assert!(matches!(&lines[0], Classified::Rejected(e) if e.kind == ErrorKind::LexicalError));
    }

    #[test]
    fn non_canonical_numbers_are_lexical_errors() {
        for src in ["00 A", "01 A", "+0 A", "-0 A", "0x1 A", "1.0 A"] {
            let lines = classify(src);
            assert!(
                matches!(&lines[0], Classified::Rejected(e) if e.kind == ErrorKind::LexicalError),
                "{src}: {:?}",
                lines[0]
            );
        }
        assert_eq!(line_number("0"), Some(0));
        assert_eq!(line_number("10"), Some(10));
    }

    #[test]
    fn ordinals_count_rejected_lines() {
        let lines = classify("0 A
B
# note
2 C");
        let ordinals: Vec<_> = lines
            .iter()
            .filter_map(|c| match c {
                Classified::Ok(l) => Some((l.line, l.ordinal)),
                _ => None,
            })
            .collect();
        assert_eq!(ordinals, vec![(0, 0), (2, 2), (3, 2)]);
    }

    #[test]
    fn trailing_newline_adds_no_line() {
        assert_eq!(classify("0 A\n").len(), 1);
        assert_eq!(classify("0 A\r\n1 B\r\n").len(), 2);
    }
}
