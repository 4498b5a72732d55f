//! VdM sequence language: text to classified lines to a validated [`Sequence`] and back.

pub mod ast;
pub mod commands;
pub mod deparse;
pub mod error;
pub mod header;
pub mod lexer;
pub mod state;
pub mod validator;
pub mod vocab;

pub use ast::*;
pub use deparse::{deparse, deparse_entities};
pub use error::{Diagnostics, ErrorKind, ParseError};

use lexer::{Classified, Lexer};

/// Entry point for parsing and validating sequence text.
pub struct Parser;

impl Parser {
    /// Parse and validate `source`.
    ///
    /// With `header_mode` set, `source` is a bare body numbered from 1; the
    /// `INITIALIZE_TRIM` header and closing `END_SEQUENCE` are synthesized and
    /// included in the returned sequence.
    pub fn parse(source: &str, header_mode: bool) -> Result<Sequence, Diagnostics> {
        let first_number = usize::from(header_mode);
        let mut diagnostics = Diagnostics::new();
        let mut lines = Vec::new();

        let mut lexer = Lexer::new(source, first_number);
        for classified in lexer.by_ref() {
            match classified {
                Classified::Ok(line) => lines.push(line),
                Classified::Misnumbered(line, error) => {
                    diagnostics.push_first(error);
                    lines.push(line);
                }
                Classified::Rejected(error) => diagnostics.push_first(error),
            }
        }

        let last_line = source.lines().count().saturating_sub(1);
        let mut header_error = None;
        if header_mode {
            let (wrapped, error) = header::wrap_body(lines, lexer.next_number(), last_line);
            lines = wrapped;
            header_error = error;
        }

        validator::validate(&lines, last_line, &mut diagnostics);
        if let Some(error) = header_error {
            diagnostics.push(error);
        }
        log::debug!(
            "parsed {} lines (header mode: {header_mode}), {} errors",
            lines.len(),
            diagnostics.len()
        );

        diagnostics.into_result(Sequence::new(lines.into_iter().map(|l| l.kind).collect()))
    }

    /// Validate `source`, returning every diagnostic (empty when valid).
    pub fn validate(source: &str, header_mode: bool) -> Vec<ParseError> {
        match Self::parse(source, header_mode) {
            Ok(_) => Vec::new(),
            Err(diagnostics) => diagnostics.into_vec(),
        }
    }

    /// Parse and re-render `source` canonically.
    pub fn format(source: &str, header_mode: bool) -> Result<String, Diagnostics> {
        Self::parse(source, header_mode).map(|seq| deparse(&seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "0 INITIALIZE_TRIM IP(IP1) BEAM(BEAM1,BEAM2) PLANE(SEPARATION) UNITS(SIGMA)\n1 END_SEQUENCE";

    #[test]
    fn parse_minimal_sequence() {
        let seq = Parser::parse(EXAMPLE, false).unwrap();
        assert_eq!(seq.lines.len(), 2);
        assert_eq!(seq.commands().next().unwrap().name, INITIALIZE_TRIM);
    }

    #[test]
    fn format_adds_trailing_newline() {
        assert_eq!(Parser::format(EXAMPLE, false).unwrap(), format!("{EXAMPLE}\n"));
    }

    #[test]
    fn numbering_error_cites_physical_line() {
        let src = "# scan\n0 INITIALIZE_TRIM IP(IP1) BEAM(BEAM1) PLANE(SEPARATION) UNITS(SIGMA)\n1 SECONDS_WAIT 1\n5 SECONDS_WAIT 1\n3 END_SEQUENCE";
        let errs = Parser::validate(src, false);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ErrorKind::NumberingError);
        assert_eq!(errs[0].line, 3);
    }

    #[test]
    fn rejected_lines_do_not_reach_validation() {
        let src = "0 INITIALIZE_TRIM IP(IP1) BEAM(BEAM1) PLANE(SEPARATION) UNITS(SIGMA)\nSECONDS_WAIT 1\n2 END_SEQUENCE";
        let errs = Parser::validate(src, false);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ErrorKind::LexicalError);
        assert_eq!(errs[0].line, 1);
    }

    #[test]
    fn header_mode_synthesizes_wrapper() {
        let body = "1 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA\n2 SECONDS_WAIT 1\n3 RELATIVE_TRIM IP1 BEAM1 SEPARATION -1.00 SIGMA";
        let text = Parser::format(body, true).unwrap();
        assert_eq!(
            text,
            "0 INITIALIZE_TRIM IP(IP1) BEAM(BEAM1) PLANE(SEPARATION) UNITS(SIGMA)\n\
             1 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA\n\
             2 SECONDS_WAIT 1\n\
             3 RELATIVE_TRIM IP1 BEAM1 SEPARATION -1.00 SIGMA\n\
             4 END_SEQUENCE\n"
        );
    }

    #[test]
    fn header_mode_expects_numbering_from_one() {
        let errs = Parser::validate("0 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1 SIGMA", true);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ErrorKind::NumberingError);
    }

    #[test]
    fn header_mode_rejects_two_ips_on_header_line() {
        let body = "1 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1 SIGMA\n2 RELATIVE_TRIM IP5 BEAM1 SEPARATION 1 SIGMA";
        let errs = Parser::validate(body, true);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ErrorKind::ArityError);
        assert_eq!(errs[0].line, header::HEADER_LINE);
    }

    #[test]
    fn rejected_first_line_does_not_shift_the_counter() {
        let src = "INITIALIZE_TRIM IP(IP1) BEAM(BEAM1) PLANE(SEPARATION) UNITS(SIGMA)\n\
                   1 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1 SIGMA\n\
                   2 END_SEQUENCE";
        let errs = Parser::validate(src, false);
        assert_eq!(errs.len(), 1, "{errs:?}");
        assert_eq!(errs[0].kind, ErrorKind::LexicalError);
        assert_eq!(errs[0].line, 0);
    }

    #[test]
    fn non_canonical_numbers_do_not_parse() {
        for src in [
            "00 INITIALIZE_TRIM IP(IP1) BEAM(BEAM1) PLANE(SEPARATION) UNITS(SIGMA)\n01 END_SEQUENCE\n",
            "0 INITIALIZE_TRIM IP(IP1) BEAM(BEAM1) PLANE(SEPARATION) UNITS(SIGMA)\n+1 END_SEQUENCE\n",
        ] {
            let errs = Parser::validate(src, false);
            assert!(
                errs.iter().any(|e| e.kind == ErrorKind::LexicalError),
                "{src}: {errs:?}"
            );
        }
    }

    #[test]
    fn header_errors_and_body_errors_on_the_same_line() {
        let body = "1 RELATIVE_TRIM IP1 BEAM3 SEPARATION 1 SIGMA\n2 RELATIVE_TRIM IP5 BEAM1 SEPARATION 1 SIGMA";
        let kinds: Vec<_> = Parser::validate(body, true)
            .iter()
            .map(|e| (e.line, e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(0, ErrorKind::VocabularyError), (0, ErrorKind::ArityError)]
        );
    }

    #[test]
    fn header_error_survives_a_numbering_error() {
        let body = "0 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1 SIGMA\n2 RELATIVE_TRIM IP5 BEAM1 SEPARATION 1 SIGMA";
        let kinds: Vec<_> = Parser::validate(body, true)
            .iter()
            .map(|e| (e.line, e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![(0, ErrorKind::NumberingError), (0, ErrorKind::ArityError)]
        );
    }

    #[test]
    fn failed_synthesis_still_validates_the_body() {
        let body = "1 SECONDS_WAIT x\n2 BOGUS\n3 START_FIT CROSSING NOPE";
        let kinds: Vec<_> = Parser::validate(body, true)
            .iter()
            .map(|e| (e.line, e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (0, ErrorKind::NumericError),
                (0, ErrorKind::VocabularyError),
                (1, ErrorKind::UnknownCommandError),
                (2, ErrorKind::VocabularyError),
            ]
        );
    }

    #[test]
    fn header_mode_without_trims_fails() {
        let errs = Parser::validate("1 SECONDS_WAIT 1", true);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ErrorKind::VocabularyError);
    }
}
