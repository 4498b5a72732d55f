//! Error types for sequence parsing and deparsing.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single problem found in a sequence, keyed by physical line.
///
/// For [`ErrorKind::StructuralError`] the `line` is the index of the
/// offending entity in the structure handed to the deparser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("line {line}: {kind}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    LexicalError,
    NumberingError,
    UnknownCommandError,
    ArityError,
    VocabularyError,
    NumericError,
    StateError,
    StructuralError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }

    pub fn lexical(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::LexicalError, message, line)
    }

    pub fn numbering(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::NumberingError, message, line)
    }

    pub fn unknown_command(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::UnknownCommandError, message, line)
    }

    pub fn arity(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::ArityError, message, line)
    }

    pub fn vocabulary(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::VocabularyError, message, line)
    }

    pub fn numeric(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::NumericError, message, line)
    }

    pub fn state(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::StateError, message, line)
    }

    pub fn structural(message: impl Into<String>, index: usize) -> Self {
        Self::new(ErrorKind::StructuralError, message, index)
    }
}

/// Every error collected from one parse or deparse call, ordered by line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<ParseError>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParseError) {
        self.0.push(error);
    }

    /// Record `error` unless its line already carries an error.
    pub fn push_first(&mut self, error: ParseError) {
        if !self.has_error_on(error.line) {
            self.0.push(error);
        }
    }

    pub fn has_error_on(&self, line: usize) -> bool {
        self.0.iter().any(|e| e.line == line)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    /// Order errors by line, keeping insertion order within a line.
    pub fn sort(&mut self) {
        self.0.sort_by_key(|e| e.line);
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.0
    }

    /// `Ok(value)` when nothing was recorded, otherwise the sorted errors.
    pub fn into_result<T>(mut self, value: T) -> Result<T, Diagnostics> {
        if self.is_empty() {
            Ok(value)
        } else {
            self.sort();
            Err(self)
        }
    }
}

impl From<ParseError> for Diagnostics {
    fn from(error: ParseError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for Diagnostics {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
