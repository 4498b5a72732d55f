//! Error type for sequence generation.

use thiserror::Error;

/// A rejected generator input.
///
/// `Input` errors point at the array or function field that caused them so a
/// form can highlight it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgError {
    #[error("input {index}: {message}")]
    Input { index: usize, message: String },
    #[error("{0}")]
    Parameter(String),
}

impl ArgError {
    pub fn input(index: usize, message: impl Into<String>) -> Self {
        ArgError::Input {
            index,
            message: message.into(),
        }
    }

    pub fn parameter(message: impl Into<String>) -> Self {
        ArgError::Parameter(message.into())
    }

    /// Index of the offending input, if the error concerns one.
    pub fn index(&self) -> Option<usize> {
        match self {
            ArgError::Input { index, .. } => Some(*index),
            ArgError::Parameter(_) => None,
        }
    }
}
