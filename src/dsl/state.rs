//! Per-document validation state.

use super::vocab::{Beam, Ip, Plane, Unit};

/// State threaded through command handlers while one document is validated.
///
/// Created fresh for every parse and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseState {
    pub ips: Vec<Ip>,
    pub beams: Vec<Beam>,
    pub planes: Vec<Plane>,
    pub units: Vec<Unit>,
    pub fit: Option<FitBlock>,
    pub has_ended: bool,
    /// Ordinal of the command being validated among command lines.
    pub current_line_num: usize,
}

/// An open `START_FIT` block.
#[derive(Debug, Clone, PartialEq)]
pub struct FitBlock {
    pub plane: Plane,
    /// Planes allowed before the block narrowed them.
    pub saved_planes: Vec<Plane>,
    /// Physical line of the `START_FIT`.
    pub line: usize,
}

impl ParseState {
    pub fn new() -> Self {
        Self {
            ips: Ip::ALL.to_vec(),
            beams: Beam::ALL.to_vec(),
            planes: Plane::ALL.to_vec(),
            units: Unit::ALL.to_vec(),
            fit: None,
            has_ended: false,
            current_line_num: 0,
        }
    }

    pub fn is_fitting(&self) -> bool {
        self.fit.is_some()
    }
}

impl Default for ParseState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_full_vocabularies() {
        let state = ParseState::new();
        assert_eq!(state.ips.len(), 4);
        assert_eq!(state.beams, vec![Beam::Beam1, Beam::Beam2]);
        assert_eq!(state.units, vec![Unit::Sigma, Unit::Mm]);
        assert!(!state.is_fitting());
        assert!(!state.has_ended);
        assert_eq!(state.current_line_num, 0);
    }
}
