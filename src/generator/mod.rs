//! Sequence generator. Turns channel trajectories into trim statements.
//!
//! A generator drives up to four channels (see [`CHANNELS`]) at one IP. The
//! output is a block of unnumbered `RELATIVE_TRIM` / `SECONDS_WAIT`
//! statements for the caller to splice into a sequence.

pub mod error;
pub mod function;
pub mod parser;

pub use error::ArgError;
pub use function::{Function, Trajectory};
pub use parser::parse_function;

use crate::dsl::vocab::{Beam, Ip, Plane, Unit};
use crate::dsl::{RELATIVE_TRIM, SECONDS_WAIT};

/// Channel order of generator inputs.
pub const CHANNELS: [(Beam, Plane); 4] = [
    (Beam::Beam1, Plane::Separation),
    (Beam::Beam1, Plane::Crossing),
    (Beam::Beam2, Plane::Separation),
    (Beam::Beam2, Plane::Crossing),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceGenerator {
    pub ip: Ip,
    pub unit: Unit,
}

impl SequenceGenerator {
    pub fn new(ip: Ip, unit: Unit) -> Self {
        Self { ip, unit }
    }

    /// Sample each trajectory `step_count` times, `wait_time` seconds apart.
    ///
    /// The run lasts `wait_time * (step_count - 1)` seconds, so a linear ramp
    /// reaches its end value on the last sample. Missing trajectories are
    /// zero.
    pub fn generate_from_function(
        &self,
        trajectories: &[Trajectory],
        wait_time: f64,
        step_count: usize,
    ) -> Result<String, ArgError> {
        check_channel_count(trajectories.len())?;
        check_wait_time(wait_time)?;
        if step_count == 0 {
            return Err(ArgError::parameter("step count must be at least 1"));
        }

        let total_time = wait_time * (step_count - 1) as f64;
        let arrays: Vec<Vec<f64>> = trajectories
            .iter()
            .map(|trajectory| {
                (0..step_count)
                    .map(|k| trajectory.sample(k as f64 * wait_time, total_time))
                    .collect()
            })
            .collect();
        self.generate_from_array(&arrays, wait_time)
    }

    /// Walk the position arrays in lock-step and emit the trims between
    /// consecutive positions, then return every channel to zero.
    ///
    /// Arrays shorter than the longest one are padded with zeros, so a
    /// channel whose array ends early goes back to zero at that index.
    pub fn generate_from_array(&self, arrays: &[Vec<f64>], wait_time: f64) -> Result<String, ArgError> {
        check_channel_count(arrays.len())?;
        check_wait_time(wait_time)?;
        for (index, array) in arrays.iter().enumerate() {
            if let Some(bad) = array.iter().find(|v| !v.is_finite()) {
                return Err(ArgError::input(index, format!("'{bad}' is not a finite position")));
            }
        }

        let len = arrays.iter().map(Vec::len).max().unwrap_or(0);
        let mut position = [0.0f64; CHANNELS.len()];
        let mut idle = 0.0;
        let mut out = Vec::new();

        for i in 0..len {
            let mut deltas = [0.0f64; CHANNELS.len()];
            for (c, delta) in deltas.iter_mut().enumerate() {
                let target = arrays.get(c).and_then(|a| a.get(i)).copied().unwrap_or(0.0);
                *delta = round2(target - position[c]);
            }
            if deltas.iter().any(|d| *d != 0.0) {
                self.emit(&mut out, idle, &deltas);
                idle = 0.0;
                for (p, d) in position.iter_mut().zip(deltas) {
                    *p = round2(*p + d);
                }
            }
            idle += wait_time;
        }

        if position.iter().any(|p| *p != 0.0) {
            self.emit(&mut out, idle, &position.map(|p| -p));
        }

        log::debug!(
            "generated {} statements from {} samples on {} channels",
            out.len(),
            len,
            arrays.len()
        );
        Ok(out.join("\n"))
    }

    fn emit(&self, out: &mut Vec<String>, idle: f64, deltas: &[f64; CHANNELS.len()]) {
        let idle = round_wait(idle);
        if idle != 0.0 {
            out.push(format!("{SECONDS_WAIT} {idle}"));
        }
        let mut trim = String::from(RELATIVE_TRIM);
        for ((beam, plane), delta) in CHANNELS.iter().zip(deltas) {
            if *delta != 0.0 {
                trim.push_str(&format!(" {} {beam} {plane} {delta:.2} {}", self.ip, self.unit));
            }
        }
        out.push(trim);
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new(Ip::Ip1, Unit::Sigma)
    }
}

/// Parse a comma- or whitespace-separated list of positions typed into
/// field `index`.
pub fn parse_array(text: &str, index: usize) -> Result<Vec<f64>, ArgError> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ArgError::input(index, format!("'{s}' is not a number"))),
        })
        .collect()
}

/// Prefix every statement of `block` with a running line number starting at
/// `first`. Blank lines and comments are left as they are.
pub fn number_statements(block: &str, first: usize) -> String {
    let mut number = first;
    block
        .lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                line.to_string()
            } else {
                let numbered = format!("{number} {trimmed}");
                number += 1;
                numbered
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_channel_count(count: usize) -> Result<(), ArgError> {
    if count > CHANNELS.len() {
        return Err(ArgError::input(
            CHANNELS.len(),
            format!("at most {} channels can be driven", CHANNELS.len()),
        ));
    }
    Ok(())
}

fn check_wait_time(wait_time: f64) -> Result<(), ArgError> {
    if !wait_time.is_finite() || wait_time < 0.0 {
        return Err(ArgError::parameter(format!(
            "wait time must be a non-negative number, got {wait_time}"
        )));
    }
    Ok(())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round_wait(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> SequenceGenerator {
        SequenceGenerator::default()
    }

    #[test]
    fn single_channel_array() {
        let out = generator().generate_from_array(&[vec![1.0, 2.0]], 1.0).unwrap();
        assert_eq!(
            out,
            "RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION -2.00 SIGMA"
        );
    }

    #[test]
    fn idle_time_accumulates_over_repeated_positions() {
        let out = generator()
            .generate_from_array(&[vec![0.5, 0.5, 0.5, 0.0]], 2.0)
            .unwrap();
        assert_eq!(
            out,
            "RELATIVE_TRIM IP1 BEAM1 SEPARATION 0.50 SIGMA\n\
             SECONDS_WAIT 6\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION -0.50 SIGMA"
        );
    }

    #[test]
    fn leading_zeros_become_an_initial_wait() {
        let out = generator().generate_from_array(&[vec![0.0, 0.0, 1.0]], 1.5).unwrap();
        assert_eq!(
            out,
            "SECONDS_WAIT 3\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA\n\
             SECONDS_WAIT 1.5\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION -1.00 SIGMA"
        );
    }

    #[test]
    fn channels_share_one_trim_line() {
        let gen = SequenceGenerator::new(Ip::Ip5, Unit::Mm);
        let out = gen
            .generate_from_array(&[vec![1.0], vec![], vec![-1.0], vec![0.25]], 1.0)
            .unwrap();
        assert_eq!(
            out,
            "RELATIVE_TRIM IP5 BEAM1 SEPARATION 1.00 MM IP5 BEAM2 SEPARATION -1.00 MM IP5 BEAM2 CROSSING 0.25 MM\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP5 BEAM1 SEPARATION -1.00 MM IP5 BEAM2 SEPARATION 1.00 MM IP5 BEAM2 CROSSING -0.25 MM"
        );
    }

    #[test]
    fn shorter_arrays_are_zero_padded() {
        let out = generator()
            .generate_from_array(&[vec![1.0, 1.0], vec![2.0]], 1.0)
            .unwrap();
        assert_eq!(
            out,
            "RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA IP1 BEAM1 CROSSING 2.00 SIGMA\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP1 BEAM1 CROSSING -2.00 SIGMA\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION -1.00 SIGMA"
        );
    }

    #[test]
    fn sub_centi_changes_are_dropped() {
        let out = generator().generate_from_array(&[vec![0.001, 0.004]], 1.0).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn empty_input_generates_nothing() {
        assert_eq!(generator().generate_from_array(&[], 1.0).unwrap(), "");
    }

    #[test]
    fn linear_function() {
        let f = parse_function("linear(-4,4)", 0).unwrap();
        let out = generator()
            .generate_from_function(&[Trajectory::Sampled(f)], 1.0, 2)
            .unwrap();
        assert_eq!(
            out,
            "RELATIVE_TRIM IP1 BEAM1 SEPARATION -4.00 SIGMA\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION 8.00 SIGMA\n\
             SECONDS_WAIT 1\n\
             RELATIVE_TRIM IP1 BEAM1 SEPARATION -4.00 SIGMA"
        );
    }

    #[test]
    fn constant_trajectory() {
        let out = generator()
            .generate_from_function(&[Trajectory::Constant(0.0), Trajectory::Constant(1.5)], 2.0, 3)
            .unwrap();
        assert_eq!(
            out,
            "RELATIVE_TRIM IP1 BEAM1 CROSSING 1.50 SIGMA\n\
             SECONDS_WAIT 6\n\
             RELATIVE_TRIM IP1 BEAM1 CROSSING -1.50 SIGMA"
        );
    }

    #[test]
    fn too_many_channels() {
        let arrays = vec![vec![1.0]; 5];
        let err = generator().generate_from_array(&arrays, 1.0).unwrap_err();
        assert_eq!(err.index(), Some(4));
    }

    #[test]
    fn non_finite_entry_carries_index() {
        let err = generator()
            .generate_from_array(&[vec![1.0], vec![f64::NAN]], 1.0)
            .unwrap_err();
        assert_eq!(err.index(), Some(1));
    }

    #[test]
    fn bad_parameters() {
        assert!(generator().generate_from_array(&[vec![1.0]], -1.0).is_err());
        assert!(generator().generate_from_array(&[vec![1.0]], f64::INFINITY).is_err());
        let err = generator()
            .generate_from_function(&[Trajectory::Constant(1.0)], 1.0, 0)
            .unwrap_err();
        assert_eq!(err.index(), None);
    }

    #[test]
    fn parse_array_values() {
        assert_eq!(parse_array("1, 2.5 -3", 0).unwrap(), vec![1.0, 2.5, -3.0]);
        assert_eq!(parse_array("", 0).unwrap(), Vec::<f64>::new());
        let err = parse_array("1, two, 3", 2).unwrap_err();
        assert_eq!(err.index(), Some(2));
    }

    #[test]
    fn number_statements_skips_comments() {
        assert_eq!(
            number_statements("# ramp\nSECONDS_WAIT 1\n\nRELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA", 1),
            "# ramp\n1 SECONDS_WAIT 1\n\n2 RELATIVE_TRIM IP1 BEAM1 SEPARATION 1.00 SIGMA"
        );
    }
}
