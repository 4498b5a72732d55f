//! Trajectory functions sampled by the generator.
//!
//! Every function is evaluated at a time `t` (seconds since the start of the
//! run) given the total run time, and returns a beam position.

use std::ops::{Add, Mul, Neg, Sub};

/// A closed-form trajectory.
///
/// Sums and products can be built with `+`, `-` and `*`, mixing functions and
/// plain numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Constant(f64),
    /// Ramp from `start` at `t = 0` to `end` at the end of the run.
    Linear { start: f64, end: f64 },
    /// Square wave: `amplitude` for the first half of each period, then 0.
    Periodic { period: f64, amplitude: f64 },
    /// 1 on `[start_time, end_time)`, 0 elsewhere.
    Step { start_time: f64, end_time: f64 },
    Sum(Box<Function>, Box<Function>),
    Product(Box<Function>, Box<Function>),
}

impl Function {
    pub fn zero() -> Self {
        Function::Constant(0.0)
    }

    pub fn constant(value: f64) -> Self {
        Function::Constant(value)
    }

    pub fn linear(start: f64, end: f64) -> Self {
        Function::Linear { start, end }
    }

    pub fn periodic(period: f64, amplitude: f64) -> Self {
        Function::Periodic { period, amplitude }
    }

    pub fn step(start_time: f64, end_time: f64) -> Self {
        Function::Step {
            start_time,
            end_time,
        }
    }

    /// Evaluate at time `t` of a run lasting `total_time`.
    pub fn eval(&self, t: f64, total_time: f64) -> f64 {
        match self {
            Function::Constant(v) => *v,
            Function::Linear { start, end } => {
                if total_time <= 0.0 {
                    *start
                } else {
                    start + (end - start) * (t / total_time)
                }
            }
            Function::Periodic { period, amplitude } => {
                if *period <= 0.0 {
                    return 0.0;
                }
                if t.rem_euclid(*period) < period / 2.0 {
                    *amplitude
                } else {
                    0.0
                }
            }
            Function::Step {
                start_time,
                end_time,
            } => {
                if t >= *start_time && t < *end_time {
                    1.0
                } else {
                    0.0
                }
            }
            Function::Sum(a, b) => a.eval(t, total_time) + b.eval(t, total_time),
            Function::Product(a, b) => a.eval(t, total_time) * b.eval(t, total_time),
        }
    }
}

impl From<f64> for Function {
    fn from(value: f64) -> Self {
        Function::Constant(value)
    }
}

impl<T: Into<Function>> Add<T> for Function {
    type Output = Function;

    fn add(self, rhs: T) -> Function {
        Function::Sum(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Function>> Mul<T> for Function {
    type Output = Function;

    fn mul(self, rhs: T) -> Function {
        Function::Product(Box::new(self), Box::new(rhs.into()))
    }
}

impl Neg for Function {
    type Output = Function;

    fn neg(self) -> Function {
        self * -1.0
    }
}

impl<T: Into<Function>> Sub<T> for Function {
    type Output = Function;

    fn sub(self, rhs: T) -> Function {
        let rhs: Function = rhs.into();
        self + (-rhs)
    }
}

impl Add<Function> for f64 {
    type Output = Function;

    fn add(self, rhs: Function) -> Function {
        Function::Constant(self) + rhs
    }
}

impl Mul<Function> for f64 {
    type Output = Function;

    fn mul(self, rhs: Function) -> Function {
        Function::Constant(self) * rhs
    }
}

/// Position source for one generator channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Trajectory {
    Constant(f64),
    Sampled(Function),
}

impl Trajectory {
    pub fn sample(&self, t: f64, total_time: f64) -> f64 {
        match self {
            Trajectory::Constant(v) => *v,
            Trajectory::Sampled(f) => f.eval(t, total_time),
        }
    }
}

impl From<Function> for Trajectory {
    fn from(f: Function) -> Self {
        Trajectory::Sampled(f)
    }
}
