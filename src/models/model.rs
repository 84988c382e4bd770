//! Model definition and evaluation.
//!
//! A `Model` is a name, an ordered list of parameter names (its arity), and a
//! function pointer. It is `Copy`, so fit results can carry the model they
//! were produced with.

use std::f64::consts::PI;
use std::fmt;

#[derive(Clone, Copy)]
pub struct Model {
    /// Registry key.
    pub name: &'static str,
    /// Human-readable formula.
    pub formula: &'static str,
    /// Parameter names, in the order the function expects them.
    pub params: &'static [&'static str],
    func: fn(f64, &[f64]) -> f64,
}

impl Model {
    pub const fn new(
        name: &'static str,
        formula: &'static str,
        params: &'static [&'static str],
        func: fn(f64, &[f64]) -> f64,
    ) -> Self {
        Self {
            name,
            formula,
            params,
            func,
        }
    }

    /// Number of free parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Evaluate `f(x; p)`.
    ///
    /// # Panics
    /// Panics if `p` is shorter than `self.arity()`. The fit engine checks the
    /// arity before any evaluation.
    pub fn eval(&self, x: f64, p: &[f64]) -> f64 {
        (self.func)(x, p)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

pub fn linear(x: f64, p: &[f64]) -> f64 {
    p[0] * x + p[1]
}

pub fn quadratic(x: f64, p: &[f64]) -> f64 {
    p[0] * x * x + p[1] * x + p[2]
}

pub fn power_law(x: f64, p: &[f64]) -> f64 {
    p[0] * x.powf(p[1])
}

pub fn exponential_decay(x: f64, p: &[f64]) -> f64 {
    p[0] * (-x / p[1]).exp()
}

pub fn damped_sinusoid(x: f64, p: &[f64]) -> f64 {
    let (a, tau, period, phi) = (p[0], p[1], p[2], p[3]);
    a * (-x / tau).exp() * (2.0 * PI * x / period + phi).cos()
}

/// `a (1 + b x + c² x)`.
pub fn power_series(x: f64, p: &[f64]) -> f64 {
    p[0] * (1.0 + x * p[1] + x * p[2] * p[2])
}

/// Polynomial with ascending coefficients `p[0] + p[1] x + ...` (Horner form).
pub fn polynomial(x: f64, p: &[f64]) -> f64 {
    p.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

pub fn cubic(x: f64, p: &[f64]) -> f64 {
    polynomial(x, &p[..4])
}

pub fn sextic(x: f64, p: &[f64]) -> f64 {
    polynomial(x, &p[..7])
}

/// `K Lⁿ`.
pub fn generalized_power(x: f64, p: &[f64]) -> f64 {
    p[0] * x.powf(p[1])
}

/// `A sin(w x + phi) + d`.
pub fn sinusoid(x: f64, p: &[f64]) -> f64 {
    let (amplitude, omega, offset, phi) = (p[0], p[1], p[2], p[3]);
    amplitude * (omega * x + phi).sin() + offset
}
