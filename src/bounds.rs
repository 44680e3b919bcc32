use rand::prelude::*;
use rand_distr::{Distribution,Uniform};
use serde::{Deserialize,Serialize};

use crate::error::{config,Result};

/// Closed interval a single decision variable is allowed to take.
#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct Bound {
    pub lower: f64,
    pub upper: f64
}

impl Bound {
    pub fn new(lower: f64, upper: f64) -> Self {
        Bound { lower, upper }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.lower && v <= self.upper
    }
}

impl From<(f64, f64)> for Bound {
    fn from((lower, upper): (f64, f64)) -> Self {
        Bound::new(lower, upper)
    }
}

impl From<[f64; 2]> for Bound {
    fn from(b: [f64; 2]) -> Self {
        Bound::new(b[0], b[1])
    }
}

/// Draws a value uniformly from `[lower, upper]`.  Callers guarantee
/// `lower <= upper` and that both ends are finite.
pub(crate) fn uniform<R: Rng>(lower: f64, upper: f64, rng: &mut R) -> f64 {
    Uniform::new_inclusive(lower, upper).sample(rng)
}

/// Bounds of every decision variable along with which of them are
/// restricted to integer values.
#[derive(Clone,Debug)]
pub struct VariableSpec {
    bounds: Vec<Bound>,

    /// Admissible integer range of each discrete dimension
    integer: Vec<Option<(f64, f64)>>
}

impl VariableSpec {

    pub fn new(bounds: Vec<Bound>, discrete: &[usize]) -> Result<Self> {
        if bounds.is_empty() {
            return config("at least one bound is required");
        }

        for (i, b) in bounds.iter().enumerate() {
            if !b.lower.is_finite() || !b.upper.is_finite() {
                return config(format!("bound {} is not finite: [{}, {}]", i, b.lower, b.upper));
            }
            if b.lower > b.upper {
                return config(format!("bound {} is inverted: [{}, {}]", i, b.lower, b.upper));
            }
        }

        let mut integer = vec![None; bounds.len()];
        for &d in discrete {
            let b = bounds.get(d).ok_or_else(|| crate::LeapfrogError::Config(
                format!("discrete index {} out of range for {} dimensions", d, bounds.len())))?;

            let lo = b.lower.ceil();
            let hi = b.upper.floor();
            if lo > hi {
                return config(format!(
                    "dimension {} is discrete but [{}, {}] holds no integer", d, b.lower, b.upper));
            }
            integer[d] = Some((lo, hi));
        }

        Ok(VariableSpec { bounds, integer })
    }

    /// Number of decision variables.
    pub fn dims(&self) -> usize {
        self.bounds.len()
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    pub fn is_discrete(&self, dim: usize) -> bool {
        self.integer.get(dim).map(|r| r.is_some()).unwrap_or(false)
    }

    /// Indices of the discrete dimensions, ascending.
    pub fn discrete(&self) -> Vec<usize> {
        (0..self.dims()).filter(|d| self.is_discrete(*d)).collect()
    }

    /// Truncates every discrete coordinate toward zero.  A truncated value
    /// that falls outside its interval is pulled back to the nearest
    /// admissible integer.
    pub fn enforce_discrete(&self, x: &mut [f64]) {
        x.iter_mut().zip(self.integer.iter()).for_each(|(xi, range)| {
            if let Some((lo, hi)) = range {
                *xi = xi.trunc().max(*lo).min(*hi);
            }
        });
    }

    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dims() && x.iter().zip(self.bounds.iter()).all(|(xi, b)| b.contains(*xi))
    }

    /// Samples a point uniformly inside the box, discrete rounding not applied.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds.iter().map(|b| uniform(b.lower, b.upper, rng)).collect()
    }
}
