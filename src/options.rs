use serde::{Deserialize,Serialize};

use crate::error::{config,Result};

/// Every option the optimizer understands.  Unknown keys are rejected
/// when options are read from a document.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Number of points in the population
    pub points: usize,

    /// Indices of the integer-valued decision variables
    pub discrete: Vec<usize>,

    pub max_iterations: usize,

    /// Convergence tolerance
    pub tolerance: f64,

    /// Seed of the random stream, drawn from the OS when absent
    pub seed: Option<u64>,

    /// Starting population of shape `(points, n)`
    pub initial_population: Option<Vec<Vec<f64>>>
}

impl Default for Options {
    fn default() -> Self {
        Options {
            points: 20,
            discrete: Vec::new(),
            max_iterations: 10_000,
            tolerance: 1e-5,
            seed: None,
            initial_population: None
        }
    }
}

impl Options {

    /// Reads options from a JSON object.  Missing keys take their defaults.
    pub fn from_json(doc: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(doc)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.points < 2 {
            return config(format!(
                "population needs at least 2 points to tell best from worst, got {}", self.points));
        }
        if self.max_iterations == 0 {
            return config("max_iterations must be positive");
        }
        if !(self.tolerance > 0.) || !self.tolerance.is_finite() {
            return config(format!("tolerance must be positive and finite, got {}", self.tolerance));
        }
        if let Some(rows) = &self.initial_population {
            if rows.len() != self.points {
                return config(format!(
                    "initial population holds {} rows but points is {}", rows.len(), self.points));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_options {
    use super::*;
    use crate::LeapfrogError;

    #[test]
    fn test_defaults() {
        let o = Options::from_json("{}").unwrap();
        assert_eq!(o, Options::default());
        assert_eq!(o.points, 20);
        assert_eq!(o.max_iterations, 10000);
        assert_eq!(o.tolerance, 1e-5);
    }

    #[test]
    fn test_partial_document() {
        let o = Options::from_json(r#"{"points": 5, "discrete": [0, 1], "seed": 1235}"#).unwrap();
        assert_eq!(o.points, 5);
        assert_eq!(o.discrete, vec![0, 1]);
        assert_eq!(o.seed, Some(1235));
        assert_eq!(o.tolerance, 1e-5);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let res = Options::from_json(r#"{"points": 5, "maxit": 100}"#);
        assert!(matches!(res, Err(LeapfrogError::Options(_))));
    }

    #[test]
    fn test_invalid_values() {
        let one = Options { points: 1, ..Default::default() };
        assert!(matches!(one.validate(), Err(LeapfrogError::Config(_))));

        let no_iters = Options { max_iterations: 0, ..Default::default() };
        assert!(no_iters.validate().is_err());

        let bad_tol = Options { tolerance: 0., ..Default::default() };
        assert!(bad_tol.validate().is_err());

        let nan_tol = Options { tolerance: std::f64::NAN, ..Default::default() };
        assert!(nan_tol.validate().is_err());

        let rows = Options { points: 3, initial_population: Some(vec![vec![0.]; 2]), ..Default::default() };
        assert!(rows.validate().is_err());
    }
}
