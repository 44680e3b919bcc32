//! Root finding on top of the leapfrog optimizer.
//!
//! A system `f(x) = 0` is solved by minimizing `sum |f_i(x)|`.  Given a box
//! the optimizer runs once inside it.  Given only a guess `x0`, a box
//! `x0 +/- k * step` is grown one step at a time until the best residual
//! drops below the tolerance.

use serde::{Deserialize,Serialize};
use tracing::{debug,info,warn};

use crate::bounds::Bound;
use crate::error::{config,LeapfrogError,Result};
use crate::leapfrog::LeapFrog;
use crate::options::Options;
use crate::problem::Problem;

/// Outcome of a root search.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct SolveResult {
    pub root: Vec<f64>,

    /// `sum |f_i(root)|`
    pub final_error: f64,

    /// Whether `final_error` is below the tolerance
    pub converged: bool,

    /// Optimizer iterations of the last run
    pub opt_iters: usize,

    /// Number of boxes tried
    pub sol_iters: usize,

    /// Half width added per bracketing step, zero when bounds were given
    pub step: f64,

    pub pointset: Vec<Vec<f64>>
}

#[derive(Clone,Debug)]
pub struct Solver {
    optimizer: LeapFrog,

    /// Half width increment of the bracket, `0.1 * sum |f(x0)|` when unset
    pub step: Option<f64>,

    /// Largest number of brackets tried before giving up
    pub max_brackets: usize
}

impl Solver {

    pub fn new(options: Options) -> Result<Self> {
        let max_brackets = options.max_iterations;
        Ok(Solver {
            optimizer: LeapFrog::new(options)?,
            step: None,
            max_brackets
        })
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_max_brackets(mut self, max_brackets: usize) -> Self {
        self.max_brackets = max_brackets;
        self
    }

    /// Searches for `x` with `residuals(x) == 0`.  `bounds` takes precedence
    /// over `x0` when both are given.
    pub fn solve<F>(&self, residuals: &F, x0: Option<&[f64]>, bounds: Option<Vec<Bound>>) -> Result<SolveResult>
        where F: Fn(&[f64]) -> Vec<f64> + Send + Sync
    {
        let tol = self.optimizer.options().tolerance;
        let objective = |x: &[f64]| residuals(x).iter().map(|r| r.abs()).sum::<f64>();

        if let Some(bounds) = bounds {
            return self.search(&objective, bounds, 1, 0., tol);
        }

        let x0 = match x0 {
            Some(x0) if !x0.is_empty() => x0,
            Some(_) => return config("initial guess is empty"),
            None => return config("an initial guess or bounds must be given")
        };
        if self.max_brackets == 0 {
            return config("max_brackets must be positive");
        }
        if let Some(step) = self.step {
            if !(step >= 0.) || !step.is_finite() {
                return config(format!("bracket step must be non-negative and finite, got {}", step));
            }
        }

        let step = match self.step {
            Some(step) => step,
            None => {
                let step = 0.1 * objective(x0);
                if !step.is_finite() {
                    return Err(LeapfrogError::Config(format!("residual at the guess is not finite: {}", step)));
                }
                step
            }
        };

        let mut spread = 0.;
        let mut last = None;
        for k in 1..=self.max_brackets {
            spread += step;
            let bounds = x0.iter().map(|x| Bound::new(x - spread, x + spread)).collect();
            let res = self.search(&objective, bounds, k, step, tol)?;
            debug!("Bracket {} (+/- {}): residual {}", k, spread, res.final_error);
            if res.converged {
                info!("Root bracketed after {} steps", k);
                return Ok(res);
            }
            last = Some(res);
        }

        warn!("Unable to bracket a root in {} steps", self.max_brackets);
        last.ok_or_else(|| LeapfrogError::Config("no bracket was tried".to_string()))
    }

    fn search(&self, objective: &(dyn Fn(&[f64]) -> f64 + Send + Sync), bounds: Vec<Bound>, k: usize, step: f64, tol: f64) -> Result<SolveResult> {
        let problem = Problem::new(&objective, bounds);
        let mut run = self.optimizer.start(&problem)?;
        let res = run.run(|_| {});

        Ok(SolveResult {
            root: res.x,
            final_error: res.fun,
            converged: res.fun < tol,
            opt_iters: res.nit,
            sol_iters: k,
            step,
            pointset: res.pointset
        })
    }
}
