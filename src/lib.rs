pub mod benchmarks;
pub mod bounds;
pub mod convergence;
pub mod error;
pub mod feasibility;
pub mod ffi;
pub mod leapfrog;
pub mod multistart;
pub mod options;
pub mod population;
pub mod problem;
pub mod result;
pub mod solve;
pub mod stepper;

pub use crate::bounds::{Bound,VariableSpec};
pub use crate::error::{LeapfrogError,Result};
pub use crate::leapfrog::{Driver,LeapFrog,Phase};
pub use crate::multistart::MultiStart;
pub use crate::options::Options;
pub use crate::problem::{Objective,Problem};
pub use crate::result::{OptimizationResult,Status};
pub use crate::solve::{SolveResult,Solver};

pub trait Optimizer: Clone + std::fmt::Debug + Send + Sync {

    /// Minimizes `problem`, calling `callback` with the current best point
    /// as the search progresses.
    fn minimize<FN: FnMut(&[f64])>(
        &self,
        problem: &Problem,
        callback: FN
    ) -> Result<OptimizationResult>;

    /// Same optimizer drawing from a different random stream.
    fn with_seed(&self, seed: u64) -> Self;
}

/// Runs the leapfrog optimizer once with the given options.
pub fn minimize<FN: FnMut(&[f64])>(
    problem: &Problem,
    options: Options,
    callback: FN
) -> Result<OptimizationResult> {
    LeapFrog::new(options)?.minimize(problem, callback)
}
