use std::fmt;

use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::{debug,info,trace,warn};

use crate::bounds::VariableSpec;
use crate::convergence;
use crate::error::Result;
use crate::feasibility;
use crate::options::Options;
use crate::population::Population;
use crate::problem::{Evaluator,Problem};
use crate::result::{OptimizationResult,Status};
use crate::stepper;
use crate::Optimizer;

/// Where a run stands.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Phase {
    Initialized,
    Iterating,
    Converged,
    MaxIterExceeded
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        match self {
            Phase::Converged | Phase::MaxIterExceeded => true,
            _ => false
        }
    }
}

/// The leapfrogging optimizer.
#[derive(Clone,Debug)]
pub struct LeapFrog {
    options: Options
}

impl LeapFrog {

    pub fn new(options: Options) -> Result<Self> {
        options.validate()?;
        Ok(LeapFrog { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Builds the starting population and returns a run that can be
    /// stepped one iteration at a time.
    pub fn start<'a>(&self, problem: &Problem<'a>) -> Result<Driver<'a>> {
        let opts = &self.options;
        let spec = VariableSpec::new(problem.bounds().to_vec(), &opts.discrete)?;

        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy()
        };

        let mut eval = Evaluator::new(problem);
        let mut population = Population::initialize(
            &spec,
            opts.points,
            opts.initial_population.as_deref(),
            &mut eval,
            &mut rng)?;
        feasibility::enforce(&mut population, &mut eval);

        let (best, worst) = population.best_worst();
        debug!(
            "Initialized {} points over {} dimensions, best objective {}",
            opts.points, spec.dims(), population.get(best).objective
        );

        Ok(Driver {
            spec,
            population,
            eval,
            rng,
            tolerance: opts.tolerance,
            max_iterations: opts.max_iterations,
            iterations: 0,
            best,
            worst,
            error: std::f64::INFINITY,
            phase: Phase::Initialized
        })
    }
}

impl Optimizer for LeapFrog {

    fn minimize<FN: FnMut(&[f64])>(
        &self,
        problem: &Problem,
        callback: FN
    ) -> Result<OptimizationResult> {
        Ok(self.start(problem)?.run(callback))
    }

    fn with_seed(&self, seed: u64) -> Self {
        let mut options = self.options.clone();
        options.seed = Some(seed);
        LeapFrog { options }
    }
}

/// A single leapfrog run.  Owns the population and all run state.
pub struct Driver<'a> {
    spec: VariableSpec,
    population: Population,
    eval: Evaluator<'a>,
    rng: StdRng,

    tolerance: f64,
    max_iterations: usize,

    iterations: usize,
    best: usize,
    worst: usize,
    error: f64,
    phase: Phase
}

impl <'a> Driver<'a> {

    /// Replaces the worst row with a leapfrogged candidate and refreshes the
    /// best/worst indices and the convergence error.
    pub fn iterate(&mut self) -> Phase {
        let candidate = stepper::leapfrog(
            &self.population,
            self.best,
            self.worst,
            &self.spec,
            &mut self.eval,
            &mut self.rng);
        self.population.replace(self.worst, candidate);

        let (best, worst) = self.population.best_worst();
        self.best = best;
        self.worst = worst;
        self.error = convergence::estimate(&self.population, best, worst, self.tolerance);
        self.iterations += 1;

        self.phase = if convergence::converged(self.error, self.tolerance) {
            Phase::Converged
        } else if self.iterations >= self.max_iterations {
            Phase::MaxIterExceeded
        } else {
            Phase::Iterating
        };

        trace!(
            "Iteration {}: best {} worst {} error {}",
            self.iterations, self.best_point().objective, self.population.get(worst).objective, self.error
        );
        self.phase
    }

    /// Iterates until convergence or until the budget runs out, calling
    /// `callback` with the best point after every iteration.  Always runs at
    /// least one iteration.
    pub fn run<FN: FnMut(&[f64])>(&mut self, mut callback: FN) -> OptimizationResult {
        loop {
            let phase = self.iterate();
            callback(&self.best_point().vars[..]);
            if phase.is_terminal() {
                break;
            }
        }

        match self.phase {
            Phase::Converged => info!(
                "Converged after {} iterations, objective {}", self.iterations, self.best_point().objective),
            _ => warn!(
                "Maximum iterations ({}) exceeded, error {}", self.max_iterations, self.error)
        }

        self.result()
    }

    /// Result record describing the current state.
    pub fn result(&self) -> OptimizationResult {
        let status = match self.phase {
            Phase::Converged => Status::Converged,
            _ => Status::MaxIterations
        };
        let best = self.best_point();

        OptimizationResult {
            x: best.vars.clone(),
            success: status == Status::Converged,
            status,
            message: status.message().to_string(),
            fun: best.objective,
            nfev: self.eval.nfev,
            nit: self.iterations,
            maxcv: self.eval.maxcv,
            best: best.row(),
            worst: self.population.get(self.worst).row(),
            final_error: self.error,
            pointset: self.population.rows()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn best(&self) -> usize {
        self.best
    }

    pub fn worst(&self) -> usize {
        self.worst
    }

    fn best_point(&self) -> &crate::population::Point {
        self.population.get(self.best)
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn nfev(&self) -> usize {
        self.eval.nfev
    }

    pub fn maxcv(&self) -> f64 {
        self.eval.maxcv
    }
}

impl fmt::Display for Driver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let best = self.best_point();
        writeln!(f, "Leapfrog optimizer state:")?;
        writeln!(f, " best obj      : {}", best.objective)?;
        writeln!(f, " best point    : {:?}", best.vars)?;
        writeln!(f, " fun evals     : {}", self.eval.nfev)?;
        writeln!(f, " iterations    : {}", self.iterations)?;
        writeln!(f, " maxcv         : {}", self.eval.maxcv)?;
        writeln!(f, " best          : {:?}", best.row())?;
        writeln!(f, " worst         : {:?}", self.population.get(self.worst).row())?;
        write!(f, " current error : {}", self.error)
    }
}
