use rand::prelude::*;

use crate::bounds::{uniform,VariableSpec};
use crate::feasibility;
use crate::population::{Point,Population};
use crate::problem::Evaluator;

/// Samples a new point from the region reached by jumping `worst` over
/// `best`, clipped to the bounds.  Discrete rounding is not applied.
pub fn reflect<R: Rng>(best: &[f64], worst: &[f64], spec: &VariableSpec, rng: &mut R) -> Vec<f64> {
    best.iter().zip(worst.iter()).zip(spec.bounds().iter()).map(|((&b, &w), bound)| {
        let reach = 2. * b - w;
        let (mut lo, mut hi) = if reach < b { (reach, b) } else { (b, reach) };
        if lo < bound.lower {
            lo = bound.lower;
        }
        if hi > bound.upper {
            hi = bound.upper;
        }
        debug_assert!(lo <= hi, "best point left its bounds");
        uniform(lo, hi, rng)
    }).collect()
}

/// Generates and scores the candidate that will take the place of the
/// worst row.
pub fn leapfrog<R: Rng>(
    population: &Population,
    best: usize,
    worst: usize,
    spec: &VariableSpec,
    eval: &mut Evaluator,
    rng: &mut R
) -> Point {
    let b = population.get(best);
    let w = population.get(worst);

    let mut vars = reflect(&b.vars, &w.vars, spec, rng);
    spec.enforce_discrete(&mut vars);

    let objective = eval.objective(&vars);
    let mut candidate = Point::new(objective, vars);
    feasibility::punish_candidate(&mut candidate, w.objective, eval);
    candidate
}
