use crate::population::{Point,Population};
use crate::problem::Evaluator;

/// Scale applied to the penalty of an infeasible candidate.
pub const PUNISH_SCALE: f64 = 1.;

/// Pushes every infeasible row above the largest absolute objective in the
/// population, so all of them rank behind every feasible row.
pub fn enforce(population: &mut Population, eval: &mut Evaluator) {
    if !eval.is_constrained() {
        return;
    }

    let big = population.largest_abs_objective();
    for i in 0..population.len() {
        let current = population.get(i);
        if let Some(v) = eval.violation(&current.vars) {
            let penalized = Point {
                objective: big + v,
                vars: current.vars.clone(),
                feasible: false
            };
            population.replace(i, penalized);
        }
    }
}

/// Penalizes a freshly scored candidate that breaks the constraint.
/// `worst_objective` is the objective of the row it is about to replace.
pub fn punish_candidate(candidate: &mut Point, worst_objective: f64, eval: &mut Evaluator) {
    if let Some(v) = eval.violation(&candidate.vars) {
        candidate.objective += PUNISH_SCALE * (v + worst_objective.abs());
        candidate.feasible = false;
    }
}
