use crate::bounds::Bound;

/// A black-box scalar function of a point.  Used both for objectives and
/// for constraints, where a value `<= 0` means feasible.
pub trait Objective: Send + Sync {
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl <F: Fn(&[f64]) -> f64 + Send + Sync> Objective for F {
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// What to minimize and where.  Extra arguments for the objective are
/// captured by the closure.
#[derive(Clone)]
pub struct Problem<'a> {
    objective: &'a dyn Objective,
    constraint: Option<&'a dyn Objective>,
    bounds: Vec<Bound>
}

impl <'a> Problem<'a> {
    pub fn new<B: Into<Bound>>(objective: &'a dyn Objective, bounds: Vec<B>) -> Self {
        Problem {
            objective,
            constraint: None,
            bounds: bounds.into_iter().map(Into::into).collect()
        }
    }

    /// Adds an inequality constraint `g(x) <= 0`.
    pub fn with_constraint(mut self, constraint: &'a dyn Objective) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn objective(&self) -> &'a dyn Objective {
        self.objective
    }

    pub fn constraint(&self) -> Option<&'a dyn Objective> {
        self.constraint
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    /// Whether `x` satisfies the constraint, true when there is none.
    pub fn is_feasible(&self, x: &[f64]) -> bool {
        self.constraint.map(|g| g.evaluate(x) <= 0.).unwrap_or(true)
    }
}

impl std::fmt::Debug for Problem<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("constrained", &self.constraint.is_some())
            .field("bounds", &self.bounds)
            .finish()
    }
}

/// Calls into the user functions on behalf of a run and keeps the
/// bookkeeping that goes with them.
pub struct Evaluator<'a> {
    objective: &'a dyn Objective,
    constraint: Option<&'a dyn Objective>,

    /// Number of objective evaluations
    pub nfev: usize,

    /// Largest constraint violation seen so far
    pub maxcv: f64
}

impl <'a> Evaluator<'a> {
    pub fn new(problem: &Problem<'a>) -> Self {
        Evaluator {
            objective: problem.objective,
            constraint: problem.constraint,
            nfev: 0,
            maxcv: 0.
        }
    }

    pub fn objective(&mut self, x: &[f64]) -> f64 {
        self.nfev += 1;
        self.objective.evaluate(x)
    }

    /// Returns the violation when `x` breaks the constraint.
    pub fn violation(&mut self, x: &[f64]) -> Option<f64> {
        let v = self.constraint?.evaluate(x);
        if v > 0. {
            if v > self.maxcv {
                self.maxcv = v;
            }
            Some(v)
        } else {
            None
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.constraint.is_some()
    }
}
