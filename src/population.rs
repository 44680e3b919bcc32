use float_ord::FloatOrd;
use rand::prelude::*;

use crate::bounds::VariableSpec;
use crate::error::{config,LeapfrogError,Result};
use crate::problem::Evaluator;

/// A member of the population.
#[derive(Clone,Debug,PartialEq)]
pub struct Point {
    pub objective: f64,
    pub vars: Vec<f64>,

    /// Whether the constraint held when the point was last scored
    pub feasible: bool
}

impl Point {
    pub fn new(objective: f64, vars: Vec<f64>) -> Self {
        Point { objective, vars, feasible: true }
    }

    /// The point as `[objective, x[0], .., x[n-1]]`.
    pub fn row(&self) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.vars.len() + 1);
        row.push(self.objective);
        row.extend_from_slice(&self.vars);
        row
    }
}

// NaN objectives always rank worst, regardless of their sign bit.
fn rank(v: f64) -> FloatOrd<f64> {
    if v.is_nan() { FloatOrd(v.abs()) } else { FloatOrd(v) }
}

/// Fixed size point set.  Rows are only ever swapped out whole.
#[derive(Clone,Debug,PartialEq)]
pub struct Population {
    points: Vec<Point>
}

impl Population {

    pub fn from_points(points: Vec<Point>) -> Self {
        Population { points }
    }

    /// Builds the starting population, either sampled inside the bounds or
    /// copied from `initial`.  Every row is checked before the objective is
    /// called for the first time.
    pub fn initialize<R: Rng>(
        spec: &VariableSpec,
        size: usize,
        initial: Option<&[Vec<f64>]>,
        eval: &mut Evaluator,
        rng: &mut R
    ) -> Result<Self> {
        if let Some(rows) = initial {
            if rows.len() != size {
                return config(format!(
                    "initial population holds {} rows but {} points were requested",
                    rows.len(), size));
            }
            for (i, row) in rows.iter().enumerate() {
                if row.len() != spec.dims() {
                    return Err(LeapfrogError::DimensionMismatch {
                        expected: spec.dims(),
                        found: row.len()
                    });
                }
                if !spec.contains(row) {
                    return config(format!("initial row {} lies outside the bounds", i));
                }
            }
        }

        let points = (0..size).map(|i| {
            let mut vars = match initial {
                Some(rows) => rows[i].clone(),
                None => spec.sample(rng)
            };
            spec.enforce_discrete(&mut vars);
            let objective = eval.objective(&vars);
            Point::new(objective, vars)
        }).collect();

        Ok(Population { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Point {
        &self.points[idx]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Swaps out the row at `idx`, returning the old one.
    pub fn replace(&mut self, idx: usize, point: Point) -> Point {
        std::mem::replace(&mut self.points[idx], point)
    }

    /// Indices of the lowest and highest objective.  The first occurrence
    /// wins ties on both ends.
    pub fn best_worst(&self) -> (usize, usize) {
        let mut best = 0;
        let mut worst = 0;
        for (i, p) in self.points.iter().enumerate() {
            let r = rank(p.objective);
            if r < rank(self.points[best].objective) {
                best = i;
            }
            if r > rank(self.points[worst].objective) {
                worst = i;
            }
        }
        (best, worst)
    }

    pub fn largest_abs_objective(&self) -> f64 {
        self.points.iter().fold(0., |acc, p| acc.max(p.objective.abs()))
    }

    pub fn any_infeasible(&self) -> bool {
        self.points.iter().any(|p| !p.feasible)
    }

    /// Every point as an `[objective, x..]` row.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.points.iter().map(Point::row).collect()
    }
}

#[cfg(test)]
mod test_population {
    use super::*;
    use crate::bounds::Bound;
    use crate::problem::Problem;

    fn pop(objs: &[f64]) -> Population {
        Population::from_points(objs.iter().map(|o| Point::new(*o, vec![*o])).collect())
    }

    #[test]
    fn test_ties_go_to_first_index() {
        let p = pop(&[3., 1., 5., 1., 5., 2.]);
        assert_eq!(p.best_worst(), (1, 2));

        let p = pop(&[4., 4., 4.]);
        assert_eq!(p.best_worst(), (0, 0));
        assert!(pop(&[]).is_empty());
    }

    #[test]
    fn test_nan_is_never_best() {
        let p = pop(&[std::f64::NAN, 2., -std::f64::NAN, 1.]);
        assert_eq!(p.best_worst(), (3, 0));
    }

    #[test]
    fn test_random_init_in_bounds() {
        let f = |x: &[f64]| x.iter().sum::<f64>();
        let bounds = vec![Bound::new(-10., 10.), Bound::new(2.5, 7.5), Bound::new(-7.5, -2.5)];
        let problem = Problem::new(&f, bounds.clone());
        let spec = VariableSpec::new(bounds, &[1, 2]).unwrap();
        let mut eval = Evaluator::new(&problem);
        let mut rng = rand::rngs::StdRng::seed_from_u64(2020);

        let p = Population::initialize(&spec, 50, None, &mut eval, &mut rng).unwrap();
        assert_eq!(p.len(), 50);
        assert!(!p.is_empty());
        assert_eq!(eval.nfev, 50);
        for pt in p.points() {
            assert!(spec.contains(&pt.vars));
            assert_eq!(pt.vars[1], pt.vars[1].trunc());
            assert_eq!(pt.vars[2], pt.vars[2].trunc());
            assert_eq!(pt.objective, pt.vars.iter().sum::<f64>());
        }
    }

    #[test]
    fn test_initial_rows_copied() {
        let f = |x: &[f64]| x[0] - x[1];
        let bounds = vec![(-10., 10.), (-10., 10.)];
        let problem = Problem::new(&f, bounds.clone());
        let spec = VariableSpec::new(problem.bounds().to_vec(), &[0]).unwrap();
        let mut eval = Evaluator::new(&problem);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);

        let rows = vec![vec![-1.7, 0.5], vec![3.2, -4.]];
        let p = Population::initialize(&spec, 2, Some(rows.as_slice()), &mut eval, &mut rng).unwrap();
        assert_eq!(p.rows(), vec![vec![-1.5, -1., 0.5], vec![7., 3., -4.]]);
    }

    #[test]
    fn test_bad_rows_rejected_before_eval() {
        let f = |x: &[f64]| x[0];
        let problem = Problem::new(&f, vec![(-1., 1.), (-1., 1.)]);
        let spec = VariableSpec::new(problem.bounds().to_vec(), &[]).unwrap();
        let mut eval = Evaluator::new(&problem);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);

        let short = vec![vec![0., 0.], vec![0.]];
        let res = Population::initialize(&spec, 2, Some(short.as_slice()), &mut eval, &mut rng);
        assert!(matches!(res, Err(LeapfrogError::DimensionMismatch { expected: 2, found: 1 })));

        let outside = vec![vec![0., 0.], vec![0., 3.]];
        assert!(Population::initialize(&spec, 2, Some(outside.as_slice()), &mut eval, &mut rng).is_err());

        let few = vec![vec![0., 0.]];
        assert!(Population::initialize(&spec, 2, Some(few.as_slice()), &mut eval, &mut rng).is_err());
        assert_eq!(eval.nfev, 0);
    }
}
