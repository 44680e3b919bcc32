use float_ord::FloatOrd;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{config,LeapfrogError,Result};
use crate::problem::Problem;
use crate::result::OptimizationResult;
use crate::Optimizer;

/// Runs several independent copies of an optimizer in parallel, each on its
/// own random stream, and keeps the best outcome.
#[derive(Clone,Debug)]
pub struct MultiStart<O> {
    pub optimizer: O,

    /// Number of independent runs
    pub starts: usize,

    /// Master seed the per-run seeds are drawn from
    pub seed: Option<u64>
}

impl <O: Optimizer> MultiStart<O> {
    pub fn new(optimizer: O, starts: usize, seed: Option<u64>) -> Self {
        MultiStart { optimizer, starts, seed }
    }
}

impl <O: Optimizer> Optimizer for MultiStart<O> {

    /// Feasible runs win over infeasible ones, then the lowest objective
    /// wins.  `nfev` and `nit` are summed over every run.  `callback` sees
    /// the best point of each run once the parallel phase is over.
    fn minimize<FN: FnMut(&[f64])>(
        &self,
        problem: &Problem,
        mut callback: FN
    ) -> Result<OptimizationResult> {
        if self.starts == 0 {
            return config("multistart needs at least one start");
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy()
        };
        let seeds: Vec<u64> = (&mut rng)
            .sample_iter(Uniform::new(0, std::u64::MAX))
            .take(self.starts)
            .collect();

        let runs = seeds.par_iter()
            .map(|seed| self.optimizer.with_seed(*seed).minimize(problem, |_| {}))
            .collect::<Result<Vec<_>>>()?;

        runs.iter().for_each(|r| callback(&r.x[..]));

        let nfev = runs.iter().map(|r| r.nfev).sum();
        let nit = runs.iter().map(|r| r.nit).sum();
        let maxcv = runs.iter().fold(0., |acc: f64, r| acc.max(r.maxcv));

        let mut best = runs.into_iter()
            .min_by_key(|r| (!problem.is_feasible(&r.x), FloatOrd(r.fun)))
            .ok_or_else(|| LeapfrogError::Config("no start produced a result".to_string()))?;
        debug!("Best of {} starts: objective {}", self.starts, best.fun);

        best.nfev = nfev;
        best.nit = nit;
        best.maxcv = maxcv;
        Ok(best)
    }

    fn with_seed(&self, seed: u64) -> Self {
        MultiStart { seed: Some(seed), ..self.clone() }
    }
}

#[cfg(test)]
mod test_multistart {
    use super::*;
    use crate::benchmarks::booth;
    use crate::{LeapFrog,Options};

    #[test]
    fn test_picks_best_and_sums_counts() {
        let problem = Problem::new(&booth, vec![(-10., 10.), (-10., 10.)]);
        let lf = LeapFrog::new(Options { tolerance: 1e-3, max_iterations: 2000, ..Default::default() }).unwrap();
        let ms = MultiStart::new(lf.clone(), 4, Some(2020));

        let mut seen = Vec::new();
        let res = ms.minimize(&problem, |x| seen.push(x.to_vec())).unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(res.nfev, res.nit + 4 * 20);

        let again = ms.minimize(&problem, |_| {}).unwrap();
        assert_eq!(res, again);

        for x in &seen {
            assert!(res.fun <= booth(x));
        }
    }

    #[test]
    fn test_zero_starts_rejected() {
        let problem = Problem::new(&booth, vec![(-10., 10.), (-10., 10.)]);
        let ms = MultiStart::new(LeapFrog::new(Options::default()).unwrap(), 0, None);
        assert!(ms.minimize(&problem, |_| {}).is_err());
    }
}
