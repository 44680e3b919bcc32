use crate::population::Population;

fn norm(v: f64, tol: f64) -> f64 {
    if v.abs() < tol { tol } else { v }
}

/// Convergence error of the population: relative objective gap between the
/// best and worst rows, plus the relative distance of every row to the
/// best row, plus `2 * tol` while any row is infeasible.
///
/// Both the objective and the spread have to collapse before the error can
/// drop below `tol`.
pub fn estimate(population: &Population, best: usize, worst: usize, tol: f64) -> f64 {
    let b = population.get(best);
    let w = population.get(worst);

    let gap = ((w.objective - b.objective) / norm(b.objective, tol)).abs();

    let norms: Vec<f64> = b.vars.iter().map(|bj| norm(*bj, tol)).collect();
    let spread: f64 = population.points().iter().map(|p| {
        p.vars.iter().zip(b.vars.iter()).zip(norms.iter())
            .map(|((xj, bj), nj)| ((bj - xj) / nj).abs())
            .sum::<f64>()
    }).sum();

    let penalty = if population.any_infeasible() { 2. * tol } else { 0. };

    gap + spread + penalty
}

/// Whether an error value satisfies the tolerance.
pub fn converged(error: f64, tol: f64) -> bool {
    error < tol
}

#[cfg(test)]
mod test_convergence {
    use super::*;
    use crate::population::Point;

    #[test]
    fn test_collapsed_population_is_zero() {
        let p = Population::from_points(vec![Point::new(3., vec![0., 2.]); 4]);
        assert_eq!(estimate(&p, 0, 0, 1e-5), 0.);
        assert!(converged(0., 1e-5));
    }

    #[test]
    fn test_infeasible_keeps_error_up() {
        let mut pts = vec![Point::new(3., vec![0., 2.]); 4];
        pts[2].feasible = false;
        let p = Population::from_points(pts);
        assert_eq!(estimate(&p, 0, 0, 1e-3), 2e-3);
        assert!(!converged(2e-3, 1e-3));
    }

    #[test]
    fn test_terms() {
        let p = Population::from_points(vec![
            Point::new(2., vec![0., 4.]),
            Point::new(3., vec![0.5, 2.]),
        ]);
        // gap = 1 / 2, spread = 0.5 / tol + 2 / 4
        let tol = 0.25;
        assert_eq!(estimate(&p, 0, 1, tol), 0.5 + 2. + 0.5);
    }

    #[test]
    fn test_negative_best_objective() {
        let p = Population::from_points(vec![
            Point::new(-4., vec![-2.]),
            Point::new(-2., vec![-1.]),
        ]);
        let err = estimate(&p, 0, 1, 1e-5);
        assert!(err > 0.);
        assert_eq!(err, 0.5 + 0.5);
    }
}
