//! Classic test functions for exercising the optimizer.  Minima are listed
//! for the two dimensional forms.

use std::f64::consts::{E,PI};

/// Sphere: `f(0, .., 0) = 0`.
pub fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|xi| xi * xi).sum()
}

/// Rastrigin: `f(0, .., 0) = 0` on `[-5.12, 5.12]`.
pub fn rastrigin(x: &[f64]) -> f64 {
    let a = 10.;
    a * x.len() as f64 + x.iter().map(|xi| xi * xi - a * (2. * PI * xi).cos()).sum::<f64>()
}

/// Ackley: `f(0, 0) = 0` on `[-5, 5]`.
pub fn ackley(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    -20. * (-0.2 * (0.5 * (a * a + b * b)).sqrt()).exp()
        - (0.5 * ((2. * PI * a).cos() + (2. * PI * b).cos())).exp()
        + E + 20.
}

/// Rosenbrock: `f(1, .., 1) = 0`.
pub fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2).map(|w| {
        let a = w[1] - w[0] * w[0];
        let b = 1. - w[0];
        100. * a * a + b * b
    }).sum()
}

/// Beale: `f(3, 0.5) = 0` on `[-4.5, 4.5]`.
pub fn beale(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    (1.5 - a + a * b).powi(2)
        + (2.25 - a + a * b * b).powi(2)
        + (2.625 - a + a * b.powi(3)).powi(2)
}

/// Booth: `f(1, 3) = 0` on `[-10, 10]`.
pub fn booth(x: &[f64]) -> f64 {
    (x[0] + 2. * x[1] - 7.).powi(2) + (2. * x[0] + x[1] - 5.).powi(2)
}

/// Matyas: `f(0, 0) = 0` on `[-10, 10]`.
pub fn matyas(x: &[f64]) -> f64 {
    0.26 * (x[0] * x[0] + x[1] * x[1]) - 0.48 * x[0] * x[1]
}

/// Himmelblau: four minima with `f = 0`, one of them at `(3, 2)`.
pub fn himmelblau(x: &[f64]) -> f64 {
    (x[0] * x[0] + x[1] - 11.).powi(2) + (x[0] + x[1] * x[1] - 7.).powi(2)
}

/// Three-hump camel: `f(0, 0) = 0` on `[-5, 5]`.
pub fn three_hump_camel(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    2. * a * a - 1.05 * a.powi(4) + a.powi(6) / 6. + a * b + b * b
}

/// McCormick: `f(-0.54719, -1.54719) = -1.91322` on `[-1.5, 4] x [-3, 4]`.
pub fn mccormick(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    (a + b).sin() + (a - b).powi(2) - 1.5 * a + 2.5 * b + 1.
}

/// Styblinski-Tang: `f(-2.903534, ..) = -39.16617 n` on `[-5, 5]`.
pub fn styblinski_tang(x: &[f64]) -> f64 {
    x.iter().map(|xi| (xi.powi(4) - 16. * xi * xi + 5. * xi) / 2.).sum()
}

/// Easom: `f(pi, pi) = -1` on `[-100, 100]`.
pub fn easom(x: &[f64]) -> f64 {
    let (a, b) = (x[0], x[1]);
    -a.cos() * b.cos() * (-((a - PI).powi(2) + (b - PI).powi(2))).exp()
}

#[cfg(test)]
mod test_benchmarks {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_known_minima() {
        assert_eq!(sphere(&[0., 0.]), 0.);
        assert!(close(rastrigin(&[0., 0.]), 0.));
        assert!(close(ackley(&[0., 0.]), 0.));
        assert_eq!(rosenbrock(&[1., 1., 1.]), 0.);
        assert_eq!(beale(&[3., 0.5]), 0.);
        assert_eq!(booth(&[1., 3.]), 0.);
        assert_eq!(matyas(&[0., 0.]), 0.);
        assert_eq!(himmelblau(&[3., 2.]), 0.);
        assert_eq!(three_hump_camel(&[0., 0.]), 0.);
        assert!(close(mccormick(&[-0.54719, -1.54719]), -1.91322));
        assert!(close(styblinski_tang(&[-2.903534, -2.903534]), -78.33234));
        assert!(close(easom(&[PI, PI]), -1.));
    }
}
