use leapfrog::benchmarks;
use leapfrog::ffi::{NativeEngine,NativeProblem};
use leapfrog::{minimize,Bound,LeapFrog,LeapfrogError,MultiStart,Optimizer,Options,Problem,Status};
use rstest::rstest;

fn quadratic(x: &[f64]) -> f64 {
    x[0] * x[0] + x[1] * x[1] + 3.
}

fn options(seed: u64) -> Options {
    Options {
        points: 20,
        tolerance: 1e-3,
        max_iterations: 10_000,
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn unconstrained_quadratic_converges() {
    let problem = Problem::new(&quadratic, vec![(-10., 10.), (-10., 10.)]);
    let res = minimize(&problem, options(1235), |_| {}).unwrap();

    assert_eq!(res.status, Status::Converged);
    assert_eq!(res.status.code(), 0);
    assert!((res.fun - 3.).abs() < 1e-2);
    assert!(res.x.iter().all(|v| v.abs() < 0.1));
    assert_eq!(res.maxcv, 0.);
}

#[test]
fn constrained_discrete_quadratic_lands_on_integer_optimum() {
    let g = |x: &[f64]| x[0] + 3.;
    let problem = Problem::new(&quadratic, vec![(-10., 10.), (-10., 10.)]).with_constraint(&g);
    let opts = Options { discrete: vec![0, 1], ..options(1235) };
    let res = minimize(&problem, opts, |x| {
        assert_eq!(x[0], x[0].trunc());
        assert_eq!(x[1], x[1].trunc());
    }).unwrap();

    assert_eq!(res.status, Status::Converged);
    assert_eq!(res.x, vec![-3., 0.]);
    assert_eq!(res.fun, 12.);
    assert!(problem.is_feasible(&res.x));
    assert!(res.maxcv > 0.);
}

#[test]
fn population_of_one_is_rejected() {
    let problem = Problem::new(&quadratic, vec![(-10., 10.), (-10., 10.)]);
    let res = minimize(&problem, Options { points: 1, ..options(1) }, |_| panic!("never iterates"));
    assert!(matches!(res, Err(LeapfrogError::Config(_))));
}

#[test]
fn options_document_drives_a_run() {
    let opts = Options::from_json(r#"{"points": 12, "tolerance": 1e-4, "seed": 17}"#).unwrap();
    let problem = Problem::new(&quadratic, vec![(-5., 5.), (-5., 5.)]);
    let res = LeapFrog::new(opts).unwrap().minimize(&problem, |_| {}).unwrap();
    assert_eq!(res.pointset.len(), 12);
    assert_eq!(res.nfev, 12 + res.nit);

    let parsed: leapfrog::OptimizationResult = serde_json::from_str(&res.to_json().unwrap()).unwrap();
    assert_eq!(parsed.status, res.status);
    assert_eq!(parsed.nit, res.nit);

    assert!(matches!(
        Options::from_json(r#"{"points": 12, "popsize": 3}"#),
        Err(LeapfrogError::Options(_))));
}

#[test]
fn native_engine_matches_library_call() {
    extern "C" fn shifted(x: *const f64, n: usize) -> f64 {
        let x = unsafe { std::slice::from_raw_parts(x, n) };
        (x[0] - 1.).powi(2) + (x[1] + 2.).powi(2)
    }
    let f = |x: &[f64]| shifted(x.as_ptr(), x.len());

    let bounds = vec![Bound::new(-4., 4.), Bound::new(-4., 4.)];
    let opts = options(42);

    let native = NativeEngine::linked()
        .minimize(&NativeProblem { objective: shifted, constraint: None, callback: None, bounds: bounds.clone() }, &opts)
        .unwrap();
    let local = minimize(&Problem::new(&f, bounds), opts, |_| {}).unwrap();
    assert_eq!(native, local);
}

#[rstest]
#[case::sphere(benchmarks::sphere, 0.)]
#[case::booth(benchmarks::booth, 0.)]
#[case::matyas(benchmarks::matyas, 0.)]
#[case::himmelblau(benchmarks::himmelblau, 0.)]
fn finds_known_minimum(#[case] f: fn(&[f64]) -> f64, #[case] minimum: f64) {
    let problem = Problem::new(&f, vec![(-5., 5.), (-5., 5.)]);
    let ms = MultiStart::new(LeapFrog::new(options(0)).unwrap(), 4, Some(2024));
    let res = ms.minimize(&problem, |_| {}).unwrap();
    assert!((res.fun - minimum).abs() < 1e-2, "got {} at {:?}", res.fun, res.x);
}
