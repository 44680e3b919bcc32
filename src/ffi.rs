//! C calling convention for the optimizer.
//!
//! Every user function crosses the boundary as a plain function pointer
//! taking a coordinate pointer and its length.  A missing constraint or
//! callback is a null pointer.  Results land in one flat buffer of
//! `n + LPFG_N_RESULTS` doubles: the solution vector followed by the fields
//! of [`Field`] in declaration order.  Callers must read `LPFG_N_RESULTS`
//! (or call `lpfg_n_results`) before sizing that buffer.

use std::fmt;
use std::os::raw::{c_double,c_int};
use std::panic::{self,AssertUnwindSafe};
use std::slice;

use tracing::error;

use crate::bounds::Bound;
use crate::error::{LeapfrogError,Result};
use crate::leapfrog::LeapFrog;
use crate::options::Options;
use crate::problem::{Objective,Problem};
use crate::result::{OptimizationResult,Status};

/// Objective or constraint: `double f(const double* x, size_t n)`.
pub type ObjectiveFn = extern "C" fn(x: *const c_double, n: usize) -> c_double;

/// Per-iteration callback: `void cb(const double* best, size_t n)`.
pub type CallbackFn = extern "C" fn(x: *const c_double, n: usize);

/// Signature of [`lpfg_minimize`].
pub type MinimizeFn = unsafe extern "C" fn(
    Option<ObjectiveFn>,
    *const c_double,
    *const c_double,
    usize,
    usize,
    Option<ObjectiveFn>,
    *const usize,
    usize,
    usize,
    c_double,
    u64,
    c_int,
    *const *mut c_double,
    c_int,
    Option<CallbackFn>,
    *mut c_double,
    *mut c_double,
    usize
) -> c_int;

/// Number of result fields after the solution vector.
pub const N_RESULTS: usize = 7;

pub const ABI_VERSION: u32 = 1;

#[no_mangle]
pub static LPFG_N_RESULTS: usize = N_RESULTS;

#[no_mangle]
pub static LPFG_ABI_VERSION: u32 = ABI_VERSION;

/// A null pointer was passed where one is required.
pub const LPFG_ERR_NULL: c_int = -1;

/// The output buffer length is not `n + LPFG_N_RESULTS`.
pub const LPFG_ERR_LENGTH: c_int = -2;

/// The arguments describe an invalid optimization.
pub const LPFG_ERR_CONFIG: c_int = -3;

/// The engine panicked.
pub const LPFG_ERR_PANIC: c_int = -4;

/// Result fields trailing the solution vector, in buffer order.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Field {
    Status,
    Fun,
    Nit,
    FinalError,
    MaxCv,
    BestIndex,
    WorstIndex
}

impl Field {
    pub const ALL: [Field; N_RESULTS] = [
        Field::Status,
        Field::Fun,
        Field::Nit,
        Field::FinalError,
        Field::MaxCv,
        Field::BestIndex,
        Field::WorstIndex
    ];
}

/// Shape of the flat output buffer for a problem of `n` variables.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct OutputLayout {
    pub n: usize,

    /// Result field count published by the engine
    pub n_results: usize
}

impl OutputLayout {
    pub fn new(n: usize, n_results: usize) -> Self {
        OutputLayout { n, n_results }
    }

    pub fn len(&self) -> usize {
        self.n + self.n_results
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn offset(&self, field: Field) -> usize {
        self.n + field as usize
    }

    /// Writes a result into `out`.  Any fields past the known ones are
    /// zeroed.
    pub fn encode(&self, result: &OptimizationResult, best: usize, worst: usize, out: &mut [f64]) -> Result<()> {
        self.check_len(out.len())?;
        out.iter_mut().for_each(|v| *v = 0.);
        out[..self.n].copy_from_slice(&result.x);
        out[self.offset(Field::Status)] = result.status.code() as f64;
        out[self.offset(Field::Fun)] = result.fun;
        out[self.offset(Field::Nit)] = result.nit as f64;
        out[self.offset(Field::FinalError)] = result.final_error;
        out[self.offset(Field::MaxCv)] = result.maxcv;
        out[self.offset(Field::BestIndex)] = best as f64;
        out[self.offset(Field::WorstIndex)] = worst as f64;
        Ok(())
    }

    /// Rebuilds the result record from the output buffer and the final
    /// population (`objectives[i]` and `rows[i]` describe point `i`).
    pub fn decode(&self, out: &[f64], objectives: &[f64], rows: &[Vec<f64>]) -> Result<OptimizationResult> {
        self.check_len(out.len())?;
        if self.n_results < N_RESULTS {
            return Err(LeapfrogError::Boundary(format!(
                "layout has {} result fields but {} are required", self.n_results, N_RESULTS)));
        }

        let code = out[self.offset(Field::Status)];
        let status = as_index(code)
            .filter(|c| *c <= std::u8::MAX as usize)
            .and_then(|c| Status::from_code(c as u8))
            .ok_or_else(|| LeapfrogError::Boundary(format!("invalid status code {}", code)))?;

        let points = rows.len();
        let index = |field: Field| -> Result<usize> {
            let raw = out[self.offset(field)];
            as_index(raw)
                .filter(|i| *i < points)
                .ok_or_else(|| LeapfrogError::Boundary(format!("{:?} {} is not a row index", field, raw)))
        };
        let best = index(Field::BestIndex)?;
        let worst = index(Field::WorstIndex)?;
        let nit = as_index(out[self.offset(Field::Nit)])
            .ok_or_else(|| LeapfrogError::Boundary("iteration count is not a whole number".to_string()))?;

        let pointset: Vec<Vec<f64>> = objectives.iter().zip(rows.iter()).map(|(o, r)| {
            let mut row = Vec::with_capacity(r.len() + 1);
            row.push(*o);
            row.extend_from_slice(r);
            row
        }).collect();

        Ok(OptimizationResult {
            x: out[..self.n].to_vec(),
            success: status == Status::Converged,
            status,
            message: status.message().to_string(),
            fun: out[self.offset(Field::Fun)],
            nfev: points + nit,
            nit,
            maxcv: out[self.offset(Field::MaxCv)],
            best: pointset[best].clone(),
            worst: pointset[worst].clone(),
            final_error: out[self.offset(Field::FinalError)],
            pointset
        })
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.len() {
            return Err(LeapfrogError::Boundary(format!(
                "output buffer holds {} values, layout needs {}", len, self.len())));
        }
        Ok(())
    }
}

fn as_index(v: f64) -> Option<usize> {
    if v >= 0. && v.fract() == 0. && v < std::usize::MAX as f64 {
        Some(v as usize)
    } else {
        None
    }
}

struct Native(ObjectiveFn);

impl Objective for Native {
    fn evaluate(&self, x: &[f64]) -> f64 {
        (self.0)(x.as_ptr(), x.len())
    }
}

#[no_mangle]
pub extern "C" fn lpfg_n_results() -> usize {
    N_RESULTS
}

#[no_mangle]
pub extern "C" fn lpfg_abi_version() -> u32 {
    ABI_VERSION
}

fn reject(code: c_int, msg: &str) -> c_int {
    error!("lpfg_minimize rejected call: {}", msg);
    code
}

/// Minimizes `objective` over the box `[lower, upper]`.
///
/// * `pointset` is either null or `points` pointers to rows of `n`
///   doubles.  When `pointset_provided` is non-zero the rows seed the
///   population, otherwise it is sampled.  The final population is written
///   back into the rows either way.
/// * `objectives` is either null or `points` doubles receiving the final
///   objective of each row.
/// * `seed` is only used when `seeded` is non-zero.
/// * `out` holds `out_len == n + LPFG_N_RESULTS` doubles.
///
/// Returns the run status (0 converged, 1 iterations exhausted) or a
/// negative `LPFG_ERR_*` code, in which case nothing has been written.
///
/// # Safety
/// Every non-null pointer must be valid for the lengths given above and no
/// buffer may be touched by the caller until the call returns.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn lpfg_minimize(
    objective: Option<ObjectiveFn>,
    lower: *const c_double,
    upper: *const c_double,
    n: usize,
    points: usize,
    constraint: Option<ObjectiveFn>,
    discrete: *const usize,
    discrete_len: usize,
    max_iterations: usize,
    tolerance: c_double,
    seed: u64,
    seeded: c_int,
    pointset: *const *mut c_double,
    pointset_provided: c_int,
    callback: Option<CallbackFn>,
    objectives: *mut c_double,
    out: *mut c_double,
    out_len: usize
) -> c_int {
    let objective = match objective {
        Some(f) => f,
        None => return reject(LPFG_ERR_NULL, "objective is null")
    };
    if lower.is_null() || upper.is_null() || out.is_null() {
        return reject(LPFG_ERR_NULL, "bounds and output buffer are required");
    }
    if discrete_len > 0 && discrete.is_null() {
        return reject(LPFG_ERR_NULL, "discrete indices are null");
    }
    if pointset_provided != 0 && pointset.is_null() {
        return reject(LPFG_ERR_NULL, "pointset flagged as provided but null");
    }
    if n.checked_add(N_RESULTS) != Some(out_len) {
        return reject(LPFG_ERR_LENGTH, &format!(
            "output buffer holds {} values, expected {} + {}", out_len, n, N_RESULTS));
    }

    let mut rows: Vec<&mut [f64]> = Vec::new();
    if !pointset.is_null() {
        let ptrs = slice::from_raw_parts(pointset, points);
        if ptrs.iter().any(|p| p.is_null()) {
            return reject(LPFG_ERR_NULL, "pointset row is null");
        }
        rows = ptrs.iter().map(|p| slice::from_raw_parts_mut(*p, n)).collect();
    }
    let objectives = if objectives.is_null() {
        None
    } else {
        Some(slice::from_raw_parts_mut(objectives, points))
    };

    let call = Call {
        objective,
        constraint,
        callback,
        lower: slice::from_raw_parts(lower, n),
        upper: slice::from_raw_parts(upper, n),
        discrete: if discrete_len == 0 { &[] } else { slice::from_raw_parts(discrete, discrete_len) },
        points,
        max_iterations,
        tolerance,
        seed: if seeded != 0 { Some(seed) } else { None },
        provided: pointset_provided != 0,
        rows,
        objectives,
        out: slice::from_raw_parts_mut(out, out_len)
    };

    match panic::catch_unwind(AssertUnwindSafe(move || call.run())) {
        Ok(Ok(status)) => status.code() as c_int,
        Ok(Err(e)) => reject(LPFG_ERR_CONFIG, &e.to_string()),
        Err(_) => reject(LPFG_ERR_PANIC, "engine panicked")
    }
}

/// Arguments of one boundary call, already turned into slices.
struct Call<'a> {
    objective: ObjectiveFn,
    constraint: Option<ObjectiveFn>,
    callback: Option<CallbackFn>,
    lower: &'a [f64],
    upper: &'a [f64],
    discrete: &'a [usize],
    points: usize,
    max_iterations: usize,
    tolerance: f64,
    seed: Option<u64>,
    provided: bool,
    rows: Vec<&'a mut [f64]>,
    objectives: Option<&'a mut [f64]>,
    out: &'a mut [f64]
}

impl Call<'_> {
    fn run(self) -> Result<Status> {
        let Call { objective, constraint, callback, lower, upper, discrete, points,
                   max_iterations, tolerance, seed, provided, mut rows, objectives, out } = self;

        let initial_population = if provided {
            Some(rows.iter().map(|r| r.to_vec()).collect())
        } else {
            None
        };
        let lf = LeapFrog::new(Options {
            points,
            discrete: discrete.to_vec(),
            max_iterations,
            tolerance,
            seed,
            initial_population
        })?;

        let objective = Native(objective);
        let constraint = constraint.map(Native);
        let bounds: Vec<Bound> = lower.iter().zip(upper.iter())
            .map(|(l, u)| Bound::new(*l, *u))
            .collect();
        let mut problem = Problem::new(&objective, bounds);
        if let Some(g) = &constraint {
            problem = problem.with_constraint(g);
        }

        let mut driver = lf.start(&problem)?;
        let result = driver.run(|x| {
            if let Some(cb) = callback {
                cb(x.as_ptr(), x.len());
            }
        });

        OutputLayout::new(lower.len(), N_RESULTS).encode(&result, driver.best(), driver.worst(), out)?;

        let final_points = driver.population().points();
        rows.iter_mut().zip(final_points.iter()).for_each(|(row, p)| row.copy_from_slice(&p.vars));
        if let Some(objs) = objectives {
            objs.iter_mut().zip(final_points.iter()).for_each(|(o, p)| *o = p.objective);
        }

        Ok(result.status)
    }
}

/// A problem described entirely with C function pointers.
#[derive(Clone,Debug)]
pub struct NativeProblem {
    pub objective: ObjectiveFn,
    pub constraint: Option<ObjectiveFn>,
    pub callback: Option<CallbackFn>,
    pub bounds: Vec<Bound>
}

/// Caller-owned handle to an engine's C entry point and its published
/// result field count.  Handles are cheap to copy and hold no run state.
#[derive(Clone,Copy)]
pub struct NativeEngine {
    minimize: MinimizeFn,
    n_results: usize
}

impl NativeEngine {

    /// The engine compiled into this crate.
    pub fn linked() -> Self {
        NativeEngine {
            minimize: lpfg_minimize,
            n_results: lpfg_n_results()
        }
    }

    /// Wraps an entry point resolved elsewhere along with the value of its
    /// `LPFG_N_RESULTS` symbol.  Engines publishing more fields than this
    /// crate knows about are accepted; fewer is a stale engine.
    pub fn from_symbols(minimize: MinimizeFn, n_results: usize) -> Result<Self> {
        if n_results < N_RESULTS {
            return Err(LeapfrogError::Boundary(format!(
                "engine publishes {} result fields, at least {} are required", n_results, N_RESULTS)));
        }
        Ok(NativeEngine { minimize, n_results })
    }

    pub fn n_results(&self) -> usize {
        self.n_results
    }

    /// Encodes the problem into the flat layout, runs the engine and
    /// decodes its output.
    pub fn minimize(&self, problem: &NativeProblem, options: &Options) -> Result<OptimizationResult> {
        options.validate()?;
        let n = problem.bounds.len();
        let points = options.points;

        let mut rows = match &options.initial_population {
            Some(rows) => {
                if let Some(bad) = rows.iter().find(|r| r.len() != n) {
                    return Err(LeapfrogError::DimensionMismatch { expected: n, found: bad.len() });
                }
                rows.clone()
            },
            None => vec![vec![0.; n]; points]
        };
        let row_ptrs: Vec<*mut f64> = rows.iter_mut().map(|r| r.as_mut_ptr()).collect();

        let lower: Vec<f64> = problem.bounds.iter().map(|b| b.lower).collect();
        let upper: Vec<f64> = problem.bounds.iter().map(|b| b.upper).collect();
        let layout = OutputLayout::new(n, self.n_results);
        let mut out = vec![0.; layout.len()];
        let mut objectives = vec![0.; points];

        let code = unsafe {
            (self.minimize)(
                Some(problem.objective),
                lower.as_ptr(),
                upper.as_ptr(),
                n,
                points,
                problem.constraint,
                options.discrete.as_ptr(),
                options.discrete.len(),
                options.max_iterations,
                options.tolerance,
                options.seed.unwrap_or(0),
                options.seed.is_some() as c_int,
                row_ptrs.as_ptr(),
                options.initial_population.is_some() as c_int,
                problem.callback,
                objectives.as_mut_ptr(),
                out.as_mut_ptr(),
                out.len())
        };
        if code < 0 {
            return Err(LeapfrogError::Boundary(format!("engine rejected the call with code {}", code)));
        }

        layout.decode(&out, &objectives, &rows)
    }
}

impl fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEngine")
            .field("n_results", &self.n_results)
            .finish()
    }
}
