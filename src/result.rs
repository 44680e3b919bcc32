use std::fmt;

use serde::{Deserialize,Serialize};

/// How a run ended.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The convergence error dropped below the tolerance
    Converged,

    /// The iteration budget ran out first
    MaxIterations,

    /// Anything else
    Failure
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Converged => 0,
            Status::MaxIterations => 1,
            Status::Failure => 2
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Converged),
            1 => Some(Status::MaxIterations),
            2 => Some(Status::Failure),
            _ => None
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Status::Converged => "Tolerance condition satisfied",
            Status::MaxIterations => "Maximum iterations exceeded",
            Status::Failure => "Optimization failed"
        }
    }
}

/// Snapshot of a finished run.
#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct OptimizationResult {
    /// Decision variables of the best point
    pub x: Vec<f64>,
    pub success: bool,
    pub status: Status,
    pub message: String,

    /// Objective at `x`, including any penalty
    pub fun: f64,
    pub nfev: usize,
    pub nit: usize,

    /// Largest constraint violation seen during the run
    pub maxcv: f64,

    /// `[fun, x..]` of the best row
    pub best: Vec<f64>,

    /// `[fun, x..]` of the worst row
    pub worst: Vec<f64>,
    pub final_error: f64,

    /// Every row of the final population as `[fun, x..]`
    pub pointset: Vec<Vec<f64>>
}

impl OptimizationResult {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} : {:?}", "x", self.x)?;
        writeln!(f, "{:>12} : {}", "success", self.success)?;
        writeln!(f, "{:>12} : {}", "status", self.status.code())?;
        writeln!(f, "{:>12} : {}", "message", self.message)?;
        writeln!(f, "{:>12} : {}", "fun", self.fun)?;
        writeln!(f, "{:>12} : {}", "nfev", self.nfev)?;
        writeln!(f, "{:>12} : {}", "nit", self.nit)?;
        writeln!(f, "{:>12} : {}", "maxcv", self.maxcv)?;
        writeln!(f, "{:>12} : {:?}", "best", self.best)?;
        writeln!(f, "{:>12} : {:?}", "worst", self.worst)?;
        write!(f, "{:>12} : {}", "final_error", self.final_error)
    }
}
