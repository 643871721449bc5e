// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Tremor Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use std::path::PathBuf;

use thiserror::Error;

/// Root error type for all Tremor Kernel failures.
#[derive(Error, Debug)]
pub enum TremorError {
    /// A kernel root, mask, or model location does not exist.
    /// Raised before any work is attempted.
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    /// Misfit variant recognised but deliberately unimplemented.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Invalid input (trace lengths, sampling interval, parameters).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Solver backend failed a delegated field operation.
    #[error("solver error: {0}")]
    Solver(String),

    /// Execution layer refused or failed a submitted job.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Underlying filesystem failure (geometry sidecar copies).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TremorResult<T> = Result<T, TremorError>;
