// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Tremor Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Rust Tremor Kernel hot path.
//!
//! The inversion driver stays in Python; per-trace adjoint-source
//! generation moves here. Scalar misfit measurement is delegated back
//! to a Python callable via the `MisfitEvaluator` adapter.
//!
//! # FFI Safety
//!
//! - GIL acquired via `Python::with_gil` before every Python callback.
//! - Python exceptions in the misfit callback → safe Rust default
//!   (0.0, which zeroes the scaled kernel).
//! - No borrowed references escape the GIL lock scope.
//!
//! Install: `pip install -e crates/tremor-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from tremor_kernel import adjoint_source
//!
//! wadj = adjoint_source("Envelope", syn, obs, dt)
//! wadj = adjoint_source("Traveltime", syn, obs, dt,
//!                       misfit=lambda kind, s, o, nt, dt: pick_lag(s, o, dt))
//! ```

use pyo3::exceptions::{PyNotImplementedError, PyValueError};
use pyo3::prelude::*;

use tremor_adjoint::{adjoint_source as generate, ExternalMisfit, MisfitKind};
use tremor_types::TremorError;

fn to_py_err(err: TremorError) -> PyErr {
    match err {
        TremorError::NotImplemented(_) => PyNotImplementedError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Generate an adjoint source for one trace pair.
///
/// Args:
///     kind: Misfit kind name, e.g. "Waveform", "Envelope", "Traveltime".
///     syn: Synthetic trace samples.
///     obs: Observed trace samples (same length).
///     dt: Sampling interval in seconds.
///     eps: Optional regularization fraction override.
///     misfit: Optional Callable[[str, list, list, int, float], float]
///         returning the scalar misfit for kinds that scale by one.
///
/// Returns:
///     The adjoint-source samples, same length as the inputs.
#[pyfunction]
#[pyo3(signature = (kind, syn, obs, dt, eps = None, misfit = None))]
fn adjoint_source(
    kind: &str,
    syn: Vec<f64>,
    obs: Vec<f64>,
    dt: f64,
    eps: Option<f64>,
    misfit: Option<PyObject>,
) -> PyResult<Vec<f64>> {
    let kind: MisfitKind = kind.parse().map_err(to_py_err)?;
    let nt = syn.len();

    let evaluator = ExternalMisfit::new(move |kind, syn, obs, nt, dt| match &misfit {
        Some(cb) => Python::with_gil(|py| {
            match cb.call1(py, (kind.to_string(), syn.to_vec(), obs.to_vec(), nt, dt)) {
                Ok(result) => result.extract::<f64>(py).unwrap_or(0.0),
                Err(e) => {
                    log::error!("misfit callback raised {e}; using 0.0");
                    0.0
                }
            }
        }),
        None => {
            log::warn!("{kind} adjoint requested without a misfit callback; using 0.0");
            0.0
        }
    });

    generate(kind, &syn, &obs, nt, dt, eps, &evaluator).map_err(to_py_err)
}

/// Discrete Hilbert transform of a real sequence.
#[pyfunction]
fn hilbert(x: Vec<f64>) -> Vec<f64> {
    tremor_signal::hilbert(&x)
}

/// Envelope (analytic-signal magnitude) of a real sequence.
#[pyfunction]
fn envelope(x: Vec<f64>) -> Vec<f64> {
    tremor_signal::envelope(&x)
}

/// Instantaneous phase of a real sequence.
#[pyfunction]
fn instantaneous_phase(x: Vec<f64>) -> Vec<f64> {
    tremor_signal::instantaneous_phase(&x)
}

/// Names of all supported misfit kinds, in declaration order.
#[pyfunction]
fn misfit_kinds() -> Vec<String> {
    MisfitKind::ALL.iter().map(|k| k.to_string()).collect()
}

#[pymodule]
fn tremor_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(adjoint_source, m)?)?;
    m.add_function(wrap_pyfunction!(hilbert, m)?)?;
    m.add_function(wrap_pyfunction!(envelope, m)?)?;
    m.add_function(wrap_pyfunction!(instantaneous_phase, m)?)?;
    m.add_function(wrap_pyfunction!(misfit_kinds, m)?)?;
    Ok(())
}
