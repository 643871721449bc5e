// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Trace Validation
// ─────────────────────────────────────────────────────────────────────

use crate::error::{TremorError, TremorResult};

/// Validate a synthetic/observed trace pair against its header.
///
/// Every adjoint-source generator calls this before touching samples:
/// `nt > 0`, `dt > 0` and finite, both traces exactly `nt` samples.
pub fn check_pair(syn: &[f64], obs: &[f64], nt: usize, dt: f64) -> TremorResult<()> {
    if nt == 0 {
        return Err(TremorError::Validation("nt must be > 0".to_string()));
    }
    if !dt.is_finite() || dt <= 0.0 {
        return Err(TremorError::Validation(format!(
            "dt must be finite and > 0, got {dt}"
        )));
    }
    if syn.len() != nt {
        return Err(TremorError::Validation(format!(
            "synthetic trace has {} samples, header says {nt}",
            syn.len()
        )));
    }
    if obs.len() != nt {
        return Err(TremorError::Validation(format!(
            "observed trace has {} samples, header says {nt}",
            obs.len()
        )));
    }
    Ok(())
}
