// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Adjoint Trace Generators
// ─────────────────────────────────────────────────────────────────────
//! One generator per [`MisfitKind`]. Each takes `(syn, obs, nt, dt)`,
//! validates the pair, and returns an adjoint source of length `nt`.
//!
//! Boundary policy for the derivative-based kernels (traveltime,
//! envelope3, velocity, acceleration): the result buffer is allocated
//! zero-initialised and only interior samples `1..nt-1` are filled, so
//! samples 0 and `nt-1` are always zero.

use tremor_signal::{envelope as trace_envelope, hilbert, instantaneous_phase as trace_phase};
use tremor_types::{check_pair, TremorError, TremorResult};

use crate::evaluator::MisfitEvaluator;
use crate::misfit::MisfitKind;

/// Generate the adjoint source for `kind`.
///
/// `eps` overrides the variant's default regularization fraction; pass
/// `None` for the documented defaults. Variants that regularise nothing
/// ignore it. The evaluator is consulted only for variants where
/// [`MisfitKind::uses_misfit_scalar`] is true.
pub fn adjoint_source(
    kind: MisfitKind,
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    eps: Option<f64>,
    misfit: &dyn MisfitEvaluator,
) -> TremorResult<Vec<f64>> {
    let eps = eps.unwrap_or(kind.default_eps());
    match kind {
        MisfitKind::Waveform => waveform(syn, obs, nt, dt),
        MisfitKind::Envelope => envelope(syn, obs, nt, dt, eps),
        MisfitKind::InstantaneousPhase => instantaneous_phase(syn, obs, nt, dt, eps),
        MisfitKind::Traveltime => traveltime(syn, obs, nt, dt, misfit),
        MisfitKind::TraveltimeInexact => traveltime_inexact(syn, obs, nt, dt, misfit),
        MisfitKind::Amplitude => amplitude(syn, obs, nt, dt, misfit),
        MisfitKind::Envelope2 => envelope2(syn, obs, nt, dt),
        MisfitKind::Envelope3 => envelope3(syn, obs, nt, dt, misfit),
        MisfitKind::InstantaneousPhase2 => instantaneous_phase2(syn, obs, nt, dt, eps),
        MisfitKind::Displacement => displacement(syn, obs, nt, dt),
        MisfitKind::Velocity => velocity(syn, obs, nt, dt),
        MisfitKind::Acceleration => acceleration(syn, obs, nt, dt),
    }
}

/// Waveform difference: `wadj = syn - obs`. Always defined.
pub fn waveform(syn: &[f64], obs: &[f64], nt: usize, dt: f64) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    Ok(syn.iter().zip(obs).map(|(s, o)| s - o).collect())
}

/// Envelope difference.
///
/// A fully muted synthetic trace (`sum(syn) == 0`) yields a zero
/// adjoint source rather than NaN from the waterlevel denominator.
pub fn envelope(syn: &[f64], obs: &[f64], nt: usize, dt: f64, eps: f64) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;

    if syn.iter().sum::<f64>() == 0.0 {
        log::warn!("envelope adjoint: muted synthetic trace, returning zeros");
        return Ok(vec![0.0; nt]);
    }

    let esyn = trace_envelope(syn);
    let eobs = trace_envelope(obs);
    let emax = max_of(&esyn);

    let etmp: Vec<f64> = esyn
        .iter()
        .zip(&eobs)
        .map(|(es, eo)| (es - eo) / (es + eps * emax))
        .collect();

    let hsyn = hilbert(syn);
    let inner: Vec<f64> = etmp.iter().zip(&hsyn).map(|(e, h)| e * h).collect();
    let hinner = hilbert(&inner);

    Ok((0..nt).map(|i| etmp[i] * syn[i] - hinner[i]).collect())
}

/// Instantaneous-phase residual.
pub fn instantaneous_phase(
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    eps: f64,
) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;

    let phi_syn = trace_phase(syn);
    let phi_obs = trace_phase(obs);
    let phi_rsd: Vec<f64> = phi_syn.iter().zip(&phi_obs).map(|(s, o)| s - o).collect();

    let esyn2: Vec<f64> = trace_envelope(syn).iter().map(|e| e * e).collect();
    let emax = max_of(&esyn2);

    let hsyn = hilbert(syn);
    let inner: Vec<f64> = (0..nt)
        .map(|i| phi_rsd[i] * syn[i] / (esyn2[i] + eps * emax))
        .collect();
    let hinner = hilbert(&inner);

    Ok((0..nt)
        .map(|i| phi_rsd[i] * hsyn[i] / (esyn2[i] + eps * emax) + hinner[i])
        .collect())
}

/// Cross-correlation traveltime kernel.
///
/// Centered-difference velocity of the synthetic, normalised by
/// `1/(dt·Σv²)` and scaled by the collaborator's traveltime misfit.
/// A constant synthetic trace has zero kernel energy and the result is
/// undefined — caller precondition, not guarded here.
pub fn traveltime(
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    misfit: &dyn MisfitEvaluator,
) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    let mut wadj = centered_difference(syn, nt, dt);
    let energy: f64 = wadj.iter().map(|v| v * v).sum::<f64>() * dt;
    let scale = misfit.evaluate(MisfitKind::Traveltime, syn, obs, nt, dt) / energy;
    for v in wadj.iter_mut() {
        *v *= scale;
    }
    Ok(wadj)
}

/// Traveltime kernel using the collaborator's fast approximate misfit.
/// Same structure and precondition as [`traveltime`].
pub fn traveltime_inexact(
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    misfit: &dyn MisfitEvaluator,
) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    let mut wadj = centered_difference(syn, nt, dt);
    let energy: f64 = wadj.iter().map(|v| v * v).sum::<f64>() * dt;
    let scale = misfit.evaluate(MisfitKind::TraveltimeInexact, syn, obs, nt, dt) / energy;
    for v in wadj.iter_mut() {
        *v *= scale;
    }
    Ok(wadj)
}

/// Cross-correlation amplitude kernel: `syn/(dt·Σsyn²)` scaled by the
/// collaborator's amplitude misfit. Zero-energy synthetic traces are a
/// caller precondition, as for [`traveltime`].
pub fn amplitude(
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    misfit: &dyn MisfitEvaluator,
) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    let energy: f64 = syn.iter().map(|v| v * v).sum::<f64>() * dt;
    let scale = misfit.evaluate(MisfitKind::Amplitude, syn, obs, nt, dt) / energy;
    Ok(syn.iter().map(|s| s * scale).collect())
}

/// Envelope amplitude ratio — unsupported, fails explicitly.
pub fn envelope2(syn: &[f64], obs: &[f64], nt: usize, dt: f64) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    Err(TremorError::NotImplemented(
        "Envelope2 (envelope amplitude ratio) adjoint source".to_string(),
    ))
}

/// Envelope cross-correlation lag kernel.
pub fn envelope3(
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    misfit: &dyn MisfitEvaluator,
) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;

    let esyn = trace_envelope(syn);
    let mut erat = vec![0.0; nt];
    for i in 1..nt.saturating_sub(1) {
        erat[i] = (esyn[i + 1] - esyn[i - 1]) / (2.0 * dt) / esyn[i];
    }
    let scale = misfit.evaluate(MisfitKind::Envelope3, syn, obs, nt, dt);
    for v in erat.iter_mut() {
        *v *= scale;
    }

    let hesyn = hilbert(&esyn);
    let inner: Vec<f64> = erat.iter().zip(&hesyn).map(|(e, h)| e * h).collect();
    let hinner = hilbert(&inner);

    Ok((0..nt).map(|i| -erat[i] * syn[i] + hinner[i]).collect())
}

/// Regularised instantaneous-phase waterlevel variant.
pub fn instantaneous_phase2(
    syn: &[f64],
    obs: &[f64],
    nt: usize,
    dt: f64,
    eps: f64,
) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;

    let esyn = trace_envelope(syn);
    let eobs = trace_envelope(obs);

    let esyn_max = max_of(&esyn);
    let eobs_max = max_of(&eobs);
    let esyn1: Vec<f64> = esyn.iter().map(|e| e + eps * esyn_max).collect();
    let eobs1: Vec<f64> = eobs.iter().map(|e| e + eps * eobs_max).collect();

    let esyn3_raw: Vec<f64> = esyn.iter().map(|e| e * e * e).collect();
    let esyn3_max = max_of(&esyn3_raw);
    let esyn3: Vec<f64> = esyn3_raw.iter().map(|e| e + eps * esyn3_max).collect();

    let hsyn = hilbert(syn);
    let hobs = hilbert(obs);

    let mut part1 = vec![0.0; nt];
    let mut part2 = vec![0.0; nt];
    for i in 0..nt {
        let diff1 = syn[i] / esyn1[i] - obs[i] / eobs1[i];
        let diff2 = hsyn[i] / esyn1[i] - hobs[i] / eobs1[i];
        part1[i] = (diff1 * hsyn[i] * hsyn[i] - diff2 * syn[i] * hsyn[i]) / esyn3[i];
        part2[i] = (diff1 * syn[i] * hsyn[i] - diff2 * syn[i] * syn[i]) / esyn3[i];
    }
    let hpart2 = hilbert(&part2);

    Ok((0..nt).map(|i| part1[i] + hpart2[i]).collect())
}

/// Migration imaging kernel: the observed trace, unscaled.
pub fn displacement(syn: &[f64], obs: &[f64], nt: usize, dt: f64) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    Ok(obs.to_vec())
}

/// Migration weighting kernel: centered first difference of the
/// observed trace, boundary samples zero, no normalisation.
pub fn velocity(syn: &[f64], obs: &[f64], nt: usize, dt: f64) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    Ok(centered_difference(obs, nt, dt))
}

/// Migration weighting kernel: centered second difference of the
/// observed trace over `2dt`, boundary samples zero.
pub fn acceleration(syn: &[f64], obs: &[f64], nt: usize, dt: f64) -> TremorResult<Vec<f64>> {
    check_pair(syn, obs, nt, dt)?;
    let mut adj = vec![0.0; nt];
    for i in 1..nt.saturating_sub(1) {
        adj[i] = (-obs[i + 1] + 2.0 * obs[i] - obs[i - 1]) / (2.0 * dt);
    }
    Ok(adj)
}

/// Centered first difference into a zero-initialised buffer;
/// samples 0 and `nt-1` stay zero.
fn centered_difference(x: &[f64], nt: usize, dt: f64) -> Vec<f64> {
    let mut out = vec![0.0; nt];
    for i in 1..nt.saturating_sub(1) {
        out[i] = (x[i + 1] - x[i - 1]) / (2.0 * dt);
    }
    out
}

fn max_of(xs: &[f64]) -> f64 {
    xs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
}
