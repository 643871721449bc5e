// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Discrete Hilbert Transform (FFT)
// ─────────────────────────────────────────────────────────────────────
//! Whole-window (not streaming) Hilbert transform:
//!
//!   X = FFT(x); X[0] and X[n/2] (even n) kept, positive frequencies
//!   doubled, negative frequencies zeroed; H(x) = Im(IFFT(X)).
//!
//! `analytic` assembles `x + i·H(x)` directly from the input samples,
//! so its real part is the input bit-for-bit and its imaginary part
//! equals `hilbert(x)` exactly.
//!
//! All routines are stateless and safe to call concurrently.

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Discrete Hilbert transform of a finite real sequence.
///
/// Returns a sequence of the same length. A constant sequence maps to
/// zeros; a single sample has a zero transform by convention.
pub fn hilbert(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(n).process(&mut buf);

    // One-sided spectrum weighting: DC (and Nyquist for even n) kept,
    // positive frequencies doubled, negative frequencies zeroed.
    let half = n / 2;
    let pos_end = if n % 2 == 0 { half } else { half + 1 };
    for v in buf[1..pos_end].iter_mut() {
        *v = v.scale(2.0);
    }
    for v in buf[half + 1..].iter_mut() {
        *v = Complex64::new(0.0, 0.0);
    }

    planner.plan_fft_inverse(n).process(&mut buf);

    // rustfft leaves transforms unnormalised
    let scale = 1.0 / n as f64;
    buf.iter().map(|v| v.im * scale).collect()
}

/// Complex analytic signal `a(x) = x + i·H(x)`.
///
/// `Re(analytic(x))` is the input itself; `Im(analytic(x))` agrees with
/// `hilbert(x)` exactly.
pub fn analytic(x: &[f64]) -> Vec<Complex64> {
    x.iter()
        .zip(hilbert(x))
        .map(|(&re, im)| Complex64::new(re, im))
        .collect()
}

/// Envelope `|a(x)|` of a real sequence.
pub fn envelope(x: &[f64]) -> Vec<f64> {
    analytic(x).iter().map(|a| a.norm()).collect()
}

/// Instantaneous phase `atan2(Im a(x), Re a(x))` of a real sequence.
pub fn instantaneous_phase(x: &[f64]) -> Vec<f64> {
    analytic(x).iter().map(|a| a.arg()).collect()
}
