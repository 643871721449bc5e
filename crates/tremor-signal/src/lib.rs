// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Analytic Signal Transform
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Analytic-signal extension of finite real sequences.
//!
//! `a(x) = x + i·H(x)` over the whole finite window, where `H` is the
//! discrete Hilbert transform computed by FFT. Magnitude gives the
//! envelope, argument gives the instantaneous phase. Every misfit
//! formula in `tremor-adjoint` builds on these four routines.

pub mod analytic;

pub use analytic::{analytic, envelope, hilbert, instantaneous_phase};
