// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Tremor Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Tremor Kernel — the adjoint-source and gradient-assembly core for
//! full-waveform inversion.

pub mod config;
pub mod error;
pub mod trace;

pub use config::PostprocessConfig;
pub use error::{TremorError, TremorResult};
pub use trace::check_pair;
