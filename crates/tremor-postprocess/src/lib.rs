// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Postprocess Core (Kernels → Gradient)
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Kernel aggregation and gradient assembly for one inversion
//! iteration.
//!
//! - `KernelAggregator` — sums per-source sensitivity kernels into one
//!   field, optionally smoothed through the solver collaborator.
//! - `GradientAssembler` — turns the aggregated kernel into a persisted
//!   optimizer-ready gradient (absolute perturbations, optional mask).
//! - `SolverBackend` / `Scheduler` — collaborator traits for the opaque
//!   per-partition field format and the execution layer.
//!
//! Aggregation and assembly each perform one globally coordinated
//! reduction over all spatial partitions; they are submitted to the
//! scheduler as a single coordinated unit, never spread across the
//! per-source data-parallel pool.

pub mod aggregator;
pub mod gradient;
pub mod solver;
pub mod system;

pub use aggregator::KernelAggregator;
pub use gradient::GradientAssembler;
pub use solver::{FieldSet, InMemorySolver, SolverBackend};
pub use system::{InlineScheduler, JobCategory, Scheduler};
