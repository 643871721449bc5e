// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Kernel Aggregator
// ─────────────────────────────────────────────────────────────────────
//! Sums per-source sensitivity kernels for a parameter set into one
//! field, optionally smoothed through the solver collaborator.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use tremor_types::{PostprocessConfig, TremorError, TremorResult};

use crate::solver::SolverBackend;

/// Per-partition grid-geometry sidecar stems the smoothing operator
/// needs next to the unsmoothed sum (mesh connectivity, Jacobian,
/// coordinates — not kernel quantities).
const GEOMETRY_SIDECARS: [&str; 4] = ["NSPEC_ibool", "jacobian", "x", "z"];

/// Sums per-source kernels, optionally smoothing the aggregate.
pub struct KernelAggregator {
    solver: Arc<dyn SolverBackend>,
    config: PostprocessConfig,
}

impl KernelAggregator {
    /// Configuration is validated here, once, before any kernel work.
    pub fn new(solver: Arc<dyn SolverBackend>, config: PostprocessConfig) -> TremorResult<Self> {
        config.validate()?;
        Ok(Self { solver, config })
    }

    pub fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    /// Sum the per-source kernels under `path` into `path/sum`.
    ///
    /// With a configured smoothing span the raw sum lands in
    /// `path/sum_nosmooth` first, gains the grid-geometry sidecars from
    /// the initial model, and is then smoothed into `path/sum`. With a
    /// zero span the kernels are combined directly into `path/sum`.
    pub fn process_kernels(&self, path: &Path, parameters: &[String]) -> TremorResult<()> {
        if !self.solver.exists(path) {
            return Err(TremorError::PathNotFound(path.to_path_buf()));
        }

        if self.config.smooth_span > 0.0 {
            let nosmooth = path.join("sum_nosmooth");
            self.solver.combine(path, &nosmooth, parameters)?;
            self.copy_geometry(&nosmooth)?;
            log::info!(
                "smoothing kernel sum with span {}",
                self.config.smooth_span
            );
            self.solver.smooth(
                &nosmooth,
                &path.join("sum"),
                parameters,
                self.config.smooth_span,
            )?;
        } else {
            self.solver.combine(path, &path.join("sum"), parameters)?;
        }
        Ok(())
    }

    /// Copy the geometry sidecars for every partition from the initial
    /// model into `dest`. Copies are independent across partitions and
    /// run in parallel; the smoothing call that consumes them does not
    /// start until every copy has landed.
    fn copy_geometry(&self, dest: &Path) -> TremorResult<()> {
        let model = self.config.model_init.as_ref().ok_or_else(|| {
            TremorError::Config("smoothing requires model_init for grid geometry".to_string())
        })?;
        std::fs::create_dir_all(dest)?;
        (0..self.config.nproc)
            .into_par_iter()
            .try_for_each(|proc| -> TremorResult<()> {
                for stem in GEOMETRY_SIDECARS {
                    let name = format!("proc{proc:06}_{stem}.bin");
                    std::fs::copy(model.join(&name), dest.join(&name))?;
                }
                Ok(())
            })
    }
}
