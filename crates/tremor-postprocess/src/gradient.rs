// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Gradient Assembler
// ─────────────────────────────────────────────────────────────────────
//! Turns one iteration's aggregated kernel into a persisted,
//! optimizer-ready gradient: coordinated aggregation, change of
//! variables to absolute perturbations, optional masking.

use std::path::Path;
use std::sync::Arc;

use tremor_types::{PostprocessConfig, TremorError, TremorResult};

use crate::aggregator::KernelAggregator;
use crate::solver::SolverBackend;
use crate::system::{JobCategory, Scheduler};

/// Assembles and persists the model-update gradient.
pub struct GradientAssembler {
    solver: Arc<dyn SolverBackend>,
    scheduler: Arc<dyn Scheduler>,
    aggregator: KernelAggregator,
    config: PostprocessConfig,
}

impl GradientAssembler {
    /// Configuration is validated once here; location preconditions
    /// (mask, initial model) fail fast at construction.
    pub fn new(
        solver: Arc<dyn SolverBackend>,
        scheduler: Arc<dyn Scheduler>,
        config: PostprocessConfig,
    ) -> TremorResult<Self> {
        config.validate()?;
        let aggregator = KernelAggregator::new(Arc::clone(&solver), config.clone())?;
        Ok(Self {
            solver,
            scheduler,
            aggregator,
            config,
        })
    }

    /// Combine per-source kernels under `path/kernels`, convert the
    /// aggregate to absolute perturbations, and persist the gradient.
    ///
    /// With a configured mask both the unmasked gradient
    /// (`gradient_nomask`) and the masked one (`gradient`) are written;
    /// without one only `gradient` is. Masking is ad hoc multiplicative
    /// weighting — distinct from preconditioning, which is a change of
    /// variables and lives with the optimizer.
    pub fn write_gradient(&self, path: &Path) -> TremorResult<()> {
        if !self.solver.exists(path) {
            return Err(TremorError::PathNotFound(path.to_path_buf()));
        }

        let kernels = path.join("kernels");
        let parameters = self.config.parameters.clone();

        // Aggregation needs a synchronized view across all partitions:
        // one coordinated unit, never the per-source pool.
        self.scheduler
            .run(JobCategory::Coordinated, "process_kernels", &mut || {
                self.aggregator.process_kernels(&kernels, &parameters)
            })?;

        let mut gradient = self
            .solver
            .merge(&self.solver.load(&kernels.join("sum"), "_kernel")?);

        // Change of variables, log dm → dm: the kernels measure
        // relative perturbations; the optimizer expects absolute ones.
        let model = self.solver.merge(&self.solver.load(&path.join("model"), "")?);
        if model.len() != gradient.len() {
            return Err(TremorError::Solver(format!(
                "model vector has {} entries, gradient has {}",
                model.len(),
                gradient.len()
            )));
        }
        for (g, m) in gradient.iter_mut().zip(&model) {
            *g *= m;
        }

        match &self.config.mask_path {
            Some(mask_path) => {
                let mask = self.solver.merge(&self.solver.load(mask_path, "")?);
                if mask.len() != gradient.len() {
                    return Err(TremorError::Solver(format!(
                        "mask vector has {} entries, gradient has {}",
                        mask.len(),
                        gradient.len()
                    )));
                }
                self.solver.save(
                    &self.solver.split(&gradient)?,
                    &path.join("gradient_nomask"),
                    &parameters,
                    "_kernel",
                )?;
                let masked: Vec<f64> = gradient.iter().zip(&mask).map(|(g, m)| g * m).collect();
                self.solver.save(
                    &self.solver.split(&masked)?,
                    &path.join("gradient"),
                    &parameters,
                    "_kernel",
                )?;
                log::info!("gradient written masked; unmasked copy kept for reproducibility");
            }
            None => {
                self.solver.save(
                    &self.solver.split(&gradient)?,
                    &path.join("gradient"),
                    &parameters,
                    "_kernel",
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use parking_lot::Mutex;

    use super::*;
    use crate::solver::{FieldSet, InMemorySolver};
    use crate::system::InlineScheduler;

    fn field(values: &[f64]) -> FieldSet {
        let mut f = FieldSet::new();
        f.insert("vp", vec![values.to_vec()]);
        f
    }

    fn config() -> PostprocessConfig {
        PostprocessConfig {
            parameters: vec!["vp".to_string()],
            ..PostprocessConfig::default()
        }
    }

    /// Runs inline while recording every submitted (category, label).
    struct RecordingScheduler {
        calls: Mutex<Vec<(JobCategory, String)>>,
    }

    impl RecordingScheduler {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Scheduler for RecordingScheduler {
        fn run(
            &self,
            category: JobCategory,
            label: &str,
            task: &mut dyn FnMut() -> TremorResult<()>,
        ) -> TremorResult<()> {
            self.calls.lock().push((category, label.to_string()));
            task()
        }
    }

    fn seeded_solver(run: &Path) -> Arc<InMemorySolver> {
        let solver = Arc::new(InMemorySolver::new());
        solver.insert(run.join("kernels/000000"), field(&[1.0, -2.0]));
        solver.insert(run.join("kernels/000001"), field(&[3.0, 4.0]));
        solver.insert(run.join("model"), field(&[2.0, 10.0]));
        solver
    }

    #[test]
    fn test_missing_run_path_is_fatal() {
        let solver = Arc::new(InMemorySolver::new());
        let assembler =
            GradientAssembler::new(solver, Arc::new(InlineScheduler), config()).unwrap();
        let err = assembler.write_gradient(Path::new("/run")).unwrap_err();
        assert!(matches!(err, TremorError::PathNotFound(_)));
    }

    #[test]
    fn test_write_gradient_without_mask() {
        let run = PathBuf::from("/run");
        let solver = seeded_solver(&run);
        let assembler = GradientAssembler::new(
            Arc::clone(&solver) as Arc<dyn SolverBackend>,
            Arc::new(InlineScheduler),
            config(),
        )
        .unwrap();
        assembler.write_gradient(&run).unwrap();

        // (1+3)*2 and (-2+4)*10: kernel sum times current model.
        let gradient = solver.fields_at(&run.join("gradient")).unwrap();
        assert_eq!(gradient.get("vp").unwrap(), &vec![vec![8.0, 20.0]]);
        assert!(
            solver.fields_at(&run.join("gradient_nomask")).is_none(),
            "no mask configured, only the plain gradient may exist"
        );
    }

    #[test]
    fn test_write_gradient_with_mask_writes_both() {
        let base = std::env::temp_dir().join(format!("tremor_grad_{}", std::process::id()));
        let mask_dir = base.join("mask");
        std::fs::create_dir_all(&mask_dir).unwrap();

        let run = PathBuf::from("/run");
        let solver = seeded_solver(&run);
        solver.insert(mask_dir.clone(), field(&[0.5, 0.0]));

        let config = PostprocessConfig {
            mask_path: Some(mask_dir),
            ..config()
        };
        let assembler = GradientAssembler::new(
            Arc::clone(&solver) as Arc<dyn SolverBackend>,
            Arc::new(InlineScheduler),
            config,
        )
        .unwrap();
        assembler.write_gradient(&run).unwrap();

        let nomask = solver.fields_at(&run.join("gradient_nomask")).unwrap();
        assert_eq!(nomask.get("vp").unwrap(), &vec![vec![8.0, 20.0]]);
        let masked = solver.fields_at(&run.join("gradient")).unwrap();
        assert_eq!(masked.get("vp").unwrap(), &vec![vec![4.0, 0.0]]);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_masked_nomask_equals_unmasked_gradient() {
        let base = std::env::temp_dir().join(format!("tremor_grad_eq_{}", std::process::id()));
        let mask_dir = base.join("mask");
        std::fs::create_dir_all(&mask_dir).unwrap();

        let run = PathBuf::from("/run");
        let plain_solver = seeded_solver(&run);
        let masked_solver = seeded_solver(&run);
        masked_solver.insert(mask_dir.clone(), field(&[0.3, 0.7]));

        GradientAssembler::new(
            Arc::clone(&plain_solver) as Arc<dyn SolverBackend>,
            Arc::new(InlineScheduler),
            config(),
        )
        .unwrap()
        .write_gradient(&run)
        .unwrap();

        let masked_config = PostprocessConfig {
            mask_path: Some(mask_dir),
            ..config()
        };
        GradientAssembler::new(
            Arc::clone(&masked_solver) as Arc<dyn SolverBackend>,
            Arc::new(InlineScheduler),
            masked_config,
        )
        .unwrap()
        .write_gradient(&run)
        .unwrap();

        // The "no mask" output of the masked run equals the single
        // output of the unmasked run, for identical kernels and model.
        assert_eq!(
            masked_solver.fields_at(&run.join("gradient_nomask")),
            plain_solver.fields_at(&run.join("gradient")),
        );

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn test_aggregation_submitted_as_one_coordinated_job() {
        let run = PathBuf::from("/run");
        let solver = seeded_solver(&run);
        let scheduler = Arc::new(RecordingScheduler::new());
        let assembler = GradientAssembler::new(
            Arc::clone(&solver) as Arc<dyn SolverBackend>,
            Arc::clone(&scheduler) as Arc<dyn Scheduler>,
            config(),
        )
        .unwrap();
        assembler.write_gradient(&run).unwrap();

        let calls = scheduler.calls.lock();
        assert_eq!(calls.len(), 1, "exactly one job submission expected");
        assert_eq!(calls[0].0, JobCategory::Coordinated);
        assert_eq!(calls[0].1, "process_kernels");
    }

    #[test]
    fn test_model_length_mismatch_errors() {
        let run = PathBuf::from("/run");
        let solver = Arc::new(InMemorySolver::new());
        solver.insert(run.join("kernels/000000"), field(&[1.0, -2.0]));
        solver.insert(run.join("model"), field(&[2.0]));
        let assembler = GradientAssembler::new(
            Arc::clone(&solver) as Arc<dyn SolverBackend>,
            Arc::new(InlineScheduler),
            config(),
        )
        .unwrap();
        assert!(matches!(
            assembler.write_gradient(&run).unwrap_err(),
            TremorError::Solver(_)
        ));
    }
}
