// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Execution Layer Interface
// ─────────────────────────────────────────────────────────────────────
//! Scheduling collaborator. The job category is an explicit parameter
//! at this boundary: kernel aggregation and gradient assembly are
//! always submitted as one coordinated unit, per-source simulation
//! work as many independent units. Distributed implementations
//! serialize the label and category into their own job descriptors;
//! the inline implementation just runs the task.

use tremor_types::TremorResult;

/// How the execution layer must treat a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCategory {
    /// One globally coordinated unit — a reduction or smoothing step
    /// needing a synchronized view across all spatial partitions.
    Coordinated,
    /// Many independent units — embarrassingly parallel per-source
    /// work with no ordering constraints.
    Independent,
}

/// Trait for execution backends.
pub trait Scheduler: Send + Sync {
    /// Execute `task` under the given category. Retry and backoff
    /// policy belongs to the implementation, never to the caller.
    fn run(
        &self,
        category: JobCategory,
        label: &str,
        task: &mut dyn FnMut() -> TremorResult<()>,
    ) -> TremorResult<()>;
}

/// Runs every job immediately on the calling thread.
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn run(
        &self,
        category: JobCategory,
        label: &str,
        task: &mut dyn FnMut() -> TremorResult<()>,
    ) -> TremorResult<()> {
        log::debug!("running {label} inline ({category:?})");
        task()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tremor_types::TremorError;

    #[test]
    fn test_inline_scheduler_runs_task() {
        let mut ran = false;
        InlineScheduler
            .run(JobCategory::Coordinated, "noop", &mut || {
                ran = true;
                Ok(())
            })
            .unwrap();
        assert!(ran);
    }

    #[test]
    fn test_inline_scheduler_propagates_error() {
        let result = InlineScheduler.run(JobCategory::Independent, "boom", &mut || {
            Err(TremorError::Validation("boom".to_string()))
        });
        assert!(result.is_err());
    }
}
