// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Solver Backend Interface
// ─────────────────────────────────────────────────────────────────────
//! Collaborator trait over the solver's per-partition binary field
//! format. This core never defines that format; it only asks the
//! backend to combine, smooth, load, save, and flatten fields.
//!
//! The in-memory backend keeps whole field sets keyed by location and
//! exists for tests and single-process runs; production deployments
//! plug in the real solver bindings via the same trait.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use tremor_types::{TremorError, TremorResult};

/// One spatial partition of a scalar field.
pub type Partition = Vec<f64>;

/// Per-parameter, per-partition scalar fields — the in-crate image of
/// one stored field set (a kernel, a model, a mask, or a gradient).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: BTreeMap<String, Vec<Partition>>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parameter: impl Into<String>, partitions: Vec<Partition>) {
        self.fields.insert(parameter.into(), partitions);
    }

    pub fn get(&self, parameter: &str) -> Option<&Vec<Partition>> {
        self.fields.get(parameter)
    }

    /// Parameter names in deterministic (sorted) order.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Restrict to the named parameters, erroring on any missing one.
    pub fn select(&self, parameters: &[String]) -> TremorResult<FieldSet> {
        let mut out = FieldSet::new();
        for name in parameters {
            let partitions = self.fields.get(name).ok_or_else(|| {
                TremorError::Solver(format!("field set has no parameter {name}"))
            })?;
            out.insert(name.clone(), partitions.clone());
        }
        Ok(out)
    }

    /// Layout signature: parameter names with per-partition lengths.
    fn layout(&self) -> Vec<(String, Vec<usize>)> {
        self.fields
            .iter()
            .map(|(name, parts)| (name.clone(), parts.iter().map(Vec::len).collect()))
            .collect()
    }

    /// Elementwise sum; both sets must share grid partitioning.
    pub fn add_assign(&mut self, other: &FieldSet) -> TremorResult<()> {
        if self.layout() != other.layout() {
            return Err(TremorError::Solver(
                "cannot sum field sets with different layouts".to_string(),
            ));
        }
        for (name, parts) in self.fields.iter_mut() {
            let other_parts = &other.fields[name];
            for (part, other_part) in parts.iter_mut().zip(other_parts) {
                for (v, o) in part.iter_mut().zip(other_part) {
                    *v += o;
                }
            }
        }
        Ok(())
    }
}

/// Trait for solver storage backends.
///
/// `merge` flattens a field set into one vector (parameters in sorted
/// order, partitions in index order); `split` reverses the most recent
/// merge layout. `exists` answers location preconditions — the backend
/// owns the storage, so only it can.
pub trait SolverBackend: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    /// Sum the per-source field sets under `input` into `output`.
    fn combine(&self, input: &Path, output: &Path, parameters: &[String]) -> TremorResult<()>;

    /// Smooth the field set at `input` into `output` with the given
    /// spatial span.
    fn smooth(
        &self,
        input: &Path,
        output: &Path,
        parameters: &[String],
        span: f64,
    ) -> TremorResult<()>;

    /// Load the field set stored at `path`. `suffix` names the storage
    /// convention for the files ("_kernel" for kernel quantities).
    fn load(&self, path: &Path, suffix: &str) -> TremorResult<FieldSet>;

    /// Persist `fields` (restricted to `parameters`) at `path`.
    fn save(
        &self,
        fields: &FieldSet,
        path: &Path,
        parameters: &[String],
        suffix: &str,
    ) -> TremorResult<()>;

    /// Flatten into a single vector for elementwise arithmetic.
    fn merge(&self, fields: &FieldSet) -> Vec<f64>;

    /// Rebuild a field set from a flat vector with the layout of the
    /// most recent `merge`.
    fn split(&self, vector: &[f64]) -> TremorResult<FieldSet>;
}

/// In-memory solver backend.
///
/// Field sets are keyed by location; `suffix` is a format detail the
/// in-memory store does not need. `smooth` copies its input unchanged
/// (identity smoothing) — span handling belongs to the real solver.
/// Every delegated call is appended to an operation log so tests can
/// assert what was and was not invoked.
#[derive(Default)]
pub struct InMemorySolver {
    store: Mutex<BTreeMap<PathBuf, FieldSet>>,
    merge_layout: Mutex<Option<Vec<(String, Vec<usize>)>>>,
    op_log: Mutex<Vec<String>>,
}

impl InMemorySolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a field set at a location.
    pub fn insert(&self, path: impl Into<PathBuf>, fields: FieldSet) {
        self.store.lock().insert(path.into(), fields);
    }

    /// Read back a stored field set (test assertions).
    pub fn fields_at(&self, path: &Path) -> Option<FieldSet> {
        self.store.lock().get(path).cloned()
    }

    /// Names of delegated operations, in call order.
    pub fn ops(&self) -> Vec<String> {
        self.op_log.lock().clone()
    }

    fn log_op(&self, op: &str) {
        self.op_log.lock().push(op.to_string());
    }
}

impl SolverBackend for InMemorySolver {
    fn exists(&self, path: &Path) -> bool {
        self.store
            .lock()
            .keys()
            .any(|k| k == path || k.starts_with(path))
    }

    fn combine(&self, input: &Path, output: &Path, parameters: &[String]) -> TremorResult<()> {
        self.log_op("combine");
        let store = self.store.lock();
        // Direct children of `input` are per-source kernels; previously
        // written aggregates are never summed back in.
        let mut sum: Option<FieldSet> = None;
        for (path, fields) in store.iter() {
            if path.parent() != Some(input) {
                continue;
            }
            if matches!(
                path.file_name().and_then(|n| n.to_str()),
                Some("sum") | Some("sum_nosmooth")
            ) {
                continue;
            }
            let selected = fields.select(parameters)?;
            match sum.as_mut() {
                None => sum = Some(selected),
                Some(total) => total.add_assign(&selected)?,
            }
        }
        let sum = sum.ok_or_else(|| {
            TremorError::Solver(format!("no kernels to combine under {}", input.display()))
        })?;
        drop(store);
        self.store.lock().insert(output.to_path_buf(), sum);
        Ok(())
    }

    fn smooth(
        &self,
        input: &Path,
        output: &Path,
        parameters: &[String],
        _span: f64,
    ) -> TremorResult<()> {
        self.log_op("smooth");
        let fields = self
            .store
            .lock()
            .get(input)
            .cloned()
            .ok_or_else(|| TremorError::PathNotFound(input.to_path_buf()))?;
        let selected = fields.select(parameters)?;
        self.store.lock().insert(output.to_path_buf(), selected);
        Ok(())
    }

    fn load(&self, path: &Path, _suffix: &str) -> TremorResult<FieldSet> {
        self.log_op("load");
        self.store
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| TremorError::PathNotFound(path.to_path_buf()))
    }

    fn save(
        &self,
        fields: &FieldSet,
        path: &Path,
        parameters: &[String],
        _suffix: &str,
    ) -> TremorResult<()> {
        self.log_op("save");
        let selected = fields.select(parameters)?;
        self.store.lock().insert(path.to_path_buf(), selected);
        Ok(())
    }

    fn merge(&self, fields: &FieldSet) -> Vec<f64> {
        *self.merge_layout.lock() = Some(fields.layout());
        let mut flat = Vec::new();
        for partitions in fields.fields.values() {
            for part in partitions {
                flat.extend_from_slice(part);
            }
        }
        flat
    }

    fn split(&self, vector: &[f64]) -> TremorResult<FieldSet> {
        let layout = self.merge_layout.lock().clone().ok_or_else(|| {
            TremorError::Solver("split called before any merge set a layout".to_string())
        })?;
        let total: usize = layout
            .iter()
            .map(|(_, parts)| parts.iter().sum::<usize>())
            .sum();
        if vector.len() != total {
            return Err(TremorError::Solver(format!(
                "vector has {} entries, layout expects {total}",
                vector.len()
            )));
        }
        let mut fields = FieldSet::new();
        let mut offset = 0;
        for (name, part_lens) in layout {
            let mut partitions = Vec::with_capacity(part_lens.len());
            for len in part_lens {
                partitions.push(vector[offset..offset + len].to_vec());
                offset += len;
            }
            fields.insert(name, partitions);
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(parameter: &str, values: &[f64]) -> FieldSet {
        let mut f = FieldSet::new();
        f.insert(parameter, vec![values.to_vec()]);
        f
    }

    #[test]
    fn test_exists_prefix() {
        let solver = InMemorySolver::new();
        solver.insert("/run/kernels/000000", field("vp", &[1.0]));
        assert!(solver.exists(Path::new("/run/kernels")));
        assert!(solver.exists(Path::new("/run/kernels/000000")));
        assert!(!solver.exists(Path::new("/run/gradient")));
    }

    #[test]
    fn test_combine_sums_children() {
        let solver = InMemorySolver::new();
        solver.insert("/run/kernels/000000", field("vp", &[1.0, 2.0]));
        solver.insert("/run/kernels/000001", field("vp", &[3.0, -1.0]));
        solver
            .combine(
                Path::new("/run/kernels"),
                Path::new("/run/kernels/sum"),
                &["vp".to_string()],
            )
            .unwrap();
        let sum = solver.fields_at(Path::new("/run/kernels/sum")).unwrap();
        assert_eq!(sum.get("vp").unwrap(), &vec![vec![4.0, 1.0]]);
    }

    #[test]
    fn test_combine_skips_previous_aggregates() {
        let solver = InMemorySolver::new();
        solver.insert("/run/kernels/000000", field("vp", &[1.0]));
        solver.insert("/run/kernels/sum", field("vp", &[99.0]));
        solver.insert("/run/kernels/sum_nosmooth", field("vp", &[77.0]));
        solver
            .combine(
                Path::new("/run/kernels"),
                Path::new("/run/kernels/sum"),
                &["vp".to_string()],
            )
            .unwrap();
        let sum = solver.fields_at(Path::new("/run/kernels/sum")).unwrap();
        assert_eq!(sum.get("vp").unwrap(), &vec![vec![1.0]]);
    }

    #[test]
    fn test_combine_restricts_parameters() {
        let solver = InMemorySolver::new();
        let mut f = FieldSet::new();
        f.insert("vp", vec![vec![1.0]]);
        f.insert("vs", vec![vec![2.0]]);
        solver.insert("/run/kernels/000000", f);
        solver
            .combine(
                Path::new("/run/kernels"),
                Path::new("/run/kernels/sum"),
                &["vp".to_string()],
            )
            .unwrap();
        let sum = solver.fields_at(Path::new("/run/kernels/sum")).unwrap();
        assert!(sum.get("vp").is_some());
        assert!(sum.get("vs").is_none());
    }

    #[test]
    fn test_combine_empty_errors() {
        let solver = InMemorySolver::new();
        assert!(solver
            .combine(
                Path::new("/run/kernels"),
                Path::new("/run/kernels/sum"),
                &["vp".to_string()],
            )
            .is_err());
    }

    #[test]
    fn test_merge_split_round_trip() {
        let solver = InMemorySolver::new();
        let mut f = FieldSet::new();
        f.insert("vp", vec![vec![1.0, 2.0], vec![3.0]]);
        f.insert("vs", vec![vec![4.0, 5.0], vec![6.0]]);
        let flat = solver.merge(&f);
        assert_eq!(flat, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let rebuilt = solver.split(&flat).unwrap();
        assert_eq!(rebuilt, f);
    }

    #[test]
    fn test_split_without_merge_errors() {
        let solver = InMemorySolver::new();
        assert!(solver.split(&[1.0]).is_err());
    }

    #[test]
    fn test_split_length_mismatch_errors() {
        let solver = InMemorySolver::new();
        solver.merge(&field("vp", &[1.0, 2.0]));
        assert!(solver.split(&[1.0]).is_err());
    }

    #[test]
    fn test_add_assign_layout_mismatch() {
        let mut a = field("vp", &[1.0, 2.0]);
        let b = field("vp", &[1.0]);
        assert!(a.add_assign(&b).is_err());
    }

    #[test]
    fn test_smooth_is_identity_in_memory() {
        let solver = InMemorySolver::new();
        solver.insert("/run/sum_nosmooth", field("vp", &[1.5]));
        solver
            .smooth(
                Path::new("/run/sum_nosmooth"),
                Path::new("/run/sum"),
                &["vp".to_string()],
                5000.0,
            )
            .unwrap();
        assert_eq!(
            solver.fields_at(Path::new("/run/sum")).unwrap(),
            field("vp", &[1.5])
        );
    }

    #[test]
    fn test_op_log_records_calls() {
        let solver = InMemorySolver::new();
        solver.insert("/run/kernels/000000", field("vp", &[1.0]));
        solver
            .combine(
                Path::new("/run/kernels"),
                Path::new("/run/kernels/sum"),
                &["vp".to_string()],
            )
            .unwrap();
        solver.load(Path::new("/run/kernels/sum"), "_kernel").unwrap();
        assert_eq!(solver.ops(), vec!["combine".to_string(), "load".to_string()]);
    }
}
