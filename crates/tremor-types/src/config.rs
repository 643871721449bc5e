// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Postprocess Configuration
// ─────────────────────────────────────────────────────────────────────

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{TremorError, TremorResult};

/// Runtime configuration for kernel aggregation and gradient assembly.
///
/// Contains only the parameters the postprocess stage needs. Everything
/// else (solver paths, acquisition geometry, optimizer settings) stays
/// with the outer driver; this is the subset that crosses into the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostprocessConfig {
    /// Smoothing span (spatial length scale) applied to the summed
    /// kernel. 0.0 disables smoothing entirely. Default: 0.0.
    pub smooth_span: f64,

    /// Optional mask location. When set, the gradient is written twice:
    /// unmasked under "gradient_nomask" and masked under "gradient".
    /// Default: None (masking disabled).
    pub mask_path: Option<PathBuf>,

    /// Initial-model location; source of the per-partition grid-geometry
    /// sidecar files required by the smoothing operator. Only consulted
    /// when `smooth_span > 0`.
    pub model_init: Option<PathBuf>,

    /// Number of spatial partitions (one geometry sidecar set each).
    /// Default: 1.
    pub nproc: usize,

    /// Material-parameter names the kernels are defined over,
    /// e.g. ["vp", "vs"].
    pub parameters: Vec<String>,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            smooth_span: 0.0,
            mask_path: None,
            model_init: None,
            nproc: 1,
            parameters: Vec::new(),
        }
    }
}

impl PostprocessConfig {
    /// Validate configuration once at startup.
    ///
    /// Location preconditions (mask, initial model) are checked here,
    /// before any kernel work begins, never ad hoc per call.
    pub fn validate(&self) -> TremorResult<()> {
        if !self.smooth_span.is_finite() || self.smooth_span < 0.0 {
            return Err(TremorError::Config(format!(
                "smooth_span must be finite and >= 0, got {}",
                self.smooth_span
            )));
        }
        if self.nproc == 0 {
            return Err(TremorError::Config("nproc must be >= 1".to_string()));
        }
        if self.parameters.is_empty() {
            return Err(TremorError::Config(
                "parameters must name at least one material parameter".to_string(),
            ));
        }
        if let Some(mask) = &self.mask_path {
            if !mask.exists() {
                return Err(TremorError::PathNotFound(mask.clone()));
            }
        }
        if self.smooth_span > 0.0 {
            match &self.model_init {
                None => {
                    return Err(TremorError::Config(
                        "smooth_span > 0 requires model_init for grid geometry".to_string(),
                    ))
                }
                Some(model) if !model.exists() => {
                    return Err(TremorError::PathNotFound(model.clone()))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> TremorResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| TremorError::Config(format!("JSON parse error: {e}")))
    }
}
