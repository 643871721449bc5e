// ─────────────────────────────────────────────────────────────────────
// Seismic FWI — Misfit Kind Enumeration
// ─────────────────────────────────────────────────────────────────────
//! Closed set of supported misfit criteria. Each variant maps to
//! exactly one generator function in `generators`; dispatch is an
//! exhaustive match, never runtime name resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use tremor_types::{TremorError, TremorResult};

/// Misfit criterion selecting the adjoint-source formula.
///
/// The last three variants are migration-type imaging kernels built
/// from the observed trace alone, with no misfit scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MisfitKind {
    /// Waveform difference (Tromp et al 2005, eq 9).
    Waveform,
    /// Envelope difference (Yuan et al 2015, eq 16).
    Envelope,
    /// Instantaneous phase (Bozdag et al 2011, eq 27).
    InstantaneousPhase,
    /// Cross-correlation traveltime (Tromp et al 2005, eq 45).
    Traveltime,
    /// Traveltime with the collaborator's fast approximate misfit.
    TraveltimeInexact,
    /// Cross-correlation amplitude.
    Amplitude,
    /// Envelope amplitude ratio — deliberately unimplemented.
    Envelope2,
    /// Envelope cross-correlation lag (Yuan et al 2015, eqs B-2, B-5).
    Envelope3,
    /// Regularised instantaneous-phase waterlevel variant.
    InstantaneousPhase2,
    /// Migration: the observed trace itself.
    Displacement,
    /// Migration: centered first difference of the observed trace.
    Velocity,
    /// Migration: centered second difference of the observed trace.
    Acceleration,
}

impl MisfitKind {
    pub const ALL: [MisfitKind; 12] = [
        MisfitKind::Waveform,
        MisfitKind::Envelope,
        MisfitKind::InstantaneousPhase,
        MisfitKind::Traveltime,
        MisfitKind::TraveltimeInexact,
        MisfitKind::Amplitude,
        MisfitKind::Envelope2,
        MisfitKind::Envelope3,
        MisfitKind::InstantaneousPhase2,
        MisfitKind::Displacement,
        MisfitKind::Velocity,
        MisfitKind::Acceleration,
    ];

    /// Default regularization fraction for the variant's waterlevel
    /// denominators. Only Envelope and InstantaneousPhase regularise
    /// by default.
    pub fn default_eps(self) -> f64 {
        match self {
            MisfitKind::Envelope | MisfitKind::InstantaneousPhase => 0.05,
            _ => 0.0,
        }
    }

    /// Whether the generator consumes the external misfit evaluator's
    /// scalar for this variant.
    pub fn uses_misfit_scalar(self) -> bool {
        matches!(
            self,
            MisfitKind::Traveltime
                | MisfitKind::TraveltimeInexact
                | MisfitKind::Amplitude
                | MisfitKind::Envelope3
        )
    }
}

impl fmt::Display for MisfitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MisfitKind::Waveform => "Waveform",
            MisfitKind::Envelope => "Envelope",
            MisfitKind::InstantaneousPhase => "InstantaneousPhase",
            MisfitKind::Traveltime => "Traveltime",
            MisfitKind::TraveltimeInexact => "TraveltimeInexact",
            MisfitKind::Amplitude => "Amplitude",
            MisfitKind::Envelope2 => "Envelope2",
            MisfitKind::Envelope3 => "Envelope3",
            MisfitKind::InstantaneousPhase2 => "InstantaneousPhase2",
            MisfitKind::Displacement => "Displacement",
            MisfitKind::Velocity => "Velocity",
            MisfitKind::Acceleration => "Acceleration",
        };
        write!(f, "{name}")
    }
}

impl FromStr for MisfitKind {
    type Err = TremorError;

    fn from_str(s: &str) -> TremorResult<Self> {
        match s {
            "Waveform" => Ok(MisfitKind::Waveform),
            "Envelope" => Ok(MisfitKind::Envelope),
            "InstantaneousPhase" => Ok(MisfitKind::InstantaneousPhase),
            "Traveltime" => Ok(MisfitKind::Traveltime),
            "TraveltimeInexact" => Ok(MisfitKind::TraveltimeInexact),
            "Amplitude" => Ok(MisfitKind::Amplitude),
            "Envelope2" => Ok(MisfitKind::Envelope2),
            "Envelope3" => Ok(MisfitKind::Envelope3),
            "InstantaneousPhase2" => Ok(MisfitKind::InstantaneousPhase2),
            "Displacement" => Ok(MisfitKind::Displacement),
            "Velocity" => Ok(MisfitKind::Velocity),
            "Acceleration" => Ok(MisfitKind::Acceleration),
            other => Err(TremorError::Validation(format!(
                "unknown misfit kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_round_trip() {
        for kind in MisfitKind::ALL {
            let parsed: MisfitKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("CrossCorrelation".parse::<MisfitKind>().is_err());
        assert!("waveform".parse::<MisfitKind>().is_err());
    }

    #[test]
    fn test_default_eps() {
        assert_eq!(MisfitKind::Envelope.default_eps(), 0.05);
        assert_eq!(MisfitKind::InstantaneousPhase.default_eps(), 0.05);
        assert_eq!(MisfitKind::Envelope3.default_eps(), 0.0);
        assert_eq!(MisfitKind::InstantaneousPhase2.default_eps(), 0.0);
        assert_eq!(MisfitKind::Waveform.default_eps(), 0.0);
    }

    #[test]
    fn test_uses_misfit_scalar() {
        assert!(MisfitKind::Traveltime.uses_misfit_scalar());
        assert!(MisfitKind::TraveltimeInexact.uses_misfit_scalar());
        assert!(MisfitKind::Amplitude.uses_misfit_scalar());
        assert!(MisfitKind::Envelope3.uses_misfit_scalar());
        assert!(!MisfitKind::Waveform.uses_misfit_scalar());
        assert!(!MisfitKind::Displacement.uses_misfit_scalar());
    }
}
