//! Oracle access errors.

use crate::error::{ErrorSeverity, GameplayError};

/// Errors that occur when accessing oracle data.
///
/// A missing oracle means the host never wired the collaborator, so these are
/// fatal for the operation that needed it. Misses on individual entries are
/// reported by the caller with its own context.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// EffectOracle is not available in the environment.
    #[error("EffectOracle not available")]
    EffectsNotAvailable,

    /// CurveOracle is not available in the environment.
    #[error("CurveOracle not available")]
    CurvesNotAvailable,
}

impl GameplayError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            OracleError::EffectsNotAvailable => "ORACLE_EFFECTS_NOT_AVAILABLE",
            OracleError::CurvesNotAvailable => "ORACLE_CURVES_NOT_AVAILABLE",
        }
    }
}
