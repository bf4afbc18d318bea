use crate::ephemeris::types::{BodyId, HouseSystem};
use thiserror::Error;

/// Errors surfaced by the calculation layer.
///
/// Only `InvalidInput`, `CalculationFailed` and `Cancelled` normally reach a
/// caller. `EngineUnavailable` and `HouseUnavailable` are produced by
/// providers and recovered inside the engine (analytic mode, whole-sign
/// houses); they escape only when a provider is used directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstroError {
    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },
    #[error("ephemeris engine unavailable: {0}")]
    EngineUnavailable(String),
    #[error("houses unavailable for {system} at latitude {latitude}: {reason}")]
    HouseUnavailable {
        system: HouseSystem,
        latitude: f64,
        reason: String,
    },
    #[error("failed to calculate {body} at JD {jd_ut}: {message}")]
    CalculationFailed {
        body: BodyId,
        jd_ut: f64,
        message: String,
    },
    #[error("calculation cancelled")]
    Cancelled,
}

impl AstroError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AstroError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Stable code for the API boundary.
    pub fn code(&self) -> &'static str {
        match self {
            AstroError::InvalidInput { .. } => "INVALID_INPUT",
            AstroError::EngineUnavailable(_) => "EPHEMERIS_UNAVAILABLE",
            AstroError::HouseUnavailable { .. } => "HOUSES_UNAVAILABLE",
            AstroError::CalculationFailed { .. } => "CALCULATION_ERROR",
            AstroError::Cancelled => "CANCELLED",
        }
    }

    /// True when the caller supplied bad input, as opposed to an engine-side
    /// limitation.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AstroError::InvalidInput { .. })
    }
}
