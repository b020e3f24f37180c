//! Error types.
//!
//! Two layers:
//!
//! - [`EngineError`]: typed failures of the series engine. Callers (the CLI, or a
//!   collector that publishes a degraded status) match on the variant.
//! - [`AppError`]: what the binary reports, carrying a process exit code.

use thiserror::Error;

/// Failures raised while assembling a series.
///
/// None of these are retried by the engine; they propagate to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No raw records were supplied, so no calendar can be established.
    #[error("raw input is empty; cannot establish a calendar")]
    EmptyInput,

    /// A configured field name does not exist on the record type.
    #[error("unknown field '{field}'")]
    MissingField { field: String },

    /// Insufficient or degenerate history for a regression fit.
    #[error("cannot project '{metric}': {reason}")]
    ProjectionInput { metric: String, reason: String },
}

impl EngineError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn projection_input(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProjectionInput {
            metric: metric.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let exit_code = match err {
            EngineError::EmptyInput | EngineError::MissingField { .. } => 2,
            EngineError::ProjectionInput { .. } => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
