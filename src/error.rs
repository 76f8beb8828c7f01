//! Error types for the returns engine

use thiserror::Error;

/// Errors surfaced by engine entry points
///
/// Missing or short data (empty NAV series, no investments) is not an error:
/// those paths return zeroed results instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("investment {id} not found for scheme {scheme_code}")]
    InvestmentNotFound { scheme_code: u32, id: String },

    #[error("investment {id} already exists for scheme {scheme_code}")]
    DuplicateInvestment { scheme_code: u32, id: String },

    #[error("investment {0} is not a SIP")]
    NotASip(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
