use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

pub type ComplianceResult<T> = Result<T, ComplianceError>;

#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Rule store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed rule parameters: {0}")]
    RuleData(#[from] RuleDataError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a stored rule payload could not be turned into a typed rule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleDataError {
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("threshold must be a non-negative number")]
    InvalidThreshold,

    #[error("weight must be a finite non-negative number")]
    InvalidWeight,

    #[error("sanctions list is empty")]
    EmptyIdentifierList,

    #[error("rule type '{0}' has no evaluator")]
    UnsupportedType(String),
}

/// Failures of the external fraud oracle. The pipeline absorbs all of them,
/// so this type has no `ComplianceError` counterpart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FraudScorerError {
    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FraudScorerError {
    /// Metric label.
    pub fn cause(&self) -> &'static str {
        match self {
            FraudScorerError::Timeout => "timeout",
            FraudScorerError::Transport(_) => "transport",
            FraudScorerError::Status(_) => "status",
            FraudScorerError::Malformed(_) => "malformed",
        }
    }
}

impl ComplianceError {
    fn code(&self) -> &'static str {
        match self {
            ComplianceError::Database(_) => "DATABASE_ERROR",
            ComplianceError::Store(_) => "STORE_ERROR",
            ComplianceError::Configuration(_) => "CONFIGURATION_ERROR",
            ComplianceError::Validation(_) => "VALIDATION_ERROR",
            ComplianceError::RuleData(_) => "INVALID_RULE_PARAMETERS",
            ComplianceError::NotFound(_) => "NOT_FOUND",
            ComplianceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ComplianceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ComplianceError::Validation(_) | ComplianceError::RuleData(_) => StatusCode::BAD_REQUEST,
            ComplianceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string()
        }))
    }
}
