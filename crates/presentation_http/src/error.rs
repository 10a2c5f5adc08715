//! API error handling
//!
//! Maps engine outcomes and admin failures onto JSON error bodies. Chaos
//! cancellations become 504 so clients see them as a gateway giving up;
//! upstream failures become 502.

use application::{ApplicationError, ChaosError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::{ChaosStrategy, DomainError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Request dropped by {strategy} after {delayed_by_secs}s")]
    ChaosDropped {
        strategy: ChaosStrategy,
        delayed_by_secs: u64,
    },

    #[error("Chaos delay interrupted during {strategy}")]
    ChaosInterrupted { strategy: ChaosStrategy },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ChaosDropped { .. } | Self::ChaosInterrupted { .. } => {
                StatusCode::GATEWAY_TIMEOUT
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::BadGateway(_) => "upstream_error",
            Self::ChaosDropped { .. } => "chaos_dropped",
            Self::ChaosInterrupted { .. } => "chaos_interrupted",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();
        let (error, details) = match self {
            Self::BadRequest(msg) => (msg, None),
            Self::BadGateway(msg) => ("Upstream request failed".to_string(), Some(msg)),
            Self::ChaosDropped {
                strategy,
                delayed_by_secs,
            } => (
                "Request dropped by chaos".to_string(),
                Some(format!("{strategy} after {delayed_by_secs}s")),
            ),
            Self::ChaosInterrupted { strategy } => (
                "Chaos delay interrupted".to_string(),
                Some(strategy.to_string()),
            ),
            Self::Internal(msg) => ("An internal error occurred".to_string(), Some(msg)),
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code,
                details,
            }),
        )
            .into_response()
    }
}

impl From<ChaosError> for ApiError {
    fn from(err: ChaosError) -> Self {
        match err {
            ChaosError::Dropped {
                strategy,
                delayed_by_secs,
            } => Self::ChaosDropped {
                strategy,
                delayed_by_secs,
            },
            ChaosError::Interrupted { strategy } => Self::ChaosInterrupted { strategy },
            ChaosError::Upstream(e) => Self::BadGateway(e.to_string()),
            ChaosError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::ExternalService(msg) => Self::BadGateway(msg),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
