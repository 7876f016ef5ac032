// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Management API error types and error response payloads

use crate::catalog::CatalogError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Error detail returned to HTTP callers
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Stable error code identifier
    pub error_code: String,
    pub message: String,
}

/// Error response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// Feature disabled or coordination store unreachable
    #[error("{message}")]
    ServiceUnavailable { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::Validation(_) => Self::BadRequest { message },
            CatalogError::Configuration(_) => Self::ServiceUnavailable { message },
            CatalogError::Store(StoreError::NoNode(_)) => Self::NotFound { message },
            CatalogError::Store(StoreError::InvalidPath(_)) => Self::BadRequest { message },
            CatalogError::Store(StoreError::ConnectionLoss(_)) => {
                Self::ServiceUnavailable { message }
            }
            CatalogError::Store(StoreError::Backend(_))
            | CatalogError::Decode(_)
            | CatalogError::Connector(_)
            | CatalogError::Announcement(_)
            | CatalogError::WatchTerminated(_) => Self::Internal { message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("Management request failed: {}", self);
        }
        let payload = ApiErrorResponse {
            error: ApiErrorDetail {
                error_code: self.error_code().to_string(),
                message: self.to_string(),
            },
        };
        (status, axum::Json(payload)).into_response()
    }
}

/// Result type for management API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_map_to_status_codes() {
        let cases = [
            (CatalogError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (CatalogError::Configuration("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (CatalogError::Store(StoreError::NoNode("x".into())), StatusCode::NOT_FOUND),
            (
                CatalogError::Store(StoreError::ConnectionLoss("x".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CatalogError::Decode("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
