// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! The one place that maps a [`cognigate_core::GatewayError`] (or a simple
//! not-found condition) to an HTTP status code and JSON body, per §10.2:
//! "the HTTP layer owns the one place that maps `GatewayError` to a status
//! code and JSON body".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cognigate_core::GatewayError;
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error_code: &'static str,
    pub message: String,
}

pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody {
                error_code: "unknown_id",
                message: message.into(),
            },
        }
    }

    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error_code: "invalid_request",
                message: format!("{field}: {}", message.into()),
            },
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let status = match &error {
            GatewayError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            GatewayError::UnknownProofId(_) => StatusCode::NOT_FOUND,
            GatewayError::LedgerIntegrity(_) | GatewayError::Config(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError {
            status,
            body: ErrorBody {
                error_code: error.error_code(),
                message: error.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
