// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Error taxonomy for the gateway.
//!
//! One [`GatewayError`] variant per error kind in the contract; internal
//! components return `Result<_, GatewayError>` rather than panicking.
//! Denials and escalations are *not* errors — they are ordinary verdicts — so
//! this enum only covers genuine failure: malformed input, unknown ids, and
//! ledger tamper detection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request field `{field}`: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("unknown proof record id `{0}`")]
    UnknownProofId(String),

    #[error("ledger integrity check failed: {0}")]
    LedgerIntegrity(String),

    #[error("config error: {0}")]
    Config(#[from] crate::config_loader::ConfigError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code, used in the `{error_code, field, message}`
    /// body shape for 400s.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest { .. } => "invalid_request",
            GatewayError::UnknownProofId(_) => "unknown_id",
            GatewayError::LedgerIntegrity(_) => "ledger_integrity",
            GatewayError::Config(_) => "config_error",
            GatewayError::Internal(_) => "internal_error",
        }
    }
}
