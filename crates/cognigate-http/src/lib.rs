// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Library surface of the cognigate HTTP gateway, split out from the binary
//! so integration tests can drive the `axum::Router` directly via
//! `tower::ServiceExt::oneshot` without going through a bound socket.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
