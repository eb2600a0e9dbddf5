// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

use std::sync::Arc;

use cognigate_core::Gateway;

/// Shared application state. One [`Gateway`] per process, constructed once
/// at startup and handed to every handler via `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}
