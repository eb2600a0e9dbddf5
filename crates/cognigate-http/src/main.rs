// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Binary entry point for the cognigate gateway HTTP surface.
//!
//! Initializes a `tracing_subscriber` registry, builds the `axum::Router`
//! with a `TraceLayer`, and serves it under `tokio::main`.

use std::sync::Arc;

use cognigate_core::config_loader::load_config_from_env;
use cognigate_core::{Gateway, GatewayConfig};
use cognigate_http::{router, AppState};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match load_config_from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(%error, "falling back to default config");
            GatewayConfig::default()
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        gateway: Arc::new(Gateway::new(config)),
    };

    let app = router(state).layer(TraceLayer::new_for_http());

    tracing::info!(%bind_addr, "cognigate gateway listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind HTTP listener");
    axum::serve(listener, app)
        .await
        .expect("HTTP server error");
}
