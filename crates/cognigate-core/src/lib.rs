// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! # cognigate-core
//!
//! Defense-in-depth governance pipeline for AI agents.
//!
//! ## Architecture
//!
//! ```text
//! Gateway
//!   ├── TripwireMatcher   — layer-1 pattern match on raw goal text (C1)
//!   ├── planner           — keyword-driven Plan construction (C4)
//!   ├── CriticProvider    — adversarial second opinion (C5)
//!   ├── TrustRegistry     — per-entity score/level/ceiling (C6)
//!   ├── VelocityLimiter   — per-entity multi-window rate limits (C2)
//!   ├── CircuitBreaker    — system-wide and per-entity halts (C3)
//!   ├── policy catalog    — static policies evaluated under a rigor mode (C7)
//!   ├── ResultCache       — bounded, TTL-expiring verdict memoization (C8)
//!   └── ProofLedger       — append-only, hash-chained audit trail (C9)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use cognigate_core::{Gateway, GatewayConfig};
//! use cognigate_core::types::IntentRequest;
//!
//! let gateway = Gateway::new(GatewayConfig::default());
//!
//! let response = gateway.intent(IntentRequest {
//!     entity_id: "agent-001".to_string(),
//!     goal: "send a status update email".to_string(),
//! });
//! assert_eq!(response.status, cognigate_core::types::IntentStatus::Normalized);
//! ```

pub mod cache;
pub mod circuit;
pub mod config;
pub mod config_loader;
pub mod critic;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod ledger;
pub mod planner;
pub mod policy;
pub mod trust;
pub mod tripwire;
pub mod types;
pub mod velocity;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::Gateway;
