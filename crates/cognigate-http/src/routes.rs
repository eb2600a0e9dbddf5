// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Route handlers for the `/v1` surface: each handler pulls the shared
//! [`AppState`] via an axum `State` extractor and exchanges typed `Json<T>`
//! bodies with the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use cognigate_core::types::{
    EnforceRequest, EnforceVerdict, IntentRequest, IntentResponse, Policy, ProofQuery, ProofRecord,
    ProofStats, ProofVerification,
};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/intent", post(intent))
        .route("/v1/enforce", post(enforce))
        .route("/v1/enforce/policies", get(list_policies))
        .route("/v1/proof", post(record_proof))
        .route("/v1/proof/:id", get(get_proof))
        .route("/v1/proof/:id/verify", get(verify_proof))
        .route("/v1/proof/query", post(query_proof))
        .route("/v1/proof/stats", get(proof_stats))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody { status: "ok" })
}

async fn ready() -> Json<StatusBody> {
    Json(StatusBody { status: "ready" })
}

async fn intent(
    State(state): State<AppState>,
    Json(request): Json<IntentRequest>,
) -> Json<IntentResponse> {
    Json(state.gateway.intent(request))
}

async fn enforce(
    State(state): State<AppState>,
    Json(request): Json<EnforceRequest>,
) -> Json<EnforceVerdict> {
    Json(state.gateway.enforce(request))
}

#[derive(Serialize)]
struct PolicyListBody {
    policies: Vec<Policy>,
}

async fn list_policies(State(state): State<AppState>) -> Json<PolicyListBody> {
    Json(PolicyListBody {
        policies: state.gateway.policy_catalog().to_vec(),
    })
}

#[derive(serde::Deserialize)]
struct RecordProofRequest {
    entity_id: String,
    verdict: EnforceVerdict,
}

async fn record_proof(
    State(state): State<AppState>,
    Json(request): Json<RecordProofRequest>,
) -> Json<ProofRecord> {
    Json(state.gateway.record_proof(&request.verdict, &request.entity_id))
}

async fn get_proof(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProofRecord>, ApiError> {
    state
        .gateway
        .get_proof(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no proof record with id {id}")))
}

async fn verify_proof(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProofVerification>, ApiError> {
    state
        .gateway
        .verify_proof(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no proof record with id {id}")))
}

async fn query_proof(
    State(state): State<AppState>,
    Json(query): Json<ProofQuery>,
) -> Json<Vec<ProofRecord>> {
    Json(state.gateway.query_proofs(&query))
}

async fn proof_stats(State(state): State<AppState>) -> Json<ProofStats> {
    Json(state.gateway.proof_stats())
}

#[allow(dead_code)]
fn method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}
