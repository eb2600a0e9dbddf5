// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Shared data types used across the governance pipeline.
//!
//! Every field named in the data model is represented here as a typed struct
//! or enum — no free-form dynamic maps stand in for a plan, verdict, or proof
//! record. All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so they round-trip through the HTTP surface and the
//! proof ledger without ad hoc conversion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{generate_id, CRITIC_PREFIX, INTENT_PREFIX, PLAN_PREFIX, PROOF_PREFIX, VERDICT_PREFIX};

fn now() -> DateTime<Utc> {
    Utc::now()
}

// ---------------------------------------------------------------------------
// Trust
// ---------------------------------------------------------------------------

/// Five-band trust level derived from a 0-1000 score.
///
/// ```rust
/// use cognigate_core::types::TrustLevel;
/// assert_eq!(TrustLevel::from_score(250), TrustLevel::Provisional);
/// assert!(TrustLevel::Verified > TrustLevel::Trusted);
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrustLevel {
    Untrusted = 0,
    Provisional = 1,
    Trusted = 2,
    Verified = 3,
    Privileged = 4,
}

impl TrustLevel {
    /// Derive the band containing `score` (clamped to `[0, 1000]`).
    pub fn from_score(score: u32) -> Self {
        match score.min(1000) {
            0..=199 => TrustLevel::Untrusted,
            200..=399 => TrustLevel::Provisional,
            400..=599 => TrustLevel::Trusted,
            600..=799 => TrustLevel::Verified,
            _ => TrustLevel::Privileged,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TrustLevel::Untrusted),
            1 => Some(TrustLevel::Provisional),
            2 => Some(TrustLevel::Trusted),
            3 => Some(TrustLevel::Verified),
            4 => Some(TrustLevel::Privileged),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Observation tier: how much insight the gateway has into an entity's
/// internals. Imposes a hard ceiling on the reachable trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationTier {
    BlackBox,
    GrayBox,
    WhiteBox,
    Attested,
    Verified,
}

impl ObservationTier {
    /// Ceiling as a fraction of the 0-1000 scale.
    pub fn ceiling_fraction(self) -> f64 {
        match self {
            ObservationTier::BlackBox => 0.60,
            ObservationTier::GrayBox => 0.75,
            ObservationTier::WhiteBox => 0.90,
            ObservationTier::Attested => 0.95,
            ObservationTier::Verified => 1.00,
        }
    }

    pub fn ceiling_score(self) -> u32 {
        (self.ceiling_fraction() * 1000.0) as u32
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Structured, immutable representation of an agent's intent.
///
/// Produced by the planner (§4.4) and optionally augmented by the critic
/// (§4.5); augmentation produces a new `Plan` value rather than mutating one
/// in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default = "default_plan_id")]
    pub plan_id: String,
    pub goal: String,
    #[serde(default)]
    pub tools_required: Vec<String>,
    #[serde(default)]
    pub endpoints_required: Vec<String>,
    #[serde(default)]
    pub data_classifications: Vec<String>,
    #[serde(default)]
    pub risk_indicators: BTreeMap<String, f64>,
    pub risk_score: f64,
    pub reasoning_trace: String,
}

fn default_plan_id() -> String {
    generate_id(PLAN_PREFIX)
}

impl Plan {
    pub fn tool(&self, name: &str) -> bool {
        self.tools_required.iter().any(|t| t == name)
    }

    pub fn has_data_class_prefix(&self, prefix: &str) -> bool {
        self.data_classifications.iter().any(|d| d.starts_with(prefix))
    }

    pub fn has_data_class(&self, tag: &str) -> bool {
        self.data_classifications.iter().any(|d| d == tag)
    }
}

// ---------------------------------------------------------------------------
// Critic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    Safe,
    Suspicious,
    Dangerous,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Proceed,
    Escalate,
    Block,
    Modify,
}

/// The critic's adversarial assessment of a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticVerdict {
    #[serde(default = "default_critic_id")]
    pub critic_id: String,
    pub plan_id: String,
    pub judgment: Judgment,
    pub confidence: f64,
    #[serde(default)]
    pub risk_adjustment: f64,
    #[serde(default)]
    pub hidden_risks: Vec<String>,
    pub reasoning: String,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub requires_human_review: bool,
    #[serde(default = "default_recommended_action")]
    pub recommended_action: RecommendedAction,
    pub model_used: String,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    pub duration_ms: Option<f64>,
}

fn default_critic_id() -> String {
    generate_id(CRITIC_PREFIX)
}

fn default_recommended_action() -> RecommendedAction {
    RecommendedAction::Proceed
}

/// Request carried into a critic provider's `analyze` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticRequest {
    pub plan_id: String,
    pub goal: String,
    pub planner_risk_score: f64,
    pub planner_reasoning: String,
    #[serde(default)]
    pub tools_required: Vec<String>,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Policy / constraints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A typed predicate over a plan's attributes and the caller's trust level.
///
/// This replaces the source's free-text `"X in condition"` substring
/// matching with a closed enum covering exactly the condition set required
/// by the baseline policy catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Condition {
    ToolPresent { tool: String },
    ToolPresentBelowTrust { tool: String, trust_level: TrustLevel },
    DataClassPresent { tag: String },
    DataClassPrefixBelowTrust { prefix: String, trust_level: TrustLevel },
    RiskScoreAbove { threshold: f64 },
    RiskScoreAboveBelowTrust { threshold: f64, trust_level: TrustLevel },
}

impl Condition {
    /// Evaluate this condition against a plan and the caller's trust level.
    pub fn evaluate(&self, plan: &Plan, trust_level: TrustLevel) -> bool {
        match self {
            Condition::ToolPresent { tool } => plan.tool(tool),
            Condition::ToolPresentBelowTrust { tool, trust_level: below } => {
                plan.tool(tool) && trust_level < *below
            }
            Condition::DataClassPresent { tag } => plan.has_data_class(tag),
            Condition::DataClassPrefixBelowTrust { prefix, trust_level: below } => {
                plan.has_data_class_prefix(prefix) && trust_level < *below
            }
            Condition::RiskScoreAbove { threshold } => plan.risk_score > *threshold,
            Condition::RiskScoreAboveBelowTrust { threshold, trust_level: below } => {
                plan.risk_score > *threshold && trust_level < *below
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub constraint_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub requires_approval: bool,
    pub condition: Condition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub constraints: Vec<Constraint>,
}

/// A specific policy violation surfaced in an [`EnforceVerdict`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub policy_id: String,
    pub constraint_id: Option<String>,
    pub severity: Severity,
    pub message: String,
    pub blocked: bool,
    pub remediation: Option<String>,
}

// ---------------------------------------------------------------------------
// Rigor mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RigorMode {
    Strict,
    Standard,
    Lite,
}

impl RigorMode {
    pub fn for_trust_level(level: TrustLevel) -> Self {
        match level {
            TrustLevel::Untrusted | TrustLevel::Provisional | TrustLevel::Trusted => {
                RigorMode::Strict
            }
            TrustLevel::Verified => RigorMode::Standard,
            TrustLevel::Privileged => RigorMode::Lite,
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict (enforce)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Allow,
    Deny,
    Escalate,
    Modify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforceVerdict {
    #[serde(default = "default_verdict_id")]
    pub verdict_id: String,
    pub intent_id: String,
    pub plan_id: String,
    pub allowed: bool,
    pub action: Action,
    #[serde(default)]
    pub violations: Vec<PolicyViolation>,
    #[serde(default)]
    pub policies_evaluated: Vec<String>,
    pub constraints_evaluated: usize,
    #[serde(default)]
    pub trust_impact: i32,
    #[serde(default)]
    pub requires_approval: bool,
    pub approval_timeout: Option<String>,
    pub rigor_mode: RigorMode,
    #[serde(default)]
    pub modifications: Option<serde_json::Value>,
    #[serde(default = "now")]
    pub decided_at: DateTime<Utc>,
    pub duration_ms: f64,
}

fn default_verdict_id() -> String {
    generate_id(VERDICT_PREFIX)
}

impl EnforceVerdict {
    /// The subset of fields that must be identical for two verdicts to count
    /// as semantically equal, per T5 / R1 — excludes ids, durations, and
    /// wall-clock timestamps.
    pub fn cache_comparable(&self) -> CacheableVerdict {
        CacheableVerdict {
            allowed: self.allowed,
            action: self.action,
            violations: self.violations.clone(),
            policies_evaluated: self.policies_evaluated.clone(),
            constraints_evaluated: self.constraints_evaluated,
            trust_impact: self.trust_impact,
            requires_approval: self.requires_approval,
            approval_timeout: self.approval_timeout.clone(),
            rigor_mode: self.rigor_mode,
            modifications: self.modifications.clone(),
        }
    }
}

/// The cacheable projection of an [`EnforceVerdict`] — excludes
/// `verdict_id`, `duration_ms`, and `decided_at` per §4.8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheableVerdict {
    pub allowed: bool,
    pub action: Action,
    pub violations: Vec<PolicyViolation>,
    pub policies_evaluated: Vec<String>,
    pub constraints_evaluated: usize,
    pub trust_impact: i32,
    pub requires_approval: bool,
    pub approval_timeout: Option<String>,
    pub rigor_mode: RigorMode,
    pub modifications: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    pub entity_id: String,
    pub goal: String,
}

/// Request body for `POST /v1/enforce`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforceRequest {
    pub intent_id: String,
    pub entity_id: String,
    pub plan: Plan,
    #[serde(default)]
    pub rigor_mode: Option<RigorMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Normalized,
    Blocked,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    #[serde(default = "default_intent_id")]
    pub intent_id: String,
    pub entity_id: String,
    pub status: IntentStatus,
    pub plan: Option<Plan>,
    pub trust_level: u8,
    pub trust_score: u32,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    pub error: Option<String>,
}

fn default_intent_id() -> String {
    generate_id(INTENT_PREFIX)
}

// ---------------------------------------------------------------------------
// Proof record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied,
    Escalated,
    Modified,
}

impl From<Action> for Decision {
    fn from(action: Action) -> Self {
        match action {
            Action::Allow => Decision::Allowed,
            Action::Deny => Decision::Denied,
            Action::Escalate => Decision::Escalated,
            Action::Modify => Decision::Modified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRecord {
    pub proof_id: String,
    pub chain_position: u64,
    pub intent_id: String,
    pub verdict_id: String,
    pub entity_id: String,
    pub action_type: String,
    pub decision: Decision,
    pub inputs_hash: String,
    pub outputs_hash: String,
    pub previous_hash: String,
    pub hash: String,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ProofRecord {
    pub fn new_id() -> String {
        generate_id(PROOF_PREFIX)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProofQuery {
    pub entity_id: Option<String>,
    pub intent_id: Option<String>,
    pub verdict_id: Option<String>,
    pub decision: Option<Decision>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default = "default_query_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_query_limit() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofVerification {
    pub proof_id: String,
    pub valid: bool,
    pub chain_valid: bool,
    pub signature_valid: Option<bool>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default = "now")]
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofStats {
    pub total_records: usize,
    pub chain_length: usize,
    pub last_record_at: Option<DateTime<Utc>>,
    pub records_by_decision: BTreeMap<String, usize>,
    pub chain_integrity: bool,
}

// ---------------------------------------------------------------------------
// Velocity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityTier {
    L0Burst,
    L1Sustained,
    L2Hourly,
    L2Daily,
}

impl VelocityTier {
    pub fn label(self) -> &'static str {
        match self {
            VelocityTier::L0Burst => "L0_burst",
            VelocityTier::L1Sustained => "L1_sustained",
            VelocityTier::L2Hourly => "L2_hourly",
            VelocityTier::L2Daily => "L2_daily",
        }
    }
}
