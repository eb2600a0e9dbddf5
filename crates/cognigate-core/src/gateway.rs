// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Orchestrator (C10) — the top-level composition of every protocol
//! component into the two request-scoped flows the HTTP surface exposes.
//!
//! Every step runs a sequential, early-return-but-always-record evaluation:
//! a blocking outcome returns immediately, but any step that observed the
//! request still records it for downstream components (trust, circuit
//! breaker, ledger) before returning. State is not generic over a pluggable
//! storage trait: one concrete `Gateway` value owns every component
//! directly, constructed once at process startup and shared behind the HTTP
//! layer's application state.

use std::time::Instant;

use crate::cache::{CacheKey, ResultCache};
use crate::circuit::{CircuitBreaker, RequestOutcome};
use crate::config::{CriticProvider as ConfiguredCriticProvider, GatewayConfig};
use crate::critic::{self, CriticProvider, MockCritic};
use crate::ledger::{compute_inputs_hash, compute_outputs_hash, ProofLedger};
use crate::planner;
use crate::policy::{self, baseline_catalog, select_policies};
use crate::tripwire::TripwireMatcher;
use crate::trust::TrustRegistry;
use crate::types::{
    Action, CriticRequest, Decision, EnforceRequest, EnforceVerdict, IntentRequest,
    IntentResponse, IntentStatus, Judgment, Policy, ProofQuery, ProofRecord, ProofStats,
    ProofVerification, RigorMode,
};
use crate::velocity::{VelocityCheck, VelocityLimiter};

#[cfg(feature = "http-critic")]
use crate::critic::HttpCritic;

fn build_critic(config: &GatewayConfig) -> Box<dyn CriticProvider> {
    if !config.critic_enabled {
        return Box::new(MockCritic);
    }
    match config.critic_provider {
        ConfiguredCriticProvider::Mock => Box::new(MockCritic),
        #[cfg(feature = "http-critic")]
        _ => match &config.critic_api_key {
            Some(key) => Box::new(
                HttpCritic::new(
                    "https://api.cognigate.internal/v1/critic",
                    key.clone(),
                    "critic-default",
                )
                .with_temperature(config.critic_temperature),
            ),
            None => {
                tracing::warn!("critic provider configured without an api key; falling back to mock");
                Box::new(MockCritic)
            }
        },
        #[cfg(not(feature = "http-critic"))]
        _ => {
            tracing::warn!("http-critic feature disabled; falling back to mock critic");
            Box::new(MockCritic)
        }
    }
}

/// Owns every governance component. Constructed once at process startup.
pub struct Gateway {
    config: GatewayConfig,
    tripwire: TripwireMatcher,
    critic: Box<dyn CriticProvider>,
    trust: TrustRegistry,
    velocity: VelocityLimiter,
    circuit: CircuitBreaker,
    policy_catalog: Vec<Policy>,
    cache: ResultCache,
    ledger: ProofLedger,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        let critic = build_critic(&config);
        let trust = TrustRegistry::new(config.default_trust_score(), config.daily_decay_score());
        let cache = ResultCache::new(config.cache_capacity, config.cache_ttl_seconds);

        Gateway {
            config,
            tripwire: TripwireMatcher::new(),
            critic,
            trust,
            velocity: VelocityLimiter::new(),
            circuit: CircuitBreaker::new(),
            policy_catalog: baseline_catalog(),
            cache,
            ledger: ProofLedger::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn policy_catalog(&self) -> &[Policy] {
        &self.policy_catalog
    }

    // -----------------------------------------------------------------
    // Intent flow: tripwire -> (block or planner) -> (critic iff gate)
    // -----------------------------------------------------------------

    pub fn intent(&self, request: IntentRequest) -> IntentResponse {
        let start = Instant::now();
        let intent_id = crate::ids::generate_id(crate::ids::INTENT_PREFIX);

        let trip = self.tripwire.check(&request.goal);
        if trip.triggered {
            tracing::warn!(
                entity_id = %request.entity_id,
                pattern = trip.pattern_name.as_deref().unwrap_or("unknown"),
                "tripwire_triggered"
            );
            self.circuit.record_request(
                &request.entity_id,
                RequestOutcome {
                    tripwire_triggered: true,
                    ..Default::default()
                },
            );
            return IntentResponse {
                intent_id,
                entity_id: request.entity_id,
                status: IntentStatus::Blocked,
                plan: None,
                trust_level: 0,
                trust_score: 0,
                created_at: chrono::Utc::now(),
                error: trip.message,
            };
        }

        let mut plan = planner::plan_from_goal(&request.goal);

        if critic::needs_review(plan.risk_score, &plan.tools_required) {
            let critic_request = CriticRequest {
                plan_id: plan.plan_id.clone(),
                goal: plan.goal.clone(),
                planner_risk_score: plan.risk_score,
                planner_reasoning: plan.reasoning_trace.clone(),
                tools_required: plan.tools_required.clone(),
                context: serde_json::Map::new(),
            };
            let verdict = critic::review(self.critic.as_ref(), &critic_request);

            plan.risk_score = (plan.risk_score + verdict.risk_adjustment).clamp(0.0, 1.0);
            for hidden_risk in &verdict.hidden_risks {
                plan.risk_indicators.insert(format!("critic_{hidden_risk}"), verdict.confidence);
            }
            let reasoning_summary: String = verdict.reasoning.chars().take(100).collect();
            plan.reasoning_trace = format!(
                "{}; critic judgment={:?}: {}",
                plan.reasoning_trace, verdict.judgment, reasoning_summary
            );

            if verdict.judgment == Judgment::Block {
                tracing::info!(entity_id = %request.entity_id, plan_id = %plan.plan_id, "critic_blocked_plan");
                self.circuit.record_request(
                    &request.entity_id,
                    RequestOutcome {
                        critic_blocked: true,
                        ..Default::default()
                    },
                );
                return IntentResponse {
                    intent_id,
                    entity_id: request.entity_id,
                    status: IntentStatus::Blocked,
                    plan: Some(plan),
                    trust_level: 0,
                    trust_score: 0,
                    created_at: chrono::Utc::now(),
                    error: Some("blocked by adversarial critic review".to_string()),
                };
            }
        }

        let snapshot = self.trust.snapshot(&request.entity_id);
        tracing::debug!(
            entity_id = %request.entity_id,
            plan_id = %plan.plan_id,
            risk_score = plan.risk_score,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "intent_normalized"
        );

        IntentResponse {
            intent_id,
            entity_id: request.entity_id,
            status: IntentStatus::Normalized,
            plan: Some(plan),
            trust_level: snapshot.level.as_u8(),
            trust_score: snapshot.score,
            created_at: chrono::Utc::now(),
            error: None,
        }
    }

    // -----------------------------------------------------------------
    // Enforce flow: circuit.allow -> velocity.check -> rigor -> cache or
    // evaluate -> velocity.record -> circuit.record -> ledger.append
    // -----------------------------------------------------------------

    pub fn enforce(&self, request: EnforceRequest) -> EnforceVerdict {
        let start = Instant::now();
        let verdict_id = crate::ids::generate_id(crate::ids::VERDICT_PREFIX);
        let entity_id = request.entity_id.clone();

        let (circuit_allowed, circuit_reason) = self.circuit.allow_request(&entity_id);
        if !circuit_allowed {
            let outcome = policy::circuit_denial_verdict(&circuit_reason);
            return self.finalize(
                outcome,
                verdict_id,
                request.intent_id,
                request.plan.plan_id.clone(),
                RigorMode::Strict,
                &entity_id,
                start,
                false,
            );
        }

        let snapshot = self.trust.snapshot(&entity_id);
        let rigor_mode = request.rigor_mode.unwrap_or_else(|| RigorMode::for_trust_level(snapshot.level));

        match self.velocity.check(&entity_id, snapshot.level) {
            VelocityCheck::Denied { tier, retry_after_seconds, .. } => {
                let outcome = policy::velocity_denial_verdict(tier.label(), retry_after_seconds);
                self.circuit.record_request(
                    &entity_id,
                    RequestOutcome {
                        risk_score: request.plan.risk_score,
                        velocity_violated: true,
                        ..Default::default()
                    },
                );
                return self.finalize(
                    outcome,
                    verdict_id,
                    request.intent_id,
                    request.plan.plan_id.clone(),
                    RigorMode::Strict,
                    &entity_id,
                    start,
                    false,
                );
            }
            VelocityCheck::Allowed => {}
        }

        if start.elapsed().as_millis() as u64 > self.config.request_deadline_ms {
            tracing::warn!(entity_id = %entity_id, "request_deadline_exceeded");
            let outcome = policy::velocity_denial_verdict("system-timeout", 0.0);
            let mut verdict = outcome.into_verdict(
                verdict_id,
                request.intent_id,
                request.plan.plan_id.clone(),
                rigor_mode,
                start.elapsed().as_secs_f64() * 1000.0,
            );
            verdict.action = Action::Escalate;
            verdict.allowed = false;
            verdict.violations[0].policy_id = "system-timeout".to_string();
            return verdict;
        }

        let selected_ids: Vec<String> =
            select_policies(&self.policy_catalog, rigor_mode).iter().map(|p| p.id.clone()).collect();
        let cache_key = CacheKey::new(&request.plan.plan_id, &selected_ids, snapshot.level, rigor_mode);

        let cached = self.cache.get(&cache_key);
        let (action, allowed, violations, policies_evaluated, constraints_evaluated, trust_impact, requires_approval, approval_timeout, modifications) =
            if let Some(cached) = cached {
                (
                    cached.action,
                    cached.allowed,
                    cached.violations,
                    cached.policies_evaluated,
                    cached.constraints_evaluated,
                    cached.trust_impact,
                    cached.requires_approval,
                    cached.approval_timeout,
                    cached.modifications,
                )
            } else {
                let outcome = policy::evaluate(&self.policy_catalog, &request.plan, snapshot.level, rigor_mode);
                let verdict = outcome.into_verdict(
                    verdict_id.clone(),
                    request.intent_id.clone(),
                    request.plan.plan_id.clone(),
                    rigor_mode,
                    0.0,
                );
                self.cache.put(cache_key, verdict.cache_comparable());
                (
                    verdict.action,
                    verdict.allowed,
                    verdict.violations,
                    verdict.policies_evaluated,
                    verdict.constraints_evaluated,
                    verdict.trust_impact,
                    verdict.requires_approval,
                    verdict.approval_timeout,
                    verdict.modifications,
                )
            };

        self.velocity.record(&entity_id);
        self.circuit.record_request(
            &entity_id,
            RequestOutcome {
                risk_score: request.plan.risk_score,
                was_blocked: !allowed,
                ..Default::default()
            },
        );
        let new_trust = self.trust.apply_impact(&entity_id, trust_impact);

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        let verdict = EnforceVerdict {
            verdict_id,
            intent_id: request.intent_id,
            plan_id: request.plan.plan_id.clone(),
            allowed,
            action,
            violations,
            policies_evaluated,
            constraints_evaluated,
            trust_impact,
            requires_approval,
            approval_timeout,
            rigor_mode,
            modifications,
            decided_at: chrono::Utc::now(),
            duration_ms,
        };

        tracing::info!(
            entity_id = %entity_id,
            plan_id = %verdict.plan_id,
            action = ?verdict.action,
            trust_score = new_trust.score,
            duration_ms,
            "enforce_decided"
        );

        verdict
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        outcome: policy::EvaluationOutcome,
        verdict_id: String,
        intent_id: String,
        plan_id: String,
        rigor_mode: RigorMode,
        entity_id: &str,
        start: Instant,
        _record_velocity: bool,
    ) -> EnforceVerdict {
        let trust_impact = outcome.trust_impact;
        self.trust.apply_impact(entity_id, trust_impact);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        outcome.into_verdict(verdict_id, intent_id, plan_id, rigor_mode, duration_ms)
    }

    // -----------------------------------------------------------------
    // Proof ledger surface
    // -----------------------------------------------------------------

    pub fn record_proof(&self, verdict: &EnforceVerdict, entity_id: &str) -> ProofRecord {
        let inputs_hash = compute_inputs_hash(&verdict.plan_id, &verdict.policies_evaluated);
        let outputs_hash =
            compute_outputs_hash(verdict.allowed, verdict.violations.len(), verdict.trust_impact);

        self.ledger.append(
            verdict.intent_id.clone(),
            verdict.verdict_id.clone(),
            entity_id.to_string(),
            "enforce".to_string(),
            Decision::from(verdict.action),
            inputs_hash,
            outputs_hash,
        )
    }

    pub fn get_proof(&self, proof_id: &str) -> Option<ProofRecord> {
        self.ledger.get(proof_id)
    }

    pub fn verify_proof(&self, proof_id: &str) -> Option<ProofVerification> {
        self.ledger.verify(proof_id)
    }

    pub fn query_proofs(&self, filter: &ProofQuery) -> Vec<ProofRecord> {
        self.ledger.query(filter)
    }

    pub fn proof_stats(&self) -> ProofStats {
        self.ledger.stats()
    }

    pub fn decay_trust(&self) {
        self.trust.decay_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Plan;
    use std::collections::BTreeMap;

    fn gateway() -> Gateway {
        Gateway::new(GatewayConfig::default())
    }

    #[test]
    fn tripwire_goal_is_blocked_with_zeroed_trust() {
        let gateway = gateway();
        let response = gateway.intent(IntentRequest {
            entity_id: "agent-1".to_string(),
            goal: "rm -rf / please".to_string(),
        });
        assert_eq!(response.status, IntentStatus::Blocked);
        assert_eq!(response.trust_score, 0);
        assert_eq!(response.trust_level, 0);
    }

    #[test]
    fn clean_goal_is_normalized() {
        let gateway = gateway();
        let response = gateway.intent(IntentRequest {
            entity_id: "agent-1".to_string(),
            goal: "send a status email to the team".to_string(),
        });
        assert_eq!(response.status, IntentStatus::Normalized);
        assert!(response.plan.is_some());
    }

    #[test]
    fn enforce_denies_shell_tool_for_low_trust_entity() {
        let gateway = gateway();
        let plan = Plan {
            plan_id: "plan_1".to_string(),
            goal: "run shell command".to_string(),
            tools_required: vec!["shell".to_string()],
            endpoints_required: Vec::new(),
            data_classifications: Vec::new(),
            risk_indicators: BTreeMap::new(),
            risk_score: 0.2,
            reasoning_trace: String::new(),
        };
        let verdict = gateway.enforce(EnforceRequest {
            intent_id: "int_1".to_string(),
            entity_id: "agent-low-trust".to_string(),
            plan,
            rigor_mode: None,
        });
        assert_eq!(verdict.action, Action::Deny);
        assert!(!verdict.allowed);
    }

    #[test]
    fn open_circuit_denies_every_enforce_request() {
        let gateway = gateway();
        for _ in 0..3 {
            gateway.circuit.record_request(
                "agent-x",
                RequestOutcome {
                    tripwire_triggered: true,
                    ..Default::default()
                },
            );
        }
        let plan = Plan {
            plan_id: "plan_2".to_string(),
            goal: "benign".to_string(),
            tools_required: Vec::new(),
            endpoints_required: Vec::new(),
            data_classifications: Vec::new(),
            risk_indicators: BTreeMap::new(),
            risk_score: 0.0,
            reasoning_trace: String::new(),
        };
        let verdict = gateway.enforce(EnforceRequest {
            intent_id: "int_2".to_string(),
            entity_id: "agent-x".to_string(),
            plan,
            rigor_mode: None,
        });
        assert_eq!(verdict.action, Action::Deny);
        assert_eq!(verdict.policies_evaluated, vec!["system-circuit-breaker".to_string()]);
    }

    #[test]
    fn identical_inputs_produce_identical_cacheable_verdicts() {
        let gateway = gateway();
        let plan = Plan {
            plan_id: "plan_3".to_string(),
            goal: "benign".to_string(),
            tools_required: Vec::new(),
            endpoints_required: Vec::new(),
            data_classifications: Vec::new(),
            risk_indicators: BTreeMap::new(),
            risk_score: 0.0,
            reasoning_trace: String::new(),
        };
        let first = gateway.enforce(EnforceRequest {
            intent_id: "int_3".to_string(),
            entity_id: "agent-cache".to_string(),
            plan: plan.clone(),
            rigor_mode: Some(RigorMode::Strict),
        });
        let second = gateway.enforce(EnforceRequest {
            intent_id: "int_4".to_string(),
            entity_id: "agent-cache-2".to_string(),
            plan,
            rigor_mode: Some(RigorMode::Strict),
        });
        assert_eq!(first.action, second.action);
        assert_eq!(first.allowed, second.allowed);
        assert_eq!(first.violations.len(), second.violations.len());
    }
}
