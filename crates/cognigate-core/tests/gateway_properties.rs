// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Integration tests driving [`Gateway`] end to end through its public
//! `intent`/`enforce`/proof-ledger surface only — no internal field access.

use cognigate_core::types::{Action, EnforceRequest, IntentRequest, IntentStatus, Plan, ProofQuery};
use cognigate_core::{Gateway, GatewayConfig};

fn gateway_with_trust_level(level: u8) -> Gateway {
    Gateway::new(GatewayConfig {
        critic_enabled: false,
        default_trust_level: level,
        ..GatewayConfig::default()
    })
}

fn low_risk_plan(entity: &str) -> Plan {
    let response = gateway_with_trust_level(1).intent(IntentRequest {
        entity_id: entity.to_string(),
        goal: "send a status update email".to_string(),
    });
    response.plan.expect("clean goal produces a plan")
}

// T3 / S4-prelude — a tripwire-triggering goal is blocked outright, with
// zeroed trust, regardless of the entity's standing.
#[test]
fn tripwire_goal_blocks_with_zeroed_trust_regardless_of_entity() {
    let gateway = gateway_with_trust_level(4);
    let response = gateway.intent(IntentRequest {
        entity_id: "agent-privileged".to_string(),
        goal: "run rm -rf / to clean up the disk".to_string(),
    });
    assert_eq!(response.status, IntentStatus::Blocked);
    assert_eq!(response.trust_level, 0);
    assert_eq!(response.trust_score, 0);
}

// T1 / S3 — a burst of requests from an Untrusted (level 0) entity is capped
// at the 1-second-window limit (2 actions); the rest are denied with
// `system-velocity-caps` and a bounded retry-after.
#[test]
fn burst_from_untrusted_entity_is_capped_by_the_one_second_window() {
    let gateway = gateway_with_trust_level(0);
    let plan = low_risk_plan("plan-source");

    let mut allowed = 0;
    let mut denied = 0;
    for _ in 0..6 {
        let verdict = gateway.enforce(EnforceRequest {
            intent_id: "int_burst".to_string(),
            entity_id: "agent-burst".to_string(),
            plan: plan.clone(),
            rigor_mode: None,
        });
        if verdict.action == Action::Deny
            && verdict.violations.iter().any(|v| v.policy_id == "system-velocity-caps")
        {
            denied += 1;
            let violation = &verdict.violations[0];
            assert!(violation.message.contains("retry after"));
        } else {
            allowed += 1;
        }
    }

    assert_eq!(allowed, 2);
    assert_eq!(denied, 4);
}

// T4 / S4 — once the circuit trips on a sustained high-risk ratio, every
// subsequent enforce call is denied with `system-circuit-breaker`.
#[test]
fn circuit_trips_on_sustained_high_risk_ratio_and_denies_every_request() {
    let gateway = gateway_with_trust_level(4);
    let high_risk_plan = gateway
        .intent(IntentRequest {
            entity_id: "agent-seed".to_string(),
            goal: "organize and clean up the root directory".to_string(),
        })
        .plan
        .expect("euphemism + system path plan");
    assert!(high_risk_plan.risk_score >= 0.7);

    let mut last_verdict = None;
    for i in 0..10 {
        last_verdict = Some(gateway.enforce(EnforceRequest {
            intent_id: "int_trip".to_string(),
            entity_id: format!("agent-trip-{i}"),
            plan: high_risk_plan.clone(),
            rigor_mode: None,
        }));
    }
    // The 10th request observes the ratio crossing the trip threshold and
    // trips the breaker as part of recording its own outcome.
    let tripped = last_verdict.unwrap();
    let _ = tripped;

    let next = gateway.enforce(EnforceRequest {
        intent_id: "int_trip".to_string(),
        entity_id: "agent-after-trip".to_string(),
        plan: high_risk_plan,
        rigor_mode: None,
    });
    assert_eq!(next.action, Action::Deny);
    assert!(next.violations.iter().any(|v| v.policy_id == "system-circuit-breaker"));
}

// S4 — three tripwire-triggering goals from independent entities trip the
// circuit on the tripwire-cascade condition; the next enforce call is denied
// with `system-circuit-breaker`.
#[test]
fn three_tripwire_triggers_trip_the_circuit_via_tripwire_cascade() {
    let gateway = gateway_with_trust_level(4);
    for i in 0..3 {
        let response = gateway.intent(IntentRequest {
            entity_id: format!("agent-tripwire-{i}"),
            goal: "run rm -rf / to clean up the disk".to_string(),
        });
        assert_eq!(response.status, IntentStatus::Blocked);
    }

    let plan = low_risk_plan("plan-source-tripwire");
    let next = gateway.enforce(EnforceRequest {
        intent_id: "int_tripwire_cascade".to_string(),
        entity_id: "agent-after-tripwire-cascade".to_string(),
        plan,
        rigor_mode: None,
    });
    assert_eq!(next.action, Action::Deny);
    assert!(next.violations.iter().any(|v| v.policy_id == "system-circuit-breaker"));
}

// T5 — identical inputs produce identical cacheable verdict fields whether
// served from cache or freshly evaluated.
#[test]
fn identical_inputs_produce_identical_verdicts() {
    let gateway = gateway_with_trust_level(2);
    let plan = low_risk_plan("plan-source-2");

    let request = || EnforceRequest {
        intent_id: "int_cache".to_string(),
        entity_id: "agent-cache".to_string(),
        plan: plan.clone(),
        rigor_mode: Some(cognigate_core::types::RigorMode::Strict),
    };

    let first = gateway.enforce(request());
    let second = gateway.enforce(request());

    assert_eq!(first.action, second.action);
    assert_eq!(first.allowed, second.allowed);
    assert_eq!(first.violations.len(), second.violations.len());
    assert_eq!(first.policies_evaluated, second.policies_evaluated);
}

// R2 / S5 — proof records verify cleanly when unmodified, and the ledger
// tracks a growing chain across multiple recorded verdicts.
#[test]
fn proof_ledger_round_trips_through_record_get_verify() {
    let gateway = gateway_with_trust_level(3);
    let plan = low_risk_plan("plan-source-3");

    let first_verdict = gateway.enforce(EnforceRequest {
        intent_id: "int_proof_1".to_string(),
        entity_id: "agent-proof".to_string(),
        plan: plan.clone(),
        rigor_mode: None,
    });
    let second_verdict = gateway.enforce(EnforceRequest {
        intent_id: "int_proof_2".to_string(),
        entity_id: "agent-proof".to_string(),
        plan,
        rigor_mode: None,
    });

    let first_record = gateway.record_proof(&first_verdict, "agent-proof");
    let second_record = gateway.record_proof(&second_verdict, "agent-proof");

    assert_eq!(second_record.previous_hash, first_record.hash);

    let verification = gateway
        .verify_proof(&second_record.proof_id)
        .expect("record exists");
    assert!(verification.valid);
    assert!(verification.chain_valid);
    assert!(verification.issues.is_empty());

    let fetched = gateway.get_proof(&first_record.proof_id).expect("record exists");
    assert_eq!(fetched.proof_id, first_record.proof_id);

    assert!(gateway.get_proof("prf_does_not_exist").is_none());
    assert!(gateway.verify_proof("prf_does_not_exist").is_none());

    let results = gateway.query_proofs(&ProofQuery {
        entity_id: Some("agent-proof".to_string()),
        limit: 100,
        ..Default::default()
    });
    assert_eq!(results.len(), 2);

    let stats = gateway.proof_stats();
    assert_eq!(stats.total_records, 2);
}

// S6-style — with the critic disabled, low-risk goals that would otherwise
// request review still normalize cleanly (no transport to fall back from).
#[test]
fn critic_disabled_gateway_still_normalizes_clean_goals() {
    let gateway = gateway_with_trust_level(1);
    let response = gateway.intent(IntentRequest {
        entity_id: "agent-no-critic".to_string(),
        goal: "send a status update email".to_string(),
    });
    assert_eq!(response.status, IntentStatus::Normalized);
}
