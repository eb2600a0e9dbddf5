// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Policy evaluator (C7) — a static catalog of policies evaluated against a
//! plan and trust level under a rigor mode.
//!
//! Conditions are a closed, typed [`crate::types::Condition`] enum rather
//! than free-text predicates, so every constraint is checked by matching on
//! a known variant instead of parsing or interpreting a string.

use crate::types::{
    Action, Condition, Constraint, EnforceVerdict, Plan, Policy, PolicyViolation, RigorMode,
    Severity, TrustLevel,
};

/// Build the required baseline policy catalog (§4.7's table).
pub fn baseline_catalog() -> Vec<Policy> {
    vec![
        Policy {
            id: "basis-core-security".to_string(),
            name: "Core security constraints".to_string(),
            constraints: vec![
                Constraint {
                    id: "core-security-shell-trust".to_string(),
                    constraint_type: "tool_trust_gate".to_string(),
                    severity: Severity::Critical,
                    message: "shell tool requires trust_level >= 3".to_string(),
                    requires_approval: false,
                    condition: Condition::ToolPresentBelowTrust {
                        tool: "shell".to_string(),
                        trust_level: TrustLevel::Verified,
                    },
                },
                Constraint {
                    id: "core-security-file-delete".to_string(),
                    constraint_type: "tool_gate".to_string(),
                    severity: Severity::High,
                    message: "file_delete tool requires approval".to_string(),
                    requires_approval: true,
                    condition: Condition::ToolPresent { tool: "file_delete".to_string() },
                },
            ],
        },
        Policy {
            id: "basis-data-protection".to_string(),
            name: "Data protection constraints".to_string(),
            constraints: vec![
                Constraint {
                    id: "data-protection-pii-trust".to_string(),
                    constraint_type: "data_class_trust_gate".to_string(),
                    severity: Severity::Critical,
                    message: "pii_* data classification requires trust_level >= 2".to_string(),
                    requires_approval: false,
                    condition: Condition::DataClassPrefixBelowTrust {
                        prefix: "pii_".to_string(),
                        trust_level: TrustLevel::Trusted,
                    },
                },
                Constraint {
                    id: "data-protection-credentials".to_string(),
                    constraint_type: "data_class_gate".to_string(),
                    severity: Severity::High,
                    message: "credentials data classification detected".to_string(),
                    requires_approval: false,
                    condition: Condition::DataClassPresent { tag: "credentials".to_string() },
                },
            ],
        },
        Policy {
            id: "basis-risk-thresholds".to_string(),
            name: "Risk score thresholds".to_string(),
            constraints: vec![
                Constraint {
                    id: "risk-thresholds-critical".to_string(),
                    constraint_type: "risk_threshold".to_string(),
                    severity: Severity::Critical,
                    message: "risk_score exceeds the critical threshold of 0.8".to_string(),
                    requires_approval: false,
                    condition: Condition::RiskScoreAbove { threshold: 0.8 },
                },
                Constraint {
                    id: "risk-thresholds-high".to_string(),
                    constraint_type: "risk_threshold_trust_gate".to_string(),
                    severity: Severity::High,
                    message: "risk_score exceeds 0.5 at trust_level below 3".to_string(),
                    requires_approval: true,
                    condition: Condition::RiskScoreAboveBelowTrust {
                        threshold: 0.5,
                        trust_level: TrustLevel::Verified,
                    },
                },
            ],
        },
    ]
}

/// Select the subset of `catalog` active under `rigor_mode`, per §4.7 step 2.
pub fn select_policies<'a>(catalog: &'a [Policy], rigor_mode: RigorMode) -> Vec<&'a Policy> {
    let allowed_ids: Option<&[&str]> = match rigor_mode {
        RigorMode::Strict => None,
        RigorMode::Standard => {
            Some(&["basis-core-security", "basis-data-protection", "basis-risk-thresholds"])
        }
        RigorMode::Lite => Some(&["basis-core-security", "basis-risk-thresholds"]),
    };

    catalog
        .iter()
        .filter(|policy| match allowed_ids {
            None => true,
            Some(ids) => ids.contains(&policy.id.as_str()),
        })
        .collect()
}

/// Evaluate `plan` at `trust_level` under `rigor_mode` against `catalog`,
/// producing the violation list and constraint count that feed an
/// [`EnforceVerdict`]. Does not assign ids, durations, or timestamps — the
/// orchestrator fills those in.
pub struct EvaluationOutcome {
    pub violations: Vec<PolicyViolation>,
    pub policies_evaluated: Vec<String>,
    pub constraints_evaluated: usize,
    pub action: Action,
    pub allowed: bool,
    pub trust_impact: i32,
    pub requires_approval: bool,
    pub approval_timeout: Option<String>,
}

pub fn evaluate(
    catalog: &[Policy],
    plan: &Plan,
    trust_level: TrustLevel,
    rigor_mode: RigorMode,
) -> EvaluationOutcome {
    let selected = select_policies(catalog, rigor_mode);
    let mut violations = Vec::new();
    let mut constraints_evaluated = 0;
    let policies_evaluated: Vec<String> = selected.iter().map(|p| p.id.clone()).collect();

    for policy in &selected {
        for constraint in &policy.constraints {
            constraints_evaluated += 1;
            if constraint.condition.evaluate(plan, trust_level) {
                violations.push(PolicyViolation {
                    policy_id: policy.id.clone(),
                    constraint_id: Some(constraint.id.clone()),
                    severity: constraint.severity,
                    message: constraint.message.clone(),
                    blocked: constraint.severity == Severity::Critical,
                    remediation: None,
                });
            }
        }
    }

    let has_critical = violations.iter().any(|v| v.severity == Severity::Critical);
    let has_high_or_approval = violations
        .iter()
        .any(|v| v.severity == Severity::High || v.blocked)
        || policy_requires_approval(&selected, plan, trust_level);

    let (action, allowed, trust_impact, approval_timeout) = if has_critical {
        (Action::Deny, false, -50, None)
    } else if has_high_or_approval {
        (Action::Escalate, false, -10, Some("4h".to_string()))
    } else {
        (Action::Allow, true, 0, None)
    };

    EvaluationOutcome {
        violations,
        policies_evaluated,
        constraints_evaluated,
        action,
        allowed,
        trust_impact,
        requires_approval: matches!(action, Action::Escalate),
        approval_timeout,
    }
}

fn policy_requires_approval(selected: &[&Policy], plan: &Plan, trust_level: TrustLevel) -> bool {
    selected.iter().any(|policy| {
        policy
            .constraints
            .iter()
            .any(|c| c.requires_approval && c.condition.evaluate(plan, trust_level))
    })
}

/// Force a STRICT-rigor, `system-circuit-breaker` critical violation, per
/// §4.7 step 5's tie-break: a circuit trip always wins over policy
/// evaluation and is never cached.
pub fn circuit_denial_verdict(violation_message: &str) -> EvaluationOutcome {
    EvaluationOutcome {
        violations: vec![PolicyViolation {
            policy_id: "system-circuit-breaker".to_string(),
            constraint_id: None,
            severity: Severity::Critical,
            message: violation_message.to_string(),
            blocked: true,
            remediation: None,
        }],
        policies_evaluated: vec!["system-circuit-breaker".to_string()],
        constraints_evaluated: 1,
        action: Action::Deny,
        allowed: false,
        trust_impact: -100,
        requires_approval: false,
        approval_timeout: None,
    }
}

/// Force a STRICT-rigor, `system-velocity-caps` high-severity deny, per
/// §4.7 step 5: velocity denials always force STRICT and severity high.
pub fn velocity_denial_verdict(tier_label: &str, retry_after_seconds: f64) -> EvaluationOutcome {
    EvaluationOutcome {
        violations: vec![PolicyViolation {
            policy_id: "system-velocity-caps".to_string(),
            constraint_id: None,
            severity: Severity::High,
            message: format!(
                "velocity tier {tier_label} exceeded; retry after {retry_after_seconds:.1}s"
            ),
            blocked: true,
            remediation: Some(format!("retry after {retry_after_seconds:.1}s")),
        }],
        policies_evaluated: vec!["system-velocity-caps".to_string()],
        constraints_evaluated: 1,
        action: Action::Deny,
        allowed: false,
        trust_impact: -5,
        requires_approval: false,
        approval_timeout: None,
    }
}

impl EvaluationOutcome {
    pub fn into_verdict(
        self,
        verdict_id: String,
        intent_id: String,
        plan_id: String,
        rigor_mode: RigorMode,
        duration_ms: f64,
    ) -> EnforceVerdict {
        EnforceVerdict {
            verdict_id,
            intent_id,
            plan_id,
            allowed: self.allowed,
            action: self.action,
            violations: self.violations,
            policies_evaluated: self.policies_evaluated,
            constraints_evaluated: self.constraints_evaluated,
            trust_impact: self.trust_impact,
            requires_approval: self.requires_approval,
            approval_timeout: self.approval_timeout,
            rigor_mode,
            modifications: None,
            decided_at: chrono::Utc::now(),
            duration_ms,
        }
    }
}
