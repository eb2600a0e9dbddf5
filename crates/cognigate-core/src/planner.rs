// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Planner (C4) — deterministic, keyword-table-driven rule engine producing
//! a [`Plan`] from a raw goal string.
//!
//! A real LLM planner is an allowed substitute as long as it honors the same
//! `Plan` contract, so this module is deliberately free of any provider
//! coupling — unlike the critic, there is no trait to implement here.

use std::collections::BTreeMap;

use crate::types::Plan;

const EUPHEMISM_KEYWORDS: &[&str] = &[
    "clear", "clean", "wipe", "purge", "organize", "tidy", "archive", "free up", "reclaim",
    "empty", "reset", "format", "nuke", "sanitize",
];

const HIGH_RISK_KEYWORDS: &[&str] = &[
    "delete", "drop", "hack", "exploit", "bypass", "admin", "root", "sudo", "rm -rf", "rmdir",
    "truncate", "destroy", "erase", "shred", "kill",
];

const SYSTEM_PATHS: &[&str] = &[
    "root", "/root", "/etc", "/var", "/usr", "/bin", "/sys", "/boot", "system32", "windows",
    "c:\\", "home directory", "all files", "everything", "entire", "whole system",
];

const MEDIUM_RISK_KEYWORDS: &[&str] = &["modify", "update", "change", "write", "send", "transfer"];

const TOOL_KEYWORDS: &[(&str, &[&str])] = &[
    ("shell", &["shell", "bash", "cmd", "exec", "run", "terminal", "command"]),
    ("file_write", &["write", "save", "create file", "modify file"]),
    ("file_delete", &["delete", "remove", "rm", "unlink", "clear", "wipe", "clean", "purge"]),
    ("network", &["http", "api", "fetch", "request", "curl"]),
    ("database", &["sql", "query", "select", "insert", "update", "delete from"]),
    ("email", &["email", "mail", "send message", "notify"]),
];

const BASE_RISK: f64 = 0.1;

fn count_matches(haystack: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| haystack.contains(*kw)).count()
}

fn any_match(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(*kw))
}

/// Build a [`Plan`] from a raw goal string. Pure and deterministic.
pub fn plan_from_goal(goal: &str) -> Plan {
    let lower = goal.to_lowercase();

    let mut tools: Vec<String> = TOOL_KEYWORDS
        .iter()
        .filter(|(_, keywords)| any_match(&lower, keywords))
        .map(|(tool, _)| tool.to_string())
        .collect();

    let mut data_classifications = Vec::new();
    if lower.contains("email") || lower.contains('@') {
        data_classifications.push("pii_email".to_string());
    }
    if lower.contains("password") || lower.contains("credential") {
        data_classifications.push("credentials".to_string());
    }
    if lower.contains("ssn") || lower.contains("social security") {
        data_classifications.push("pii_ssn".to_string());
    }

    let mut indicators: BTreeMap<String, f64> = BTreeMap::new();
    let mut reasoning_parts = Vec::new();

    let euphemism_count = count_matches(&lower, EUPHEMISM_KEYWORDS);
    let has_system_path = any_match(&lower, SYSTEM_PATHS);
    let destructive_count = count_matches(&lower, HIGH_RISK_KEYWORDS);
    let modification_count = count_matches(&lower, MEDIUM_RISK_KEYWORDS);
    let has_dangerous_tool = tools.iter().any(|t| t == "shell" || t == "file_delete");

    let mut forced_risk: Option<f64> = None;

    if euphemism_count > 0 && has_system_path {
        indicators.insert("euphemism_attack".to_string(), 0.95);
        forced_risk = Some(0.95);
        reasoning_parts.push("euphemistic language combined with a system path reference".to_string());
        for tool in ["file_delete", "shell"] {
            if !tools.iter().any(|t| t == tool) {
                tools.push(tool.to_string());
            }
        }
    } else if euphemism_count > 0 {
        let value = (0.5 + 0.1 * euphemism_count as f64).min(0.7);
        indicators.insert("suspicious_euphemism".to_string(), value);
        reasoning_parts.push(format!("{euphemism_count} euphemistic term(s) detected"));
    }

    if destructive_count > 0 {
        let value = (0.3 * destructive_count as f64).min(0.9);
        indicators.insert("destructive_intent".to_string(), value);
        reasoning_parts.push(format!("{destructive_count} explicit destructive keyword(s)"));
    }

    if has_system_path && euphemism_count == 0 {
        indicators.insert("system_path_access".to_string(), 0.7);
        reasoning_parts.push("reference to a system path".to_string());
    }

    if modification_count > 0 {
        let value = (0.15 * modification_count as f64).min(0.5);
        indicators.insert("modification_intent".to_string(), value);
        reasoning_parts.push(format!("{modification_count} modification verb(s)"));
    }

    if has_dangerous_tool {
        indicators.insert("dangerous_tools".to_string(), 0.7);
        reasoning_parts.push("shell or file_delete tool required".to_string());
    }

    let max_indicator = indicators.values().copied().fold(0.0_f64, f64::max);
    let risk_score = forced_risk.unwrap_or_else(|| BASE_RISK.max(max_indicator)).min(1.0);

    let reasoning_trace = if reasoning_parts.is_empty() {
        "no risk indicators detected; baseline risk applied".to_string()
    } else {
        reasoning_parts.join("; ")
    };

    Plan {
        plan_id: crate::ids::generate_id(crate::ids::PLAN_PREFIX),
        goal: goal.to_string(),
        tools_required: tools,
        endpoints_required: Vec::new(),
        data_classifications,
        risk_indicators: indicators,
        risk_score,
        reasoning_trace,
    }
}
