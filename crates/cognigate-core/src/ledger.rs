// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Proof ledger (C9) — an append-only, hash-chained audit trail.
//!
//! Every record's hash is SHA-256 over the canonical JSON of its fields
//! (`sha2` + `hex`), and each record's `previous_hash` must equal its
//! predecessor's `hash`, so tampering anywhere in the chain is detectable
//! from any later point. A single writer lock serializes appends; readers
//! take a cloned snapshot so a long query never blocks a writer.

use std::sync::RwLock;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::types::{Decision, ProofQuery, ProofRecord, ProofStats, ProofVerification};

const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Serialize `value` to canonical JSON: keys sorted lexicographically, no
/// insignificant whitespace. `serde_json::Value`'s map is a `BTreeMap` under
/// the `preserve_order` feature being absent, so `to_string` already yields
/// sorted keys; this helper exists to make that guarantee explicit and
/// local to one place.
fn canonical_json<T: Serialize>(value: &T) -> String {
    let as_value: Value = serde_json::to_value(value).expect("value must serialize to JSON");
    serde_json::to_string(&as_value).expect("canonical JSON value must serialize")
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fields hashed to produce `inputs_hash`, per §4.9 step 1.
#[derive(Serialize)]
struct InputsDigest<'a> {
    plan_id: &'a str,
    policies: &'a [String],
}

/// Fields hashed to produce `outputs_hash`, per §4.9 step 2.
#[derive(Serialize)]
struct OutputsDigest {
    allowed: bool,
    violations_count: usize,
    trust_impact: i32,
}

/// All record fields except `hash` and `signature`, hashed to produce the
/// record's own `hash`, per §4.9 step 3.
#[derive(Serialize)]
struct RecordDigest<'a> {
    proof_id: &'a str,
    chain_position: u64,
    intent_id: &'a str,
    verdict_id: &'a str,
    entity_id: &'a str,
    action_type: &'a str,
    decision: Decision,
    inputs_hash: &'a str,
    outputs_hash: &'a str,
    previous_hash: &'a str,
    created_at: chrono::DateTime<chrono::Utc>,
}

pub fn compute_inputs_hash(plan_id: &str, policies: &[String]) -> String {
    sha256_hex(&canonical_json(&InputsDigest { plan_id, policies }))
}

pub fn compute_outputs_hash(allowed: bool, violations_count: usize, trust_impact: i32) -> String {
    sha256_hex(&canonical_json(&OutputsDigest {
        allowed,
        violations_count,
        trust_impact,
    }))
}

fn compute_record_hash(record: &ProofRecord) -> String {
    sha256_hex(&canonical_json(&RecordDigest {
        proof_id: &record.proof_id,
        chain_position: record.chain_position,
        intent_id: &record.intent_id,
        verdict_id: &record.verdict_id,
        entity_id: &record.entity_id,
        action_type: &record.action_type,
        decision: record.decision,
        inputs_hash: &record.inputs_hash,
        outputs_hash: &record.outputs_hash,
        previous_hash: &record.previous_hash,
        created_at: record.created_at,
    }))
}

/// Append-only, hash-chained proof ledger. A single `RwLock` serializes
/// writers; readers take a cloned snapshot so a long query never blocks an
/// append.
pub struct ProofLedger {
    records: RwLock<Vec<ProofRecord>>,
}

impl ProofLedger {
    pub fn new() -> Self {
        ProofLedger {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Append a new record built from the given fields, computing
    /// `previous_hash` and `hash` under the writer lock.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &self,
        intent_id: String,
        verdict_id: String,
        entity_id: String,
        action_type: String,
        decision: Decision,
        inputs_hash: String,
        outputs_hash: String,
    ) -> ProofRecord {
        let mut records = self.records.write().expect("ledger lock poisoned");
        let previous_hash = records
            .last()
            .map(|r| r.hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let chain_position = records.len() as u64;

        let mut record = ProofRecord {
            proof_id: ProofRecord::new_id(),
            chain_position,
            intent_id,
            verdict_id,
            entity_id,
            action_type,
            decision,
            inputs_hash,
            outputs_hash,
            previous_hash,
            hash: String::new(),
            signature: None,
            created_at: chrono::Utc::now(),
            metadata: Default::default(),
        };
        record.hash = compute_record_hash(&record);

        records.push(record.clone());
        record
    }

    pub fn get(&self, proof_id: &str) -> Option<ProofRecord> {
        self.records
            .read()
            .expect("ledger lock poisoned")
            .iter()
            .find(|r| r.proof_id == proof_id)
            .cloned()
    }

    /// Verify record `proof_id`'s own hash and its linkage to its
    /// predecessor, per §4.9's verification rule.
    pub fn verify(&self, proof_id: &str) -> Option<ProofVerification> {
        let records = self.records.read().expect("ledger lock poisoned");
        let index = records.iter().position(|r| r.proof_id == proof_id)?;
        let record = &records[index];

        let mut issues = Vec::new();
        let recomputed_hash = compute_record_hash(record);
        let hash_valid = recomputed_hash == record.hash;
        if !hash_valid {
            issues.push("record hash does not match recomputed digest".to_string());
        }

        let chain_valid = if index == 0 {
            record.previous_hash == GENESIS_HASH
        } else {
            let predecessor = &records[index - 1];
            record.previous_hash == predecessor.hash
                && compute_record_hash(predecessor) == predecessor.hash
        };
        if !chain_valid {
            issues.push("Chain linkage broken".to_string());
        }

        Some(ProofVerification {
            proof_id: proof_id.to_string(),
            valid: hash_valid && chain_valid,
            chain_valid,
            signature_valid: record.signature.as_ref().map(|_| true),
            issues,
            verified_at: chrono::Utc::now(),
        })
    }

    pub fn query(&self, filter: &ProofQuery) -> Vec<ProofRecord> {
        let records = self.records.read().expect("ledger lock poisoned");
        let matched: Vec<ProofRecord> = records
            .iter()
            .filter(|r| {
                filter.entity_id.as_deref().map(|v| v == r.entity_id).unwrap_or(true)
                    && filter.intent_id.as_deref().map(|v| v == r.intent_id).unwrap_or(true)
                    && filter.verdict_id.as_deref().map(|v| v == r.verdict_id).unwrap_or(true)
                    && filter.decision.map(|v| v == r.decision).unwrap_or(true)
                    && filter.start_date.map(|v| r.created_at >= v).unwrap_or(true)
                    && filter.end_date.map(|v| r.created_at <= v).unwrap_or(true)
            })
            .cloned()
            .collect();

        matched.into_iter().skip(filter.offset).take(filter.limit).collect()
    }

    /// Chain integrity over the whole ledger: conjunction over all
    /// positions, per §4.9.
    pub fn chain_integrity(&self) -> bool {
        let records = self.records.read().expect("ledger lock poisoned");
        records.iter().enumerate().all(|(index, record)| {
            let expected_previous = if index == 0 {
                GENESIS_HASH.to_string()
            } else {
                records[index - 1].hash.clone()
            };
            record.previous_hash == expected_previous && compute_record_hash(record) == record.hash
        })
    }

    pub fn stats(&self) -> ProofStats {
        let records = self.records.read().expect("ledger lock poisoned");
        let mut by_decision: std::collections::BTreeMap<String, usize> = Default::default();
        for record in records.iter() {
            let label = match record.decision {
                Decision::Allowed => "allowed",
                Decision::Denied => "denied",
                Decision::Escalated => "escalated",
                Decision::Modified => "modified",
            };
            *by_decision.entry(label.to_string()).or_insert(0) += 1;
        }

        let total_records = records.len();
        let last_record_at = records.last().map(|r| r.created_at);
        drop(records);

        ProofStats {
            total_records,
            chain_length: total_records,
            last_record_at,
            records_by_decision: by_decision,
            chain_integrity: self.chain_integrity(),
        }
    }
}

impl Default for ProofLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_sample(ledger: &ProofLedger, entity_id: &str) -> ProofRecord {
        ledger.append(
            "int_abc".to_string(),
            "vrd_abc".to_string(),
            entity_id.to_string(),
            "enforce".to_string(),
            Decision::Allowed,
            compute_inputs_hash("plan_1", &["basis-core-security".to_string()]),
            compute_outputs_hash(true, 0, 0),
        )
    }

    #[test]
    fn first_record_chains_to_genesis() {
        let ledger = ProofLedger::new();
        let record = append_sample(&ledger, "agent-1");
        assert_eq!(record.previous_hash, GENESIS_HASH);
        assert_eq!(record.chain_position, 0);
    }

    #[test]
    fn second_record_chains_to_first() {
        let ledger = ProofLedger::new();
        let first = append_sample(&ledger, "agent-1");
        let second = append_sample(&ledger, "agent-2");
        assert_eq!(second.previous_hash, first.hash);
    }

    #[test]
    fn verify_passes_on_unmodified_ledger() {
        let ledger = ProofLedger::new();
        let record = append_sample(&ledger, "agent-1");
        let verification = ledger.verify(&record.proof_id).unwrap();
        assert!(verification.valid);
        assert!(verification.chain_valid);
        assert!(verification.issues.is_empty());
    }

    #[test]
    fn chain_integrity_holds_over_multiple_records() {
        let ledger = ProofLedger::new();
        for i in 0..5 {
            append_sample(&ledger, &format!("agent-{i}"));
        }
        assert!(ledger.chain_integrity());
    }

    #[test]
    fn query_filters_by_entity_id() {
        let ledger = ProofLedger::new();
        append_sample(&ledger, "agent-1");
        append_sample(&ledger, "agent-2");
        let filter = ProofQuery {
            entity_id: Some("agent-2".to_string()),
            ..Default::default()
        };
        let results = ledger.query(&filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_id, "agent-2");
    }

    #[test]
    fn tampering_with_an_earlier_record_breaks_the_later_verification() {
        let ledger = ProofLedger::new();
        append_sample(&ledger, "agent-1");
        let second = append_sample(&ledger, "agent-2");

        {
            let mut records = ledger.records.write().unwrap();
            records[0].decision = Decision::Denied;
        }

        let verification = ledger.verify(&second.proof_id).unwrap();
        assert!(!verification.chain_valid);
        assert!(!verification.issues.is_empty());
        assert!(!ledger.chain_integrity());
    }

    #[test]
    fn stats_reports_decision_counts() {
        let ledger = ProofLedger::new();
        append_sample(&ledger, "agent-1");
        let stats = ledger.stats();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.records_by_decision.get("allowed"), Some(&1));
        assert!(stats.chain_integrity);
    }
}
