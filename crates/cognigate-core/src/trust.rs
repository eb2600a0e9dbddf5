// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Trust registry (C6) — per-entity score, level, and observation ceiling.
//!
//! Score changes are clamped by per-update, per-hour, and per-day windowed
//! caps, mirroring the windowed accounting the velocity limiter already does
//! for action counts. State is owned directly by this struct, held behind a
//! `parking_lot::Mutex`, and is itself owned by the orchestrator — no
//! pluggable storage trait sits in front of it.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::types::{ObservationTier, TrustLevel};

const MAX_SCORE: u32 = 1000;
const PER_UPDATE_CAP: i32 = 100;
const PER_HOUR_CAP: i32 = 150;
const PER_DAY_CAP: i32 = 300;

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

struct EntityTrust {
    score: u32,
    observation_tier: ObservationTier,
    applied_deltas: VecDeque<(f64, i32)>,
    last_decay_at: f64,
}

impl EntityTrust {
    fn new(initial_score: u32, observation_tier: ObservationTier) -> Self {
        EntityTrust {
            score: initial_score.min(observation_tier.ceiling_score()),
            observation_tier,
            applied_deltas: VecDeque::new(),
            last_decay_at: now_seconds(),
        }
    }

    fn windowed_sum(&mut self, window_seconds: f64) -> i32 {
        let now = now_seconds();
        while let Some(&(ts, _)) = self.applied_deltas.front() {
            if now - ts > 86_400.0 {
                self.applied_deltas.pop_front();
            } else {
                break;
            }
        }
        self.applied_deltas
            .iter()
            .filter(|&&(ts, _)| now - ts <= window_seconds)
            .map(|&(_, delta)| delta)
            .sum()
    }
}

/// Snapshot returned to callers after a lookup or mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustSnapshot {
    pub score: u32,
    pub level: TrustLevel,
    pub ceiling: u32,
}

/// Owns all per-entity trust state. Held exclusively by the orchestrator;
/// no other component mutates an entity's score directly.
pub struct TrustRegistry {
    entities: Mutex<HashMap<String, EntityTrust>>,
    default_score: u32,
    daily_decay_rate: u32,
}

impl TrustRegistry {
    pub fn new(default_score: u32, daily_decay_rate: u32) -> Self {
        TrustRegistry {
            entities: Mutex::new(HashMap::new()),
            default_score,
            daily_decay_rate,
        }
    }

    /// Look up (or lazily initialize, at black-box observation) an entity.
    pub fn snapshot(&self, entity_id: &str) -> TrustSnapshot {
        let mut entities = self.entities.lock();
        let entity = entities
            .entry(entity_id.to_string())
            .or_insert_with(|| EntityTrust::new(self.default_score, ObservationTier::BlackBox));
        TrustSnapshot {
            score: entity.score,
            level: TrustLevel::from_score(entity.score),
            ceiling: entity.observation_tier.ceiling_score(),
        }
    }

    pub fn set_observation_tier(&self, entity_id: &str, tier: ObservationTier) {
        let mut entities = self.entities.lock();
        let entity = entities
            .entry(entity_id.to_string())
            .or_insert_with(|| EntityTrust::new(self.default_score, tier));
        entity.observation_tier = tier;
        entity.score = entity.score.min(tier.ceiling_score());
    }

    /// Apply a signed `trust_impact` from an [`crate::types::EnforceVerdict`],
    /// clamping against the per-update, per-hour, and per-day velocity caps
    /// (§4.6) and the observation tier's score ceiling.
    pub fn apply_impact(&self, entity_id: &str, trust_impact: i32) -> TrustSnapshot {
        let mut entities = self.entities.lock();
        let entity = entities
            .entry(entity_id.to_string())
            .or_insert_with(|| EntityTrust::new(self.default_score, ObservationTier::BlackBox));

        let clamped_update = trust_impact.clamp(-PER_UPDATE_CAP, PER_UPDATE_CAP);

        let hour_sum = entity.windowed_sum(3_600.0);
        let day_sum = entity.windowed_sum(86_400.0);

        let hour_remaining = (PER_HOUR_CAP - hour_sum.abs()).max(0);
        let day_remaining = (PER_DAY_CAP - day_sum.abs()).max(0);
        let remaining = hour_remaining.min(day_remaining);

        let applied = if clamped_update >= 0 {
            clamped_update.min(remaining)
        } else {
            -((-clamped_update).min(remaining))
        };

        let ceiling = entity.observation_tier.ceiling_score();
        let new_score = (entity.score as i64 + applied as i64).clamp(0, ceiling as i64) as u32;
        entity.score = new_score;
        entity.applied_deltas.push_back((now_seconds(), applied));

        TrustSnapshot {
            score: entity.score,
            level: TrustLevel::from_score(entity.score),
            ceiling,
        }
    }

    /// Apply the configured daily decay rate to `entity_id`. Decay applies
    /// unconditionally regardless of circuit-breaker state and never lowers
    /// the score below zero. Safe to call more often than once per day —
    /// the amount applied scales with elapsed time since the last call.
    pub fn decay(&self, entity_id: &str) -> TrustSnapshot {
        let mut entities = self.entities.lock();
        let entity = entities
            .entry(entity_id.to_string())
            .or_insert_with(|| EntityTrust::new(self.default_score, ObservationTier::BlackBox));

        let now = now_seconds();
        let elapsed_days = (now - entity.last_decay_at) / 86_400.0;
        if elapsed_days > 0.0 {
            let decay_amount = (self.daily_decay_rate as f64 * elapsed_days).round() as u32;
            entity.score = entity.score.saturating_sub(decay_amount);
            entity.last_decay_at = now;
        }

        TrustSnapshot {
            score: entity.score,
            level: TrustLevel::from_score(entity.score),
            ceiling: entity.observation_tier.ceiling_score(),
        }
    }

    /// Decay every registered entity. Intended to be invoked periodically by
    /// a background task owned by the gateway.
    pub fn decay_all(&self) {
        let ids: Vec<String> = self.entities.lock().keys().cloned().collect();
        for id in ids {
            self.decay(&id);
        }
    }
}

impl Default for TrustRegistry {
    fn default() -> Self {
        Self::new(MAX_SCORE / 4, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_entity_gets_default_score() {
        let registry = TrustRegistry::new(250, 5);
        let snapshot = registry.snapshot("agent-1");
        assert_eq!(snapshot.score, 250);
        assert_eq!(snapshot.level, TrustLevel::Provisional);
    }

    #[test]
    fn positive_impact_raises_score() {
        let registry = TrustRegistry::new(250, 5);
        let snapshot = registry.apply_impact("agent-1", 30);
        assert_eq!(snapshot.score, 280);
    }

    #[test]
    fn negative_impact_is_clamped_at_zero() {
        let registry = TrustRegistry::new(10, 5);
        let snapshot = registry.apply_impact("agent-1", -100);
        assert_eq!(snapshot.score, 0);
    }

    #[test]
    fn per_update_cap_limits_a_single_large_impact() {
        let registry = TrustRegistry::new(500, 5);
        let snapshot = registry.apply_impact("agent-1", 500);
        // per-update cap is 100, so score rises by at most 100.
        assert_eq!(snapshot.score, 600);
    }

    #[test]
    fn observation_tier_ceiling_bounds_the_score() {
        let registry = TrustRegistry::new(0, 5);
        registry.set_observation_tier("agent-1", ObservationTier::BlackBox);
        for _ in 0..20 {
            registry.apply_impact("agent-1", 100);
        }
        let snapshot = registry.snapshot("agent-1");
        assert!(snapshot.score <= ObservationTier::BlackBox.ceiling_score());
    }

    #[test]
    fn decay_never_goes_below_zero() {
        let registry = TrustRegistry::new(2, 1_000_000);
        registry.snapshot("agent-1");
        let snapshot = registry.decay("agent-1");
        assert!(snapshot.score <= 2);
    }
}
