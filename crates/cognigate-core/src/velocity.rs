// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Velocity limiter (C2) — per-entity multi-window rate limits.
//!
//! Checking and recording are split: [`VelocityLimiter::check`] is read-only
//! and answers whether an entity may act right now, while
//! [`VelocityLimiter::record`] mutates state and must only be called once the
//! caller has actually admitted the request downstream. Per-entity state is
//! serialized behind a `parking_lot::Mutex`.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::types::{TrustLevel, VelocityTier};

/// `(max_actions, window_seconds)` per tier, indexed by trust level 0-4.
const LIMITS: [[(u32, u64); 4]; 5] = [
    [(2, 1), (10, 60), (50, 3_600), (200, 86_400)],
    [(5, 1), (30, 60), (200, 3_600), (1_000, 86_400)],
    [(10, 1), (60, 60), (500, 3_600), (5_000, 86_400)],
    [(20, 1), (120, 60), (2_000, 3_600), (20_000, 86_400)],
    [(50, 1), (300, 60), (10_000, 3_600), (100_000, 86_400)],
];

const PRUNE_HORIZON_SECONDS: u64 = 86_400;

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[derive(Debug, Default)]
struct EntityVelocityState {
    timestamps: VecDeque<f64>,
    total_actions: u64,
    throttled_until: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VelocityCheck {
    Allowed,
    Denied {
        tier: VelocityTier,
        current_rate: usize,
        limit: u32,
        window_label: &'static str,
        retry_after_seconds: f64,
    },
}

impl VelocityCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, VelocityCheck::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VelocityStats {
    pub total_actions: u64,
    pub window_1s: usize,
    pub window_60s: usize,
    pub window_3600s: usize,
    pub window_86400s: usize,
}

/// Owns per-entity velocity state. Held exclusively by the [`crate::gateway::Gateway`];
/// no component outside the orchestrator may mutate it (§3 ownership rule).
pub struct VelocityLimiter {
    states: Mutex<HashMap<String, EntityVelocityState>>,
}

impl VelocityLimiter {
    pub fn new() -> Self {
        VelocityLimiter {
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether `entity_id` may act now at `trust_level`. Read-only:
    /// does not record the action. Callers must call [`Self::record`]
    /// themselves after the check succeeds and the request is actually
    /// admitted downstream.
    pub fn check(&self, entity_id: &str, trust_level: TrustLevel) -> VelocityCheck {
        let mut states = self.states.lock();
        let state = states.entry(entity_id.to_string()).or_default();
        let now = now_seconds();

        if let Some(until) = state.throttled_until {
            if now < until {
                return VelocityCheck::Denied {
                    tier: VelocityTier::L0Burst,
                    current_rate: 0,
                    limit: 0,
                    window_label: "manual_throttle",
                    retry_after_seconds: until - now,
                };
            }
            state.throttled_until = None;
        }

        while let Some(&front) = state.timestamps.front() {
            if now - front > PRUNE_HORIZON_SECONDS as f64 {
                state.timestamps.pop_front();
            } else {
                break;
            }
        }

        let limits = LIMITS[trust_level.as_u8() as usize];
        let tiers = [
            (VelocityTier::L0Burst, limits[0], "1 second"),
            (VelocityTier::L1Sustained, limits[1], "60 seconds"),
            (VelocityTier::L2Hourly, limits[2], "3600 seconds"),
            (VelocityTier::L2Daily, limits[3], "86400 seconds"),
        ];

        for (tier, (max_actions, window_seconds), window_label) in tiers {
            let window_seconds = window_seconds as f64;
            let count = state
                .timestamps
                .iter()
                .filter(|&&ts| now - ts < window_seconds)
                .count();

            if count as u32 >= max_actions {
                let oldest_in_window = state
                    .timestamps
                    .iter()
                    .find(|&&ts| now - ts < window_seconds)
                    .copied()
                    .unwrap_or(now);
                let retry_after_seconds = (oldest_in_window + window_seconds - now).max(0.0);

                return VelocityCheck::Denied {
                    tier,
                    current_rate: count,
                    limit: max_actions,
                    window_label,
                    retry_after_seconds,
                };
            }
        }

        VelocityCheck::Allowed
    }

    /// Record an action for `entity_id`. Append-only.
    pub fn record(&self, entity_id: &str) {
        let mut states = self.states.lock();
        let state = states.entry(entity_id.to_string()).or_default();
        state.timestamps.push_back(now_seconds());
        state.total_actions += 1;
    }

    /// Manually throttle an entity until `duration_seconds` from now.
    pub fn throttle(&self, entity_id: &str, duration_seconds: f64) {
        let mut states = self.states.lock();
        let state = states.entry(entity_id.to_string()).or_default();
        state.throttled_until = Some(now_seconds() + duration_seconds);
    }

    pub fn unthrottle(&self, entity_id: &str) {
        if let Some(state) = self.states.lock().get_mut(entity_id) {
            state.throttled_until = None;
        }
    }

    pub fn stats(&self, entity_id: &str) -> Option<VelocityStats> {
        let states = self.states.lock();
        let state = states.get(entity_id)?;
        let now = now_seconds();
        let count_within = |window: f64| {
            state.timestamps.iter().filter(|&&ts| now - ts < window).count()
        };
        Some(VelocityStats {
            total_actions: state.total_actions,
            window_1s: count_within(1.0),
            window_60s: count_within(60.0),
            window_3600s: count_within(3_600.0),
            window_86400s: count_within(86_400.0),
        })
    }
}

impl Default for VelocityLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_limit_denies_after_threshold() {
        let limiter = VelocityLimiter::new();
        // Level 0: L0 burst limit is 2 per second.
        for _ in 0..2 {
            assert!(limiter.check("agent-1", TrustLevel::Untrusted).is_allowed());
            limiter.record("agent-1");
        }
        match limiter.check("agent-1", TrustLevel::Untrusted) {
            VelocityCheck::Denied { tier, .. } => assert_eq!(tier, VelocityTier::L0Burst),
            VelocityCheck::Allowed => panic!("expected denial at burst limit"),
        }
    }

    #[test]
    fn higher_trust_gets_higher_limits() {
        let limiter = VelocityLimiter::new();
        for _ in 0..10 {
            assert!(limiter.check("agent-2", TrustLevel::Trusted).is_allowed());
            limiter.record("agent-2");
        }
    }

    #[test]
    fn manual_throttle_denies_regardless_of_window_state() {
        let limiter = VelocityLimiter::new();
        limiter.throttle("agent-3", 60.0);
        match limiter.check("agent-3", TrustLevel::Privileged) {
            VelocityCheck::Denied { window_label, .. } => {
                assert_eq!(window_label, "manual_throttle")
            }
            VelocityCheck::Allowed => panic!("throttled entity must be denied"),
        }
    }

    #[test]
    fn different_entities_are_independent() {
        let limiter = VelocityLimiter::new();
        for _ in 0..2 {
            limiter.record("agent-a");
        }
        // agent-b has made no requests yet, so it should still be allowed
        // even though agent-a is now at its burst limit.
        assert!(limiter.check("agent-b", TrustLevel::Untrusted).is_allowed());
    }
}
