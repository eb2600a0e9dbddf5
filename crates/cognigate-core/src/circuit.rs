// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Circuit breaker (C3) — system-wide and per-entity halts based on rolling
//! metrics.
//!
//! A Closed/Open/Half-Open state machine with four independent trip
//! conditions (sustained high-risk ratio, tripwire cascade, injection
//! detection, critic-block cascade) over a rolling metrics window, plus
//! per-entity halting and cascade-halt registration for parent/child
//! entities. State, metrics, trip history, halted set, and cascade map all
//! live behind one `parking_lot::Mutex<CircuitInner>`, held only for O(1)
//! work.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

const HIGH_RISK_THRESHOLD: f64 = 0.10;
const TRIPWIRE_CASCADE_COUNT: u32 = 3;
const INJECTION_THRESHOLD: u32 = 2;
const CRITIC_BLOCK_THRESHOLD: u32 = 5;
const AUTO_RESET_SECONDS: f64 = 300.0;
const HALF_OPEN_REQUESTS: u32 = 3;
const METRICS_WINDOW_SECONDS: f64 = 300.0;
const ENTITY_VIOLATION_THRESHOLD: u32 = 10;

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripReason {
    HighRiskThreshold,
    TripwireCascade,
    InjectionDetected,
    CriticBlockCascade,
    ManualHalt,
}

impl TripReason {
    pub fn label(self) -> &'static str {
        match self {
            TripReason::HighRiskThreshold => "high_risk_threshold",
            TripReason::TripwireCascade => "tripwire_cascade",
            TripReason::InjectionDetected => "injection_detected",
            TripReason::CriticBlockCascade => "critic_block_cascade",
            TripReason::ManualHalt => "manual_halt",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitTrip {
    pub reason: TripReason,
    pub timestamp: f64,
    pub entity_id: Option<String>,
    pub auto_reset_at: Option<f64>,
}

#[derive(Debug, Default)]
struct Metrics {
    total_requests: u32,
    high_risk_requests: u32,
    tripwire_triggers: u32,
    injection_attempts: u32,
    critic_blocks: u32,
    window_start: f64,
}

impl Metrics {
    fn high_risk_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.high_risk_requests as f64 / self.total_requests as f64
        }
    }
}

struct CircuitInner {
    state: CircuitState,
    metrics: Metrics,
    trip_history: Vec<CircuitTrip>,
    current_trip: Option<CircuitTrip>,
    half_open_successes: u32,
    entity_violations: HashMap<String, u32>,
    halted_entities: HashSet<String>,
    cascade_children: HashMap<String, HashSet<String>>,
}

impl Default for CircuitInner {
    fn default() -> Self {
        CircuitInner {
            state: CircuitState::Closed,
            metrics: Metrics {
                window_start: now_seconds(),
                ..Metrics::default()
            },
            trip_history: Vec::new(),
            current_trip: None,
            half_open_successes: 0,
            entity_violations: HashMap::new(),
            halted_entities: HashSet::new(),
            cascade_children: HashMap::new(),
        }
    }
}

/// Outcome fed to [`CircuitBreaker::record_request`] describing one
/// completed request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOutcome {
    pub risk_score: f64,
    pub was_blocked: bool,
    pub tripwire_triggered: bool,
    pub injection_detected: bool,
    pub critic_blocked: bool,
    pub velocity_violated: bool,
}

pub struct CircuitBreaker {
    inner: Mutex<CircuitInner>,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        CircuitBreaker {
            inner: Mutex::new(CircuitInner::default()),
        }
    }

    /// Whether `entity_id` may proceed right now, and why not if denied.
    pub fn allow_request(&self, entity_id: &str) -> (bool, String) {
        let mut inner = self.inner.lock();
        self.check_auto_reset(&mut inner);
        self.check_metrics_window(&mut inner);

        if inner.halted_entities.contains(entity_id) {
            return (false, format!("entity {entity_id} is halted"));
        }

        match inner.state {
            CircuitState::Open => {
                let reason = inner
                    .current_trip
                    .as_ref()
                    .map(|t| t.reason.label().to_string())
                    .unwrap_or_else(|| "open".to_string());
                (false, format!("circuit open: {reason}"))
            }
            CircuitState::HalfOpen => {
                if inner.half_open_successes >= HALF_OPEN_REQUESTS {
                    inner.state = CircuitState::Closed;
                    inner.current_trip = None;
                    tracing::info!("circuit_closed");
                    (true, "circuit recovered".to_string())
                } else {
                    (true, "circuit half-open: probing".to_string())
                }
            }
            CircuitState::Closed => (true, "circuit closed".to_string()),
        }
    }

    /// Record the outcome of a completed request and, if still Closed,
    /// evaluate trip conditions.
    pub fn record_request(&self, entity_id: &str, outcome: RequestOutcome) {
        let mut inner = self.inner.lock();
        self.check_metrics_window(&mut inner);

        inner.metrics.total_requests += 1;
        if outcome.risk_score >= 0.7 {
            inner.metrics.high_risk_requests += 1;
        }
        if outcome.tripwire_triggered {
            inner.metrics.tripwire_triggers += 1;
        }
        if outcome.injection_detected {
            inner.metrics.injection_attempts += 1;
        }
        if outcome.critic_blocked {
            inner.metrics.critic_blocks += 1;
        }
        if outcome.velocity_violated {
            let count = inner.entity_violations.entry(entity_id.to_string()).or_insert(0);
            *count += 1;
            if *count >= ENTITY_VIOLATION_THRESHOLD {
                inner.halted_entities.insert(entity_id.to_string());
                tracing::warn!(entity_id, "entity_halted_violation_threshold");
            }
        }

        match inner.state {
            CircuitState::Closed => self.check_trip_conditions(&mut inner, entity_id),
            CircuitState::HalfOpen if !outcome.was_blocked => {
                inner.half_open_successes += 1;
            }
            _ => {}
        }
    }

    fn check_trip_conditions(&self, inner: &mut CircuitInner, entity_id: &str) {
        let m = &inner.metrics;
        if m.total_requests >= 10 && m.high_risk_ratio() > HIGH_RISK_THRESHOLD {
            self.trip(inner, TripReason::HighRiskThreshold, None);
            return;
        }
        if m.tripwire_triggers >= TRIPWIRE_CASCADE_COUNT {
            self.trip(inner, TripReason::TripwireCascade, None);
            return;
        }
        if m.injection_attempts >= INJECTION_THRESHOLD {
            self.trip(inner, TripReason::InjectionDetected, Some(entity_id.to_string()));
            return;
        }
        if m.critic_blocks >= CRITIC_BLOCK_THRESHOLD {
            self.trip(inner, TripReason::CriticBlockCascade, None);
        }
    }

    fn trip(&self, inner: &mut CircuitInner, reason: TripReason, entity_id: Option<String>) {
        let now = now_seconds();
        inner.state = CircuitState::Open;
        let trip = CircuitTrip {
            reason,
            timestamp: now,
            entity_id,
            auto_reset_at: Some(now + AUTO_RESET_SECONDS),
        };
        inner.half_open_successes = 0;
        tracing::error!(reason = reason.label(), "circuit_tripped");
        inner.trip_history.push(trip.clone());
        inner.current_trip = Some(trip);
    }

    fn check_auto_reset(&self, inner: &mut CircuitInner) {
        if inner.state != CircuitState::Open {
            return;
        }
        if let Some(deadline) = inner.current_trip.as_ref().and_then(|t| t.auto_reset_at) {
            if now_seconds() >= deadline {
                inner.state = CircuitState::HalfOpen;
                inner.half_open_successes = 0;
                tracing::info!("circuit_half_open");
            }
        }
    }

    fn check_metrics_window(&self, inner: &mut CircuitInner) {
        if now_seconds() - inner.metrics.window_start > METRICS_WINDOW_SECONDS {
            inner.metrics = Metrics {
                window_start: now_seconds(),
                ..Metrics::default()
            };
        }
    }

    pub fn manual_reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = CircuitState::Closed;
        inner.current_trip = None;
        inner.metrics = Metrics {
            window_start: now_seconds(),
            ..Metrics::default()
        };
    }

    pub fn halt_entity(&self, entity_id: &str) {
        self.inner.lock().halted_entities.insert(entity_id.to_string());
    }

    pub fn unhalt_entity(&self, entity_id: &str) {
        let mut inner = self.inner.lock();
        inner.halted_entities.remove(entity_id);
        inner.entity_violations.insert(entity_id.to_string(), 0);
    }

    pub fn register_child(&self, parent_id: &str, child_id: &str) {
        self.inner
            .lock()
            .cascade_children
            .entry(parent_id.to_string())
            .or_default()
            .insert(child_id.to_string());
    }

    /// Halt `parent_id` and every child registered to it, atomically.
    pub fn cascade_halt(&self, parent_id: &str) {
        let mut inner = self.inner.lock();
        inner.halted_entities.insert(parent_id.to_string());
        if let Some(children) = inner.cascade_children.get(parent_id).cloned() {
            for child in children {
                inner.halted_entities.insert(child);
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn is_halted(&self, entity_id: &str) -> bool {
        self.inner.lock().halted_entities.contains(entity_id)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_circuit_admits_requests() {
        let breaker = CircuitBreaker::new();
        let (allowed, _) = breaker.allow_request("agent-1");
        assert!(allowed);
    }

    #[test]
    fn tripwire_cascade_trips_the_breaker() {
        let breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.record_request(
                "agent-1",
                RequestOutcome {
                    tripwire_triggered: true,
                    ..Default::default()
                },
            );
        }
        assert_eq!(breaker.state(), CircuitState::Open);
        let (allowed, _) = breaker.allow_request("agent-1");
        assert!(!allowed);
    }

    #[test]
    fn high_risk_ratio_trips_after_ten_requests() {
        let breaker = CircuitBreaker::new();
        for _ in 0..2 {
            breaker.record_request(
                "agent-1",
                RequestOutcome {
                    risk_score: 0.9,
                    ..Default::default()
                },
            );
        }
        for _ in 0..8 {
            breaker.record_request(
                "agent-1",
                RequestOutcome {
                    risk_score: 0.1,
                    ..Default::default()
                },
            );
        }
        // 2/10 = 20% > 10% threshold.
        assert_eq!(breaker.state(), CircuitState::Open);
    }

    #[test]
    fn entity_violation_threshold_halts_entity_independent_of_breaker_state() {
        let breaker = CircuitBreaker::new();
        for _ in 0..10 {
            breaker.record_request(
                "agent-x",
                RequestOutcome {
                    velocity_violated: true,
                    ..Default::default()
                },
            );
        }
        assert!(breaker.is_halted("agent-x"));
        let (allowed, _) = breaker.allow_request("agent-x");
        assert!(!allowed);
    }

    #[test]
    fn cascade_halt_covers_registered_children() {
        let breaker = CircuitBreaker::new();
        breaker.register_child("parent", "child-1");
        breaker.register_child("parent", "child-2");
        breaker.cascade_halt("parent");
        assert!(breaker.is_halted("parent"));
        assert!(breaker.is_halted("child-1"));
        assert!(breaker.is_halted("child-2"));
    }

    #[test]
    fn manual_reset_closes_the_circuit() {
        let breaker = CircuitBreaker::new();
        for _ in 0..3 {
            breaker.record_request(
                "agent-1",
                RequestOutcome {
                    tripwire_triggered: true,
                    ..Default::default()
                },
            );
        }
        assert_eq!(breaker.state(), CircuitState::Open);
        breaker.manual_reset();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
