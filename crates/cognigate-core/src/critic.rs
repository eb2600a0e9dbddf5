// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Critic (C5) — adversarial second-opinion review of a plan.
//!
//! A transport failure never propagates to the caller; it degrades to a
//! cautious `suspicious` verdict instead. Provider selection is data, not
//! type dispatch: any value implementing [`CriticProvider`] can be plugged
//! into the gateway. The shipped build ships [`MockCritic`] (deterministic,
//! used by the test suite and as the default) and [`HttpCritic`] (a thin
//! adapter shape; concrete vendor wiring is left to the embedding
//! application).

use std::time::Instant;

use crate::types::{CriticRequest, CriticVerdict, Judgment, RecommendedAction};

/// Tools that force a critic invocation regardless of risk score.
const ALWAYS_REVIEW_TOOLS: &[&str] = &["shell", "file_delete", "database", "network"];

/// Risk score at or above which the critic is invoked even with a benign
/// tool list.
const REVIEW_RISK_THRESHOLD: f64 = 0.3;

/// Whether a plan needs critic review at all, per §4.5's gate.
pub fn needs_review(risk_score: f64, tools_required: &[String]) -> bool {
    risk_score >= REVIEW_RISK_THRESHOLD
        || tools_required.iter().any(|t| ALWAYS_REVIEW_TOOLS.contains(&t.as_str()))
}

/// A pluggable critic backend. Any LLM vendor, or a deterministic stand-in,
/// can implement this.
pub trait CriticProvider: Send + Sync {
    fn analyze(&self, request: &CriticRequest) -> CriticVerdict;
    fn model_name(&self) -> &str;
}

fn cautious_fallback(plan_id: &str, model_used: &str, duration_ms: f64) -> CriticVerdict {
    CriticVerdict {
        critic_id: crate::ids::generate_id(crate::ids::CRITIC_PREFIX),
        plan_id: plan_id.to_string(),
        judgment: Judgment::Suspicious,
        confidence: 0.3,
        risk_adjustment: 0.1,
        hidden_risks: Vec::new(),
        reasoning: "critic provider unavailable; applying cautious fallback verdict".to_string(),
        concerns: vec!["critic_unavailable".to_string()],
        requires_human_review: true,
        recommended_action: RecommendedAction::Escalate,
        model_used: model_used.to_string(),
        created_at: chrono::Utc::now(),
        duration_ms: Some(duration_ms),
    }
}

/// Run `request` through `provider`, timing the call and applying the
/// cautious fallback on panic-free but unavailable providers. Providers are
/// expected to perform their own internal error recovery (see
/// [`HttpCritic`]); this wrapper exists to guarantee latency is always
/// reported, even for a provider that forgets to set `duration_ms`.
pub fn review(provider: &dyn CriticProvider, request: &CriticRequest) -> CriticVerdict {
    let start = Instant::now();
    let mut verdict = provider.analyze(request);
    if verdict.duration_ms.is_none() {
        verdict.duration_ms = Some(start.elapsed().as_secs_f64() * 1000.0);
    }
    verdict
}

// ---------------------------------------------------------------------------
// MockCritic
// ---------------------------------------------------------------------------

/// Deterministic critic used by default and by the test suite. Mirrors the
/// planner's own risk signal rather than calling out to a model: judgment
/// tracks the incoming risk score, so the pipeline stays fully reproducible
/// end to end.
pub struct MockCritic;

impl CriticProvider for MockCritic {
    fn analyze(&self, request: &CriticRequest) -> CriticVerdict {
        let (judgment, confidence, risk_adjustment, recommended_action, requires_human_review) =
            if request.planner_risk_score >= 0.9 {
                (Judgment::Block, 0.95, 0.05, RecommendedAction::Block, true)
            } else if request.planner_risk_score >= 0.6 {
                (Judgment::Dangerous, 0.8, 0.1, RecommendedAction::Escalate, true)
            } else if request.planner_risk_score >= 0.3 {
                (Judgment::Suspicious, 0.6, 0.05, RecommendedAction::Escalate, false)
            } else {
                (Judgment::Safe, 0.9, 0.0, RecommendedAction::Proceed, false)
            };

        CriticVerdict {
            critic_id: crate::ids::generate_id(crate::ids::CRITIC_PREFIX),
            plan_id: request.plan_id.clone(),
            judgment,
            confidence,
            risk_adjustment,
            hidden_risks: Vec::new(),
            reasoning: format!(
                "mock critic assessment based on planner risk score {:.2}",
                request.planner_risk_score
            ),
            concerns: Vec::new(),
            requires_human_review,
            recommended_action,
            model_used: self.model_name().to_string(),
            created_at: chrono::Utc::now(),
            duration_ms: None,
        }
    }

    fn model_name(&self) -> &str {
        "mock-critic-v1"
    }
}

// ---------------------------------------------------------------------------
// HttpCritic
// ---------------------------------------------------------------------------

#[cfg(feature = "http-critic")]
pub use http_critic::HttpCritic;

#[cfg(feature = "http-critic")]
mod http_critic {
    use super::*;
    use serde::Deserialize;

    /// POSTs an adversarial system/user prompt pair to a configured HTTP
    /// endpoint and parses a JSON verdict back. The wire shape is generic
    /// enough to sit in front of any Claude/OpenAI/Gemini/Grok-compatible
    /// chat-completions endpoint; the caller supplies the endpoint and
    /// bearer token. Never returns an `Err` to its caller — transport and
    /// parse failures both degrade to [`cautious_fallback`].
    pub struct HttpCritic {
        endpoint: String,
        api_key: String,
        model: String,
        temperature: f64,
        client: reqwest::blocking::Client,
    }

    impl HttpCritic {
        pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
            HttpCritic {
                endpoint: endpoint.into(),
                api_key: api_key.into(),
                model: model.into(),
                temperature: 0.3,
                client: reqwest::blocking::Client::new(),
            }
        }

        pub fn with_temperature(mut self, temperature: f64) -> Self {
            self.temperature = temperature;
            self
        }

        fn system_prompt(&self) -> &'static str {
            "You are an adversarial reviewer of an AI agent's plan. Assume bad \
             intent until proven otherwise. Return only the verdict JSON schema \
             you were given; do not wrap it in markdown fences."
        }

        fn user_prompt(&self, request: &CriticRequest) -> String {
            format!(
                "goal: {}\nplanner_risk_score: {}\nplanner_reasoning: {}\ntools_required: {:?}",
                request.goal, request.planner_risk_score, request.planner_reasoning, request.tools_required
            )
        }
    }

    #[derive(Deserialize)]
    struct RawVerdict {
        judgment: Judgment,
        confidence: f64,
        #[serde(default)]
        risk_adjustment: f64,
        #[serde(default)]
        hidden_risks: Vec<String>,
        reasoning: String,
        #[serde(default)]
        concerns: Vec<String>,
        #[serde(default)]
        requires_human_review: bool,
        #[serde(default = "super::default_recommended_action")]
        recommended_action: RecommendedAction,
    }

    fn strip_markdown_fences(body: &str) -> &str {
        body.trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    }

    impl CriticProvider for HttpCritic {
        fn analyze(&self, request: &CriticRequest) -> CriticVerdict {
            let start = Instant::now();
            let body = serde_json::json!({
                "model": self.model,
                "temperature": self.temperature,
                "system": self.system_prompt(),
                "user": self.user_prompt(request),
            });

            let result = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .and_then(|resp| resp.text());

            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            let raw = match result {
                Ok(text) => serde_json::from_str::<RawVerdict>(strip_markdown_fences(&text)).ok(),
                Err(_) => None,
            };

            match raw {
                Some(raw) => CriticVerdict {
                    critic_id: crate::ids::generate_id(crate::ids::CRITIC_PREFIX),
                    plan_id: request.plan_id.clone(),
                    judgment: raw.judgment,
                    confidence: raw.confidence,
                    risk_adjustment: raw.risk_adjustment,
                    hidden_risks: raw.hidden_risks,
                    reasoning: raw.reasoning,
                    concerns: raw.concerns,
                    requires_human_review: raw.requires_human_review,
                    recommended_action: raw.recommended_action,
                    model_used: self.model.clone(),
                    created_at: chrono::Utc::now(),
                    duration_ms: Some(elapsed_ms),
                },
                None => super::cautious_fallback(&request.plan_id, &self.model, elapsed_ms),
            }
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }
}

#[cfg(feature = "http-critic")]
fn default_recommended_action() -> RecommendedAction {
    RecommendedAction::Escalate
}
