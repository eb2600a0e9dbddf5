// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Cognigate Contributors

//! Opaque, prefixed identifier generation.
//!
//! Every externally visible id in this crate (`int_`, `plan_`, `vrd_`, `prf_`,
//! `crit_`, `req_`) is a random hex string behind a stable prefix, matching the
//! documented prefix table in the external interface contract.

use uuid::Uuid;

/// Generate an opaque id with the given prefix, e.g. `generate_id("plan_")`.
pub fn generate_id(prefix: &str) -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &raw[..12])
}

pub const INTENT_PREFIX: &str = "int_";
pub const PLAN_PREFIX: &str = "plan_";
pub const VERDICT_PREFIX: &str = "vrd_";
pub const PROOF_PREFIX: &str = "prf_";
pub const CRITIC_PREFIX: &str = "crit_";
pub const REQUEST_PREFIX: &str = "req_";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_the_requested_prefix() {
        let id = generate_id(PLAN_PREFIX);
        assert!(id.starts_with("plan_"));
        assert_eq!(id.len(), "plan_".len() + 12);
    }

    #[test]
    fn generated_ids_are_not_trivially_repeated() {
        let a = generate_id(VERDICT_PREFIX);
        let b = generate_id(VERDICT_PREFIX);
        assert_ne!(a, b);
    }
}
