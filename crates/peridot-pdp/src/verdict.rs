//! The output of one policy evaluation.
//!
//! A verdict is created per `evaluate` call, owned by the calling
//! enforcement point for the duration of one intercept, and never persisted
//! or shared across requests.

use peridot_odrl::{Policy, Rule, RuleKind};
use serde::{Deserialize, Serialize};

/// One rule that applied to the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRule {
    /// Uid of the policy the rule belongs to.
    pub policy_uid: String,
    /// Which collection the rule came from.
    pub kind: RuleKind,
    /// Position within that collection (tie-break order).
    pub rule_index: usize,
    /// The matched rule itself.
    pub rule: Rule,
}

/// The structured result of one PDP evaluation.
///
/// `matches` lists every permission, prohibition, and obligation that
/// applied, ordered by policy uid and then rule position. Obligations are
/// collected on both the allow and the deny path (duties such as audit
/// logging may apply even when access is refused).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// The final access decision.
    pub allow: bool,
    /// Every rule that applied, in deterministic order.
    pub matches: Vec<MatchedRule>,
    /// The applicable policies (deduplicated, uid order) for the execution
    /// point's obligation lookup.
    pub policies: Vec<Policy>,
    /// Non-fatal data-quality warnings recorded during evaluation
    /// (malformed rules skipped, attribute retrieval degraded).
    pub warnings: Vec<String>,
}

impl Verdict {
    /// A deny verdict with no applicable rules (the fail-closed default).
    pub fn deny() -> Self {
        Self {
            allow: false,
            matches: Vec::new(),
            policies: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when access is granted.
    pub fn is_allowed(&self) -> bool {
        self.allow
    }

    /// The matched permission rules.
    pub fn permissions(&self) -> impl Iterator<Item = &MatchedRule> {
        self.matches
            .iter()
            .filter(|m| m.kind == RuleKind::Permission)
    }

    /// The matched prohibition rules.
    pub fn prohibitions(&self) -> impl Iterator<Item = &MatchedRule> {
        self.matches
            .iter()
            .filter(|m| m.kind == RuleKind::Prohibition)
    }

    /// The matched obligation rules.
    pub fn obligations(&self) -> impl Iterator<Item = &MatchedRule> {
        self.matches
            .iter()
            .filter(|m| m.kind == RuleKind::Obligation)
    }
}
