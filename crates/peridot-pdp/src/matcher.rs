//! Rule matching for one policy against one request.
//!
//! A rule matches when its effective action set covers the request action,
//! its effective target set covers the request target (or it has none and is
//! policy-wide), its parties match the request identities, and every
//! constraint is satisfied. Rule-level values fall back to policy-level
//! defaults. All matches are retained; deduplication and conflict handling
//! belong to the resolver.

use peridot_odrl::{Policy, Rule, RuleKind};
use tracing::{debug, warn};

use crate::attributes::{AttributeBag, EvaluationRequest};
use crate::verdict::MatchedRule;

/// Matches every rule of `policy` against the request.
///
/// Malformed rules (no action of their own and none inherited) are skipped
/// with a warning pushed to `warnings`; they never abort the evaluation.
/// A policy with no rules matches nothing.
pub fn match_policy(
    policy: &Policy,
    request: &EvaluationRequest,
    attributes: &AttributeBag,
    warnings: &mut Vec<String>,
) -> Vec<MatchedRule> {
    let mut matches = Vec::new();

    for (kind, index, rule) in policy.rules() {
        match rule_matches(policy, kind, index, rule, request, attributes) {
            RuleOutcome::Matched => matches.push(MatchedRule {
                policy_uid: policy.uid.clone(),
                kind,
                rule_index: index,
                rule: rule.clone(),
            }),
            RuleOutcome::NotMatched => {}
            RuleOutcome::Malformed(reason) => {
                warn!(
                    policy = %policy.uid,
                    kind = ?kind,
                    index,
                    reason = %reason,
                    "skipping malformed rule"
                );
                warnings.push(format!(
                    "policy {}: skipped malformed {kind:?} rule at index {index}: {reason}",
                    policy.uid
                ));
            }
        }
    }

    matches
}

enum RuleOutcome {
    Matched,
    NotMatched,
    Malformed(String),
}

fn rule_matches(
    policy: &Policy,
    kind: RuleKind,
    index: usize,
    rule: &Rule,
    request: &EvaluationRequest,
    attributes: &AttributeBag,
) -> RuleOutcome {
    // Action: rule-level set, falling back to the policy-level action.
    // Exact string match on action identifiers, no fuzzy matching.
    let action_matches = if rule.action.is_empty() {
        match policy.action.as_deref() {
            Some(action) => action == request.action,
            None => {
                return RuleOutcome::Malformed("no action and no policy-level action".to_string());
            }
        }
    } else {
        rule.action.iter().any(|a| *a == request.action)
    };
    if !action_matches {
        return RuleOutcome::NotMatched;
    }

    // Target: rule-level set, falling back to policy-level targets. An empty
    // effective set is a policy-wide rule and covers any target. A targeted
    // rule cannot match a request that names no asset.
    let effective_targets: &[String] = if rule.target.is_empty() {
        &policy.target
    } else {
        &rule.target
    };
    if !effective_targets.is_empty() {
        match request.target.as_deref() {
            Some(target) if effective_targets.iter().any(|t| t == target) => {}
            _ => return RuleOutcome::NotMatched,
        }
    }

    // Parties: assignee binds the requesting user, assigner the node
    // operator granting rights over assets it hosts.
    let assignee = rule.assignee.as_deref().or(policy.assignee.as_deref());
    if let Some(assignee) = assignee {
        if assignee != request.user_identity {
            return RuleOutcome::NotMatched;
        }
    }
    let assigner = rule.assigner.as_deref().or(policy.assigner.as_deref());
    if let Some(assigner) = assigner {
        if assigner != request.node_identity {
            return RuleOutcome::NotMatched;
        }
    }

    // Constraints: logical AND. An unresolvable left operand makes its
    // constraint unsatisfied, never an error.
    for constraint in &rule.constraint {
        let resolved = attributes.resolve(&constraint.left_operand);
        if !constraint.is_satisfied(resolved) {
            debug!(
                policy = %policy.uid,
                kind = ?kind,
                index,
                left_operand = %constraint.left_operand,
                resolved = resolved.is_some(),
                "constraint not satisfied"
            );
            return RuleOutcome::NotMatched;
        }
    }

    RuleOutcome::Matched
}
