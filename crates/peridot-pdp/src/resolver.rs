//! Conflict resolution: from per-policy matches to a single verdict.
//!
//! Each policy's own conflict strategy applies to its own rules only. At the
//! cross-policy level the aggregate is deliberately conservative: a single
//! prohibition not overridden within its own policy denies the whole
//! decision. No policy matching anything is a deny (fail-closed default).

use peridot_odrl::{ConflictStrategy, Policy, RuleKind};
use tracing::debug;

use crate::error::{EvaluationError, Result};
use crate::verdict::{MatchedRule, Verdict};

/// Resolves matched rules across candidate policies into a verdict.
///
/// `per_policy` must be ordered by policy uid, with each policy's matches in
/// rule-position order; the verdict preserves that order, so identical input
/// always yields an identical verdict.
///
/// Obligations are collected regardless of the allow/deny outcome.
pub fn resolve(per_policy: &[(Policy, Vec<MatchedRule>)]) -> Result<Verdict> {
    let mut matches = Vec::new();
    let mut policies = Vec::new();
    let mut any_permission = false;
    let mut surviving_prohibition = false;

    for (policy, policy_matches) in per_policy {
        if policy_matches.is_empty() {
            continue;
        }

        let has_permission = policy_matches
            .iter()
            .any(|m| m.kind == RuleKind::Permission);
        let has_prohibition = policy_matches
            .iter()
            .any(|m| m.kind == RuleKind::Prohibition);

        // Permission and prohibition of one policy both cover the request:
        // the owning policy's strategy decides.
        if has_permission && has_prohibition {
            match policy.conflict {
                ConflictStrategy::Perm => {
                    debug!(policy = %policy.uid, "conflict resolved in favor of permission");
                }
                ConflictStrategy::Prohibit => {
                    debug!(policy = %policy.uid, "conflict resolved in favor of prohibition");
                    surviving_prohibition = true;
                }
                ConflictStrategy::Invalid => {
                    return Err(EvaluationError::ConflictUnresolved {
                        policy_uid: policy.uid.clone(),
                    });
                }
            }
        } else if has_prohibition {
            surviving_prohibition = true;
        }

        any_permission |= has_permission;
        matches.extend(policy_matches.iter().cloned());
        policies.push(policy.clone());
    }

    // Nothing matched is the fail-closed default deny.
    if matches.is_empty() {
        return Ok(Verdict::deny());
    }

    // A surviving prohibition anywhere denies; permissions alone allow.
    let allow = any_permission && !surviving_prohibition;

    Ok(Verdict {
        allow,
        matches,
        policies,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use peridot_odrl::Rule;

    fn matched(policy: &Policy, kind: RuleKind, rule_index: usize) -> MatchedRule {
        MatchedRule {
            policy_uid: policy.uid.clone(),
            kind,
            rule_index,
            rule: Rule::new("asset/1", "use"),
        }
    }

    fn policy(uid: &str, conflict: ConflictStrategy) -> Policy {
        Policy::new(uid).with_conflict(conflict)
    }

    #[test]
    fn nothing_matched_denies_by_default() {
        let verdict = resolve(&[]).expect("resolve");
        assert!(!verdict.is_allowed());
        assert!(verdict.matches.is_empty());
    }

    #[test]
    fn permission_only_allows() {
        let p = policy("urn:policy:1", ConflictStrategy::Invalid);
        let matches = vec![matched(&p, RuleKind::Permission, 0)];
        let verdict = resolve(&[(p, matches)]).expect("resolve");
        assert!(verdict.is_allowed());
    }

    #[test]
    fn prohibition_only_denies() {
        let p = policy("urn:policy:1", ConflictStrategy::Invalid);
        let matches = vec![matched(&p, RuleKind::Prohibition, 0)];
        let verdict = resolve(&[(p, matches)]).expect("resolve");
        assert!(!verdict.is_allowed());
        assert_eq!(verdict.prohibitions().count(), 1);
    }

    #[test]
    fn perm_strategy_resolves_in_policy_conflict_to_allow() {
        let p = policy("urn:policy:1", ConflictStrategy::Perm);
        let matches = vec![
            matched(&p, RuleKind::Permission, 0),
            matched(&p, RuleKind::Prohibition, 0),
        ];
        let verdict = resolve(&[(p, matches)]).expect("resolve");
        assert!(verdict.is_allowed());
        // Both matched rules stay visible in the verdict.
        assert_eq!(verdict.matches.len(), 2);
    }

    #[test]
    fn prohibit_strategy_resolves_in_policy_conflict_to_deny() {
        let p = policy("urn:policy:1", ConflictStrategy::Prohibit);
        let matches = vec![
            matched(&p, RuleKind::Permission, 0),
            matched(&p, RuleKind::Prohibition, 0),
        ];
        let verdict = resolve(&[(p, matches)]).expect("resolve");
        assert!(!verdict.is_allowed());
    }

    #[test]
    fn invalid_strategy_conflict_is_fatal() {
        let p = policy("urn:policy:1", ConflictStrategy::Invalid);
        let matches = vec![
            matched(&p, RuleKind::Permission, 0),
            matched(&p, RuleKind::Prohibition, 0),
        ];
        let result = resolve(&[(p, matches)]);
        assert!(matches!(
            result,
            Err(EvaluationError::ConflictUnresolved { ref policy_uid }) if policy_uid == "urn:policy:1"
        ));
    }

    #[test]
    fn cross_policy_prohibition_denies_despite_foreign_perm_strategy() {
        // Scenario D: a perm-strategy policy's permission does not override
        // another policy's prohibition.
        let permitting = policy("urn:policy:perm", ConflictStrategy::Perm);
        let prohibiting = policy("urn:policy:proh", ConflictStrategy::Prohibit);
        let per_policy = vec![
            (
                permitting.clone(),
                vec![matched(&permitting, RuleKind::Permission, 0)],
            ),
            (
                prohibiting.clone(),
                vec![matched(&prohibiting, RuleKind::Prohibition, 0)],
            ),
        ];

        let verdict = resolve(&per_policy).expect("resolve");
        assert!(!verdict.is_allowed());
        assert_eq!(verdict.policies.len(), 2);
    }

    #[test]
    fn obligations_collected_on_deny_path() {
        let p = policy("urn:policy:1", ConflictStrategy::Invalid);
        let matches = vec![
            matched(&p, RuleKind::Prohibition, 0),
            matched(&p, RuleKind::Obligation, 0),
        ];
        let verdict = resolve(&[(p, matches)]).expect("resolve");
        assert!(!verdict.is_allowed());
        assert_eq!(verdict.obligations().count(), 1);
    }

    #[test]
    fn verdict_preserves_input_order() {
        let a = policy("urn:policy:a", ConflictStrategy::Perm);
        let b = policy("urn:policy:b", ConflictStrategy::Perm);
        let per_policy = vec![
            (a.clone(), vec![matched(&a, RuleKind::Permission, 0)]),
            (
                b.clone(),
                vec![
                    matched(&b, RuleKind::Permission, 0),
                    matched(&b, RuleKind::Permission, 1),
                ],
            ),
        ];

        let verdict = resolve(&per_policy).expect("resolve");
        let order: Vec<(&str, usize)> = verdict
            .matches
            .iter()
            .map(|m| (m.policy_uid.as_str(), m.rule_index))
            .collect();
        assert_eq!(
            order,
            vec![("urn:policy:a", 0), ("urn:policy:b", 0), ("urn:policy:b", 1)]
        );
    }
}
