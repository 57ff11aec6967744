//! ODRL policy documents.
//!
//! A policy is identified by an immutable `uid` and carries ordered
//! collections of permission, prohibition, and obligation rules. Policy-level
//! target/action/party values act as defaults for rules that omit them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::rule::Rule;

// ============================================================================
// PolicyType
// ============================================================================

/// The ODRL policy subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PolicyType {
    /// A plain collection of rules; no party requirements.
    #[default]
    Set,
    /// Rules offered by an assigner; requires `assigner`.
    Offer,
    /// Rules agreed between two parties; requires `assigner` and `assignee`.
    Agreement,
}

// ============================================================================
// ConflictStrategy
// ============================================================================

/// How a policy resolves a permission/prohibition conflict over the same
/// target and action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ConflictStrategy {
    /// The permission wins.
    Perm,
    /// The prohibition wins.
    Prohibit,
    /// The conflict is unresolvable; evaluation must fail rather than guess.
    #[default]
    Invalid,
}

// ============================================================================
// Policy
// ============================================================================

/// An ODRL policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Globally unique, stable identifier. Immutable once assigned.
    pub uid: String,
    /// The policy subclass.
    #[serde(default)]
    pub policy_type: PolicyType,
    /// Profiles this policy conforms to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
    /// Policy-level assigner, inherited by rules that omit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigner: Option<String>,
    /// Policy-level assignee, inherited by rules that omit one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Policy-level targets, inherited by rules that omit their own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<String>,
    /// Policy-level action, inherited by rules that omit their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Conflict resolution strategy for this policy's own rules.
    #[serde(default)]
    pub conflict: ConflictStrategy,
    /// Permission rules, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permission: Vec<Rule>,
    /// Prohibition rules, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prohibition: Vec<Rule>,
    /// Obligation (duty) rules, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obligation: Vec<Rule>,
}

impl Policy {
    /// Creates an empty `Set` policy with the given uid.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            policy_type: PolicyType::default(),
            profile: Vec::new(),
            assigner: None,
            assignee: None,
            target: Vec::new(),
            action: None,
            conflict: ConflictStrategy::default(),
            permission: Vec::new(),
            prohibition: Vec::new(),
            obligation: Vec::new(),
        }
    }

    /// Creates an empty `Set` policy with a freshly generated urn uid.
    pub fn with_generated_uid() -> Self {
        Self::new(format!("urn:policy:{}", Uuid::new_v4()))
    }

    /// Sets the policy type (builder pattern).
    pub fn of_type(mut self, policy_type: PolicyType) -> Self {
        self.policy_type = policy_type;
        self
    }

    /// Sets the conflict strategy (builder pattern).
    pub fn with_conflict(mut self, conflict: ConflictStrategy) -> Self {
        self.conflict = conflict;
        self
    }

    /// Sets the policy-level assigner (builder pattern).
    pub fn with_assigner(mut self, assigner: impl Into<String>) -> Self {
        self.assigner = Some(assigner.into());
        self
    }

    /// Sets the policy-level assignee (builder pattern).
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Adds a policy-level target (builder pattern).
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target.push(target.into());
        self
    }

    /// Adds a permission rule (builder pattern).
    pub fn with_permission(mut self, rule: Rule) -> Self {
        self.permission.push(rule);
        self
    }

    /// Adds a prohibition rule (builder pattern).
    pub fn with_prohibition(mut self, rule: Rule) -> Self {
        self.prohibition.push(rule);
        self
    }

    /// Adds an obligation rule (builder pattern).
    pub fn with_obligation(mut self, rule: Rule) -> Self {
        self.obligation.push(rule);
        self
    }

    /// True when the policy carries no rules at all.
    ///
    /// Such a policy matches nothing.
    pub fn is_empty(&self) -> bool {
        self.permission.is_empty() && self.prohibition.is_empty() && self.obligation.is_empty()
    }

    /// Iterates over all rules with their kinds, in document order
    /// (permissions, then prohibitions, then obligations).
    pub fn rules(&self) -> impl Iterator<Item = (crate::rule::RuleKind, usize, &Rule)> {
        use crate::rule::RuleKind;
        self.permission
            .iter()
            .enumerate()
            .map(|(i, r)| (RuleKind::Permission, i, r))
            .chain(
                self.prohibition
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (RuleKind::Prohibition, i, r)),
            )
            .chain(
                self.obligation
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (RuleKind::Obligation, i, r)),
            )
    }

    /// Validates the document for persistence.
    ///
    /// Rejected before storage (`ValidationFailed` in the error taxonomy):
    /// - empty `uid`
    /// - `Offer` without an assigner, `Agreement` without both parties
    /// - a rule with no action of its own and no policy-level action
    /// - a constraint with an empty left operand
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.uid.trim().is_empty() {
            return Err(ValidationError::MissingUid);
        }

        match self.policy_type {
            PolicyType::Offer if self.assigner.is_none() => {
                return Err(ValidationError::MissingParty {
                    policy_type: self.policy_type,
                    party: "assigner",
                });
            }
            PolicyType::Agreement if self.assigner.is_none() || self.assignee.is_none() => {
                let party = if self.assigner.is_none() {
                    "assigner"
                } else {
                    "assignee"
                };
                return Err(ValidationError::MissingParty {
                    policy_type: self.policy_type,
                    party,
                });
            }
            _ => {}
        }

        for (kind, index, rule) in self.rules() {
            if rule.action.is_empty() && self.action.is_none() {
                return Err(ValidationError::RuleWithoutAction { kind, index });
            }
            for constraint in &rule.constraint {
                if constraint.left_operand.trim().is_empty() {
                    return Err(ValidationError::EmptyLeftOperand { kind, index });
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// Errors reported by [`Policy::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The policy uid is empty.
    #[error("policy uid must not be empty")]
    MissingUid,

    /// The policy type requires a party that is absent.
    #[error("{policy_type:?} policy requires an {party}")]
    MissingParty {
        /// The policy type imposing the requirement.
        policy_type: PolicyType,
        /// The missing party field.
        party: &'static str,
    },

    /// A rule has no action and cannot inherit one from the policy.
    #[error("{kind:?} rule at index {index} has no action")]
    RuleWithoutAction {
        /// The rule collection the offending rule belongs to.
        kind: crate::rule::RuleKind,
        /// Position within its collection.
        index: usize,
    },

    /// A constraint names no left operand.
    #[error("{kind:?} rule at index {index} has a constraint with an empty left operand")]
    EmptyLeftOperand {
        /// The rule collection the offending rule belongs to.
        kind: crate::rule::RuleKind,
        /// Position within its collection.
        index: usize,
    },
}

// ============================================================================
// Tests
// ============================================================================
