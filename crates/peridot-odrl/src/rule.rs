//! ODRL rules: permissions, prohibitions, and obligations (duties).
//!
//! A rule names the targets and actions it covers, optionally narrows the
//! parties it binds, and carries an ordered constraint list (AND semantics).
//! Permission rules may additionally carry transform directives that the
//! enforcement point applies to granted data.

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;

// ============================================================================
// RuleKind
// ============================================================================

/// The kind of a rule within a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    /// The assignee may perform the action.
    Permission,
    /// The assignee must not perform the action.
    Prohibition,
    /// An action that must be performed as a condition of or alongside access.
    Obligation,
}

// ============================================================================
// Transform
// ============================================================================

/// A data transform directive carried on a permission rule.
///
/// Field paths are dot-separated for nested objects (`"patient.ssn"`).
/// Missing fields are tolerated; transforms never fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Transform {
    /// Replace the named fields' values with `"***"`.
    Redact {
        /// Dot-separated field paths to redact.
        fields: Vec<String>,
    },
    /// Delete the named fields entirely.
    Remove {
        /// Dot-separated field paths to remove.
        fields: Vec<String>,
    },
}

// ============================================================================
// Rule
// ============================================================================

/// A single ODRL rule.
///
/// Empty `target` or `action` collections fall back to the owning policy's
/// policy-level values at match time. A rule with an empty constraint list
/// always matches once target, action, and parties match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Rule {
    /// Asset identifiers this rule covers. Empty = inherit from the policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<String>,
    /// Action identifiers this rule covers. Empty = inherit from the policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action: Vec<String>,
    /// Party granting the rule, when narrower than the policy's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigner: Option<String>,
    /// Party the rule binds, when narrower than the policy's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Constraints, all of which must be satisfied (logical AND).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraint: Vec<Constraint>,
    /// Transform directives applied by the enforcement point on grant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Transform>,
}

impl Rule {
    /// Creates a rule covering a single target and action.
    pub fn new(target: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            target: vec![target.into()],
            action: vec![action.into()],
            ..Self::default()
        }
    }

    /// Creates a rule covering an action with no target of its own
    /// (inherits the policy-level target, or applies policy-wide).
    pub fn for_action(action: impl Into<String>) -> Self {
        Self {
            action: vec![action.into()],
            ..Self::default()
        }
    }

    /// Adds a constraint (builder pattern).
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint.push(constraint);
        self
    }

    /// Sets the assignee party (builder pattern).
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the assigner party (builder pattern).
    pub fn with_assigner(mut self, assigner: impl Into<String>) -> Self {
        self.assigner = Some(assigner.into());
        self
    }

    /// Adds a transform directive (builder pattern).
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform.push(transform);
        self
    }
}
