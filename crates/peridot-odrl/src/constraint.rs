//! ODRL constraints: `(left operand, operator, right operand)` triples.
//!
//! A constraint narrows when a rule applies. The left operand names an
//! attribute supplied at evaluation time (by the Policy Information Point);
//! the operator compares the resolved value against the right operand.
//! A constraint whose left operand cannot be resolved is treated as not
//! satisfied, never as an error.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Operator
// ============================================================================

/// The ODRL constraint operators supported by the evaluation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// Resolved value equals the right operand.
    Eq,
    /// Resolved value does not equal the right operand.
    Neq,
    /// Resolved value is strictly less than the right operand.
    Lt,
    /// Resolved value is less than or equal to the right operand.
    Lteq,
    /// Resolved value is strictly greater than the right operand.
    Gt,
    /// Resolved value is greater than or equal to the right operand.
    Gteq,
    /// Resolved value is an instance of the class named by the right operand.
    IsA,
    /// Resolved value is a member of the set given by the right operand.
    IsPartOf,
    /// Every element of the right operand is present in the resolved value.
    IsAllOf,
    /// At least one element of the right operand is present in the resolved value.
    IsAnyOf,
    /// No element of the right operand is present in the resolved value.
    IsNoneOf,
}

// ============================================================================
// ConstraintValue
// ============================================================================

/// A typed operand value.
///
/// Replaces the JSON-string-encoded operands of looser ODRL encodings with a
/// proper tagged union; serialization to JSON happens only at the storage
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintValue {
    /// A boolean value.
    Boolean(bool),
    /// A signed integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A text value, compared lexicographically.
    Text(String),
    /// A UTC timestamp, compared chronologically.
    DateTime(DateTime<Utc>),
    /// An ordered collection of values.
    List(Vec<ConstraintValue>),
}

impl ConstraintValue {
    /// Compares two values with operand-type-aware semantics.
    ///
    /// Numbers compare numerically (integer and float mix), text compares
    /// lexicographically, timestamps chronologically. Any other pairing is
    /// incomparable and returns `None`, which the matcher treats as
    /// constraint-not-satisfied.
    pub fn compare(&self, other: &ConstraintValue) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            #[allow(clippy::cast_precision_loss)]
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns the value as a slice of elements.
    ///
    /// Scalars are viewed as a one-element set so that the set operators
    /// (`isAllOf`, `isAnyOf`, `isNoneOf`, `isA`, `isPartOf`) apply uniformly.
    pub fn as_elements(&self) -> Vec<&ConstraintValue> {
        match self {
            Self::List(items) => items.iter().collect(),
            scalar => vec![scalar],
        }
    }

    /// True when `member` is equal to this value or to one of its elements.
    pub fn contains(&self, member: &ConstraintValue) -> bool {
        self.as_elements().iter().any(|v| *v == member)
    }

    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl From<i64> for ConstraintValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ConstraintValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConstraintValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for ConstraintValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

// ============================================================================
// Constraint
// ============================================================================

/// A single ODRL constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Name of the attribute to resolve at evaluation time.
    pub left_operand: String,
    /// The comparison operator.
    pub operator: Operator,
    /// The value the resolved attribute is compared against.
    pub right_operand: ConstraintValue,
}

impl Constraint {
    /// Creates a new constraint.
    pub fn new(
        left_operand: impl Into<String>,
        operator: Operator,
        right_operand: impl Into<ConstraintValue>,
    ) -> Self {
        Self {
            left_operand: left_operand.into(),
            operator,
            right_operand: right_operand.into(),
        }
    }

    /// Evaluates this constraint against a resolved left-operand value.
    ///
    /// `resolved` is the value the caller's attribute resolver produced for
    /// `left_operand`, or `None` when it could not be resolved. An
    /// unresolved operand is never satisfied (fail-closed).
    pub fn is_satisfied(&self, resolved: Option<&ConstraintValue>) -> bool {
        let Some(left) = resolved else {
            return false;
        };

        let right = &self.right_operand;
        match self.operator {
            Operator::Eq => left == right,
            Operator::Neq => left != right,
            Operator::Lt => matches!(left.compare(right), Some(Ordering::Less)),
            Operator::Lteq => matches!(
                left.compare(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => matches!(left.compare(right), Some(Ordering::Greater)),
            Operator::Gteq => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            // Classification membership: the resolved value (a class or list
            // of classes supplied by the PIP) includes the named class.
            Operator::IsA => left.contains(right),
            // Set membership: the resolved value is one of the right
            // operand's elements.
            Operator::IsPartOf => right.contains(left),
            Operator::IsAllOf => right.as_elements().iter().all(|v| left.contains(v)),
            Operator::IsAnyOf => right.as_elements().iter().any(|v| left.contains(v)),
            Operator::IsNoneOf => !right.as_elements().iter().any(|v| left.contains(v)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
