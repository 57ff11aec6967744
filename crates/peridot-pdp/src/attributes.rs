//! Evaluation requests and the Policy Information Point boundary.
//!
//! The PIP supplies attribute values for constraint evaluation in one batched
//! call before matching begins; the matcher itself performs no I/O. Resolved
//! values live in a request-scoped [`AttributeBag`] so a left operand is
//! resolved at most once per evaluation.

use std::collections::HashMap;

use peridot_odrl::ConstraintValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// EvaluationRequest
// ============================================================================

/// One authorization request, as seen by the decision engine.
///
/// Identity strings are opaque, pre-validated tokens; the engine never
/// derives authorization logic from their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The type of asset being processed.
    pub asset_type: String,
    /// The action being performed on the asset.
    pub action: String,
    /// The asset identifier, when the caller has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// The data payload the decision is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// The requesting user identity.
    pub user_identity: String,
    /// The node identity scoping the policy set.
    pub node_identity: String,
}

impl EvaluationRequest {
    /// Creates a request with no target or payload.
    pub fn new(
        asset_type: impl Into<String>,
        action: impl Into<String>,
        user_identity: impl Into<String>,
        node_identity: impl Into<String>,
    ) -> Self {
        Self {
            asset_type: asset_type.into(),
            action: action.into(),
            target: None,
            data: None,
            user_identity: user_identity.into(),
            node_identity: node_identity.into(),
        }
    }

    /// Sets the asset identifier (builder pattern).
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Sets the data payload (builder pattern).
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// One attribute supplied by the PIP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The left-operand name this attribute resolves.
    pub name: String,
    /// The resolved value.
    pub value: ConstraintValue,
}

impl Attribute {
    /// Creates an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<ConstraintValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Request-scoped cache of resolved attribute values.
///
/// Populated once per evaluation from the PIP's batched response. A left
/// operand absent from the bag is unresolvable, and any constraint naming it
/// fails closed.
#[derive(Debug, Clone, Default)]
pub struct AttributeBag {
    values: HashMap<String, ConstraintValue>,
}

impl AttributeBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from a PIP response. Later duplicates win.
    pub fn from_attributes(attributes: Vec<Attribute>) -> Self {
        let mut bag = Self::new();
        for attribute in attributes {
            bag.values.insert(attribute.name, attribute.value);
        }
        bag
    }

    /// Inserts a value, replacing any previous value for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ConstraintValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Resolves a left operand, or `None` when unresolvable.
    pub fn resolve(&self, left_operand: &str) -> Option<&ConstraintValue> {
        self.values.get(left_operand)
    }

    /// Number of resolved attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no attributes are resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// InformationPoint
// ============================================================================

/// Error reported by a PIP backend.
///
/// Not fatal to an evaluation: the engine degrades to an empty attribute bag
/// (constraints then fail closed) and records a warning on the verdict.
#[derive(Debug, Error)]
#[error("attribute retrieval failed: {reason}")]
pub struct AttributeError {
    /// Backend-specific failure description.
    pub reason: String,
}

/// The Policy Information Point boundary.
///
/// Implementations gather every attribute relevant to the request in one
/// batch, before matching begins, to avoid N+1 fetches mid-match.
pub trait InformationPoint: Send + Sync {
    /// Retrieves the attributes relevant to a request.
    fn retrieve(&self, request: &EvaluationRequest) -> Result<Vec<Attribute>, AttributeError>;
}

/// A PIP that supplies no attributes.
///
/// Every constraint referencing an external attribute fails closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInformationPoint;

impl InformationPoint for NoInformationPoint {
    fn retrieve(&self, _request: &EvaluationRequest) -> Result<Vec<Attribute>, AttributeError> {
        Ok(Vec::new())
    }
}

/// A PIP with a fixed attribute set, independent of the request.
#[derive(Debug, Clone, Default)]
pub struct StaticInformationPoint {
    attributes: Vec<Attribute>,
}

impl StaticInformationPoint {
    /// Creates a PIP returning the given attributes for every request.
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// Adds an attribute (builder pattern).
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<ConstraintValue>,
    ) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }
}

impl InformationPoint for StaticInformationPoint {
    fn retrieve(&self, _request: &EvaluationRequest) -> Result<Vec<Attribute>, AttributeError> {
        Ok(self.attributes.clone())
    }
}
