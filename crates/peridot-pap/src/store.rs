//! The policy store boundary.
//!
//! Storage backends implement [`PolicyStore`]. Every operation is scoped by
//! node identity: the store enforces storage-level tenancy, and the
//! evaluation core treats identities as opaque correlation tokens.

use peridot_odrl::{Policy, PolicyType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a policy store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage cannot be reached.
    ///
    /// Fatal to any evaluation in flight; the core performs no retries.
    #[error("policy store unavailable: {reason}")]
    Unavailable {
        /// Backend-specific failure description.
        reason: String,
    },

    /// The caller supplied a cursor the backend cannot interpret.
    ///
    /// Recoverable: restart the query without a cursor.
    #[error("invalid query cursor: {cursor:?}")]
    InvalidCursor {
        /// The cursor as received.
        cursor: String,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// Query conditions
// ============================================================================

/// A filter condition for [`PolicyStore::query`].
///
/// Target and action conditions match policy-level values as well as values
/// nested inside rules, so the supply layer can pre-filter candidates without
/// missing rule-scoped policies. Backends that cannot evaluate a condition
/// may over-return; the rule matcher re-checks every candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryCondition {
    /// The policy uid equals the value.
    UidEquals(String),
    /// The policy is of the given type.
    TypeEquals(PolicyType),
    /// The policy-level assigner equals the value.
    AssignerEquals(String),
    /// The policy-level assignee equals the value.
    AssigneeEquals(String),
    /// The policy or one of its rules targets the asset.
    TargetsAsset(String),
    /// The policy or one of its rules covers the action.
    CoversAction(String),
}

impl QueryCondition {
    /// Evaluates the condition against a policy document.
    pub fn matches(&self, policy: &Policy) -> bool {
        match self {
            Self::UidEquals(uid) => policy.uid == *uid,
            Self::TypeEquals(policy_type) => policy.policy_type == *policy_type,
            Self::AssignerEquals(party) => policy.assigner.as_deref() == Some(party.as_str()),
            Self::AssigneeEquals(party) => policy.assignee.as_deref() == Some(party.as_str()),
            Self::TargetsAsset(asset) => {
                policy.target.iter().any(|t| t == asset)
                    || policy
                        .rules()
                        .any(|(_, _, rule)| rule.target.iter().any(|t| t == asset))
            }
            Self::CoversAction(action) => {
                policy.action.as_deref() == Some(action.as_str())
                    || policy
                        .rules()
                        .any(|(_, _, rule)| rule.action.iter().any(|a| a == action))
            }
        }
    }
}

// ============================================================================
// Query results
// ============================================================================

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    /// The policies on this page, in uid order.
    pub policies: Vec<Policy>,
    /// Opaque cursor for the next page, absent on the last page.
    pub cursor: Option<String>,
}

// ============================================================================
// PolicyStore
// ============================================================================

/// Storage backend for ODRL policy documents.
///
/// Implementations own the persisted policies; the decision engine only
/// borrows them for the duration of one evaluation.
pub trait PolicyStore: Send + Sync {
    /// Retrieves a policy by uid, or `None` when absent.
    fn get(&self, node_identity: &str, uid: &str) -> Result<Option<Policy>>;

    /// Stores a policy. A policy with the same uid is replaced.
    fn set(&self, node_identity: &str, policy: Policy) -> Result<()>;

    /// Removes a policy by uid. Returns whether a policy was removed.
    fn remove(&self, node_identity: &str, uid: &str) -> Result<bool>;

    /// Queries policies matching all of `conditions`, paginated.
    ///
    /// `cursor` is an opaque token from a previous page; `page_size` caps the
    /// page length (backends apply their own default when `None`).
    fn query(
        &self,
        node_identity: &str,
        conditions: &[QueryCondition],
        cursor: Option<&str>,
        page_size: Option<usize>,
    ) -> Result<QueryPage>;
}

// Shared handles delegate, so one store can back both the administration
// point and the decision engine's supply.
impl<S: PolicyStore + ?Sized> PolicyStore for std::sync::Arc<S> {
    fn get(&self, node_identity: &str, uid: &str) -> Result<Option<Policy>> {
        (**self).get(node_identity, uid)
    }

    fn set(&self, node_identity: &str, policy: Policy) -> Result<()> {
        (**self).set(node_identity, policy)
    }

    fn remove(&self, node_identity: &str, uid: &str) -> Result<bool> {
        (**self).remove(node_identity, uid)
    }

    fn query(
        &self,
        node_identity: &str,
        conditions: &[QueryCondition],
        cursor: Option<&str>,
        page_size: Option<usize>,
    ) -> Result<QueryPage> {
        (**self).query(node_identity, conditions, cursor, page_size)
    }
}
