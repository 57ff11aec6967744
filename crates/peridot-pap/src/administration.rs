//! The Policy Administration Point.
//!
//! A thin CRUD wrapper over a [`PolicyStore`] that validates documents before
//! persistence and clamps query page sizes. Carries no evaluation logic.

use peridot_odrl::{Policy, ValidationError};
use thiserror::Error;
use tracing::{debug, info};

use crate::store::{PolicyStore, QueryCondition, QueryPage, StoreError};

/// Maximum (and default) number of policies returned per query page.
const MAX_QUERY_RESULTS: usize = 100;

/// Errors reported by administration operations.
#[derive(Debug, Error)]
pub enum PapError {
    /// No policy exists with the requested uid.
    #[error("policy not found: {uid}")]
    NotFound {
        /// The uid that was requested.
        uid: String,
    },

    /// The policy document failed validation and was rejected before
    /// persistence.
    #[error("policy validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for administration operations.
pub type Result<T> = std::result::Result<T, PapError>;

/// The Policy Administration Point.
pub struct AdministrationPoint<S> {
    store: S,
    max_query_results: usize,
}

impl<S: PolicyStore> AdministrationPoint<S> {
    /// Creates an administration point over a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_query_results: MAX_QUERY_RESULTS,
        }
    }

    /// Overrides the query page-size cap (clamped to at least 1).
    pub fn with_max_query_results(mut self, max: usize) -> Self {
        self.max_query_results = max.max(1);
        self
    }

    /// Validates and stores a policy. A policy with the same uid is replaced.
    pub fn store_policy(&self, node_identity: &str, policy: Policy) -> Result<()> {
        policy.validate()?;
        info!(uid = %policy.uid, node = %node_identity, "policy stored");
        self.store.set(node_identity, policy)?;
        Ok(())
    }

    /// Retrieves a policy by uid.
    pub fn retrieve(&self, node_identity: &str, uid: &str) -> Result<Policy> {
        self.store
            .get(node_identity, uid)?
            .ok_or_else(|| PapError::NotFound {
                uid: uid.to_string(),
            })
    }

    /// Removes a policy by uid.
    pub fn remove_policy(&self, node_identity: &str, uid: &str) -> Result<()> {
        if self.store.remove(node_identity, uid)? {
            info!(uid = %uid, node = %node_identity, "policy removed");
            Ok(())
        } else {
            Err(PapError::NotFound {
                uid: uid.to_string(),
            })
        }
    }

    /// Queries policies with optional conditions and pagination.
    ///
    /// The effective page size is the caller's, clamped to the configured cap.
    pub fn query(
        &self,
        node_identity: &str,
        conditions: &[QueryCondition],
        cursor: Option<&str>,
        page_size: Option<usize>,
    ) -> Result<QueryPage> {
        let page_size = page_size
            .map_or(self.max_query_results, |s| s.min(self.max_query_results));
        let page = self
            .store
            .query(node_identity, conditions, cursor, Some(page_size))?;
        debug!(
            node = %node_identity,
            results = page.policies.len(),
            has_more = page.cursor.is_some(),
            "policy query"
        );
        Ok(page)
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
