//! Candidate supply for the decision engine.
//!
//! [`PolicySupply`] narrows the full store interface into the single
//! operation the PDP needs: fetch the policies whose scope could apply to a
//! request. The supply pre-filters at the store level where the store
//! supports it, but never guarantees full filtering; the rule matcher
//! re-checks every returned policy.

use peridot_odrl::Policy;
use thiserror::Error;
use tracing::debug;

use crate::store::{PolicyStore, QueryCondition, StoreError};

/// Errors reported while fetching candidates.
#[derive(Debug, Error)]
pub enum SupplyError {
    /// The policy store cannot be reached.
    ///
    /// Fatal to the current evaluation; no partial verdict is produced.
    #[error("policy store unavailable: {reason}")]
    StoreUnavailable {
        /// Backend-specific failure description.
        reason: String,
    },
}

impl From<StoreError> for SupplyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable { reason } => Self::StoreUnavailable { reason },
            // The supply only replays cursors the store itself issued, so a
            // rejected cursor here means the backend is broken.
            StoreError::InvalidCursor { cursor } => Self::StoreUnavailable {
                reason: format!("store rejected its own cursor: {cursor:?}"),
            },
        }
    }
}

/// Supplies candidate policies for one evaluation.
pub trait PolicySupply: Send + Sync {
    /// Returns the candidate policies for a request, ordered by uid.
    ///
    /// Returns an empty vec (never an error) when the node has no policies.
    fn fetch_candidates(
        &self,
        asset_type: &str,
        action: &str,
        user_identity: &str,
        node_identity: &str,
    ) -> Result<Vec<Policy>, SupplyError>;
}

/// A [`PolicySupply`] backed by a [`PolicyStore`].
///
/// Filters by node identity (policies are node-scoped) and pre-filters by
/// action; pages through the store until the candidate set is complete.
pub struct StoreSupply<S> {
    store: S,
}

impl<S: PolicyStore> StoreSupply<S> {
    /// Creates a supply over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: PolicyStore> PolicySupply for StoreSupply<S> {
    fn fetch_candidates(
        &self,
        asset_type: &str,
        action: &str,
        _user_identity: &str,
        node_identity: &str,
    ) -> Result<Vec<Policy>, SupplyError> {
        let conditions = [QueryCondition::CoversAction(action.to_string())];

        let mut candidates = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .store
                .query(node_identity, &conditions, cursor.as_deref(), None)?;
            candidates.extend(page.policies);
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        // Store backends may return in any order; the resolver requires
        // uid-ordered input for deterministic verdicts.
        candidates.sort_by(|a, b| a.uid.cmp(&b.uid));

        debug!(
            node = %node_identity,
            asset_type = %asset_type,
            action = %action,
            candidates = candidates.len(),
            "fetched candidate policies"
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPolicyStore;
    use peridot_odrl::Rule;

    const NODE: &str = "did:example:node";
    const USER: &str = "did:example:user";

    #[test]
    fn empty_store_yields_empty_candidates() {
        let supply = StoreSupply::new(MemoryPolicyStore::new());
        let candidates = supply
            .fetch_candidates("doc", "use", USER, NODE)
            .expect("fetch");
        assert!(candidates.is_empty());
    }

    #[test]
    fn candidates_are_prefiltered_by_action_and_ordered_by_uid() {
        let store = MemoryPolicyStore::new();
        store
            .set(
                NODE,
                Policy::new("urn:policy:b").with_permission(Rule::new("asset/1", "use")),
            )
            .expect("set");
        store
            .set(
                NODE,
                Policy::new("urn:policy:a").with_prohibition(Rule::new("asset/1", "use")),
            )
            .expect("set");
        store
            .set(
                NODE,
                Policy::new("urn:policy:c").with_permission(Rule::new("asset/1", "share")),
            )
            .expect("set");

        let supply = StoreSupply::new(store);
        let candidates = supply
            .fetch_candidates("doc", "use", USER, NODE)
            .expect("fetch");

        let uids: Vec<&str> = candidates.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["urn:policy:a", "urn:policy:b"]);
    }

    #[test]
    fn candidates_are_node_scoped() {
        let store = MemoryPolicyStore::new();
        store
            .set(
                "did:example:other-node",
                Policy::new("urn:policy:1").with_permission(Rule::new("asset/1", "use")),
            )
            .expect("set");

        let supply = StoreSupply::new(store);
        let candidates = supply
            .fetch_candidates("doc", "use", USER, NODE)
            .expect("fetch");
        assert!(candidates.is_empty());
    }

    #[test]
    fn pages_are_exhausted() {
        let store = MemoryPolicyStore::new();
        // More policies than one default page.
        for i in 0..150 {
            store
                .set(
                    NODE,
                    Policy::new(format!("urn:policy:{i:03}"))
                        .with_permission(Rule::new("asset/1", "use")),
                )
                .expect("set");
        }

        let supply = StoreSupply::new(store);
        let candidates = supply
            .fetch_candidates("doc", "use", USER, NODE)
            .expect("fetch");
        assert_eq!(candidates.len(), 150);
    }
}
