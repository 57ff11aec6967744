//! In-memory policy store.
//!
//! Reference backend used for tests and embedded deployments. Policies are
//! keyed by `(node identity, uid)` in a `BTreeMap`, so iteration (and
//! therefore query pagination) is deterministic by uid.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use peridot_odrl::Policy;

use crate::store::{PolicyStore, QueryCondition, QueryPage, Result, StoreError};

/// Default page size for queries when the caller does not supply one.
const DEFAULT_PAGE_SIZE: usize = 100;

/// An in-memory, node-scoped policy store.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    policies: RwLock<BTreeMap<(String, String), Policy>>,
}

impl MemoryPolicyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of policies held for a node.
    pub fn len(&self, node_identity: &str) -> usize {
        self.policies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|(node, _)| node == node_identity)
            .count()
    }

    /// True when the node has no policies.
    pub fn is_empty(&self, node_identity: &str) -> bool {
        self.len(node_identity) == 0
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn get(&self, node_identity: &str, uid: &str) -> Result<Option<Policy>> {
        let policies = self.policies.read().unwrap_or_else(PoisonError::into_inner);
        Ok(policies
            .get(&(node_identity.to_string(), uid.to_string()))
            .cloned())
    }

    fn set(&self, node_identity: &str, policy: Policy) -> Result<()> {
        let mut policies = self.policies.write().unwrap_or_else(PoisonError::into_inner);
        policies.insert((node_identity.to_string(), policy.uid.clone()), policy);
        Ok(())
    }

    fn remove(&self, node_identity: &str, uid: &str) -> Result<bool> {
        let mut policies = self.policies.write().unwrap_or_else(PoisonError::into_inner);
        Ok(policies
            .remove(&(node_identity.to_string(), uid.to_string()))
            .is_some())
    }

    fn query(
        &self,
        node_identity: &str,
        conditions: &[QueryCondition],
        cursor: Option<&str>,
        page_size: Option<usize>,
    ) -> Result<QueryPage> {
        let offset = match cursor {
            None => 0,
            Some(raw) => raw.parse::<usize>().map_err(|_| StoreError::InvalidCursor {
                cursor: raw.to_string(),
            })?,
        };
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let policies = self.policies.read().unwrap_or_else(PoisonError::into_inner);
        let matching: Vec<&Policy> = policies
            .iter()
            .filter(|((node, _), _)| node == node_identity)
            .map(|(_, policy)| policy)
            .filter(|policy| conditions.iter().all(|c| c.matches(policy)))
            .collect();

        let page: Vec<Policy> = matching
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|p| (*p).clone())
            .collect();

        let next = offset + page.len();
        let cursor = (next < matching.len()).then(|| next.to_string());

        Ok(QueryPage { policies: page, cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(node: &str, uids: &[&str]) -> MemoryPolicyStore {
        let store = MemoryPolicyStore::new();
        for uid in uids {
            store
                .set(node, Policy::new(*uid))
                .expect("memory store set");
        }
        store
    }

    #[test]
    fn get_set_remove_roundtrip() {
        let store = MemoryPolicyStore::new();
        let policy = Policy::new("urn:policy:1");

        store.set("node-a", policy.clone()).expect("set");
        assert_eq!(store.get("node-a", "urn:policy:1").expect("get"), Some(policy));

        assert!(store.remove("node-a", "urn:policy:1").expect("remove"));
        assert!(!store.remove("node-a", "urn:policy:1").expect("second remove"));
        assert_eq!(store.get("node-a", "urn:policy:1").expect("get"), None);
    }

    #[test]
    fn set_replaces_same_uid() {
        let store = MemoryPolicyStore::new();
        store
            .set("node-a", Policy::new("urn:policy:1"))
            .expect("set");
        let replacement = Policy::new("urn:policy:1").with_target("asset/1");
        store.set("node-a", replacement.clone()).expect("replace");

        assert_eq!(store.len("node-a"), 1);
        assert_eq!(
            store.get("node-a", "urn:policy:1").expect("get"),
            Some(replacement)
        );
    }

    #[test]
    fn nodes_are_isolated() {
        let store = store_with("node-a", &["urn:policy:1"]);
        assert_eq!(store.get("node-b", "urn:policy:1").expect("get"), None);
        assert!(store.is_empty("node-b"));

        let page = store.query("node-b", &[], None, None).expect("query");
        assert!(page.policies.is_empty());
        assert!(page.cursor.is_none());
    }

    #[test]
    fn query_returns_uid_order() {
        let store = store_with("node-a", &["urn:policy:c", "urn:policy:a", "urn:policy:b"]);
        let page = store.query("node-a", &[], None, None).expect("query");
        let uids: Vec<&str> = page.policies.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, vec!["urn:policy:a", "urn:policy:b", "urn:policy:c"]);
    }

    #[test]
    fn query_paginates_with_cursor() {
        let store = store_with("node-a", &["urn:policy:a", "urn:policy:b", "urn:policy:c"]);

        let first = store.query("node-a", &[], None, Some(2)).expect("page 1");
        assert_eq!(first.policies.len(), 2);
        let cursor = first.cursor.expect("cursor for next page");

        let second = store
            .query("node-a", &[], Some(&cursor), Some(2))
            .expect("page 2");
        assert_eq!(second.policies.len(), 1);
        assert_eq!(second.policies[0].uid, "urn:policy:c");
        assert!(second.cursor.is_none());
    }

    #[test]
    fn query_rejects_malformed_cursor() {
        let store = store_with("node-a", &["urn:policy:a"]);
        let result = store.query("node-a", &[], Some("not-a-number"), None);
        assert!(matches!(
            result,
            Err(StoreError::InvalidCursor { ref cursor }) if cursor == "not-a-number"
        ));
    }

    #[test]
    fn query_applies_conditions() {
        let store = MemoryPolicyStore::new();
        store
            .set(
                "node-a",
                Policy::new("urn:policy:1")
                    .with_permission(peridot_odrl::Rule::new("asset/1", "use")),
            )
            .expect("set");
        store
            .set(
                "node-a",
                Policy::new("urn:policy:2")
                    .with_permission(peridot_odrl::Rule::new("asset/2", "share")),
            )
            .expect("set");

        let page = store
            .query(
                "node-a",
                &[QueryCondition::CoversAction("use".to_string())],
                None,
                None,
            )
            .expect("query");
        assert_eq!(page.policies.len(), 1);
        assert_eq!(page.policies[0].uid, "urn:policy:1");
    }
}
