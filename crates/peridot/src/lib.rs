//! Peridot: an ODRL rights-management authorization core.
//!
//! Policies are ODRL documents (permissions, prohibitions, obligations with
//! constraints); enforcement follows the XACML point architecture:
//!
//! ```text
//!                 +---------------------------+
//!   admin ------> | PAP   policy CRUD + store |
//!                 +-------------+-------------+
//!                               |
//!                               v
//!   caller -----> +-----------------------------+
//!     intercept   | PEP   gate, transform, dispatch
//!                 +------+---------------+------+
//!                        |               |
//!                        v               v
//!                 +-----------+   +-------------+
//!                 | PDP       |   | PXP         |
//!                 | evaluate  |   | obligations |
//!                 +-----+-----+   +-------------+
//!                       |
//!                       v
//!                 +-----------+
//!                 | PIP       |
//!                 | attributes|
//!                 +-----------+
//! ```
//!
//! [`RightsManagement`] wires the points together over one policy store and
//! one attribute source; everything is explicit dependency injection, no
//! runtime component lookup. The core is fail-closed throughout: no policy
//! means deny, unresolvable constraint operands mean not satisfied, and a
//! refused caller only ever sees a generic denial.
//!
//! # Example
//!
//! ```
//! use peridot::{EvaluationRequest, Policy, RightsManagement, Rule};
//!
//! let rm = RightsManagement::in_memory();
//! rm.pap_store(
//!     "did:example:node",
//!     Policy::new("urn:policy:1").with_permission(Rule::new("asset/1", "use")),
//! )?;
//!
//! let request = EvaluationRequest::new("doc", "use", "did:example:user", "did:example:node")
//!     .with_target("asset/1");
//! assert!(rm.intercept(&request).is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;

use peridot_pap::{AdministrationPoint, StoreSupply};
use peridot_pdp::DecisionEngine;
use peridot_pep::EnforcementPoint;
use peridot_pxp::ExecutionRegistry;

pub use peridot_odrl::{
    ConflictStrategy, Constraint, ConstraintValue, Operator, Policy, PolicyType, Rule, RuleKind,
    Transform, ValidationError,
};
pub use peridot_pap::{
    MemoryPolicyStore, PapError, PolicyStore, PolicySupply, QueryCondition, QueryPage, StoreError,
    SupplyError,
};
pub use peridot_pdp::{
    Attribute, AttributeBag, AttributeError, EvaluationError, EvaluationRequest, InformationPoint,
    MatchedRule, NoInformationPoint, StaticInformationPoint, Verdict,
};
pub use peridot_pep::{EnforcementError, apply_transforms};
pub use peridot_pxp::{
    ActionContext, ActionError, ActionFailure, CancelToken, DecisionStage, ExecutionReport,
    FnPolicyAction, PolicyAction,
};

/// The assembled rights-management service.
///
/// One store backs both administration and evaluation; one registry backs
/// obligation execution. The service itself is `Send + Sync` and intended
/// to be shared across request-handling threads.
pub struct RightsManagement<S, I> {
    pap: AdministrationPoint<Arc<S>>,
    pep: EnforcementPoint<StoreSupply<Arc<S>>, I>,
}

impl RightsManagement<MemoryPolicyStore, NoInformationPoint> {
    /// A self-contained service over the in-memory store with no external
    /// attribute source.
    pub fn in_memory() -> Self {
        Self::new(MemoryPolicyStore::new(), NoInformationPoint)
    }
}

impl<S: PolicyStore, I: InformationPoint> RightsManagement<S, I> {
    /// Wires the points over a store and an information point.
    pub fn new(store: S, information_point: I) -> Self {
        let store = Arc::new(store);
        let pap = AdministrationPoint::new(Arc::clone(&store));
        let engine = DecisionEngine::new(StoreSupply::new(store), information_point);
        let pep = EnforcementPoint::new(engine, Arc::new(ExecutionRegistry::new()));
        Self { pap, pep }
    }

    // ------------------------------------------------------------------
    // PAP
    // ------------------------------------------------------------------

    /// Validates and stores a policy for a node.
    pub fn pap_store(&self, node_identity: &str, policy: Policy) -> Result<(), PapError> {
        self.pap.store_policy(node_identity, policy)
    }

    /// Retrieves a policy by uid.
    pub fn pap_retrieve(&self, node_identity: &str, uid: &str) -> Result<Policy, PapError> {
        self.pap.retrieve(node_identity, uid)
    }

    /// Removes a policy by uid.
    pub fn pap_remove(&self, node_identity: &str, uid: &str) -> Result<(), PapError> {
        self.pap.remove_policy(node_identity, uid)
    }

    /// Queries policies with optional conditions and pagination.
    pub fn pap_query(
        &self,
        node_identity: &str,
        conditions: &[QueryCondition],
        cursor: Option<&str>,
        page_size: Option<usize>,
    ) -> Result<QueryPage, PapError> {
        self.pap.query(node_identity, conditions, cursor, page_size)
    }

    // ------------------------------------------------------------------
    // PDP / PEP
    // ------------------------------------------------------------------

    /// Evaluates a request without enforcing it.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<Verdict, EvaluationError> {
        self.pep.engine().evaluate(request)
    }

    /// Intercepts a request, returning the (possibly transformed) payload on
    /// allow.
    pub fn intercept(
        &self,
        request: &EvaluationRequest,
    ) -> Result<Option<serde_json::Value>, EnforcementError> {
        self.pep.intercept(request)
    }

    /// Intercepts with a caller-held cancel token for the before stage.
    pub fn intercept_with_cancel(
        &self,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<Option<serde_json::Value>, EnforcementError> {
        self.pep.intercept_with_cancel(request, cancel)
    }

    // ------------------------------------------------------------------
    // PXP
    // ------------------------------------------------------------------

    /// Registers an obligation action callback. The last registration for
    /// an id wins.
    pub fn register_action(
        &self,
        action_id: impl Into<String>,
        stage: DecisionStage,
        callback: Arc<dyn PolicyAction>,
    ) {
        self.pep.registry().register_action(action_id, stage, callback);
    }

    /// Removes an action registration. Unknown ids are a no-op.
    pub fn unregister_action(&self, action_id: &str) {
        self.pep.registry().unregister_action(action_id);
    }
}
