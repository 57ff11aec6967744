//! Policy Execution Point for the Peridot rights-management core.
//!
//! Obligation rules reference actions by id; this crate holds the registry
//! that binds those ids to callbacks and runs them at the right stage:
//! before-stage actions gate access, after-stage actions run detached from
//! the caller. Callbacks are isolated from one another; a single failure is
//! reported, never propagated.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use peridot_odrl::{Policy, Rule};
//! use peridot_pxp::{
//!     ActionContext, CancelToken, DecisionStage, ExecutionRegistry, FnPolicyAction,
//! };
//!
//! let registry = ExecutionRegistry::new();
//! registry.register_action(
//!     "audit",
//!     DecisionStage::Before,
//!     Arc::new(FnPolicyAction::new(|_ctx: &ActionContext| Ok(()))),
//! );
//!
//! let context = ActionContext {
//!     asset_type: "doc".to_string(),
//!     action: "use".to_string(),
//!     data: None,
//!     user_identity: "did:example:user".to_string(),
//!     node_identity: "did:example:node".to_string(),
//!     policies: vec![Policy::new("urn:policy:1").with_obligation(Rule::for_action("audit"))],
//! };
//!
//! let report = registry.execute_actions(DecisionStage::Before, &context, &CancelToken::new());
//! assert_eq!(report.executed, vec!["audit"]);
//! ```

mod action;
mod registry;

pub use action::{
    ActionContext, ActionError, CancelToken, DecisionStage, FnPolicyAction, PolicyAction,
};
pub use registry::{ActionFailure, ExecutionRegistry, ExecutionReport};
