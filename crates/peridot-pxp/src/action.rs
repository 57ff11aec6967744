//! Action callbacks and their execution context.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use peridot_odrl::Policy;
use thiserror::Error;

/// When, relative to resource access, an action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionStage {
    /// Runs synchronously before access is granted; failure blocks access.
    Before,
    /// Runs after access, detached from the caller; failure is logged only.
    After,
}

/// One action callback's failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action execution failed: {reason}")]
pub struct ActionError {
    /// Human-readable failure cause, surfaced in the execution report.
    pub reason: String,
}

impl ActionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// What an executing action gets to see.
///
/// Everything is owned so the context can cross a thread boundary for
/// after-stage dispatch.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Asset type of the intercepted request.
    pub asset_type: String,
    /// The requested action identifier.
    pub action: String,
    /// The request payload, if any.
    pub data: Option<serde_json::Value>,
    /// Identity of the requesting user.
    pub user_identity: String,
    /// Identity of the node answering the request.
    pub node_identity: String,
    /// The policies that applied to the request; execution walks their
    /// obligation rules.
    pub policies: Vec<Policy>,
}

/// A registered obligation callback.
///
/// Implementations must tolerate concurrent invocation; the registry only
/// holds its read lock while snapshotting the table, not while running
/// callbacks.
pub trait PolicyAction: Send + Sync {
    /// Performs the action. Errors are collected per action and never abort
    /// sibling actions.
    fn execute(&self, context: &ActionContext) -> Result<(), ActionError>;
}

/// Adapts a closure into a [`PolicyAction`].
pub struct FnPolicyAction<F>(F);

impl<F> FnPolicyAction<F>
where
    F: Fn(&ActionContext) -> Result<(), ActionError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PolicyAction for FnPolicyAction<F>
where
    F: Fn(&ActionContext) -> Result<(), ActionError> + Send + Sync,
{
    fn execute(&self, context: &ActionContext) -> Result<(), ActionError> {
        (self.0)(context)
    }
}

/// Cooperative cancellation flag for an execution run.
///
/// Checked between actions only; a running callback is never interrupted.
/// Clones share the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the remaining actions.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
