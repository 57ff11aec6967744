//! The action registry and obligation execution.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use peridot_odrl::RuleKind;
use tracing::{debug, info, warn};

use crate::action::{ActionContext, CancelToken, DecisionStage, PolicyAction};

/// One failed action callback within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    /// The action id whose callback failed.
    pub action_id: String,
    /// The failure cause reported by the callback.
    pub reason: String,
}

/// Outcome of one `execute_actions` run.
///
/// Failures never abort the run; every action referenced by an obligation
/// gets its chance unless cancellation fires first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Action ids whose callbacks completed successfully, in run order.
    pub executed: Vec<String>,
    /// Action ids that did not run: unregistered, or remaining after
    /// cancellation.
    pub skipped: Vec<String>,
    /// Callbacks that ran and failed.
    pub failures: Vec<ActionFailure>,
    /// True when cancellation cut the run short.
    pub cancelled: bool,
}

impl ExecutionReport {
    /// True when every action that ran succeeded and none were cancelled.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

struct RegisteredAction {
    stage: DecisionStage,
    callback: Arc<dyn PolicyAction>,
}

/// Maps action ids to registered callbacks.
///
/// Registration is expected at wiring time but remains safe at any point;
/// the table is behind a `RwLock` so concurrent intercepts read it without
/// contention.
#[derive(Default)]
pub struct ExecutionRegistry {
    actions: RwLock<HashMap<String, RegisteredAction>>,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for an action id at a stage. Registering the
    /// same id again replaces the previous callback.
    pub fn register_action(
        &self,
        action_id: impl Into<String>,
        stage: DecisionStage,
        callback: Arc<dyn PolicyAction>,
    ) {
        let action_id = action_id.into();
        debug!(action = %action_id, ?stage, "registering action");
        let mut actions = self
            .actions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        actions.insert(action_id, RegisteredAction { stage, callback });
    }

    /// Removes a registration. Unknown ids are a no-op.
    pub fn unregister_action(&self, action_id: &str) {
        let mut actions = self
            .actions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if actions.remove(action_id).is_none() {
            debug!(action = %action_id, "unregister of unknown action ignored");
        }
    }

    /// Runs every obligation-referenced action registered at `stage`.
    ///
    /// Walks the obligation rules of the supplied policies in order and
    /// executes each referenced action id. Unregistered ids are skipped with
    /// a warning. Ids registered at the other stage are left for that
    /// stage's run. Callback failures are collected, never propagated. The
    /// cancel token is checked between actions only.
    pub fn execute_actions(
        &self,
        stage: DecisionStage,
        context: &ActionContext,
        cancel: &CancelToken,
    ) -> ExecutionReport {
        // Snapshot under the read lock; callbacks run lock-free so a slow
        // action cannot block registration or concurrent runs.
        let mut runnable: Vec<(String, Arc<dyn PolicyAction>)> = Vec::new();
        let mut report = ExecutionReport::default();
        {
            let actions = self
                .actions
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            for policy in &context.policies {
                for (kind, _, rule) in policy.rules() {
                    if kind != RuleKind::Obligation {
                        continue;
                    }
                    for action_id in &rule.action {
                        match actions.get(action_id) {
                            Some(registered) if registered.stage == stage => {
                                runnable
                                    .push((action_id.clone(), Arc::clone(&registered.callback)));
                            }
                            Some(_) => {}
                            None => {
                                warn!(
                                    policy = %policy.uid,
                                    action = %action_id,
                                    "obligation references unregistered action"
                                );
                                report.skipped.push(action_id.clone());
                            }
                        }
                    }
                }
            }
        }

        for (action_id, callback) in runnable {
            if cancel.is_cancelled() {
                report.cancelled = true;
                report.skipped.push(action_id);
                continue;
            }
            match callback.execute(context) {
                Ok(()) => report.executed.push(action_id),
                Err(err) => {
                    warn!(action = %action_id, error = %err, "action callback failed");
                    report.failures.push(ActionFailure {
                        action_id,
                        reason: err.reason,
                    });
                }
            }
        }

        info!(
            ?stage,
            executed = report.executed.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            cancelled = report.cancelled,
            "obligation run complete"
        );
        report
    }
}
