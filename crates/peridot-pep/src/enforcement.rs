//! Request interception.

use std::sync::Arc;
use std::thread;

use peridot_pap::PolicySupply;
use peridot_pdp::{DecisionEngine, EvaluationRequest, InformationPoint};
use peridot_pxp::{ActionContext, CancelToken, DecisionStage, ExecutionRegistry};
use tracing::{info, warn};

use crate::error::{EnforcementError, Result};
use crate::transforms;

/// The Policy Enforcement Point.
///
/// Sits between a caller and a guarded resource: evaluates the request,
/// gates it on before-stage obligations, applies payload transforms, and
/// dispatches after-stage obligations detached from the caller. Each
/// intercept is an independent unit of work; the only shared state is the
/// read-only store behind the engine and the action registry table.
pub struct EnforcementPoint<S, I> {
    engine: DecisionEngine<S, I>,
    registry: Arc<ExecutionRegistry>,
}

impl<S: PolicySupply, I: InformationPoint> EnforcementPoint<S, I> {
    pub fn new(engine: DecisionEngine<S, I>, registry: Arc<ExecutionRegistry>) -> Self {
        Self { engine, registry }
    }

    /// The shared action registry.
    pub fn registry(&self) -> &Arc<ExecutionRegistry> {
        &self.registry
    }

    /// The decision engine behind this enforcement point.
    pub fn engine(&self) -> &DecisionEngine<S, I> {
        &self.engine
    }

    /// Intercepts a request without external cancellation.
    pub fn intercept(&self, request: &EvaluationRequest) -> Result<Option<serde_json::Value>> {
        self.intercept_with_cancel(request, &CancelToken::new())
    }

    /// Intercepts a request, returning the (possibly transformed) payload on
    /// allow.
    ///
    /// Deny is a bare [`EnforcementError::AccessDenied`]; the reasons are
    /// written to the audit log only. Obligations of the applicable policies
    /// still run on a deny (duties such as audit logging bind regardless of
    /// outcome), detached and without affecting the result. Before-stage
    /// obligation failure or cancellation on the allow path also denies.
    /// After-stage obligations run on a detached thread with their own
    /// cancel token, unaffected by `cancel`.
    pub fn intercept_with_cancel(
        &self,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<Option<serde_json::Value>> {
        let verdict = self.engine.evaluate(request)?;

        if !verdict.is_allowed() {
            warn!(
                action = %request.action,
                asset_type = %request.asset_type,
                user = %request.user_identity,
                prohibitions = verdict.prohibitions().count(),
                policies = verdict.policies.len(),
                "access denied"
            );
            // Duties can bind on refusal as well (audit trails, denial
            // notifications). Both stages run detached; their failures are
            // logged by the registry and never alter the deny.
            let context = ActionContext {
                asset_type: request.asset_type.clone(),
                action: request.action.clone(),
                data: request.data.clone(),
                user_identity: request.user_identity.clone(),
                node_identity: request.node_identity.clone(),
                policies: verdict.policies.clone(),
            };
            let registry = Arc::clone(&self.registry);
            thread::spawn(move || {
                let cancel = CancelToken::new();
                registry.execute_actions(DecisionStage::Before, &context, &cancel);
                registry.execute_actions(DecisionStage::After, &context, &cancel);
            });
            return Err(EnforcementError::AccessDenied);
        }

        let mut context = ActionContext {
            asset_type: request.asset_type.clone(),
            action: request.action.clone(),
            data: request.data.clone(),
            user_identity: request.user_identity.clone(),
            node_identity: request.node_identity.clone(),
            policies: verdict.policies.clone(),
        };

        // Before-stage obligations are preconditions of the grant.
        let before = self
            .registry
            .execute_actions(DecisionStage::Before, &context, cancel);
        if !before.is_clean() {
            warn!(
                action = %request.action,
                user = %request.user_identity,
                failed = before.failures.len(),
                cancelled = before.cancelled,
                "before-stage obligations did not complete, denying"
            );
            return Err(EnforcementError::AccessDenied);
        }

        let data = request.data.clone().map(|payload| {
            transforms::apply(
                payload,
                verdict.permissions().flat_map(|m| &m.rule.transform),
            )
        });

        info!(
            action = %request.action,
            asset_type = %request.asset_type,
            user = %request.user_identity,
            transformed = data.is_some(),
            "access granted"
        );

        // After-stage obligations see the transformed payload and outlive
        // the caller; their failures are logged by the registry, never
        // surfaced here.
        context.data = data.clone();
        let registry = Arc::clone(&self.registry);
        thread::spawn(move || {
            registry.execute_actions(DecisionStage::After, &context, &CancelToken::new());
        });

        Ok(data)
    }
}
