//! The Policy Decision Point.
//!
//! Orchestrates candidate supply, attribute retrieval, rule matching, and
//! conflict resolution. Stateless across calls: every evaluation is an
//! independent unit of work with no shared mutable state beyond the
//! read-only store behind the supply.

use peridot_pap::PolicySupply;
use tracing::{info, warn};

use crate::attributes::{AttributeBag, EvaluationRequest, InformationPoint};
use crate::error::Result;
use crate::{matcher, resolver};
use crate::verdict::Verdict;

/// The decision engine.
///
/// Dependencies are injected as typed interfaces at wiring time; there is no
/// runtime component lookup.
pub struct DecisionEngine<S, I> {
    supply: S,
    information_point: I,
}

impl<S: PolicySupply, I: InformationPoint> DecisionEngine<S, I> {
    /// Creates an engine over a candidate supply and an information point.
    pub fn new(supply: S, information_point: I) -> Self {
        Self {
            supply,
            information_point,
        }
    }

    /// Evaluates one authorization request.
    ///
    /// Fatal failures (`StoreUnavailable`, `ConflictUnresolved`) abort with
    /// no partial verdict. Malformed candidate policies and degraded
    /// attribute retrieval are recorded as warnings on the verdict instead.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<Verdict> {
        let mut candidates = self.supply.fetch_candidates(
            &request.asset_type,
            &request.action,
            &request.user_identity,
            &request.node_identity,
        )?;
        // The supply contract orders by uid; re-sorting here keeps verdicts
        // deterministic even over a non-conforming backend.
        candidates.sort_by(|a, b| a.uid.cmp(&b.uid));

        let mut warnings = Vec::new();
        let attributes = match self.information_point.retrieve(request) {
            Ok(attrs) => AttributeBag::from_attributes(attrs),
            Err(err) => {
                warn!(error = %err, "attribute retrieval degraded; constraints will fail closed");
                warnings.push(format!("attribute retrieval degraded: {err}"));
                AttributeBag::new()
            }
        };

        let mut per_policy = Vec::with_capacity(candidates.len());
        for policy in candidates {
            let matches = matcher::match_policy(&policy, request, &attributes, &mut warnings);
            if !matches.is_empty() {
                per_policy.push((policy, matches));
            }
        }

        let mut verdict = resolver::resolve(&per_policy)?;
        verdict.warnings = warnings;

        info!(
            action = %request.action,
            asset_type = %request.asset_type,
            user = %request.user_identity,
            node = %request.node_identity,
            allow = verdict.allow,
            matched = verdict.matches.len(),
            "evaluation complete"
        );

        Ok(verdict)
    }
}
