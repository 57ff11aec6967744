//! Enforcement errors surfaced to callers.

use peridot_pdp::EvaluationError;
use thiserror::Error;

/// Errors returned by an intercept.
///
/// `AccessDenied` deliberately carries no policy detail: the applicable
/// policies and rules are an enumeration side channel a refused caller must
/// not see. Full detail goes to the audit log instead.
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// The request was refused.
    #[error("access denied")]
    AccessDenied,

    /// Evaluation itself failed before a decision could be made.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// Result type for enforcement.
pub type Result<T> = std::result::Result<T, EnforcementError>;
