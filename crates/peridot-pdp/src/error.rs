//! Decision-path errors.
//!
//! Both variants are fatal to the current evaluation: no partial verdict is
//! ever produced. Data-quality problems (malformed rules, degraded attribute
//! retrieval) are not errors; they surface as warnings on the verdict.

use peridot_pap::SupplyError;
use thiserror::Error;

/// Errors aborting one evaluation.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The policy store cannot be reached. Retry policy is the caller's
    /// responsibility; the core surfaces the failure immediately.
    #[error(transparent)]
    StoreUnavailable(#[from] SupplyError),

    /// A policy with the `invalid` conflict strategy has both a permission
    /// and a prohibition matching the same request. Surfaced distinctly so
    /// callers can alert rather than silently deny.
    #[error("unresolvable permission/prohibition conflict in policy {policy_uid}")]
    ConflictUnresolved {
        /// The policy whose strategy forbids resolution.
        policy_uid: String,
    },
}

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, EvaluationError>;
