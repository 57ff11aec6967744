//! Policy Enforcement Point for the Peridot rights-management core.
//!
//! The enforcement point is the one component callers talk to on the data
//! path:
//!
//! ```text
//!   caller --> intercept --> PDP evaluate --> before obligations (gate)
//!                                |                   |
//!                              deny?             transforms
//!                                |                   |
//!                          AccessDenied       after obligations (detached)
//!                                                    |
//!                                              transformed payload
//! ```
//!
//! A refused caller learns nothing beyond "access denied"; which policies
//! applied and why is audit-log material only.

mod enforcement;
mod error;
mod transforms;

pub use enforcement::EnforcementPoint;
pub use error::{EnforcementError, Result};
pub use transforms::apply as apply_transforms;
