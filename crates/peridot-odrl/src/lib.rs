//! # peridot-odrl: ODRL policy data model
//!
//! Structured types for Open Digital Rights Language (ODRL) policies:
//! permissions, prohibitions, and obligations over assets, with typed
//! constraints and per-policy conflict strategies.
//!
//! The model is the domain representation used by the decision and
//! enforcement points; serialization (serde/JSON) happens only at the
//! storage and transport boundaries. Sub-objects are proper tagged unions,
//! not serialized strings.
//!
//! ## Examples
//!
//! ```
//! use peridot_odrl::{Constraint, ConstraintValue, Operator, Policy, Rule};
//!
//! let policy = Policy::new("urn:policy:quota")
//!     .with_permission(
//!         Rule::new("asset/1", "use")
//!             .with_constraint(Constraint::new("count", Operator::Lteq, 5)),
//!     )
//!     .with_obligation(Rule::for_action("notify"));
//!
//! assert!(policy.validate().is_ok());
//! ```

pub mod constraint;
pub mod policy;
pub mod rule;

pub use constraint::{Constraint, ConstraintValue, Operator};
pub use policy::{ConflictStrategy, Policy, PolicyType, ValidationError};
pub use rule::{Rule, RuleKind, Transform};
