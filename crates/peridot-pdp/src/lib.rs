//! Policy Decision Point for the Peridot rights-management core.
//!
//! Turns an authorization request into a structured [`Verdict`] by combining
//! three stages:
//!
//! ```text
//!   EvaluationRequest
//!         |
//!         v
//!   +-------------+     +--------------+     +--------------+
//!   | candidate   | --> | rule         | --> | conflict     | --> Verdict
//!   | supply (PAP)|     | matcher      |     | resolver     |
//!   +-------------+     +--------------+     +--------------+
//!                              ^
//!                              |
//!                       AttributeBag (PIP)
//! ```
//!
//! The engine is fail-closed at every layer: no candidate policies means
//! deny, an unresolvable constraint operand means the constraint is not
//! satisfied, and a surviving prohibition anywhere denies. The only fatal
//! errors are an unreachable store and an unresolvable conflict inside a
//! policy whose strategy forbids resolution; everything else degrades into
//! verdict warnings.
//!
//! # Example
//!
//! ```
//! use peridot_odrl::{Policy, Rule};
//! use peridot_pap::{MemoryPolicyStore, PolicyStore, StoreSupply};
//! use peridot_pdp::{DecisionEngine, EvaluationRequest, NoInformationPoint};
//!
//! let store = MemoryPolicyStore::new();
//! store.set(
//!     "did:example:node",
//!     Policy::new("urn:policy:1").with_permission(Rule::new("asset/1", "use")),
//! )?;
//!
//! let engine = DecisionEngine::new(StoreSupply::new(store), NoInformationPoint);
//! let request = EvaluationRequest::new("doc", "use", "did:example:user", "did:example:node")
//!     .with_target("asset/1");
//!
//! let verdict = engine.evaluate(&request)?;
//! assert!(verdict.is_allowed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod attributes;
mod engine;
mod error;
mod matcher;
mod resolver;
mod verdict;

pub use attributes::{
    Attribute, AttributeBag, AttributeError, EvaluationRequest, InformationPoint,
    NoInformationPoint, StaticInformationPoint,
};
pub use engine::DecisionEngine;
pub use error::{EvaluationError, Result};
pub use verdict::{MatchedRule, Verdict};
