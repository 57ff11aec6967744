//! # peridot-pap: Policy Administration Point
//!
//! Policy lifecycle management and the storage boundary for Peridot:
//!
//! - [`PolicyStore`]: the trait real storage backends implement
//!   (get/set/remove/query, node-identity-scoped)
//! - [`MemoryPolicyStore`]: deterministic in-memory reference backend
//! - [`AdministrationPoint`]: validate-then-store CRUD wrapper
//! - [`PolicySupply`] / [`StoreSupply`]: the narrowed candidate-fetch
//!   interface consumed by the decision engine
//!
//! ## Architecture
//!
//! ```text
//!   +----------------------+     +------------------------+
//!   | AdministrationPoint  |     | StoreSupply (PDP use)  |
//!   | store / retrieve /   |     | fetch_candidates       |
//!   | remove / query       |     +-----------+------------+
//!   +----------+-----------+                 |
//!              |                             |
//!              v                             v
//!   +-------------------------------------------------+
//!   | PolicyStore (trait), node-scoped tenancy        |
//!   +-------------------------------------------------+
//! ```

pub mod administration;
pub mod memory;
pub mod store;
pub mod supply;

pub use administration::{AdministrationPoint, PapError};
pub use memory::MemoryPolicyStore;
pub use store::{PolicyStore, QueryCondition, QueryPage, StoreError};
pub use supply::{PolicySupply, StoreSupply, SupplyError};
