//! Document-store collaborator for the marketplace backend.
//!
//! The store is the sole source of truth: no component keeps entity state
//! in memory between calls. Every state transition is exposed as an atomic
//! conditional update ("set status to X where status = Y") that reports
//! whether a document was affected; that discipline is the system's only
//! concurrency-safety mechanism.
//!
//! Two backends share the same traits: [`InMemoryStore`] for tests and the
//! default server, and [`PgStore`] for PostgreSQL deployments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{MarketStore, OrderStore, PaymentStore, RoleRequestStore, UserStore};
