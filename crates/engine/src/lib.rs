//! Lifecycle engine for the marketplace backend.
//!
//! The engine is the coupling point between the user directory, order
//! store, payment ledger, and role-request workflow. It validates caller
//! permissions, checks current state against the requested transition,
//! applies side effects, and returns the new state. It holds no entity
//! state of its own; the store is the sole source of truth.

pub mod error;
pub mod lifecycle;
pub mod provider;

pub use error::EngineError;
pub use lifecycle::{Decision, Identity, Lifecycle};
pub use provider::{CheckoutSession, InMemoryCheckoutProvider, PaymentProvider};
