//! Domain layer for the marketplace backend.
//!
//! This crate provides the validated entities and status state machines:
//! - User directory records with roles and the fraud flag
//! - Orders with independent fulfillment and payment status axes
//! - Payment records
//! - Role-elevation requests

pub mod error;
pub mod order;
pub mod payment;
pub mod role_request;
pub mod user;

pub use error::DomainError;
pub use order::{FulfillmentStatus, Order, OrderDraft, PaymentStatus};
pub use payment::Payment;
pub use role_request::{NewRoleRequest, RequestStatus, RequestType, RoleRequest};
pub use user::{ChefId, FraudStatus, NewUser, ProfileUpdate, Role, User};
