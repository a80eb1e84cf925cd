//! Store traits implemented by every backend.
//!
//! Methods that perform a state transition return `bool`: `true` when a
//! document matched the condition and was updated, `false` when nothing
//! matched. Callers translate `false` into the appropriate conflict or
//! precondition error; the store itself never decides legality.

use async_trait::async_trait;
use common::{OrderId, RequestId, UserId};
use domain::{
    ChefId, FulfillmentStatus, Order, Payment, ProfileUpdate, RequestStatus, Role, RoleRequest,
    User,
};

use crate::error::Result;

/// Per-user role and fraud status, consulted by every gated operation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user unless a record with the same email exists.
    ///
    /// Returns `false` (and writes nothing) when the email is taken.
    async fn insert_user_if_absent(&self, user: &User) -> Result<bool>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Applies a non-privileged profile update. Returns `false` when no
    /// record with that email exists.
    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<bool>;

    /// One-way fraud flag. Returns `false` when the user is absent.
    async fn set_fraud(&self, id: UserId) -> Result<bool>;

    /// Sets role and chef identifier as a single write. Returns `false`
    /// when the user is absent.
    async fn set_role(&self, email: &str, role: Role, chef_id: Option<&ChefId>) -> Result<bool>;
}

/// Orders and their two independent status fields.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<()>;

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Finds any order matching the creation fields, regardless of status.
    /// Used for duplicate-submission detection.
    async fn find_duplicate_order(
        &self,
        food_id: &str,
        customer_email: &str,
        quantity: u32,
    ) -> Result<Option<Order>>;

    /// Orders placed by a customer, newest first.
    async fn orders_for_customer(&self, email: &str) -> Result<Vec<Order>>;

    /// Orders routed to a chef, newest first.
    async fn orders_for_chef(&self, chef_id: &ChefId) -> Result<Vec<Order>>;

    /// Atomically sets fulfillment to `to` where it currently equals `from`.
    async fn transition_fulfillment(
        &self,
        id: OrderId,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    ) -> Result<bool>;

    /// Atomically sets fulfillment to `delivered` where payment is `paid`.
    async fn deliver_if_paid(&self, id: OrderId) -> Result<bool>;

    /// Sets payment status to `paid`. Returns `false` when the order is
    /// absent; paid is terminal, so repeating the write is harmless.
    async fn mark_paid(&self, id: OrderId) -> Result<bool>;
}

/// Completed payment events.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, payment: &Payment) -> Result<()>;

    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>>;
}

/// Role-elevation requests.
#[async_trait]
pub trait RoleRequestStore: Send + Sync {
    /// Inserts the request unless a pending one for the same
    /// (requester, type) pair exists. Returns `false` on conflict; the
    /// check and the insert are atomic.
    async fn insert_request_if_no_pending(&self, request: &RoleRequest) -> Result<bool>;

    async fn find_request(&self, id: RequestId) -> Result<Option<RoleRequest>>;

    /// All requests, newest first.
    async fn list_requests(&self) -> Result<Vec<RoleRequest>>;

    /// Sets the request status unconditionally. Returns `false` when the
    /// request is absent.
    async fn set_request_status(&self, id: RequestId, status: RequestStatus) -> Result<bool>;
}

/// Umbrella trait for a backend implementing every collection.
pub trait MarketStore:
    UserStore + OrderStore + PaymentStore + RoleRequestStore + Clone + Send + Sync + 'static
{
}

impl<T> MarketStore for T where
    T: UserStore + OrderStore + PaymentStore + RoleRequestStore + Clone + Send + Sync + 'static
{
}
