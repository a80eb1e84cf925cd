use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, RequestId, UserId};
use domain::{
    ChefId, FulfillmentStatus, Order, Payment, PaymentStatus, ProfileUpdate, RequestStatus, Role,
    RoleRequest, User,
};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{OrderStore, PaymentStore, RoleRequestStore, UserStore};

/// In-memory store implementation.
///
/// Used by the test suites and as the default backend when no database is
/// configured. Conditional updates take the collection's write lock for the
/// whole check-and-set, giving the same atomicity as the SQL backend.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<Vec<User>>>,
    orders: Arc<RwLock<Vec<Order>>>,
    payments: Arc<RwLock<Vec<Payment>>>,
    requests: Arc<RwLock<Vec<RoleRequest>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every collection.
    pub async fn clear(&self) {
        self.users.write().await.clear();
        self.orders.write().await.clear();
        self.payments.write().await.clear();
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user_if_absent(&self, user: &User) -> Result<bool> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        users.push(user.clone());
        Ok(true)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.apply_profile_update(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_fraud(&self, id: UserId) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.status = domain::FraudStatus::Fraud;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_role(&self, email: &str, role: Role, chef_id: Option<&ChefId>) -> Result<bool> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.role = role;
                user.chef_id = chef_id.cloned();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_duplicate_order(
        &self,
        food_id: &str,
        customer_email: &str,
        quantity: u32,
    ) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .find(|o| {
                o.food_id == food_id
                    && o.customer_email == customer_email
                    && o.quantity == quantity
            })
            .cloned())
    }

    async fn orders_for_customer(&self, email: &str) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matched: Vec<_> = orders
            .iter()
            .filter(|o| o.customer_email == email)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        Ok(matched)
    }

    async fn orders_for_chef(&self, chef_id: &ChefId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut matched: Vec<_> = orders
            .iter()
            .filter(|o| &o.chef_id == chef_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at));
        Ok(matched)
    }

    async fn transition_fulfillment(
        &self,
        id: OrderId,
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders
            .iter_mut()
            .find(|o| o.id == id && o.fulfillment == from)
        {
            Some(order) => {
                order.fulfillment = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deliver_if_paid(&self, id: OrderId) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders
            .iter_mut()
            .find(|o| o.id == id && o.payment == PaymentStatus::Paid)
        {
            Some(order) => {
                order.fulfillment = FulfillmentStatus::Delivered;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_paid(&self, id: OrderId) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.payment = PaymentStatus::Paid;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        self.payments.write().await.push(payment.clone());
        Ok(())
    }

    async fn payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleRequestStore for InMemoryStore {
    async fn insert_request_if_no_pending(&self, request: &RoleRequest) -> Result<bool> {
        let mut requests = self.requests.write().await;
        let pending_exists = requests.iter().any(|r| {
            r.requester_email == request.requester_email
                && r.request_type == request.request_type
                && r.status == RequestStatus::Pending
        });
        if pending_exists {
            return Ok(false);
        }
        requests.push(request.clone());
        Ok(true)
    }

    async fn find_request(&self, id: RequestId) -> Result<Option<RoleRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_requests(&self) -> Result<Vec<RoleRequest>> {
        let mut requests = self.requests.read().await.clone();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(requests)
    }

    async fn set_request_status(&self, id: RequestId, status: RequestStatus) -> Result<bool> {
        let mut requests = self.requests.write().await;
        match requests.iter_mut().find(|r| r.id == id) {
            Some(request) => {
                request.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
