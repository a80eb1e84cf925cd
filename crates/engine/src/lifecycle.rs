//! The lifecycle engine: transition legality across all entities.
//!
//! Every state transition goes through an atomic conditional update on the
//! store ("set status to X where status = Y"). When the condition fails,
//! zero documents are affected and the operation reports a conflict or
//! precondition failure; there are no partial writes and no read-modify-
//! write races.

use chrono::Utc;
use common::{OrderId, RequestId, UserId};
use domain::{
    ChefId, NewRoleRequest, NewUser, Order, OrderDraft, Payment, ProfileUpdate, RequestStatus,
    RequestType, Role, RoleRequest, User,
};
use metrics::counter;
use store::MarketStore;

use crate::error::EngineError;
use crate::provider::{CheckoutSession, PaymentProvider};

/// A verified identity claim supplied by the external auth collaborator.
///
/// The engine consumes the subject email; it never sees tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Identity {
            email: email.into(),
        }
    }
}

/// An admin's verdict on a role-elevation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Orchestrates the user directory, order store, payment ledger, and
/// role-request workflow over a shared store backend.
#[derive(Clone)]
pub struct Lifecycle<S, P> {
    store: S,
    payments: P,
}

impl<S: MarketStore, P: PaymentProvider> Lifecycle<S, P> {
    /// Creates an engine over the given store and payment provider.
    pub fn new(store: S, payments: P) -> Self {
        Self { store, payments }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves the caller's directory record and requires the admin role.
    async fn require_admin(&self, identity: &Identity) -> Result<User, EngineError> {
        let user = self.store.find_user_by_email(&identity.email).await?;
        match user {
            Some(user) if user.role == Role::Admin => Ok(user),
            _ => Err(EngineError::Forbidden("admin only".into())),
        }
    }

    /// Requires the path-specified email to equal the verified identity's.
    fn require_self(identity: &Identity, email: &str) -> Result<(), EngineError> {
        if identity.email == email {
            Ok(())
        } else {
            Err(EngineError::Forbidden(
                "callers may only act on their own record".into(),
            ))
        }
    }

    // -- User directory --

    /// Idempotent signup: re-signup with an existing email returns the
    /// existing record unmutated.
    #[tracing::instrument(skip(self, new), fields(email = %new.email))]
    pub async fn signup(&self, new: NewUser) -> Result<User, EngineError> {
        new.validate()?;
        let user = User::signup(new, Utc::now());

        if self.store.insert_user_if_absent(&user).await? {
            counter!("marketplace_signups_total").increment(1);
            return Ok(user);
        }

        self.store
            .find_user_by_email(&user.email)
            .await?
            .ok_or_else(|| {
                EngineError::Inconsistent(format!(
                    "user {} reported present but could not be loaded",
                    user.email
                ))
            })
    }

    /// Loads a user's own profile.
    #[tracing::instrument(skip(self, identity))]
    pub async fn get_profile(&self, identity: &Identity, email: &str) -> Result<User, EngineError> {
        Self::require_self(identity, email)?;
        self.store
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| EngineError::not_found("user", email))
    }

    /// Applies a non-privileged self-service profile update.
    #[tracing::instrument(skip(self, identity, update))]
    pub async fn update_profile(
        &self,
        identity: &Identity,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<(), EngineError> {
        Self::require_self(identity, email)?;
        // An empty update still goes to the store so a missing record
        // reports not-found rather than vacuous success.
        if self.store.update_profile(email, &update).await? {
            Ok(())
        } else {
            Err(EngineError::not_found("user", email))
        }
    }

    /// Role lookup; unknown emails default to the base role.
    #[tracing::instrument(skip(self))]
    pub async fn role_of(&self, email: &str) -> Result<Role, EngineError> {
        let user = self.store.find_user_by_email(email).await?;
        Ok(user.map(|u| u.role).unwrap_or_default())
    }

    /// Lists every user record. Admin only.
    #[tracing::instrument(skip(self, identity))]
    pub async fn list_users(&self, identity: &Identity) -> Result<Vec<User>, EngineError> {
        self.require_admin(identity).await?;
        Ok(self.store.list_users().await?)
    }

    /// One-way fraud flag. Admin only.
    #[tracing::instrument(skip(self, identity))]
    pub async fn flag_fraud(&self, identity: &Identity, user_id: UserId) -> Result<(), EngineError> {
        self.require_admin(identity).await?;
        if self.store.set_fraud(user_id).await? {
            counter!("marketplace_fraud_flags_total").increment(1);
            Ok(())
        } else {
            Err(EngineError::not_found("user", user_id))
        }
    }

    // -- Order lifecycle --

    /// Places an order.
    ///
    /// Rejected outright when the customer is fraud-flagged, and when any
    /// order with the same (food, customer, quantity) exists regardless of
    /// its status.
    #[tracing::instrument(skip(self, draft), fields(customer = %draft.customer_email))]
    pub async fn place_order(&self, draft: OrderDraft) -> Result<Order, EngineError> {
        draft.validate()?;

        let customer = self.store.find_user_by_email(&draft.customer_email).await?;
        if customer.is_some_and(|u| u.status.is_fraud()) {
            return Err(EngineError::Forbidden(
                "fraud-flagged users cannot place orders".into(),
            ));
        }

        let duplicate = self
            .store
            .find_duplicate_order(&draft.food_id, &draft.customer_email, draft.quantity)
            .await?;
        if duplicate.is_some() {
            return Err(EngineError::Conflict(
                "an order for the same food and quantity already exists".into(),
            ));
        }

        let order = Order::place(draft, Utc::now());
        self.store.insert_order(&order).await?;
        counter!("marketplace_orders_placed_total").increment(1);
        Ok(order)
    }

    /// Accepts a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn accept_order(&self, id: OrderId) -> Result<(), EngineError> {
        self.transition_order(id, domain::FulfillmentStatus::Accepted)
            .await
    }

    /// Cancels a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, id: OrderId) -> Result<(), EngineError> {
        self.transition_order(id, domain::FulfillmentStatus::Cancelled)
            .await
    }

    async fn transition_order(
        &self,
        id: OrderId,
        to: domain::FulfillmentStatus,
    ) -> Result<(), EngineError> {
        let moved = self
            .store
            .transition_fulfillment(id, domain::FulfillmentStatus::Pending, to)
            .await?;
        if moved {
            counter!("marketplace_order_transitions_total", "to" => to.as_str()).increment(1);
            return Ok(());
        }

        // Zero documents affected: absent order or a lost race. Nothing
        // was written either way.
        match self.store.find_order(id).await? {
            None => Err(EngineError::not_found("order", id)),
            Some(order) => Err(EngineError::Conflict(format!(
                "order is {}, expected pending",
                order.fulfillment
            ))),
        }
    }

    /// Delivers an order. Gated on payment status alone; the fulfillment
    /// axis is not consulted.
    #[tracing::instrument(skip(self))]
    pub async fn deliver_order(&self, id: OrderId) -> Result<(), EngineError> {
        let delivered = self.store.deliver_if_paid(id).await?;
        if delivered {
            counter!("marketplace_order_transitions_total", "to" => "delivered").increment(1);
            return Ok(());
        }

        match self.store.find_order(id).await? {
            None => Err(EngineError::not_found("order", id)),
            Some(_) => Err(EngineError::PreconditionFailed(
                "payment not completed".into(),
            )),
        }
    }

    /// Orders placed by the caller, newest first. Self-scoped.
    #[tracing::instrument(skip(self, identity))]
    pub async fn orders_for_customer(
        &self,
        identity: &Identity,
        email: &str,
    ) -> Result<Vec<Order>, EngineError> {
        Self::require_self(identity, email)?;
        Ok(self.store.orders_for_customer(email).await?)
    }

    /// Orders routed to a chef, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_chef(&self, chef_id: &ChefId) -> Result<Vec<Order>, EngineError> {
        Ok(self.store.orders_for_chef(chef_id).await?)
    }

    // -- Payment gate --

    /// Obtains a checkout redirect URL from the payment provider. Touches
    /// no stored state.
    #[tracing::instrument(skip(self))]
    pub async fn create_checkout_session(
        &self,
        order_id: OrderId,
        amount_cents: i64,
    ) -> Result<CheckoutSession, EngineError> {
        self.payments
            .create_checkout_session(order_id, amount_cents)
            .await
    }

    /// Records a completed payment, then marks the order paid.
    ///
    /// The two writes are not a transaction. A payment record with no
    /// corresponding order update is surfaced as
    /// [`EngineError::Inconsistent`], never a silent success.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment(
        &self,
        order_id: OrderId,
        amount_cents: i64,
    ) -> Result<Payment, EngineError> {
        let payment = Payment::record(order_id, amount_cents, Utc::now());
        self.store.insert_payment(&payment).await?;

        match self.store.mark_paid(order_id).await {
            Ok(true) => {
                counter!("marketplace_payments_recorded_total").increment(1);
                Ok(payment)
            }
            Ok(false) => Err(EngineError::Inconsistent(format!(
                "payment {} recorded but order {} was not found",
                payment.id, order_id
            ))),
            Err(e) => Err(EngineError::Inconsistent(format!(
                "payment {} recorded but the order update failed: {e}",
                payment.id
            ))),
        }
    }

    // -- Role-request workflow --

    /// Opens a role-elevation request. At most one pending request may
    /// exist per (requester, type) pair.
    #[tracing::instrument(skip(self, new), fields(requester = %new.requester_email))]
    pub async fn request_role(&self, new: NewRoleRequest) -> Result<RoleRequest, EngineError> {
        new.validate()?;
        let request = RoleRequest::open(new, Utc::now());

        if self.store.insert_request_if_no_pending(&request).await? {
            counter!("marketplace_role_requests_total").increment(1);
            Ok(request)
        } else {
            Err(EngineError::Conflict(
                "a pending request of this type already exists".into(),
            ))
        }
    }

    /// Lists all role requests, newest first. Admin only.
    #[tracing::instrument(skip(self, identity))]
    pub async fn list_role_requests(
        &self,
        identity: &Identity,
    ) -> Result<Vec<RoleRequest>, EngineError> {
        self.require_admin(identity).await?;
        Ok(self.store.list_requests().await?)
    }

    /// Applies an admin decision to a request. Admin only.
    ///
    /// There is deliberately no guard against re-deciding an already
    /// decided request. The status write always runs, even when the user
    /// mutation for an approval fails; that partial outcome is reported as
    /// [`EngineError::Inconsistent`].
    #[tracing::instrument(skip(self, identity))]
    pub async fn decide_role_request(
        &self,
        identity: &Identity,
        id: RequestId,
        decision: Decision,
    ) -> Result<RoleRequest, EngineError> {
        self.require_admin(identity).await?;

        let request = self
            .store
            .find_request(id)
            .await?
            .ok_or_else(|| EngineError::not_found("role request", id))?;

        let mut user_mutation_failure = None;
        if decision == Decision::Approve {
            let (role, chef_id) = match request.request_type {
                RequestType::Chef => (Role::Chef, Some(ChefId::generate())),
                RequestType::Admin => (Role::Admin, None),
            };
            match self
                .store
                .set_role(&request.requester_email, role, chef_id.as_ref())
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    user_mutation_failure =
                        Some(format!("requester {} not found", request.requester_email));
                }
                Err(e) => user_mutation_failure = Some(e.to_string()),
            }
        }

        let status = match decision {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        };
        let updated = self.store.set_request_status(id, status).await?;
        if !updated {
            return Err(EngineError::Inconsistent(format!(
                "role request {id} vanished before its status could be written"
            )));
        }

        if let Some(reason) = user_mutation_failure {
            return Err(EngineError::Inconsistent(format!(
                "role request {id} marked {status} but the user mutation failed: {reason}"
            )));
        }

        counter!("marketplace_role_requests_decided_total", "status" => status.as_str())
            .increment(1);
        Ok(RoleRequest { status, ..request })
    }
}
