//! Order entity and its two status state machines.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::user::ChefId;

/// The order's progress through preparation and delivery.
///
/// State transitions:
/// ```text
/// pending ──┬──► accepted ──► delivered
///           └──► cancelled
/// ```
///
/// `cancelled` and `delivered` are terminal. The `delivered` transition is
/// gated on [`PaymentStatus::Paid`], not on the fulfillment axis itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    /// Placed by the customer, awaiting the chef's decision.
    #[default]
    Pending,

    /// Accepted by the chef, being prepared.
    Accepted,

    /// Cancelled before acceptance (terminal state).
    Cancelled,

    /// Handed over to the customer (terminal state).
    Delivered,
}

impl FulfillmentStatus {
    /// Returns true if the order can be accepted in this state.
    pub fn can_accept(&self) -> bool {
        matches!(self, FulfillmentStatus::Pending)
    }

    /// Returns true if the order can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, FulfillmentStatus::Pending)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FulfillmentStatus::Cancelled | FulfillmentStatus::Delivered
        )
    }

    /// Returns the wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::Pending => "pending",
            FulfillmentStatus::Accepted => "accepted",
            FulfillmentStatus::Cancelled => "cancelled",
            FulfillmentStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether funds have been captured for an order.
///
/// Independent of the fulfillment axis. `Paid` is terminal; there is no
/// un-paying. The wire casing (`"Pending"` / `"paid"`) is inherited from the
/// original service and is observable behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,

    #[serde(rename = "paid")]
    Paid,
}

impl PaymentStatus {
    /// Returns true once funds have been captured.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Returns the wire name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted meal order.
///
/// Orders are never deleted; terminal states close them out while keeping
/// the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub food_id: String,
    pub food_name: String,
    pub customer_email: String,
    pub chef_id: ChefId,
    pub quantity: u32,
    pub amount_cents: i64,
    pub ordered_at: DateTime<Utc>,
    pub fulfillment: FulfillmentStatus,
    pub payment: PaymentStatus,
}

impl Order {
    /// Creates a new order from a validated draft.
    ///
    /// Both status axes start at their initial states.
    pub fn place(draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Order {
            id: OrderId::new(),
            food_id: draft.food_id,
            food_name: draft.food_name,
            customer_email: draft.customer_email,
            chef_id: draft.chef_id,
            quantity: draft.quantity,
            amount_cents: draft.amount_cents,
            ordered_at: now,
            fulfillment: FulfillmentStatus::Pending,
            payment: PaymentStatus::Pending,
        }
    }
}

/// Client-supplied order fields, validated before persistence.
///
/// Unknown or mistyped fields are rejected at deserialization rather than
/// persisted blindly.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderDraft {
    pub food_id: String,
    pub food_name: String,
    pub customer_email: String,
    pub chef_id: ChefId,
    pub quantity: u32,
    pub amount_cents: i64,
}

impl OrderDraft {
    /// Checks field-level constraints the type system cannot express.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.food_id.trim().is_empty() {
            return Err(DomainError::validation("food_id", "must not be empty"));
        }
        if self.customer_email.trim().is_empty() {
            return Err(DomainError::validation(
                "customer_email",
                "must not be empty",
            ));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity", "must be at least 1"));
        }
        if self.amount_cents < 0 {
            return Err(DomainError::validation(
                "amount_cents",
                "must not be negative",
            ));
        }
        Ok(())
    }
}
