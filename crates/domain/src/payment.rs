//! Payment records, cross-referencing orders.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

/// A completed payment event.
///
/// Created exactly once per successful payment; creation side-effects the
/// referenced order's payment status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub amount_cents: i64,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a payment record stamped with the given time.
    pub fn record(order_id: OrderId, amount_cents: i64, now: DateTime<Utc>) -> Self {
        Payment {
            id: PaymentId::new(),
            order_id,
            amount_cents,
            paid_at: now,
        }
    }
}
