//! Payment-provider collaborator trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use serde::Serialize;

use crate::error::EngineError;

/// A redirect target obtained from the payment provider.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// Trait for the external payment provider.
///
/// Creating a session is stateless on our side; stored state changes only
/// when a separate confirmation call records the payment.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Obtains a checkout redirect URL for the given order and amount.
    async fn create_checkout_session(
        &self,
        order_id: OrderId,
        amount_cents: i64,
    ) -> Result<CheckoutSession, EngineError>;
}

#[derive(Debug, Default)]
struct InMemoryCheckoutState {
    sessions: u32,
    fail_on_create: bool,
}

/// In-memory payment provider for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckoutProvider {
    state: Arc<RwLock<InMemoryCheckoutState>>,
}

impl InMemoryCheckoutProvider {
    /// Creates a new in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the provider to fail on the next session creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Returns the number of sessions created.
    pub fn session_count(&self) -> u32 {
        self.state.read().unwrap().sessions
    }
}

#[async_trait]
impl PaymentProvider for InMemoryCheckoutProvider {
    async fn create_checkout_session(
        &self,
        order_id: OrderId,
        amount_cents: i64,
    ) -> Result<CheckoutSession, EngineError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(EngineError::Provider("checkout session declined".into()));
        }

        state.sessions += 1;
        Ok(CheckoutSession {
            url: format!("https://checkout.invalid/session/{order_id}?amount={amount_cents}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_sessions_with_order_reference() {
        let provider = InMemoryCheckoutProvider::new();
        let order_id = OrderId::new();

        let session = provider
            .create_checkout_session(order_id, 50_000)
            .await
            .unwrap();
        assert!(session.url.contains(&order_id.to_string()));
        assert_eq!(provider.session_count(), 1);
    }

    #[tokio::test]
    async fn fail_toggle() {
        let provider = InMemoryCheckoutProvider::new();
        provider.set_fail_on_create(true);

        let result = provider
            .create_checkout_session(OrderId::new(), 1000)
            .await;
        assert!(matches!(result, Err(EngineError::Provider(_))));
        assert_eq!(provider.session_count(), 0);
    }
}
