//! Payment gateway abstraction and the simulated gateway.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::OrderRequest;
use crate::error::OrderError;

/// User-facing message when the simulated charge is declined.
pub const PAYMENT_DECLINED_MESSAGE: &str =
    "La simulación del pago ha fallado. Por favor, intente de nuevo.";

/// Something that can charge an order.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, order: &OrderRequest) -> Result<(), OrderError>;
}

/// Gateway that approves a fixed share of charges at random.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
    success_rate: f64,
    delay: Duration,
}

impl SimulatedPaymentGateway {
    pub fn new(success_rate: f64, delay: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            delay,
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

impl Default for SimulatedPaymentGateway {
    fn default() -> Self {
        Self::new(0.9, Duration::from_millis(1500))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn charge(&self, order: &OrderRequest) -> Result<(), OrderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let approved = rand::thread_rng().gen_bool(self.success_rate);
        if approved {
            tracing::info!(total = %order.total, "Simulated payment approved");
            Ok(())
        } else {
            tracing::error!(total = %order.total, "Simulated payment failure");
            Err(OrderError::PaymentDeclined(
                PAYMENT_DECLINED_MESSAGE.to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::CustomerInfo;
    use rust_decimal_macros::dec;

    fn order() -> OrderRequest {
        OrderRequest {
            customer: CustomerInfo::default(),
            products: vec![],
            total: dec!(10),
        }
    }

    #[tokio::test]
    async fn always_approves_at_rate_one() {
        let gateway = SimulatedPaymentGateway::new(1.0, Duration::ZERO);
        for _ in 0..20 {
            assert!(gateway.charge(&order()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn always_declines_at_rate_zero() {
        let gateway = SimulatedPaymentGateway::new(0.0, Duration::ZERO);
        let err = gateway.charge(&order()).await.unwrap_err();
        assert!(matches!(err, OrderError::PaymentDeclined(ref m) if m == PAYMENT_DECLINED_MESSAGE));
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(SimulatedPaymentGateway::new(7.0, Duration::ZERO).success_rate(), 1.0);
        assert_eq!(SimulatedPaymentGateway::new(-1.0, Duration::ZERO).success_rate(), 0.0);
        assert_eq!(SimulatedPaymentGateway::default().success_rate(), 0.9);
    }
}
