//! Order submission: simulated payment, webhook notification, invoice.
//!
//! A payment failure is reported to the user and blocks the order. A webhook
//! failure is only logged: the order still succeeds.

pub mod payment;
pub mod webhook;

pub use payment::{PAYMENT_DECLINED_MESSAGE, PaymentGateway, SimulatedPaymentGateway};
pub use webhook::{WebhookNotifier, WebhookPayload, WebhookProduct};

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::configurator::{CustomerInfo, SelectedProduct};
use crate::error::OrderError;

/// Everything needed to place an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(rename = "customerInfo")]
    pub customer: CustomerInfo,
    #[serde(rename = "selectedProducts")]
    pub products: Vec<SelectedProduct>,
    #[serde(rename = "totalCost")]
    pub total: Decimal,
}

/// Result of an order submission: exactly one of invoice URL or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Success { invoice_url: String },
    Failure { error: String },
}

impl OrderOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for OrderOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Success { invoice_url } => OutcomeWire {
                success: true,
                invoice_url: Some(invoice_url),
                error: None,
            },
            Self::Failure { error } => OutcomeWire {
                success: false,
                invoice_url: None,
                error: Some(error),
            },
        };
        wire.serialize(serializer)
    }
}

/// Order pipeline configuration.
#[derive(Debug, Clone)]
pub struct OrderConfig {
    /// Webhook URL; `None` skips the notification.
    pub webhook_url: Option<String>,
    /// Base URL the synthetic invoice is placed under.
    pub invoice_base_url: String,
    /// Probability that the simulated payment is approved.
    pub payment_success_rate: f64,
    /// Simulated processing delay before the payment decision.
    pub processing_delay: Duration,
    /// Timeout for outbound HTTP calls.
    pub http_timeout: Duration,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            invoice_base_url: "https://example.com/invoices".to_string(),
            payment_success_rate: 0.9,
            processing_delay: Duration::from_millis(1500),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl OrderConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let webhook_url = std::env::var("CONFIGURATOR_WEBHOOK_URL")
            .or_else(|_| std::env::var("N8N_WEBHOOK_URL"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let invoice_base_url = std::env::var("CONFIGURATOR_INVOICE_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.invoice_base_url);

        let payment_success_rate: f64 = std::env::var("CONFIGURATOR_PAYMENT_SUCCESS_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.payment_success_rate);

        let processing_delay = std::env::var("CONFIGURATOR_PROCESSING_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.processing_delay);

        let http_timeout = std::env::var("CONFIGURATOR_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            webhook_url,
            invoice_base_url,
            payment_success_rate,
            processing_delay,
            http_timeout,
        }
    }
}

/// Runs the order pipeline.
pub struct OrderService {
    payment: Arc<dyn PaymentGateway>,
    webhook: Option<WebhookNotifier>,
    invoice_base_url: String,
}

impl OrderService {
    pub fn new(
        payment: Arc<dyn PaymentGateway>,
        webhook: Option<WebhookNotifier>,
        invoice_base_url: impl Into<String>,
    ) -> Self {
        Self {
            payment,
            webhook,
            invoice_base_url: invoice_base_url.into(),
        }
    }

    /// Build the service from configuration with the simulated gateway.
    pub fn from_config(config: &OrderConfig, client: reqwest::Client) -> Self {
        let payment = Arc::new(SimulatedPaymentGateway::new(
            config.payment_success_rate,
            config.processing_delay,
        ));
        let webhook = config
            .webhook_url
            .as_ref()
            .map(|url| WebhookNotifier::new(client, url.clone()));
        Self::new(payment, webhook, config.invoice_base_url.clone())
    }

    /// Charge, notify, and issue an invoice reference.
    ///
    /// Re-submitting after a failure runs the whole pipeline again.
    pub async fn submit(&self, order: &OrderRequest) -> OrderOutcome {
        tracing::info!(
            customer = %order.customer.email,
            products = order.products.len(),
            total = %order.total,
            "Processing order"
        );

        if let Err(e) = self.payment.charge(order).await {
            let error = match e {
                OrderError::PaymentDeclined(message) => message,
                other => other.to_string(),
            };
            return OrderOutcome::Failure { error };
        }

        let order_id = format!("ORD-{}", chrono::Utc::now().timestamp_millis());
        match &self.webhook {
            Some(webhook) => {
                let payload = WebhookPayload::new(&order_id, order);
                if let Err(e) = webhook.notify(&payload).await {
                    tracing::error!(
                        order_id = %order_id,
                        url = %webhook.url(),
                        error = %e,
                        "Error sending order webhook"
                    );
                }
            }
            None => {
                tracing::warn!("Webhook URL is not set. Skipping webhook notification.");
            }
        }

        let invoice_url = format!(
            "{}/INV-{}.pdf",
            self.invoice_base_url,
            chrono::Utc::now().timestamp_millis()
        );
        tracing::info!(order_id = %order_id, invoice_url = %invoice_url, "Generated invoice");
        OrderOutcome::Success { invoice_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn order() -> OrderRequest {
        OrderRequest {
            customer: CustomerInfo {
                name: "Ana Ruiz".to_string(),
                email: "ana@x.com".to_string(),
                phone: "+1234567".to_string(),
                company: "Acme".to_string(),
                country: "CO".to_string(),
                consent: true,
            },
            products: vec![],
            total: dec!(750),
        }
    }

    fn gateway(rate: f64) -> Arc<dyn PaymentGateway> {
        Arc::new(SimulatedPaymentGateway::new(rate, Duration::ZERO))
    }

    struct BrokenGateway;

    #[async_trait]
    impl PaymentGateway for BrokenGateway {
        async fn charge(&self, _order: &OrderRequest) -> Result<(), OrderError> {
            Err(OrderError::WebhookStatus {
                url: "x".to_string(),
                status: 500,
            })
        }
    }

    /// Bind a webhook receiver that answers with `status` and forwards bodies.
    async fn webhook_server(
        status: StatusCode,
    ) -> (String, mpsc::UnboundedReceiver<serde_json::Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/hook",
            post(move |Json(body): Json<serde_json::Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    status
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://127.0.0.1:{port}/hook"), rx)
    }

    #[tokio::test]
    async fn success_without_webhook_returns_invoice() {
        let service = OrderService::new(gateway(1.0), None, "https://example.com/invoices");
        let outcome = service.submit(&order()).await;
        match outcome {
            OrderOutcome::Success { invoice_url } => {
                assert!(invoice_url.starts_with("https://example.com/invoices/INV-"));
                assert!(invoice_url.ends_with(".pdf"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn declined_payment_is_a_failure_outcome() {
        let service = OrderService::new(gateway(0.0), None, "https://example.com/invoices");
        let outcome = service.submit(&order()).await;
        assert_eq!(
            outcome,
            OrderOutcome::Failure {
                error: PAYMENT_DECLINED_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn other_gateway_errors_are_reported_as_text() {
        let service = OrderService::new(Arc::new(BrokenGateway), None, "https://x");
        let outcome = service.submit(&order()).await;
        assert!(matches!(outcome, OrderOutcome::Failure { ref error } if error.contains("500")));
    }

    #[tokio::test]
    async fn webhook_receives_payload() {
        let (url, mut rx) = webhook_server(StatusCode::OK).await;
        let webhook = WebhookNotifier::new(reqwest::Client::new(), url);
        let service = OrderService::new(gateway(1.0), Some(webhook), "https://x");

        assert!(service.submit(&order()).await.is_success());
        let body = rx.recv().await.unwrap();
        assert!(body["order_id"].as_str().unwrap().starts_with("ORD-"));
        assert_eq!(body["customer_email"], "ana@x.com");
        assert_eq!(body["total_amount"], 750.0);
    }

    #[tokio::test]
    async fn webhook_failure_does_not_fail_order() {
        let (url, _rx) = webhook_server(StatusCode::INTERNAL_SERVER_ERROR).await;
        let webhook = WebhookNotifier::new(reqwest::Client::new(), url);
        let service = OrderService::new(gateway(1.0), Some(webhook), "https://x");
        assert!(service.submit(&order()).await.is_success());

        // Nothing listening at all.
        let webhook = WebhookNotifier::new(reqwest::Client::new(), "http://127.0.0.1:9/hook");
        let service = OrderService::new(gateway(1.0), Some(webhook), "https://x");
        assert!(service.submit(&order()).await.is_success());
    }

    #[tokio::test]
    async fn declined_payment_skips_webhook() {
        let (url, mut rx) = webhook_server(StatusCode::OK).await;
        let webhook = WebhookNotifier::new(reqwest::Client::new(), url);
        let service = OrderService::new(gateway(0.0), Some(webhook), "https://x");
        assert!(!service.submit(&order()).await.is_success());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn outcome_wire_format_has_exactly_one_field() {
        let ok = serde_json::to_value(OrderOutcome::Success {
            invoice_url: "u".to_string(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "invoiceUrl": "u"}));

        let err = serde_json::to_value(OrderOutcome::Failure {
            error: "e".to_string(),
        })
        .unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "e"}));
    }

    #[test]
    fn order_request_uses_original_field_names() {
        let json = serde_json::to_value(order()).unwrap();
        assert!(json.get("customerInfo").is_some());
        assert!(json.get("selectedProducts").is_some());
        assert_eq!(json["totalCost"], 750.0);
    }
}
