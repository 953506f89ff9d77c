//! Outbound order notification.

use rust_decimal::Decimal;
use serde::Serialize;

use super::OrderRequest;
use crate::error::OrderError;

/// Product summary inside the webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    pub price: Decimal,
}

/// JSON body POSTed to the order webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub company: String,
    pub phone: String,
    pub country: String,
    pub total_amount: Decimal,
    pub products: Vec<WebhookProduct>,
}

impl WebhookPayload {
    pub fn new(order_id: &str, order: &OrderRequest) -> Self {
        let c = &order.customer;
        Self {
            order_id: order_id.to_string(),
            customer_name: c.name.clone(),
            customer_email: c.email.clone(),
            company: c.company.clone(),
            phone: c.phone.clone(),
            country: c.country.clone(),
            total_amount: order.total,
            products: order
                .products
                .iter()
                .map(|p| WebhookProduct {
                    name: p.name.clone(),
                    option: p.option.as_ref().map(|o| o.label.clone()),
                    price: p.price,
                })
                .collect(),
        }
    }
}

/// Posts order payloads to a configured URL. One attempt, no retries.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the payload; any transport error or non-2xx status is an error.
    pub async fn notify(&self, payload: &WebhookPayload) -> Result<(), OrderError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::WebhookStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        tracing::info!(order_id = %payload.order_id, "Webhook sent successfully");
        Ok(())
    }
}
