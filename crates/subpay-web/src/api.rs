//! API Client

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::{CheckoutBackend, CheckoutError};
use crate::config;

/// Subscription plan as listed by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub name: String,
    /// Price in rupees
    #[serde(alias = "price")]
    pub amount: Decimal,
}

impl Subscription {
    pub fn label(&self) -> String {
        format!("{} - ₹{}", self.name, self.amount)
    }
}

/// Order issued by the backend for the checkout widget
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PaymentOrder {
    pub id: String,
    /// Amount in paise
    pub amount: u64,
}

#[derive(Deserialize)]
struct StartPaymentResponse {
    payment: PaymentOrder,
}

/// Talks to the subpay server over HTTP
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(config::server_url())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, CheckoutError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let data: serde_json::Value = response.json().await.unwrap_or_default();
    Err(CheckoutError::Backend {
        status: status.as_u16(),
        message: data["error"].as_str().unwrap_or("Request failed").to_string(),
    })
}

/// Form fields sent to the verification endpoint
pub fn confirmation_form(response: &str, subscription_id: u64) -> [(&'static str, String); 2] {
    [
        ("response", response.to_string()),
        ("subscription_id", subscription_id.to_string()),
    ]
}

#[async_trait(?Send)]
impl CheckoutBackend for HttpBackend {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, CheckoutError> {
        let response = self
            .client
            .get(self.url("/razorpay/subscriptions/"))
            .header("Accept", "application/json")
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn create_order(&self, subscription_id: u64) -> Result<PaymentOrder, CheckoutError> {
        let response = self
            .client
            .post(self.url("/razorpay/pay/"))
            .header("Accept", "application/json")
            .form(&[("subscription_id", subscription_id.to_string())])
            .send()
            .await?;

        let data: StartPaymentResponse = check(response).await?.json().await?;
        Ok(data.payment)
    }

    async fn confirm_payment(
        &self,
        response: &str,
        subscription_id: u64,
    ) -> Result<(), CheckoutError> {
        let reply = self
            .client
            .post(self.url("/razorpay/payment/success/"))
            .header("Accept", "application/json")
            .form(&confirmation_form(response, subscription_id))
            .send()
            .await?;

        check(reply).await?;
        Ok(())
    }
}
