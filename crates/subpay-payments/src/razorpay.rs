//! Razorpay Orders Integration
//!
//! Creates orders through Razorpay's REST API. The browser then hands the
//! order id to Razorpay's hosted checkout widget, which collects the payment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{CURRENCY, Subscription};
use crate::error::{PaymentError, Result};

/// Default Razorpay API base
pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com/v1";

/// Order creation parameters (`POST /orders`)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    /// Amount in paise
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
    /// `1` captures the payment automatically on authorization
    pub payment_capture: u8,
}

impl CreateOrder {
    /// Order for one billing period of a subscription
    pub fn for_subscription(subscription: &Subscription) -> Result<Self> {
        Ok(Self {
            amount: subscription.amount_in_paise()?,
            currency: CURRENCY.to_string(),
            receipt: format!("rcpt_{}", uuid::Uuid::new_v4().simple()),
            payment_capture: 1,
        })
    }
}

/// Order as returned by Razorpay
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RazorpayOrder {
    /// `order_...`
    pub id: String,
    #[serde(default)]
    pub entity: String,
    pub amount: u64,
    #[serde(default)]
    pub amount_paid: u64,
    #[serde(default)]
    pub amount_due: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    error: RazorpayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Order creation backend (Strategy pattern)
///
/// `RazorpayClient` talks to the real API; tests substitute a fake.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, request: CreateOrder) -> Result<RazorpayOrder>;

    /// Public key id handed to the checkout widget
    fn key_id(&self) -> &str;

    /// Secret used to sign payment callbacks
    fn key_secret(&self) -> &str;
}

/// Razorpay REST client
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_base: String,
}

impl RazorpayClient {
    /// Create a new Razorpay client
    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API base (sandbox proxy, mock server)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let key_id = std::env::var("RAZORPAY_KEY_ID")
            .map_err(|_| PaymentError::Config("RAZORPAY_KEY_ID not set".into()))?;
        let key_secret = std::env::var("RAZORPAY_KEY_SECRET")
            .map_err(|_| PaymentError::Config("RAZORPAY_KEY_SECRET not set".into()))?;

        let client = Self::new(&key_id, &key_secret);
        Ok(match std::env::var("RAZORPAY_API_BASE") {
            Ok(base) => client.with_api_base(base),
            Err(_) => client,
        })
    }
}

#[async_trait]
impl OrderGateway for RazorpayClient {
    async fn create_order(&self, request: CreateOrder) -> Result<RazorpayOrder> {
        let response = self
            .http
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<RazorpayErrorBody>().await {
                Ok(body) => format!("{} {}", body.error.code, body.error.description),
                Err(_) => "no error body".to_string(),
            };
            return Err(PaymentError::Razorpay(format!("{status}: {}", detail.trim())));
        }

        let order: RazorpayOrder = response.json().await?;

        tracing::info!(
            razorpay_order_id = %order.id,
            amount = order.amount,
            receipt = ?order.receipt,
            "Created Razorpay order"
        );

        Ok(order)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn key_secret(&self) -> &str {
        &self.key_secret
    }
}
