//! # subpay-payments
//!
//! Subscription catalog, order bookkeeping and Razorpay integration for subpay.
//!
//! ## Payment flow
//!
//! ```text
//! ┌──────────┐ subscription_id ┌──────────┐  POST /orders  ┌──────────┐
//! │ Browser  │────────────────▶│  Server  │───────────────▶│ Razorpay │
//! │          │◀────────────────│          │◀───────────────│   API    │
//! │          │  order id+amount└──────────┘    order_...   └──────────┘
//! │          │
//! │  Hosted  │ payment_id, order_id, signature
//! │ Checkout │──────────────────────────────▶ Server: verify HMAC, mark paid
//! └──────────┘
//! ```
//!
//! The widget talks to Razorpay directly; this crate only creates the order
//! and checks the signature on the callback payload.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use subpay_payments::{CreateOrder, OrderGateway, PaymentConfirmation, RazorpayClient};
//!
//! let client = RazorpayClient::new("rzp_test_xxx", "secret");
//! let order = client.create_order(CreateOrder::for_subscription(&plan)?).await?;
//!
//! // ...later, with the JSON the widget handed the browser:
//! PaymentConfirmation::from_callback(&response)?.verify(client.key_secret())?;
//! ```

mod catalog;
mod error;
mod order;
mod razorpay;
mod signature;

pub use catalog::{CURRENCY, MemorySubscriptionStore, Subscription, SubscriptionStore};
pub use error::{PaymentError, Result};
pub use order::{MemoryOrderStore, ORDER_DATE_FORMAT, Order, OrderStore};
pub use razorpay::{CreateOrder, DEFAULT_API_BASE, OrderGateway, RazorpayClient, RazorpayOrder};
pub use signature::{PaymentConfirmation, sign_payment};
