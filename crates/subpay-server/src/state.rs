//! Application State

use std::sync::Arc;

use subpay_payments::{OrderGateway, OrderStore, SubscriptionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Plans offered on the checkout page
    pub subscriptions: Arc<dyn SubscriptionStore>,

    /// Orders created through `/razorpay/pay/`
    pub orders: Arc<dyn OrderStore>,

    /// Razorpay client (optional - None if not configured)
    pub razorpay: Option<Arc<dyn OrderGateway>>,
}
