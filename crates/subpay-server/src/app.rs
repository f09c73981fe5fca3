//! Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{health_check, list_subscriptions, payment_success, start_payment};
use crate::state::AppState;

/// API routes, without static hosting or middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/razorpay/subscriptions/", get(list_subscriptions))
        .route("/razorpay/pay/", post(start_payment))
        .route("/razorpay/payment/success/", post(payment_success))
        .with_state(state)
}
