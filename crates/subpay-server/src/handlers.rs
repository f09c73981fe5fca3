//! HTTP Handlers

use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use subpay_payments::{
    CreateOrder, Order, OrderGateway, PaymentConfirmation, PaymentError, RazorpayOrder,
    Subscription,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub razorpay_configured: bool,
    pub subscriptions: usize,
}

#[derive(Debug, Deserialize)]
pub struct StartPaymentForm {
    pub subscription_id: String,
}

#[derive(Debug, Serialize)]
pub struct StartPaymentResponse {
    pub payment: RazorpayOrder,
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub struct PaymentSuccessForm {
    /// JSON text of the checkout widget's success callback
    pub response: String,
    #[serde(default)]
    pub subscription_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentSuccessResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error rendered as `(status, {error, code})`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>, code: &str) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                code: code.into(),
            },
        }
    }

    fn payments_disabled() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        let (status, code) = match &err {
            PaymentError::SubscriptionNotFound(_) => {
                (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND")
            }
            PaymentError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            PaymentError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD"),
            PaymentError::SignatureMismatch(_) => (StatusCode::BAD_REQUEST, "SIGNATURE_MISMATCH"),
            PaymentError::Razorpay(_) | PaymentError::Http(_) => {
                (StatusCode::BAD_GATEWAY, "RAZORPAY_ERROR")
            }
            PaymentError::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONFIG_ERROR"),
            PaymentError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %err, code, "Request failed");
        } else {
            tracing::warn!(error = %err, code, "Request rejected");
        }

        Self::new(status, err.user_message(), code)
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        PaymentError::InvalidPayload(rejection.body_text()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn parse_subscription_id(raw: &str) -> Result<u64, PaymentError> {
    raw.trim().parse().map_err(|_| {
        PaymentError::InvalidPayload(format!("subscription_id {raw:?} is not an integer"))
    })
}

fn gateway(state: &AppState) -> Result<&dyn OrderGateway, ApiError> {
    state.razorpay.as_deref().ok_or_else(ApiError::payments_disabled)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let subscriptions = match state.subscriptions.list() {
        Ok(list) => list.len(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not count subscriptions");
            0
        }
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        razorpay_configured: state.razorpay.is_some(),
        subscriptions,
    })
}

/// `GET /razorpay/subscriptions/`
pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    Ok(Json(state.subscriptions.list()?))
}

/// `POST /razorpay/pay/` - create a Razorpay order for a subscription
pub async fn start_payment(
    State(state): State<AppState>,
    form: Result<Form<StartPaymentForm>, FormRejection>,
) -> Result<Json<StartPaymentResponse>, ApiError> {
    let Form(form) = form?;
    let razorpay = gateway(&state)?;

    let subscription_id = parse_subscription_id(&form.subscription_id)?;
    let subscription = state
        .subscriptions
        .get(subscription_id)?
        .ok_or(PaymentError::SubscriptionNotFound(subscription_id))?;

    let payment = razorpay
        .create_order(CreateOrder::for_subscription(&subscription)?)
        .await?;

    let order = state.orders.create(subscription, &payment.id)?;

    tracing::info!(
        order_id = order.id,
        razorpay_order_id = %payment.id,
        subscription_id,
        amount = payment.amount,
        "Payment started"
    );

    Ok(Json(StartPaymentResponse { payment, order }))
}

/// `POST /razorpay/payment/success/` - verify the widget callback and mark
/// the order paid
pub async fn payment_success(
    State(state): State<AppState>,
    form: Result<Form<PaymentSuccessForm>, FormRejection>,
) -> Result<Json<PaymentSuccessResponse>, ApiError> {
    let Form(form) = form?;
    let razorpay = gateway(&state)?;

    let confirmation = PaymentConfirmation::from_callback(&form.response)?;

    let order = state
        .orders
        .get_by_payment_id(&confirmation.razorpay_order_id)?
        .ok_or_else(|| PaymentError::OrderNotFound(confirmation.razorpay_order_id.clone()))?;

    confirmation.verify(razorpay.key_secret())?;

    if let Some(raw) = form.subscription_id.as_deref().filter(|s| !s.trim().is_empty()) {
        let subscription_id = parse_subscription_id(raw)?;
        if subscription_id != order.subscription.id {
            return Err(PaymentError::InvalidPayload(format!(
                "order {} is for subscription {}, not {subscription_id}",
                order.order_payment_id, order.subscription.id
            ))
            .into());
        }
    }

    if order.is_paid {
        tracing::debug!(razorpay_order_id = %order.order_payment_id, "Order already paid");
    } else {
        state.orders.mark_paid(&order.order_payment_id)?;
    }

    tracing::info!(
        order_id = order.id,
        razorpay_order_id = %confirmation.razorpay_order_id,
        razorpay_payment_id = %confirmation.razorpay_payment_id,
        "Payment verified"
    );

    Ok(Json(PaymentSuccessResponse {
        message: "payment successfully received!",
    }))
}
