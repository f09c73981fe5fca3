//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Razorpay API error
    #[error("Razorpay error: {0}")]
    Razorpay(String),

    /// Transport failure talking to Razorpay
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Payment signature did not match
    #[error("Payment signature mismatch for order {0}")]
    SignatureMismatch(String),

    /// Subscription not found
    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(u64),

    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Request payload could not be understood
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Razorpay(_) | PaymentError::Http(_) | PaymentError::Storage(_)
        )
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Razorpay(_) | PaymentError::Http(_) => {
                "Payment processing failed. Please try again."
            }
            PaymentError::SignatureMismatch(_) => "Something went wrong",
            PaymentError::SubscriptionNotFound(_) => "Subscription not found.",
            PaymentError::OrderNotFound(_) => "Order not found.",
            PaymentError::InvalidPayload(_) => "The request could not be understood.",
            PaymentError::Config(_) => "Service configuration error.",
            PaymentError::Storage(_) => "An error occurred processing your request.",
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::InvalidPayload(err.to_string())
    }
}
