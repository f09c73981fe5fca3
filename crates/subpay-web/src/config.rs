//! Build-time Configuration
//!
//! Values are baked in at compile time, e.g.
//! `RAZORPAY_KEY_ID=rzp_test_xxx trunk build`.

use crate::browser;

/// Hosted checkout script
pub const CHECKOUT_SCRIPT_URL: &str = "https://checkout.razorpay.com/v1/checkout.js";

const FALLBACK_SERVER_URL: &str = "http://localhost:3000";

/// Public Razorpay key id handed to the checkout widget
pub fn merchant_key() -> &'static str {
    option_env!("RAZORPAY_KEY_ID").unwrap_or_default()
}

/// Backend base URL: `SUBPAY_SERVER_URL`, else the page's own origin
pub fn server_url() -> String {
    match option_env!("SUBPAY_SERVER_URL") {
        Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
        _ => browser::origin().unwrap_or_else(|| FALLBACK_SERVER_URL.into()),
    }
}
