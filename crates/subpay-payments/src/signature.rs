//! Payment Signature Verification
//!
//! The checkout widget hands the browser three values on success. Razorpay
//! signs `order_id|payment_id` with the account secret; a payment is genuine
//! only if that HMAC-SHA256 matches `razorpay_signature`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Fields of the checkout widget's success callback
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

impl PaymentConfirmation {
    /// Parse the JSON text forwarded by the browser.
    ///
    /// Missing keys read as empty strings; anything but a JSON object is
    /// rejected.
    pub fn from_callback(response: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(response)?;
        if !value.is_object() {
            return Err(PaymentError::InvalidPayload(
                "payment response must be a JSON object".into(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Check the signature against the account secret
    pub fn verify(&self, key_secret: &str) -> Result<()> {
        let signature = hex::decode(self.razorpay_signature.trim())
            .map_err(|_| PaymentError::SignatureMismatch(self.razorpay_order_id.clone()))?;

        let mut mac = signer(key_secret)?;
        mac.update(self.signed_payload().as_bytes());

        mac.verify_slice(&signature)
            .map_err(|_| PaymentError::SignatureMismatch(self.razorpay_order_id.clone()))
    }

    fn signed_payload(&self) -> String {
        format!("{}|{}", self.razorpay_order_id, self.razorpay_payment_id)
    }
}

fn signer(key_secret: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key_secret.as_bytes())
        .map_err(|e| PaymentError::Config(format!("invalid signing key: {e}")))
}

/// Compute the signature Razorpay would produce for an order/payment pair
pub fn sign_payment(order_id: &str, payment_id: &str, key_secret: &str) -> Result<String> {
    let mut mac = signer(key_secret)?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
