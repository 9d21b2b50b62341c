//! Payment gateway client.
//!
//! Online checkouts are handed to a hosted payment page: we create a
//! gateway session carrying the order reference and total, redirect the
//! customer, and learn the outcome later through the signed webhook.

use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use jademart_core::Price;

use crate::config::PaymentGatewayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP transport failure.
    #[error("payment gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway rejected the request.
    #[error("payment gateway returned {status}: {message}")]
    Gateway {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The gateway response couldn't be decoded.
    #[error("invalid payment gateway response: {0}")]
    InvalidResponse(String),
}

/// A created hosted-checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session ID.
    pub session_id: String,
    /// Hosted payment page the customer is redirected to.
    pub checkout_url: String,
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    merchant_id: &'a str,
    order_reference: &'a str,
    /// Amount in NT$, two decimal places.
    amount: String,
    currency: &'a str,
    return_url: &'a str,
}

/// HTTP client for the payment gateway.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_url: String,
    merchant_id: String,
    api_secret: secrecy::SecretString,
}

impl PaymentClient {
    /// Build a client from gateway configuration.
    #[must_use]
    pub fn new(config: &PaymentGatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            merchant_id: config.merchant_id.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    /// Create a hosted-checkout session for an order.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` for non-success responses and
    /// `PaymentError::Request` for transport failures.
    pub async fn create_checkout(
        &self,
        order_reference: &str,
        total: Price,
        return_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let request = CreateSessionRequest {
            merchant_id: &self.merchant_id,
            order_reference,
            amount: format!("{:.2}", total.amount()),
            currency: "TWD",
            return_url,
        };

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_url))
            .bearer_auth(self.api_secret.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Gateway { status, message });
        }

        let session = response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        Ok(session)
    }

    /// Verify a webhook signature.
    ///
    /// The gateway signs the raw request body with HMAC-SHA256 over the
    /// shared API secret and sends the hex digest in a header. Verification
    /// uses a constant-time comparison.
    #[must_use]
    pub fn verify_webhook_signature(&self, body: &[u8], signature_hex: &str) -> bool {
        verify_hmac_hex(self.api_secret.expose_secret().as_bytes(), body, signature_hex)
    }
}

/// Constant-time HMAC-SHA256 hex-digest verification.
fn verify_hmac_hex(secret: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);

    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sign(secret: &[u8], body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let secret = b"test-webhook-secret";
        let body = br#"{"order_reference":"ORD-202608-0001"}"#;
        let signature = sign(secret, body);

        assert!(verify_hmac_hex(secret, body, &signature));
        assert!(verify_hmac_hex(secret, body, &format!("  {signature} ")));
    }

    #[test]
    fn test_verify_rejects_bad_signature() {
        let secret = b"test-webhook-secret";
        let body = br#"{"order_reference":"ORD-202608-0001"}"#;

        assert!(!verify_hmac_hex(secret, body, &sign(b"other-secret", body)));
        assert!(!verify_hmac_hex(secret, body, "not-hex"));
        assert!(!verify_hmac_hex(secret, body, ""));
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let secret = b"test-webhook-secret";
        let body = br#"{"amount":"100.00"}"#;
        let signature = sign(secret, body);

        assert!(!verify_hmac_hex(secret, br#"{"amount":"999.00"}"#, &signature));
    }
}
