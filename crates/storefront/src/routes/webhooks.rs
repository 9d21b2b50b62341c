//! Inbound webhook handler.
//!
//! Two unrelated providers deliver to the same endpoint. The payment
//! gateway signs its callbacks with HMAC-SHA256 over the raw body; the
//! transactional-email provider sends plain JSON with no signature. The
//! handler branches on the presence of the signature header, so a payload
//! claiming to be from the gateway is never accepted unsigned.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::Email;

use crate::db::orders::PaymentApplied;
use crate::db::{NewsletterRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Header carrying the payment gateway's hex HMAC digest.
const SIGNATURE_HEADER: &str = "x-gateway-signature";

/// Payment gateway event envelope.
#[derive(Debug, Deserialize)]
struct PaymentEvent {
    event: String,
    data: PaymentEventData,
}

#[derive(Debug, Deserialize)]
struct PaymentEventData {
    order_reference: String,
    transaction_id: String,
}

/// Email provider event.
#[derive(Debug, Deserialize)]
struct EmailEvent {
    #[serde(rename = "type")]
    event_type: String,
    email: String,
}

/// POST /webhooks/payment
///
/// Signed payloads are gateway events; unsigned payloads are the email
/// provider's bounce/complaint feed. Replayed transaction IDs are
/// acknowledged without re-applying writes, so the gateway may retry
/// freely.
#[instrument(skip(state, headers, body))]
pub async fn payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Value>)> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    match signature {
        Some(signature) => handle_gateway_event(&state, &body, signature).await,
        None => handle_email_event(&state, &body).await,
    }
}

async fn handle_gateway_event(
    state: &AppState,
    body: &str,
    signature: &str,
) -> Result<(StatusCode, Json<Value>)> {
    if !state
        .payments()
        .verify_webhook_signature(body.as_bytes(), signature)
    {
        tracing::warn!("payment webhook signature verification failed");
        return Err(AppError::Unauthorized("invalid webhook signature".to_owned()));
    }

    let event: PaymentEvent = serde_json::from_str(body)
        .map_err(|e| AppError::BadRequest(format!("invalid webhook payload: {e}")))?;

    let repo = OrderRepository::new(state.pool());

    match event.event.as_str() {
        "payment.succeeded" => {
            let outcome = repo
                .apply_payment(&event.data.order_reference, &event.data.transaction_id)
                .await?;

            match outcome {
                PaymentApplied::Applied => {
                    tracing::info!(
                        reference = %event.data.order_reference,
                        "order marked paid via webhook"
                    );
                    Ok((StatusCode::OK, Json(json!({ "received": true }))))
                }
                PaymentApplied::Duplicate => {
                    tracing::info!(
                        txn_id = %event.data.transaction_id,
                        "duplicate payment event acknowledged"
                    );
                    Ok((
                        StatusCode::OK,
                        Json(json!({ "received": true, "duplicate": true })),
                    ))
                }
                PaymentApplied::UnknownOrder => Err(AppError::NotFound(format!(
                    "order '{}'",
                    event.data.order_reference
                ))),
            }
        }
        "payment.failed" => {
            // Record the transaction so retries stay idempotent; the order
            // stays unpaid.
            repo.record_payment_event(&event.data.order_reference, &event.data.transaction_id)
                .await?;
            tracing::info!(
                reference = %event.data.order_reference,
                "failed payment recorded"
            );
            Ok((StatusCode::OK, Json(json!({ "received": true }))))
        }
        other => {
            tracing::debug!(event = %other, "ignoring payment event");
            Ok((StatusCode::OK, Json(json!({ "received": true }))))
        }
    }
}

/// Bounces, complaints, and provider-side unsubscribes all deactivate the
/// subscriber. Unknown event types and unknown addresses are acknowledged
/// so the provider doesn't retry.
async fn handle_email_event(
    state: &AppState,
    body: &str,
) -> Result<(StatusCode, Json<Value>)> {
    let event: EmailEvent = serde_json::from_str(body)
        .map_err(|e| AppError::BadRequest(format!("invalid webhook payload: {e}")))?;

    if !matches!(
        event.event_type.as_str(),
        "bounced" | "complained" | "unsubscribed"
    ) {
        return Ok((StatusCode::OK, Json(json!({ "received": true }))));
    }

    let Ok(email) = Email::parse(&event.email) else {
        tracing::warn!("email webhook carried an unparseable address");
        return Ok((StatusCode::OK, Json(json!({ "received": true }))));
    };

    let repo = NewsletterRepository::new(state.pool());
    let deactivated = repo.deactivate_by_email(&email).await?;
    if deactivated {
        tracing::info!(event_type = %event.event_type, "subscriber deactivated");
    }

    Ok((StatusCode::OK, Json(json!({ "received": true }))))
}
