//! Newsletter subscription route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use rand::Rng;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::Email;

use crate::db::NewsletterRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Subscription payload.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// POST /newsletter/subscribe
///
/// Subscribing an address that is already on the list reactivates it;
/// the response is the same either way so the endpoint can't be used to
/// probe the subscriber list.
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<Value>> {
    let email =
        Email::parse(&request.email).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let token = generate_unsubscribe_token();
    let repo = NewsletterRepository::new(state.pool());
    repo.subscribe(&email, &token).await?;

    tracing::info!("newsletter subscription recorded");

    Ok(Json(json!({ "ok": true })))
}

/// GET /newsletter/unsubscribe/{token}
///
/// Token links are embedded in every newsletter email.
#[instrument(skip(state))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>> {
    let repo = NewsletterRepository::new(state.pool());
    let found = repo.unsubscribe_by_token(&token).await?;
    if !found {
        return Err(AppError::NotFound("unsubscribe token".to_owned()));
    }

    Ok(Json(json!({ "ok": true })))
}

/// Generate a URL-safe random unsubscribe token.
fn generate_unsubscribe_token() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const TOKEN_LENGTH: usize = 40;

    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribe_token_shape() {
        let token = generate_unsubscribe_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        // Two draws should not collide
        assert_ne!(token, generate_unsubscribe_token());
    }
}
