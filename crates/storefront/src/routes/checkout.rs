//! Checkout route handler.
//!
//! Turns the session cart into an order: every line is repriced against the
//! live catalog, the shipping fee policy is applied server-side, the `ORD`
//! reference is allocated, and stock is decremented, all inside the order
//! transaction. Online payments additionally get a hosted-checkout URL.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use jademart_core::{PaymentMethod, Price};

use crate::db::{CatalogRepository, OrderRepository, RepositoryError};
use crate::db::orders::{NewOrder, NewOrderLine};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAuth;
use crate::models::cart::Cart;
use crate::models::order::ShippingDetails;
use crate::routes::cart::{load_cart, save_cart};
use crate::state::AppState;

/// Checkout payload.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub recipient: String,
    pub phone: String,
    pub address: String,
    pub note: Option<String>,
}

/// POST /checkout
#[instrument(skip(state, session, request))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_owned()));
    }

    let shipping = validate_shipping(&request)?;

    // Reprice every line against the live catalog
    let catalog = CatalogRepository::new(state.pool());
    let ids: Vec<_> = cart.items.iter().map(|l| l.product_id).collect();
    let products = catalog.get_products_by_ids(&ids).await?;

    let mut lines = Vec::with_capacity(cart.items.len());
    let mut subtotal = Price::ZERO;

    for line in &cart.items {
        let product = products
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "product {} is no longer available",
                    line.product_id
                ))
            })?;

        let line_total = product
            .price
            .checked_mul_qty(line.quantity)
            .map_err(|e| AppError::Internal(format!("order total overflow: {e}")))?;
        subtotal = subtotal
            .checked_add(line_total)
            .map_err(|e| AppError::Internal(format!("order total overflow: {e}")))?;

        lines.push(NewOrderLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: line.quantity,
        });
    }

    let shipping_fee = shipping_fee_for(&state, subtotal)?;
    let total = subtotal
        .checked_add(shipping_fee)
        .map_err(|e| AppError::Internal(format!("order total overflow: {e}")))?;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .create(&NewOrder {
            user_id: user.id,
            payment_method: request.payment_method,
            shipping,
            note: request.note.filter(|n| !n.trim().is_empty()),
            lines,
            subtotal,
            shipping_fee,
            total,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    tracing::info!(reference = %order.reference, user_id = %user.id, "order placed");

    // The cart is consumed by a successful checkout
    save_cart(&session, &Cart::default()).await?;

    let mut body = json!({ "order": order });

    if request.payment_method == PaymentMethod::Online {
        let return_url = format!("{}/orders/{}", state.config().base_url, order.reference);
        let gateway_session = state
            .payments()
            .create_checkout(&order.reference, order.total, &return_url)
            .await?;

        body["payment"] = json!({
            "session_id": gateway_session.session_id,
            "checkout_url": gateway_session.checkout_url,
        });
    }

    Ok(Json(body))
}

fn validate_shipping(request: &CheckoutRequest) -> Result<ShippingDetails> {
    let recipient = request.recipient.trim();
    let phone = request.phone.trim();
    let address = request.address.trim();

    if recipient.is_empty() || recipient.len() > 100 {
        return Err(AppError::BadRequest("recipient name is required".to_owned()));
    }
    if phone.is_empty() || phone.len() > 30 {
        return Err(AppError::BadRequest("phone number is required".to_owned()));
    }
    if address.is_empty() || address.len() > 500 {
        return Err(AppError::BadRequest("delivery address is required".to_owned()));
    }

    Ok(ShippingDetails {
        recipient: recipient.to_owned(),
        phone: phone.to_owned(),
        address: address.to_owned(),
    })
}

/// Flat fee below the free-shipping threshold, zero at or above it.
fn shipping_fee_for(state: &AppState, subtotal: Price) -> Result<Price> {
    let policy = &state.config().shipping;
    if subtotal.amount() >= policy.free_threshold {
        return Ok(Price::ZERO);
    }
    Price::new(policy.flat_fee)
        .map_err(|e| AppError::Internal(format!("invalid shipping fee configuration: {e}")))
}
