//! Session cart route handlers.
//!
//! The cart stores product IDs and quantities only. Responses join the
//! current catalog so the client always sees live prices and names; lines
//! whose product has since been unpublished are surfaced with
//! `available: false`.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use jademart_core::{Price, ProductId};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::cart::{Cart, CartError};
use crate::models::session_keys;
use crate::state::AppState;

/// Payload for adding a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Payload for setting a line quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Payload for removing a line.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// GET /cart
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<Value>> {
    let cart = load_cart(&session).await?;
    render_cart(&state, &cart).await
}

/// POST /cart/add
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<Value>> {
    // Only published products can enter the cart
    let repo = CatalogRepository::new(state.pool());
    let found = repo.get_products_by_ids(&[request.product_id]).await?;
    if found.is_empty() {
        return Err(AppError::NotFound(format!(
            "product {}",
            request.product_id
        )));
    }

    let mut cart = load_cart(&session).await?;
    cart.add(request.product_id, request.quantity)
        .map_err(cart_error)?;
    save_cart(&session, &cart).await?;

    render_cart(&state, &cart).await
}

/// POST /cart/update
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<Value>> {
    let mut cart = load_cart(&session).await?;
    cart.set_quantity(request.product_id, request.quantity)
        .map_err(cart_error)?;
    save_cart(&session, &cart).await?;

    render_cart(&state, &cart).await
}

/// POST /cart/remove
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<Value>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(request.product_id).map_err(cart_error)?;
    save_cart(&session, &cart).await?;

    render_cart(&state, &cart).await
}

/// Read the cart from the session, defaulting to empty.
pub(crate) async fn load_cart(session: &Session) -> Result<Cart> {
    let cart = session
        .get::<Cart>(session_keys::CART)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read session: {e}")))?
        .unwrap_or_default();
    Ok(cart)
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(session_keys::CART, cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write session: {e}")))?;
    Ok(())
}

fn cart_error(e: CartError) -> AppError {
    match e {
        CartError::LineNotFound => AppError::NotFound("cart line".to_owned()),
        other => AppError::BadRequest(other.to_string()),
    }
}

/// Join cart lines against the live catalog and total them up.
async fn render_cart(state: &AppState, cart: &Cart) -> Result<Json<Value>> {
    let repo = CatalogRepository::new(state.pool());
    let ids: Vec<ProductId> = cart.items.iter().map(|l| l.product_id).collect();
    let products = repo.get_products_by_ids(&ids).await?;

    let mut lines = Vec::with_capacity(cart.items.len());
    let mut subtotal = Price::ZERO;

    for line in &cart.items {
        let product = products.iter().find(|p| p.id == line.product_id);
        match product {
            Some(product) => {
                let line_total = product
                    .price
                    .checked_mul_qty(line.quantity)
                    .map_err(|e| AppError::Internal(format!("cart total overflow: {e}")))?;
                subtotal = subtotal
                    .checked_add(line_total)
                    .map_err(|e| AppError::Internal(format!("cart total overflow: {e}")))?;

                lines.push(json!({
                    "product_id": line.product_id,
                    "slug": product.slug,
                    "name": product.name,
                    "unit_price": product.price,
                    "quantity": line.quantity,
                    "line_total": line_total,
                    "available": product.stock >= i32::try_from(line.quantity).unwrap_or(i32::MAX),
                }));
            }
            None => {
                lines.push(json!({
                    "product_id": line.product_id,
                    "quantity": line.quantity,
                    "available": false,
                }));
            }
        }
    }

    Ok(Json(json!({
        "items": lines,
        "subtotal": subtotal,
        "unit_count": cart.unit_count(),
    })))
}
