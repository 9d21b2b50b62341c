//! Order management handlers.

use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::{OrderId, OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::db::orders::{OrderFilter, TransitionOutcome};
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::models::order::OrderDetail;
use crate::state::AppState;

use super::Pagination;

/// Query parameters for the order list.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Matches the order reference or customer email.
    pub q: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Payload for a status transition.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
}

/// Printable order document.
#[derive(Template)]
#[template(path = "orders/print.html")]
struct PrintOrderTemplate {
    reference: String,
    status: String,
    payment_method: String,
    payment_status: String,
    customer_email: String,
    recipient: String,
    phone: String,
    address: String,
    note: String,
    created_at: String,
    lines: Vec<PrintLine>,
    subtotal: String,
    shipping_fee: String,
    total: String,
}

struct PrintLine {
    name_en: String,
    name_zh: String,
    unit_price: String,
    quantity: i32,
    line_total: String,
}

impl PrintOrderTemplate {
    fn from_detail(detail: &OrderDetail) -> Self {
        let lines = detail
            .items
            .iter()
            .map(|item| PrintLine {
                name_en: item.name.en.clone(),
                name_zh: item.name.zh_tw.clone(),
                unit_price: item.unit_price.display(),
                quantity: item.quantity,
                line_total: item
                    .unit_price
                    .checked_mul_qty(item.quantity.unsigned_abs())
                    .map_or_else(|_| "-".to_owned(), |p| p.display()),
            })
            .collect();

        Self {
            reference: detail.order.reference.clone(),
            status: detail.order.status.to_string(),
            payment_method: detail.order.payment_method.to_string(),
            payment_status: detail.order.payment_status.to_string(),
            customer_email: detail.order.customer_email.clone(),
            recipient: detail.order.recipient.clone(),
            phone: detail.order.phone.clone(),
            address: detail.order.address.clone(),
            note: detail.order.note.clone().unwrap_or_default(),
            created_at: detail.order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            lines,
            subtotal: detail.order.subtotal.display(),
            shipping_fee: detail.order.shipping_fee.display(),
            total: detail.order.total.display(),
        }
    }
}

/// GET /orders
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Value>> {
    let (limit, offset, page, per_page) = query.pagination.resolve();
    let filter = OrderFilter {
        status: query.status,
        payment_status: query.payment_status,
        query: query.q.filter(|q| !q.trim().is_empty()),
        limit,
        offset,
    };

    let repo = OrderRepository::new(state.shop_pool());
    let (orders, total) = repo.list(&filter).await?;

    Ok(Json(json!({
        "orders": orders,
        "page": page,
        "per_page": per_page,
        "total": total,
    })))
}

/// GET /orders/{id}
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.shop_pool());
    let detail = repo
        .get_detail(OrderId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("order {id}")))?;

    Ok(Json(json!({ "order": detail })))
}

/// PATCH /orders/{id}/status
#[instrument(skip(state, request))]
pub async fn transition_status(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.shop_pool());
    let outcome = repo.transition_status(OrderId::new(id), request.status).await?;

    match outcome {
        TransitionOutcome::Applied(order) => {
            tracing::info!(order_id = %id, status = %order.status, "order status changed");
            Ok(Json(json!({ "order": order })))
        }
        TransitionOutcome::Invalid { from, to } => Err(AdminError::BadRequest(format!(
            "cannot move order from {from} to {to}"
        ))),
    }
}

/// POST /orders/{id}/mark-paid
#[instrument(skip(state))]
pub async fn mark_paid(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.shop_pool());
    let order = repo.mark_paid(OrderId::new(id)).await?;

    tracing::info!(order_id = %id, "order manually marked paid");

    Ok(Json(json!({ "order": order })))
}

/// GET /orders/{id}/print
#[instrument(skip(state))]
pub async fn print(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Html<String>> {
    let repo = OrderRepository::new(state.shop_pool());
    let detail = repo
        .get_detail(OrderId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("order {id}")))?;

    let html = PrintOrderTemplate::from_detail(&detail)
        .render()
        .map_err(|e| AdminError::Internal(format!("template render failed: {e}")))?;

    Ok(Html(html))
}
