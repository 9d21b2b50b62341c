//! Invoice handlers: one-time order invoices, period invoices, delivery
//! by email, and the overdue sweep.

use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::{InvoiceId, InvoiceKind, InvoiceStatus, OrderId, UserId};

use crate::db::InvoiceRepository;
use crate::db::invoices::InvoiceFilter;
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::models::invoice::{Invoice, PeriodInvoiceInput};
use crate::state::AppState;

use super::Pagination;

/// Query parameters for the invoice list.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    pub kind: Option<InvoiceKind>,
    pub status: Option<InvoiceStatus>,
    pub user_id: Option<i32>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Payload for issuing a one-time invoice from an order.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub order_id: i32,
}

/// Printable invoice document.
#[derive(Template)]
#[template(path = "invoice/print.html")]
struct PrintInvoiceTemplate {
    reference: String,
    kind: String,
    status: String,
    customer_name: String,
    customer_email: String,
    amount: String,
    issued_at: String,
    due_at: String,
    period: String,
    order_count: usize,
}

impl PrintInvoiceTemplate {
    fn from_invoice(invoice: &Invoice) -> Self {
        let period = match (invoice.period_start, invoice.period_end) {
            (Some(start), Some(end)) => format!(
                "{} – {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
            _ => String::new(),
        };

        Self {
            reference: invoice.reference.clone(),
            kind: invoice.kind.to_string(),
            status: invoice.status.to_string(),
            customer_name: invoice.customer_name.clone(),
            customer_email: invoice.customer_email.clone().unwrap_or_default(),
            amount: invoice.amount.display(),
            issued_at: invoice.issued_at.format("%Y-%m-%d").to_string(),
            due_at: invoice.due_at.format("%Y-%m-%d").to_string(),
            period,
            order_count: invoice.order_ids.len(),
        }
    }
}

/// GET /invoices
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Value>> {
    let (limit, offset, page, per_page) = query.pagination.resolve();
    let filter = InvoiceFilter {
        kind: query.kind,
        status: query.status,
        user_id: query.user_id.map(UserId::new),
        limit,
        offset,
    };

    let repo = InvoiceRepository::new(state.shop_pool());
    let (invoices, total) = repo.list(&filter).await?;

    Ok(Json(json!({
        "invoices": invoices,
        "page": page,
        "per_page": per_page,
        "total": total,
    })))
}

/// POST /invoices
#[instrument(skip(state, request))]
pub async fn create_for_order(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<Value>> {
    let repo = InvoiceRepository::new(state.shop_pool());
    let invoice = repo.create_for_order(OrderId::new(request.order_id)).await?;

    tracing::info!(reference = %invoice.reference, order_id = request.order_id, "invoice issued");

    Ok(Json(json!({ "invoice": invoice })))
}

/// POST /invoices/period
#[instrument(skip(state, input))]
pub async fn create_period(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<PeriodInvoiceInput>,
) -> Result<Json<Value>> {
    if input.period_end <= input.period_start {
        return Err(AdminError::BadRequest(
            "period end must be after period start".to_string(),
        ));
    }
    if !(1..=28).contains(&input.cycle_day) {
        return Err(AdminError::BadRequest(
            "cycle day must be between 1 and 28".to_string(),
        ));
    }

    let repo = InvoiceRepository::new(state.shop_pool());
    let invoice = repo.create_period(&input).await?;

    tracing::info!(
        reference = %invoice.reference,
        user_id = %input.user_id,
        orders = invoice.order_ids.len(),
        "period invoice issued"
    );

    Ok(Json(json!({ "invoice": invoice })))
}

/// POST /invoices/overdue-sweep
#[instrument(skip(state))]
pub async fn overdue_sweep(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
) -> Result<Json<Value>> {
    let repo = InvoiceRepository::new(state.shop_pool());
    let updated = repo.sweep_overdue().await?;

    if updated > 0 {
        tracing::info!(updated, "invoices marked overdue");
    }

    Ok(Json(json!({ "updated": updated })))
}

/// GET /invoices/{id}
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = InvoiceRepository::new(state.shop_pool());
    let invoice = repo
        .get_by_id(InvoiceId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("invoice {id}")))?;

    Ok(Json(json!({ "invoice": invoice })))
}

/// POST /invoices/{id}/mark-paid
#[instrument(skip(state))]
pub async fn mark_paid(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = InvoiceRepository::new(state.shop_pool());
    let invoice = repo.mark_paid(InvoiceId::new(id)).await?;

    tracing::info!(reference = %invoice.reference, "invoice marked paid");

    Ok(Json(json!({ "invoice": invoice })))
}

/// POST /invoices/{id}/send
#[instrument(skip(state))]
pub async fn send(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = InvoiceRepository::new(state.shop_pool());
    let invoice = repo
        .get_by_id(InvoiceId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("invoice {id}")))?;

    let Some(to) = invoice.customer_email.as_deref() else {
        return Err(AdminError::BadRequest(
            "invoice has no customer email on file".to_string(),
        ));
    };

    state.email().send_invoice(to, &invoice).await?;
    repo.mark_sent(invoice.id).await?;

    tracing::info!(reference = %invoice.reference, "invoice emailed");

    Ok(Json(json!({ "ok": true })))
}

/// GET /invoices/{id}/print
#[instrument(skip(state))]
pub async fn print(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Html<String>> {
    let repo = InvoiceRepository::new(state.shop_pool());
    let invoice = repo
        .get_by_id(InvoiceId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("invoice {id}")))?;

    let html = PrintInvoiceTemplate::from_invoice(&invoice)
        .render()
        .map_err(|e| AdminError::Internal(format!("template render failed: {e}")))?;

    Ok(Html(html))
}
