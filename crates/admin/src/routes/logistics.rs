//! Delivery fleet handlers: vehicles and order assignments.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use jademart_core::{AssignmentId, OrderId, VehicleId, VehicleStatus};

use crate::db::LogisticsRepository;
use crate::error::{AdminError, Result};
use crate::middleware::{RequireAdmin, RequireWriteAccess};
use crate::models::logistics::VehicleInput;
use crate::state::AppState;

/// Payload for a vehicle status change.
#[derive(Debug, Deserialize)]
pub struct VehicleStatusRequest {
    pub status: VehicleStatus,
}

/// Payload for dispatching an order.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub order_id: i32,
    pub vehicle_id: i32,
}

/// Query parameters for the assignment list.
#[derive(Debug, Deserialize)]
pub struct ListAssignmentsQuery {
    /// `true` for open deliveries only, `false` for completed only.
    pub active: Option<bool>,
}

fn validate_vehicle_input(input: &VehicleInput) -> Result<()> {
    if input.plate.trim().is_empty() {
        return Err(AdminError::BadRequest("license plate is required".to_string()));
    }
    if input.driver_name.trim().is_empty() {
        return Err(AdminError::BadRequest("driver name is required".to_string()));
    }
    Ok(())
}

/// GET /logistics/vehicles
#[instrument(skip(state))]
pub async fn list_vehicles(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    let vehicles = repo.list_vehicles().await?;

    Ok(Json(json!({ "vehicles": vehicles })))
}

/// POST /logistics/vehicles
#[instrument(skip(state, input))]
pub async fn create_vehicle(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(input): Json<VehicleInput>,
) -> Result<Json<Value>> {
    validate_vehicle_input(&input)?;

    let repo = LogisticsRepository::new(state.shop_pool());
    let vehicle = repo.create_vehicle(&input).await?;

    tracing::info!(plate = %vehicle.plate, "vehicle registered");

    Ok(Json(json!({ "vehicle": vehicle })))
}

/// GET /logistics/vehicles/{id}
#[instrument(skip(state))]
pub async fn get_vehicle(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    let vehicle = repo
        .get_vehicle(VehicleId::new(id))
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("vehicle {id}")))?;

    Ok(Json(json!({ "vehicle": vehicle })))
}

/// PUT /logistics/vehicles/{id}
#[instrument(skip(state, input))]
pub async fn update_vehicle(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(input): Json<VehicleInput>,
) -> Result<Json<Value>> {
    validate_vehicle_input(&input)?;

    let repo = LogisticsRepository::new(state.shop_pool());
    let vehicle = repo.update_vehicle(VehicleId::new(id), &input).await?;

    Ok(Json(json!({ "vehicle": vehicle })))
}

/// DELETE /logistics/vehicles/{id}
#[instrument(skip(state))]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    repo.soft_delete_vehicle(VehicleId::new(id)).await?;

    Ok(Json(json!({ "ok": true })))
}

/// PATCH /logistics/vehicles/{id}/status
#[instrument(skip(state, request))]
pub async fn set_vehicle_status(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
    Json(request): Json<VehicleStatusRequest>,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    let vehicle = repo.set_vehicle_status(VehicleId::new(id), request.status).await?;

    tracing::info!(plate = %vehicle.plate, status = %vehicle.status, "vehicle status changed");

    Ok(Json(json!({ "vehicle": vehicle })))
}

/// GET /logistics/assignments
#[instrument(skip(state, query))]
pub async fn list_assignments(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ListAssignmentsQuery>,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    let assignments = repo.list_assignments(query.active).await?;

    Ok(Json(json!({ "assignments": assignments })))
}

/// POST /logistics/assignments
///
/// Dispatches an order: the vehicle goes on delivery and the order ships.
#[instrument(skip(state, request))]
pub async fn assign(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Json(request): Json<AssignRequest>,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    let assignment = repo
        .assign(OrderId::new(request.order_id), VehicleId::new(request.vehicle_id))
        .await?;

    tracing::info!(
        order_id = request.order_id,
        vehicle_id = request.vehicle_id,
        "order dispatched"
    );

    Ok(Json(json!({ "assignment": assignment })))
}

/// POST /logistics/assignments/{id}/complete
#[instrument(skip(state))]
pub async fn complete(
    State(state): State<AppState>,
    RequireWriteAccess(_): RequireWriteAccess,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let repo = LogisticsRepository::new(state.shop_pool());
    let assignment = repo.complete(AssignmentId::new(id)).await?;

    tracing::info!(assignment_id = id, "delivery completed");

    Ok(Json(json!({ "assignment": assignment })))
}
