//! Delivery fleet domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jademart_core::{AssignmentId, OrderId, VehicleId, VehicleStatus};

/// A delivery vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// License plate, unique across the fleet.
    pub plate: String,
    pub model: String,
    pub driver_name: String,
    pub driver_phone: String,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering or updating a vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleInput {
    pub plate: String,
    pub model: String,
    pub driver_name: String,
    pub driver_phone: String,
}

/// An order-to-vehicle delivery assignment.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub order_id: OrderId,
    pub vehicle_id: VehicleId,
    pub assigned_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}
