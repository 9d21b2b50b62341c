//! Delivery fleet repository (shop database).
//!
//! Assignments couple the fleet to the order lifecycle: dispatching an
//! order puts the vehicle on delivery and ships the order; completing the
//! delivery frees the vehicle and marks the order delivered. Both moves
//! run in one transaction so the fleet and the order can never disagree.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use jademart_core::{AssignmentId, OrderId, OrderStatus, VehicleId, VehicleStatus};

use super::{RepositoryError, corrupt};
use crate::models::logistics::{Assignment, Vehicle, VehicleInput};

/// Repository for vehicles and delivery assignments.
pub struct LogisticsRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: i32,
    plate: String,
    model: String,
    driver_name: String,
    driver_phone: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VehicleRow {
    fn into_vehicle(self) -> Result<Vehicle, RepositoryError> {
        Ok(Vehicle {
            id: VehicleId::new(self.id),
            plate: self.plate,
            model: self.model,
            driver_name: self.driver_name,
            driver_phone: self.driver_phone,
            status: self.status.parse::<VehicleStatus>().map_err(|e| corrupt("vehicle status", e))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: i32,
    order_id: i32,
    vehicle_id: i32,
    assigned_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

impl AssignmentRow {
    fn into_assignment(self) -> Assignment {
        Assignment {
            id: AssignmentId::new(self.id),
            order_id: OrderId::new(self.order_id),
            vehicle_id: VehicleId::new(self.vehicle_id),
            assigned_at: self.assigned_at,
            delivered_at: self.delivered_at,
        }
    }
}

const VEHICLE_COLUMNS: &str =
    "id, plate, model, driver_name, driver_phone, status, created_at, updated_at";

const ASSIGNMENT_COLUMNS: &str = "id, order_id, vehicle_id, assigned_at, delivered_at";

impl<'a> LogisticsRepository<'a> {
    /// Create a new logistics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // ==================== vehicles ====================

    /// List the fleet, by plate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            r"
            SELECT {VEHICLE_COLUMNS} FROM shop.vehicle
            WHERE deleted_at IS NULL
            ORDER BY plate ASC
            "
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(VehicleRow::into_vehicle).collect()
    }

    /// Get a vehicle by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM shop.vehicle WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(VehicleRow::into_vehicle).transpose()
    }

    /// Register a vehicle. New vehicles start `Available`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the plate is taken.
    pub async fn create_vehicle(&self, input: &VehicleInput) -> Result<Vehicle, RepositoryError> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            r"
            INSERT INTO shop.vehicle (plate, model, driver_name, driver_phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {VEHICLE_COLUMNS}
            "
        ))
        .bind(&input.plate)
        .bind(&input.model)
        .bind(&input.driver_name)
        .bind(&input.driver_phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "license plate already registered"))?;

        row.into_vehicle()
    }

    /// Update a vehicle's plate, model or driver.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vehicle does not exist,
    /// `RepositoryError::Conflict` if the new plate is taken.
    pub async fn update_vehicle(
        &self,
        id: VehicleId,
        input: &VehicleInput,
    ) -> Result<Vehicle, RepositoryError> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            r"
            UPDATE shop.vehicle
            SET plate = $2, model = $3, driver_name = $4, driver_phone = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {VEHICLE_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(&input.plate)
        .bind(&input.model)
        .bind(&input.driver_name)
        .bind(&input.driver_phone)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "license plate already registered"))?
        .ok_or(RepositoryError::NotFound)?;

        row.into_vehicle()
    }

    /// Set a vehicle's status directly (maintenance, out of service, back
    /// to available). A vehicle with an open delivery cannot be declared
    /// `Available`; completing the delivery is what frees it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vehicle does not exist, and
    /// `RepositoryError::Conflict` if it has an open delivery.
    pub async fn set_vehicle_status(
        &self,
        id: VehicleId,
        status: VehicleStatus,
    ) -> Result<Vehicle, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let open: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM shop.delivery_assignment
            WHERE vehicle_id = $1 AND delivered_at IS NULL
            ",
        )
        .bind(id.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        if open > 0 && status == VehicleStatus::Available {
            return Err(RepositoryError::Conflict(
                "vehicle has an open delivery".to_owned(),
            ));
        }

        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            r"
            UPDATE shop.vehicle
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {VEHICLE_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(status.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        row.into_vehicle()
    }

    /// Retire a vehicle from the fleet. Refused while a delivery is open.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the vehicle does not exist, and
    /// `RepositoryError::Conflict` if it has an open delivery.
    pub async fn soft_delete_vehicle(&self, id: VehicleId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.vehicle v
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE v.id = $1 AND v.deleted_at IS NULL
              AND NOT EXISTS (
                  SELECT 1 FROM shop.delivery_assignment a
                  WHERE a.vehicle_id = v.id AND a.delivered_at IS NULL
              )
            ",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i32> = sqlx::query_scalar(
                "SELECT id FROM shop.vehicle WHERE id = $1 AND deleted_at IS NULL",
            )
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
            return match exists {
                Some(_) => Err(RepositoryError::Conflict(
                    "vehicle has an open delivery".to_owned(),
                )),
                None => Err(RepositoryError::NotFound),
            };
        }
        Ok(())
    }

    // ==================== assignments ====================

    /// List assignments for an order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn assignments_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            r"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM shop.delivery_assignment
            WHERE order_id = $1
            ORDER BY assigned_at DESC
            "
        ))
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AssignmentRow::into_assignment).collect())
    }

    /// List assignments, optionally only open or only completed ones,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_assignments(
        &self,
        active: Option<bool>,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            r"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM shop.delivery_assignment
            WHERE ($1::BOOLEAN IS NULL OR (delivered_at IS NULL) = $1)
            ORDER BY assigned_at DESC, id DESC
            "
        ))
        .bind(active)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AssignmentRow::into_assignment).collect())
    }

    /// Dispatch an order on a vehicle.
    ///
    /// The vehicle must be `Available`; it moves to `On Delivery` and the
    /// order moves from `processing` to `shipped` in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order or vehicle does not
    /// exist, and `RepositoryError::Conflict` when the vehicle cannot take
    /// the delivery or the order is not ready to ship.
    pub async fn assign(
        &self,
        order_id: OrderId,
        vehicle_id: VehicleId,
    ) -> Result<Assignment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let vehicle_status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM shop.vehicle WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(vehicle_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let vehicle_status = vehicle_status
            .ok_or(RepositoryError::NotFound)?
            .parse::<VehicleStatus>()
            .map_err(|e| corrupt("vehicle status", e))?;

        if !vehicle_status.can_accept_assignment() {
            return Err(RepositoryError::Conflict(format!(
                "vehicle is {vehicle_status}, not available"
            )));
        }

        let order_status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM shop.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let order_status = order_status
            .ok_or(RepositoryError::NotFound)?
            .parse::<OrderStatus>()
            .map_err(|e| corrupt("order status", e))?;

        if !order_status.can_transition_to(OrderStatus::Shipped) {
            return Err(RepositoryError::Conflict(format!(
                "order is {order_status}, not ready to ship"
            )));
        }

        let already_assigned: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM shop.delivery_assignment
            WHERE order_id = $1 AND delivered_at IS NULL
            ",
        )
        .bind(order_id.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        if already_assigned > 0 {
            return Err(RepositoryError::Conflict(
                "order already has an open delivery".to_owned(),
            ));
        }

        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r"
            INSERT INTO shop.delivery_assignment (order_id, vehicle_id)
            VALUES ($1, $2)
            RETURNING {ASSIGNMENT_COLUMNS}
            "
        ))
        .bind(order_id.as_i32())
        .bind(vehicle_id.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "vehicle already has an open delivery"))?;

        sqlx::query("UPDATE shop.vehicle SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(vehicle_id.as_i32())
            .bind(VehicleStatus::OnDelivery.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE shop.customer_order SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(order_id.as_i32())
        .bind(OrderStatus::Shipped.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into_assignment())
    }

    /// Complete a delivery: stamp `delivered_at`, free the vehicle, and
    /// mark the order delivered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the assignment does not exist,
    /// and `RepositoryError::Conflict` if it is already completed.
    pub async fn complete(&self, id: AssignmentId) -> Result<Assignment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AssignmentRow>(&format!(
            r"
            UPDATE shop.delivery_assignment
            SET delivered_at = NOW()
            WHERE id = $1 AND delivered_at IS NULL
            RETURNING {ASSIGNMENT_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            let exists: Option<i32> =
                sqlx::query_scalar("SELECT id FROM shop.delivery_assignment WHERE id = $1")
                    .bind(id.as_i32())
                    .fetch_optional(&mut *tx)
                    .await?;
            return match exists {
                Some(_) => Err(RepositoryError::Conflict(
                    "delivery is already completed".to_owned(),
                )),
                None => Err(RepositoryError::NotFound),
            };
        };

        sqlx::query("UPDATE shop.vehicle SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(row.vehicle_id)
            .bind(VehicleStatus::Available.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            UPDATE shop.customer_order
            SET status = 'delivered', updated_at = NOW()
            WHERE id = $1 AND status = 'shipped'
            ",
        )
        .bind(row.order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into_assignment())
    }
}
