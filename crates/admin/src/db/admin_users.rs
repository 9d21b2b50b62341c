//! Admin account repository (admin database, schema `admin`).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use jademart_core::{AdminRole, AdminUserId, Email};

use super::{RepositoryError, corrupt};
use crate::models::admin_user::AdminUser;

/// Repository for back-office accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    name: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdminUserRow {
    fn into_admin_user(self) -> Result<AdminUser, RepositoryError> {
        Ok(AdminUser {
            id: AdminUserId::new(self.id),
            email: Email::parse(&self.email).map_err(|e| corrupt("admin email", e))?,
            name: self.name,
            role: self.role.parse::<AdminRole>().map_err(|e| corrupt("admin role", e))?,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ADMIN_COLUMNS: &str = "id, email, name, role, active, created_at, updated_at";

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admin.admin_user ORDER BY id ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AdminUserRow::into_admin_user).collect()
    }

    /// Get an admin account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: AdminUserId,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admin.admin_user WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(AdminUserRow::into_admin_user).transpose()
    }

    /// Get an admin account and its password hash by email.
    ///
    /// Returns `None` when no account carries the address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct WithHash {
            id: i32,
            email: String,
            name: String,
            role: String,
            active: bool,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, WithHash>(
            r"
            SELECT id, email, name, role, active, created_at, updated_at, password_hash
            FROM admin.admin_user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let user = AdminUserRow {
                id: r.id,
                email: r.email,
                name: r.name,
                role: r.role,
                active: r.active,
                created_at: r.created_at,
                updated_at: r.updated_at,
            }
            .into_admin_user()?;
            Ok((user, r.password_hash))
        })
        .transpose()
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken, and
    /// `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            r"
            INSERT INTO admin.admin_user (email, name, role, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {ADMIN_COLUMNS}
            "
        ))
        .bind(email.as_str())
        .bind(name)
        .bind(role.to_string())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "admin email already exists"))?;

        row.into_admin_user()
    }

    /// Change an account's role and/or active flag. `None` fields keep
    /// their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn update(
        &self,
        id: AdminUserId,
        role: Option<AdminRole>,
        active: Option<bool>,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            r"
            UPDATE admin.admin_user
            SET role = COALESCE($2, role),
                active = COALESCE($3, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ADMIN_COLUMNS}
            "
        ))
        .bind(id.as_i32())
        .bind(role.map(|r| r.to_string()))
        .bind(active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_admin_user()
    }

    /// Delete an admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.admin_user WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Count admin accounts; used to guard first-run bootstrap.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin.admin_user")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
