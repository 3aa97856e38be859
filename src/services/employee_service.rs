use crate::dto::employee_dto::{CreateEmployeePayload, UpdateEmployeePayload};
use crate::error::{Error, Result};
use crate::models::employee::Employee;
use crate::utils::crypto;
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

#[derive(Clone)]
pub struct EmployeeService {
    pool: SqlitePool,
}

impl EmployeeService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateEmployeePayload) -> Result<Employee> {
        payload.validate()?;
        if self
            .get_by_username(&payload.username)
            .await?
            .is_some()
        {
            return Err(Error::BadRequest(format!(
                "Username {} is already taken",
                payload.username
            )));
        }
        let password_hash = crypto::hash_password(&payload.password)?;
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees
                (username, password_hash, first_name, last_name, email, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(payload.username.trim())
        .bind(&password_hash)
        .bind(payload.first_name.trim())
        .bind(payload.last_name.trim())
        .bind(payload.email.trim())
        .bind(payload.role.as_deref().unwrap_or("staff"))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn get(&self, id: i64) -> Result<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Employee {} not found", id)))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Employee>> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(employee)
    }

    pub async fn list(&self) -> Result<Vec<Employee>> {
        let employees =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY username")
                .fetch_all(&self.pool)
                .await?;
        Ok(employees)
    }

    pub async fn update(&self, id: i64, payload: UpdateEmployeePayload) -> Result<Employee> {
        let current = self.get(id).await?;
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, role = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(payload.first_name.unwrap_or(current.first_name))
        .bind(payload.last_name.unwrap_or(current.last_name))
        .bind(payload.email.unwrap_or(current.email))
        .bind(payload.role.unwrap_or(current.role))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn update_password(&self, id: i64, password: &str) -> Result<()> {
        self.get(id).await?;
        let password_hash = crypto::hash_password(password)?;
        sqlx::query("UPDATE employees SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Flips the account between `active` and `inactive`.
    pub async fn toggle_status(&self, id: i64) -> Result<Employee> {
        let current = self.get(id).await?;
        let next = if current.status == "active" {
            "inactive"
        } else {
            "active"
        };
        let employee = sqlx::query_as::<_, Employee>(
            "UPDATE employees SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(next)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Employee {} not found", id)));
        }
        Ok(())
    }
}
