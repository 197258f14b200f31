//! Equipment repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentAutofill, EquipmentQuery, UpdateEquipment},
        Department, EquipmentCategory,
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List non-scrapped equipment matching the filters
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<Vec<Equipment>> {
        let mut conditions = vec!["is_scrapped = FALSE".to_string()];
        let mut idx = 1;

        if query.category.is_some() {
            conditions.push(format!("category = ${}", idx));
            idx += 1;
        }
        if query.department.is_some() {
            conditions.push(format!("department = ${}", idx));
            idx += 1;
        }
        if query.team.is_some() {
            conditions.push(format!("maintenance_team_id = ${}", idx));
            idx += 1;
        }
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        if search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${i} OR serial_number ILIKE ${i} OR location ILIKE ${i})",
                i = idx
            ));
        }

        let select_q = format!(
            "SELECT * FROM equipment WHERE {} ORDER BY name",
            conditions.join(" AND ")
        );
        let mut builder = sqlx::query_as::<_, Equipment>(&select_q);
        if let Some(category) = query.category { builder = builder.bind(category); }
        if let Some(department) = query.department { builder = builder.bind(department); }
        if let Some(team) = query.team { builder = builder.bind(team); }
        if let Some(ref pattern) = search { builder = builder.bind(pattern); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                name, serial_number, category, department, location,
                maintenance_team_id, assigned_employee_id, default_technician_id,
                purchase_date, warranty_expiry, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.serial_number)
        .bind(data.category)
        .bind(data.department)
        .bind(&data.location)
        .bind(data.maintenance_team_id)
        .bind(data.assigned_employee_id)
        .bind(data.default_technician_id)
        .bind(data.purchase_date)
        .bind(data.warranty_expiry)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, format!("Serial number '{}' already exists", data.serial_number)))
    }

    /// Update equipment; only the provided fields are written
    pub async fn update(&self, id: i32, data: &UpdateEquipment, now: DateTime<Utc>) -> AppResult<Equipment> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.serial_number, "serial_number");
        add_field!(data.category, "category");
        add_field!(data.department, "department");
        add_field!(data.location, "location");
        add_field!(data.maintenance_team_id, "maintenance_team_id");
        add_field!(data.assigned_employee_id, "assigned_employee_id");
        add_field!(data.default_technician_id, "default_technician_id");
        add_field!(data.purchase_date, "purchase_date");
        add_field!(data.warranty_expiry, "warranty_expiry");
        add_field!(data.notes, "notes");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.serial_number);
        bind_field!(data.category);
        bind_field!(data.department);
        bind_field!(data.location);
        bind_field!(data.maintenance_team_id);
        bind_field!(data.assigned_employee_id);
        bind_field!(data.default_technician_id);
        bind_field!(data.purchase_date);
        bind_field!(data.warranty_expiry);
        bind_field!(data.notes);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "Serial number already exists"))?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment; its requests and their logs cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Team and technician defaults used to pre-fill a request
    pub async fn autofill(&self, id: i32) -> AppResult<EquipmentAutofill> {
        sqlx::query_as::<_, (Option<i32>, Option<String>, Option<i32>, EquipmentCategory, Department)>(
            r#"
            SELECT e.maintenance_team_id, t.name, e.default_technician_id, e.category, e.department
            FROM equipment e
            LEFT JOIN maintenance_teams t ON t.id = e.maintenance_team_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(|(team, team_name, technician, category, department)| EquipmentAutofill {
            maintenance_team: team,
            maintenance_team_name: team_name.unwrap_or_default(),
            default_technician: technician,
            category,
            department,
        })
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Requests against the equipment created at or after `since`
    pub async fn count_requests_since(&self, id: i32, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM maintenance_requests WHERE equipment_id = $1 AND created_at >= $2",
        )
        .bind(id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Requests against the equipment that are neither repaired nor scrapped
    pub async fn count_open_requests(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM maintenance_requests
            WHERE equipment_id = $1 AND stage NOT IN ('repaired', 'scrap')
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
