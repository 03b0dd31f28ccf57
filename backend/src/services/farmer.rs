//! Farmer registry service: code assignment, lookups and cascading deletes

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use shared::{next_farmer_code, Farmer, FarmerCategory};

/// Farmer registry service
#[derive(Clone)]
pub struct FarmerService {
    db: SqlitePool,
}

/// Database row for a farmer
#[derive(Debug, sqlx::FromRow)]
struct FarmerRow {
    farmer_code: i64,
    name: String,
    village: Option<String>,
    contact: Option<String>,
    category: String,
}

impl From<FarmerRow> for Farmer {
    fn from(row: FarmerRow) -> Self {
        Farmer {
            farmer_code: row.farmer_code,
            name: row.name,
            village: row.village,
            contact: row.contact,
            category: row.category.parse().unwrap_or_default(),
        }
    }
}

/// Input for registering a farmer
#[derive(Debug, Deserialize)]
pub struct CreateFarmerInput {
    pub name: String,
    pub village: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub category: FarmerCategory,
}

/// Input for updating a farmer
#[derive(Debug, Deserialize)]
pub struct UpdateFarmerInput {
    pub name: String,
    pub village: Option<String>,
    pub contact: Option<String>,
    pub category: FarmerCategory,
}

impl FarmerService {
    /// Create a new FarmerService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List all farmers ordered by code
    pub async fn list_farmers(&self) -> AppResult<Vec<Farmer>> {
        let rows = sqlx::query_as::<_, FarmerRow>(
            "SELECT farmer_code, name, village, contact, category \
             FROM farmers ORDER BY farmer_code",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a farmer by code
    pub async fn get_farmer(&self, farmer_code: i64) -> AppResult<Farmer> {
        let row = sqlx::query_as::<_, FarmerRow>(
            "SELECT farmer_code, name, village, contact, category \
             FROM farmers WHERE farmer_code = ?",
        )
        .bind(farmer_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Farmer".to_string()))?;

        Ok(row.into())
    }

    /// Register a farmer under the smallest unused code
    pub async fn create_farmer(&self, input: CreateFarmerInput) -> AppResult<Farmer> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Farmer name is required".to_string(),
            });
        }

        let existing: Vec<i64> =
            sqlx::query_scalar("SELECT farmer_code FROM farmers ORDER BY farmer_code")
                .fetch_all(&self.db)
                .await?;
        let code = next_farmer_code(&existing);

        sqlx::query(
            "INSERT INTO farmers (farmer_code, name, village, contact, category) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(code)
        .bind(input.name.trim())
        .bind(&input.village)
        .bind(&input.contact)
        .bind(input.category.as_str())
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("farmer_code".to_string())
            }
            other => AppError::DatabaseError(other),
        })?;

        self.get_farmer(code).await
    }

    /// Update a farmer's details
    pub async fn update_farmer(
        &self,
        farmer_code: i64,
        input: UpdateFarmerInput,
    ) -> AppResult<Farmer> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Farmer name is required".to_string(),
            });
        }

        let result = sqlx::query(
            "UPDATE farmers SET name = ?, village = ?, contact = ?, category = ? \
             WHERE farmer_code = ?",
        )
        .bind(input.name.trim())
        .bind(&input.village)
        .bind(&input.contact)
        .bind(input.category.as_str())
        .bind(farmer_code)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Farmer".to_string()));
        }

        self.get_farmer(farmer_code).await
    }

    /// Delete a farmer together with all related records, freeing the code
    /// for reuse
    pub async fn delete_farmer(&self, farmer_code: i64) -> AppResult<()> {
        // Existence check gives a clean 404 instead of a silent no-op
        self.get_farmer(farmer_code).await?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM milk_records WHERE farmer_code = ?")
            .bind(farmer_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM advances WHERE farmer_code = ?")
            .bind(farmer_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM advance_deductions WHERE farmer_code = ?")
            .bind(farmer_code)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM farmers WHERE farmer_code = ?")
            .bind(farmer_code)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Deleted farmer {} and related records", farmer_code);
        Ok(())
    }
}
