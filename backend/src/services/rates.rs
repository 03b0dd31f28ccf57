//! Rate table service: slab management and per-litre rate resolution

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use shared::{default_slabs, resolve_rate, slab_fat, validate_amount, MilkCategory, RateSlab};

/// Rate table service
#[derive(Clone)]
pub struct RateService {
    db: SqlitePool,
}

/// Database row for a rate slab
#[derive(Debug, sqlx::FromRow)]
struct RateSlabRow {
    id: i64,
    category: String,
    fat: f64,
    snf: f64,
    rate: f64,
}

/// A stored slab with its row id
#[derive(Debug, Clone, Serialize)]
pub struct RateSlabEntry {
    pub id: i64,
    pub category: MilkCategory,
    pub fat: f64,
    pub snf: f64,
    pub rate: f64,
}

impl TryFrom<RateSlabRow> for RateSlabEntry {
    type Error = AppError;

    fn try_from(row: RateSlabRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|e: &str| AppError::Internal(e.to_string()))?;
        Ok(RateSlabEntry {
            id: row.id,
            category,
            fat: row.fat,
            snf: row.snf,
            rate: row.rate,
        })
    }
}

/// Input for adding a slab
#[derive(Debug, Deserialize)]
pub struct AddRateSlabInput {
    pub category: MilkCategory,
    pub fat: f64,
    pub snf: f64,
    pub rate: f64,
}

impl RateService {
    /// Create a new RateService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List the rate table ordered by category and fat, optionally filtered
    pub async fn list_slabs(
        &self,
        category: Option<MilkCategory>,
    ) -> AppResult<Vec<RateSlabEntry>> {
        let mut sql =
            String::from("SELECT id, category, fat, snf, rate FROM rate_slabs");
        if category.is_some() {
            sql.push_str(" WHERE category = ?");
        }
        sql.push_str(" ORDER BY category, fat, snf");

        let mut query = sqlx::query_as::<_, RateSlabRow>(&sql);
        if let Some(c) = category {
            query = query.bind(c.as_str());
        }
        let rows = query.fetch_all(&self.db).await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Add a slab; the fat reading is stored on the 0.1 grid
    pub async fn add_slab(&self, input: AddRateSlabInput) -> AppResult<RateSlabEntry> {
        validate_amount(input.rate).map_err(|e| AppError::Validation {
            field: "rate".to_string(),
            message: e.to_string(),
        })?;
        if input.fat < 0.0 || input.snf < 0.0 {
            return Err(AppError::ValidationError(
                "fat and SNF cannot be negative".to_string(),
            ));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO rate_slabs (category, fat, snf, rate) VALUES (?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(input.category.as_str())
        .bind(slab_fat(input.fat))
        .bind(input.snf)
        .bind(input.rate)
        .fetch_one(&self.db)
        .await?;

        Ok(RateSlabEntry {
            id,
            category: input.category,
            fat: slab_fat(input.fat),
            snf: input.snf,
            rate: input.rate,
        })
    }

    /// Delete a slab row
    pub async fn delete_slab(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM rate_slabs WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Rate slab".to_string()));
        }
        Ok(())
    }

    /// Resolve the per-litre rate for a fat/SNF reading
    pub async fn find_rate(
        &self,
        category: MilkCategory,
        fat: f64,
        snf: f64,
    ) -> AppResult<f64> {
        let rows = sqlx::query_as::<_, RateSlabRow>(
            "SELECT id, category, fat, snf, rate FROM rate_slabs WHERE category = ?",
        )
        .bind(category.as_str())
        .fetch_all(&self.db)
        .await?;

        let slabs: Vec<RateSlab> = rows
            .into_iter()
            .map(|r| RateSlab {
                category,
                fat: r.fat,
                snf: r.snf,
                rate: r.rate,
            })
            .collect();

        Ok(resolve_rate(&slabs, category, fat, snf))
    }

    /// Seed the default slab set when the table is empty; returns the number
    /// of slabs inserted
    pub async fn seed_defaults_if_empty(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rate_slabs")
            .fetch_one(&self.db)
            .await?;
        if count > 0 {
            return Ok(0);
        }

        let slabs = default_slabs();
        let mut tx = self.db.begin().await?;
        for slab in &slabs {
            sqlx::query("INSERT INTO rate_slabs (category, fat, snf, rate) VALUES (?, ?, ?, ?)")
                .bind(slab.category.as_str())
                .bind(slab.fat)
                .bind(slab.snf)
                .bind(slab.rate)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Ok(slabs.len() as u64)
    }
}
