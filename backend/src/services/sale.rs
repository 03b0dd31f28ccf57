//! Wholesale sales service

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use shared::{amount_for, validate_amount, MilkCategory, Month, Sale};

/// Wholesale sales service
#[derive(Clone)]
pub struct SaleService {
    db: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    date: NaiveDate,
    dairy_name: String,
    category: String,
    litres: f64,
    fat: f64,
    rate: f64,
    amount: f64,
}

impl TryFrom<SaleRow> for Sale {
    type Error = AppError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<MilkCategory>()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Sale {
            id: row.id,
            date: row.date,
            dairy_name: row.dairy_name,
            category,
            litres: row.litres,
            fat: row.fat,
            rate: row.rate,
            amount: row.amount,
        })
    }
}

/// Input for recording a wholesale dispatch
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub dairy_name: String,
    pub category: MilkCategory,
    pub litres: f64,
    pub fat: f64,
    pub rate: f64,
    /// Defaults to litres * rate when omitted
    pub amount: Option<f64>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record a wholesale sale to an external dairy
    pub async fn record_sale(&self, input: RecordSaleInput) -> AppResult<Sale> {
        let dairy_name = input.dairy_name.trim().to_string();
        if dairy_name.is_empty() {
            return Err(AppError::Validation {
                field: "dairy_name".to_string(),
                message: "Dairy name is required".to_string(),
            });
        }
        if input.litres < 0.0 {
            return Err(AppError::Validation {
                field: "litres".to_string(),
                message: "Litres cannot be negative".to_string(),
            });
        }
        if input.rate < 0.0 {
            return Err(AppError::Validation {
                field: "rate".to_string(),
                message: "Rate cannot be negative".to_string(),
            });
        }

        let amount = match input.amount {
            Some(a) => {
                validate_amount(a).map_err(|e| AppError::ValidationError(e.to_string()))?;
                shared::round2(a)
            }
            None => amount_for(input.litres, input.rate),
        };
        let date = input.date.unwrap_or_else(|| Local::now().date_naive());

        let row = sqlx::query_as::<_, SaleRow>(
            "INSERT INTO sales (date, dairy_name, category, litres, fat, rate, amount) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, date, dairy_name, category, litres, fat, rate, amount",
        )
        .bind(date)
        .bind(&dairy_name)
        .bind(input.category.as_str())
        .bind(input.litres)
        .bind(input.fat)
        .bind(input.rate)
        .bind(amount)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// List sales, newest first
    pub async fn list_sales(&self, limit: Option<i64>) -> AppResult<Vec<Sale>> {
        let limit = limit.unwrap_or(1000).clamp(1, 5000);
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, date, dairy_name, category, litres, fat, rate, amount \
             FROM sales ORDER BY date DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// All sales within a month, ordered by date
    pub async fn month_sales(&self, month: Month) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, date, dairy_name, category, litres, fat, rate, amount \
             FROM sales WHERE date BETWEEN ? AND ? ORDER BY date, id",
        )
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn zero_litre_correction_entry_is_accepted() {
        let pool = test_pool().await;
        let service = SaleService::new(pool);

        let sale = service
            .record_sale(RecordSaleInput {
                date: NaiveDate::from_ymd_opt(2025, 3, 5),
                dairy_name: "Amul".to_string(),
                category: MilkCategory::Cow,
                litres: 0.0,
                fat: 4.0,
                rate: 50.0,
                amount: None,
            })
            .await
            .unwrap();
        assert_eq!(sale.litres, 0.0);
        assert_eq!(sale.amount, 0.0);
    }

    #[tokio::test]
    async fn negative_litres_rejected() {
        let pool = test_pool().await;
        let service = SaleService::new(pool);

        let result = service
            .record_sale(RecordSaleInput {
                date: None,
                dairy_name: "Amul".to_string(),
                category: MilkCategory::Cow,
                litres: -1.0,
                fat: 4.0,
                rate: 50.0,
                amount: None,
            })
            .await;
        assert!(result.is_err());
    }
}
