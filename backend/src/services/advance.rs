//! Advance ledger service: payouts, deductions and running balances

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use shared::{advance_balance, validate_amount, Advance, AdvanceDeduction, Month};

/// Advance ledger service
#[derive(Clone)]
pub struct AdvanceService {
    db: SqlitePool,
}

#[derive(Debug, sqlx::FromRow)]
struct AdvanceRow {
    id: i64,
    farmer_code: i64,
    date: NaiveDate,
    reason: Option<String>,
    amount: f64,
}

impl From<AdvanceRow> for Advance {
    fn from(row: AdvanceRow) -> Self {
        Advance {
            id: row.id,
            farmer_code: row.farmer_code,
            date: row.date,
            reason: row.reason,
            amount: row.amount,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DeductionRow {
    id: i64,
    farmer_code: i64,
    date: NaiveDate,
    month: String,
    amount: f64,
    note: Option<String>,
}

impl TryFrom<DeductionRow> for AdvanceDeduction {
    type Error = AppError;

    fn try_from(row: DeductionRow) -> Result<Self, Self::Error> {
        let month = row
            .month
            .parse::<Month>()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(AdvanceDeduction {
            id: row.id,
            farmer_code: row.farmer_code,
            date: row.date,
            month,
            amount: row.amount,
            note: row.note,
        })
    }
}

/// An advance entry joined with the farmer name
#[derive(Debug, Clone, Serialize)]
pub struct AdvanceWithFarmer {
    #[serde(flatten)]
    pub advance: Advance,
    pub farmer_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct AdvanceWithFarmerRow {
    id: i64,
    farmer_code: i64,
    farmer_name: Option<String>,
    date: NaiveDate,
    reason: Option<String>,
    amount: f64,
}

impl From<AdvanceWithFarmerRow> for AdvanceWithFarmer {
    fn from(row: AdvanceWithFarmerRow) -> Self {
        AdvanceWithFarmer {
            advance: Advance {
                id: row.id,
                farmer_code: row.farmer_code,
                date: row.date,
                reason: row.reason,
                amount: row.amount,
            },
            farmer_name: row.farmer_name,
        }
    }
}

/// Input for paying out an advance
#[derive(Debug, Deserialize)]
pub struct RecordAdvanceInput {
    pub farmer_code: i64,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub amount: f64,
}

/// A farmer's current advance position
#[derive(Debug, Clone, Serialize)]
pub struct AdvanceBalance {
    pub farmer_code: i64,
    pub total_advances: f64,
    pub total_deductions: f64,
    pub balance: f64,
}

impl AdvanceService {
    /// Create a new AdvanceService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Pay out an advance to a farmer
    pub async fn record_advance(&self, input: RecordAdvanceInput) -> AppResult<Advance> {
        crate::services::FarmerService::new(self.db.clone())
            .get_farmer(input.farmer_code)
            .await?;
        validate_amount(input.amount)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let date = input.date.unwrap_or_else(|| Local::now().date_naive());
        let row = sqlx::query_as::<_, AdvanceRow>(
            "INSERT INTO advances (farmer_code, date, reason, amount) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, farmer_code, date, reason, amount",
        )
        .bind(input.farmer_code)
        .bind(date)
        .bind(&input.reason)
        .bind(input.amount)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// List advances with farmer names, newest first, optionally for one farmer
    pub async fn list_advances(
        &self,
        farmer_code: Option<i64>,
    ) -> AppResult<Vec<AdvanceWithFarmer>> {
        let mut sql = String::from(
            "SELECT a.id, a.farmer_code, f.name AS farmer_name, a.date, a.reason, a.amount \
             FROM advances a \
             LEFT JOIN farmers f ON f.farmer_code = a.farmer_code",
        );
        if farmer_code.is_some() {
            sql.push_str(" WHERE a.farmer_code = ?");
        }
        sql.push_str(" ORDER BY a.date DESC, a.id DESC");

        let mut query = sqlx::query_as::<_, AdvanceWithFarmerRow>(&sql);
        if let Some(code) = farmer_code {
            query = query.bind(code);
        }
        let rows = query.fetch_all(&self.db).await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Outstanding balance for a farmer across the whole ledger
    pub async fn balance(&self, farmer_code: i64) -> AppResult<AdvanceBalance> {
        self.balance_inner(farmer_code, None).await
    }

    /// Outstanding balance counting every advance ever paid, but only
    /// deductions recorded for months before the given one. Used by
    /// settlement so the month being settled never deducts against itself.
    pub async fn balance_before(
        &self,
        farmer_code: i64,
        month: Month,
    ) -> AppResult<AdvanceBalance> {
        self.balance_inner(farmer_code, Some(month)).await
    }

    async fn balance_inner(
        &self,
        farmer_code: i64,
        before: Option<Month>,
    ) -> AppResult<AdvanceBalance> {
        crate::services::FarmerService::new(self.db.clone())
            .get_farmer(farmer_code)
            .await?;

        let total_advances: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM advances WHERE farmer_code = ?",
        )
        .bind(farmer_code)
        .fetch_one(&self.db)
        .await?;

        let total_deductions: f64 = match before {
            // month is stored YYYY-MM, so text comparison is chronological
            Some(month) => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(amount), 0.0) FROM advance_deductions \
                     WHERE farmer_code = ? AND month < ?",
                )
                .bind(farmer_code)
                .bind(month.to_string())
                .fetch_one(&self.db)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(amount), 0.0) FROM advance_deductions \
                     WHERE farmer_code = ?",
                )
                .bind(farmer_code)
                .fetch_one(&self.db)
                .await?
            }
        };

        Ok(AdvanceBalance {
            farmer_code,
            total_advances: shared::round2(total_advances),
            total_deductions: shared::round2(total_deductions),
            balance: advance_balance(total_advances, total_deductions),
        })
    }

    /// Record a deduction applied against a month's settlement
    pub async fn record_deduction(
        &self,
        farmer_code: i64,
        month: Month,
        amount: f64,
        note: Option<String>,
    ) -> AppResult<AdvanceDeduction> {
        let row = sqlx::query_as::<_, DeductionRow>(
            "INSERT INTO advance_deductions (farmer_code, date, month, amount, note) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, farmer_code, date, month, amount, note",
        )
        .bind(farmer_code)
        .bind(Local::now().date_naive())
        .bind(month.to_string())
        .bind(amount)
        .bind(&note)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Total advances paid to a farmer within a month
    pub async fn month_advances(&self, farmer_code: i64, month: Month) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM advances \
             WHERE farmer_code = ? AND date BETWEEN ? AND ?",
        )
        .bind(farmer_code)
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_one(&self.db)
        .await?;

        Ok(shared::round2(total))
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
        sqlx::query("INSERT INTO farmers (farmer_code, name, category) VALUES (1, 'Asha', 'Cow')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn balance_before_counts_advances_paid_within_the_month() {
        let pool = test_pool().await;
        let service = AdvanceService::new(pool);
        service
            .record_advance(RecordAdvanceInput {
                farmer_code: 1,
                date: NaiveDate::from_ymd_opt(2025, 3, 10),
                reason: None,
                amount: 500.0,
            })
            .await
            .unwrap();

        let month: Month = "2025-03".parse().unwrap();
        let balance = service.balance_before(1, month).await.unwrap();
        assert_eq!(balance.total_advances, 500.0);
        assert_eq!(balance.balance, 500.0);
    }

    #[tokio::test]
    async fn balance_before_excludes_the_month_being_settled() {
        let pool = test_pool().await;
        let service = AdvanceService::new(pool);
        service
            .record_advance(RecordAdvanceInput {
                farmer_code: 1,
                date: NaiveDate::from_ymd_opt(2025, 1, 15),
                reason: None,
                amount: 800.0,
            })
            .await
            .unwrap();
        let february: Month = "2025-02".parse().unwrap();
        let march: Month = "2025-03".parse().unwrap();
        service
            .record_deduction(1, february, 300.0, None)
            .await
            .unwrap();
        service.record_deduction(1, march, 100.0, None).await.unwrap();

        // February's deduction counts, March's own does not
        let balance = service.balance_before(1, march).await.unwrap();
        assert_eq!(balance.total_deductions, 300.0);
        assert_eq!(balance.balance, 500.0);

        // the unrestricted balance sees both
        let balance = service.balance(1).await.unwrap();
        assert_eq!(balance.balance, 400.0);
    }
}
