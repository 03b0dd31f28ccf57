//! Dashboard aggregates for the day's collection desk

use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::AppResult;
use shared::{MilkCategory, Shift};

/// Dashboard aggregation service
#[derive(Clone)]
pub struct DashboardService {
    db: SqlitePool,
}

/// Litres and amount totals for one category
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryTotals {
    pub litres: f64,
    pub amount: f64,
}

/// Summary figures shown on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub farmer_count: i64,
    pub today_cow: CategoryTotals,
    pub today_buffalo: CategoryTotals,
    pub today_sales_cow: CategoryTotals,
    pub today_sales_buffalo: CategoryTotals,
    pub total_milk_records: i64,
}

/// Filter for the dashboard view
#[derive(Debug, Default, Deserialize)]
pub struct DashboardFilter {
    /// Restrict today's intake totals to one shift
    pub shift: Option<Shift>,
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    litres: f64,
    amount: f64,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Summary for today's operations
    pub async fn summary(&self, filter: DashboardFilter) -> AppResult<DashboardSummary> {
        let today = Local::now().date_naive();

        let farmer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM farmers")
            .fetch_one(&self.db)
            .await?;
        let total_milk_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM milk_records")
            .fetch_one(&self.db)
            .await?;

        let today_cow = self
            .intake_totals(today, MilkCategory::Cow, filter.shift)
            .await?;
        let today_buffalo = self
            .intake_totals(today, MilkCategory::Buffalo, filter.shift)
            .await?;
        let today_sales_cow = self.sales_totals(today, MilkCategory::Cow).await?;
        let today_sales_buffalo = self.sales_totals(today, MilkCategory::Buffalo).await?;

        Ok(DashboardSummary {
            farmer_count,
            today_cow,
            today_buffalo,
            today_sales_cow,
            today_sales_buffalo,
            total_milk_records,
        })
    }

    async fn intake_totals(
        &self,
        date: chrono::NaiveDate,
        category: MilkCategory,
        shift: Option<Shift>,
    ) -> AppResult<CategoryTotals> {
        let mut sql = String::from(
            "SELECT COALESCE(SUM(litres), 0.0) AS litres, \
             COALESCE(SUM(amount), 0.0) AS amount \
             FROM milk_records WHERE date = ? AND category = ?",
        );
        if shift.is_some() {
            sql.push_str(" AND shift = ?");
        }

        let mut query = sqlx::query_as::<_, TotalsRow>(&sql)
            .bind(date)
            .bind(category.as_str());
        if let Some(s) = shift {
            query = query.bind(s.as_str());
        }
        let row = query.fetch_one(&self.db).await?;

        Ok(CategoryTotals {
            litres: shared::round2(row.litres),
            amount: shared::round2(row.amount),
        })
    }

    async fn sales_totals(
        &self,
        date: chrono::NaiveDate,
        category: MilkCategory,
    ) -> AppResult<CategoryTotals> {
        let row = sqlx::query_as::<_, TotalsRow>(
            "SELECT COALESCE(SUM(litres), 0.0) AS litres, \
             COALESCE(SUM(amount), 0.0) AS amount \
             FROM sales WHERE date = ? AND category = ?",
        )
        .bind(date)
        .bind(category.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(CategoryTotals {
            litres: shared::round2(row.litres),
            amount: shared::round2(row.amount),
        })
    }
}
