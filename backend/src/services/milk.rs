//! Milk intake service: shift entries, late corrections and listings

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::rates::RateService;
use shared::{
    amount_for, fat_in_expected_range, slab_fat, validate_intake_quantities, Farmer,
    FarmerCategory, MilkCategory, MilkRecord, Month, Shift, DEFAULT_SNF,
};

/// Milk intake service
#[derive(Clone)]
pub struct MilkService {
    db: SqlitePool,
}

/// Database row for a milk record
#[derive(Debug, sqlx::FromRow)]
struct MilkRow {
    id: i64,
    farmer_code: i64,
    date: NaiveDate,
    shift: String,
    category: String,
    litres: f64,
    fat: f64,
    snf: f64,
    rate: f64,
    amount: f64,
}

impl TryFrom<MilkRow> for MilkRecord {
    type Error = AppError;

    fn try_from(row: MilkRow) -> Result<Self, Self::Error> {
        let shift = row
            .shift
            .parse::<Shift>()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let category = row
            .category
            .parse::<MilkCategory>()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(MilkRecord {
            id: row.id,
            farmer_code: row.farmer_code,
            date: row.date,
            shift,
            category,
            litres: row.litres,
            fat: row.fat,
            snf: row.snf,
            rate: row.rate,
            amount: row.amount,
        })
    }
}

/// Database row for a milk record joined with the farmer name
#[derive(Debug, sqlx::FromRow)]
struct MilkWithFarmerRow {
    id: i64,
    farmer_code: i64,
    farmer_name: Option<String>,
    date: NaiveDate,
    shift: String,
    category: String,
    litres: f64,
    fat: f64,
    snf: f64,
    rate: f64,
    amount: f64,
}

/// A milk record as shown on the dashboard listing
#[derive(Debug, Clone, Serialize)]
pub struct MilkRecordWithFarmer {
    #[serde(flatten)]
    pub record: MilkRecord,
    pub farmer_name: Option<String>,
}

impl TryFrom<MilkWithFarmerRow> for MilkRecordWithFarmer {
    type Error = AppError;

    fn try_from(row: MilkWithFarmerRow) -> Result<Self, Self::Error> {
        let farmer_name = row.farmer_name.clone();
        let record = MilkRow {
            id: row.id,
            farmer_code: row.farmer_code,
            date: row.date,
            shift: row.shift,
            category: row.category,
            litres: row.litres,
            fat: row.fat,
            snf: row.snf,
            rate: row.rate,
            amount: row.amount,
        }
        .try_into()?;
        Ok(MilkRecordWithFarmer {
            record,
            farmer_name,
        })
    }
}

/// Input for recording an intake entry
#[derive(Debug, Deserialize)]
pub struct RecordMilkInput {
    pub farmer_code: i64,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    /// Defaults to the shift for the current time
    pub shift: Option<Shift>,
    /// Required for farmers registered under `Both`
    pub category: Option<MilkCategory>,
    pub litres: f64,
    pub fat: f64,
    /// Defaults to 8.0 when the tester did not report one
    pub snf: Option<f64>,
    /// Overrides rate resolution when supplied
    pub rate: Option<f64>,
}

/// Input for a late (missed-shift) correction entry
#[derive(Debug, Deserialize)]
pub struct LateMilkInput {
    pub farmer_code: i64,
    pub date: NaiveDate,
    pub shift: Shift,
    pub category: Option<MilkCategory>,
    pub litres: f64,
    pub fat: f64,
    pub snf: Option<f64>,
}

/// Listing filter for milk records
#[derive(Debug, Default, Deserialize)]
pub struct MilkListFilter {
    pub shift: Option<Shift>,
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl MilkService {
    /// Create a new MilkService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record an intake entry for a shift
    pub async fn record_milk(&self, input: RecordMilkInput) -> AppResult<MilkRecord> {
        let farmer = self.fetch_farmer(input.farmer_code).await?;
        let category = record_category(&farmer, input.category)?;

        let now = Local::now();
        let date = input.date.unwrap_or_else(|| now.date_naive());
        if date > now.date_naive() {
            return Err(AppError::Validation {
                field: "date".to_string(),
                message: "Cannot record milk for a future date".to_string(),
            });
        }
        let shift = input.shift.unwrap_or_else(|| Shift::for_time(now.time()));

        let snf = input.snf.unwrap_or(DEFAULT_SNF);
        let fat = slab_fat(input.fat);
        validate_intake_quantities(input.litres, fat, snf).map_err(|e| {
            AppError::ValidationError(e.to_string())
        })?;
        if !fat_in_expected_range(category, fat) {
            tracing::warn!(
                "Fat {:.1} outside expected range for {} (farmer {})",
                fat,
                category,
                input.farmer_code
            );
        }

        let rate = match input.rate {
            Some(r) if r >= 0.0 => r,
            Some(_) => {
                return Err(AppError::Validation {
                    field: "rate".to_string(),
                    message: "Rate cannot be negative".to_string(),
                })
            }
            None => {
                RateService::new(self.db.clone())
                    .find_rate(category, fat, snf)
                    .await?
            }
        };
        let amount = amount_for(input.litres, rate);

        let row = sqlx::query_as::<_, MilkRow>(
            "INSERT INTO milk_records \
             (farmer_code, date, shift, category, litres, fat, snf, rate, amount) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, farmer_code, date, shift, category, litres, fat, snf, rate, amount",
        )
        .bind(input.farmer_code)
        .bind(date)
        .bind(shift.as_str())
        .bind(category.as_str())
        .bind(input.litres)
        .bind(fat)
        .bind(snf)
        .bind(rate)
        .bind(amount)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Record a missed entry after the shift closed: inserts, or updates the
    /// existing row keyed on (farmer, date, shift, category)
    pub async fn record_milk_late(&self, input: LateMilkInput) -> AppResult<MilkRecord> {
        let farmer = self.fetch_farmer(input.farmer_code).await?;
        let category = record_category(&farmer, input.category)?;

        if input.date > Local::now().date_naive() {
            return Err(AppError::Validation {
                field: "date".to_string(),
                message: "Cannot record milk for a future date".to_string(),
            });
        }

        let snf = input.snf.unwrap_or(DEFAULT_SNF);
        let fat = slab_fat(input.fat);
        validate_intake_quantities(input.litres, fat, snf).map_err(|e| {
            AppError::ValidationError(e.to_string())
        })?;

        let rate = RateService::new(self.db.clone())
            .find_rate(category, fat, snf)
            .await?;
        let amount = amount_for(input.litres, rate);

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM milk_records \
             WHERE farmer_code = ? AND date = ? AND shift = ? AND category = ?",
        )
        .bind(input.farmer_code)
        .bind(input.date)
        .bind(input.shift.as_str())
        .bind(category.as_str())
        .fetch_optional(&self.db)
        .await?;

        let row = match existing {
            Some(id) => {
                sqlx::query_as::<_, MilkRow>(
                    "UPDATE milk_records \
                     SET litres = ?, fat = ?, snf = ?, rate = ?, amount = ? \
                     WHERE id = ? \
                     RETURNING id, farmer_code, date, shift, category, litres, fat, snf, \
                               rate, amount",
                )
                .bind(input.litres)
                .bind(fat)
                .bind(snf)
                .bind(rate)
                .bind(amount)
                .bind(id)
                .fetch_one(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MilkRow>(
                    "INSERT INTO milk_records \
                     (farmer_code, date, shift, category, litres, fat, snf, rate, amount) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
                     RETURNING id, farmer_code, date, shift, category, litres, fat, snf, \
                               rate, amount",
                )
                .bind(input.farmer_code)
                .bind(input.date)
                .bind(input.shift.as_str())
                .bind(category.as_str())
                .bind(input.litres)
                .bind(fat)
                .bind(snf)
                .bind(rate)
                .bind(amount)
                .fetch_one(&self.db)
                .await?
            }
        };

        row.try_into()
    }

    /// List recent milk records with farmer names, newest first
    pub async fn list_milk(&self, filter: MilkListFilter) -> AppResult<Vec<MilkRecordWithFarmer>> {
        let limit = filter.limit.unwrap_or(1000).clamp(1, 5000);

        let mut sql = String::from(
            "SELECT m.id, m.farmer_code, f.name AS farmer_name, m.date, m.shift, \
             m.category, m.litres, m.fat, m.snf, m.rate, m.amount \
             FROM milk_records m \
             LEFT JOIN farmers f ON f.farmer_code = m.farmer_code WHERE 1 = 1",
        );
        if filter.date.is_some() {
            sql.push_str(" AND m.date = ?");
        }
        if filter.shift.is_some() {
            sql.push_str(" AND m.shift = ?");
        }
        sql.push_str(" ORDER BY m.date DESC, m.id DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, MilkWithFarmerRow>(&sql);
        if let Some(date) = filter.date {
            query = query.bind(date);
        }
        if let Some(shift) = filter.shift {
            query = query.bind(shift.as_str());
        }
        let rows = query.bind(limit).fetch_all(&self.db).await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// All records for a farmer, category and month, ordered by date and shift
    pub async fn month_records(
        &self,
        farmer_code: i64,
        category: MilkCategory,
        month: Month,
    ) -> AppResult<Vec<MilkRecord>> {
        let rows = sqlx::query_as::<_, MilkRow>(
            "SELECT id, farmer_code, date, shift, category, litres, fat, snf, rate, amount \
             FROM milk_records \
             WHERE farmer_code = ? AND category = ? AND date BETWEEN ? AND ? \
             ORDER BY date, shift",
        )
        .bind(farmer_code)
        .bind(category.as_str())
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// All records for a farmer and month across categories
    pub async fn farmer_month_records(
        &self,
        farmer_code: i64,
        month: Month,
    ) -> AppResult<Vec<MilkRecord>> {
        let rows = sqlx::query_as::<_, MilkRow>(
            "SELECT id, farmer_code, date, shift, category, litres, fat, snf, rate, amount \
             FROM milk_records \
             WHERE farmer_code = ? AND date BETWEEN ? AND ? \
             ORDER BY date, shift, category",
        )
        .bind(farmer_code)
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Total payable amount earned by a farmer in a month, across categories
    pub async fn month_earnings(&self, farmer_code: i64, month: Month) -> AppResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM milk_records \
             WHERE farmer_code = ? AND date BETWEEN ? AND ?",
        )
        .bind(farmer_code)
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_one(&self.db)
        .await?;

        Ok(shared::round2(total))
    }

    async fn fetch_farmer(&self, farmer_code: i64) -> AppResult<Farmer> {
        crate::services::FarmerService::new(self.db.clone())
            .get_farmer(farmer_code)
            .await
    }
}

/// Category for a record given the farmer's registration
fn record_category(
    farmer: &Farmer,
    requested: Option<MilkCategory>,
) -> AppResult<MilkCategory> {
    match (farmer.category, requested) {
        (FarmerCategory::Both, Some(c)) => Ok(c),
        (FarmerCategory::Both, None) => Err(AppError::Validation {
            field: "category".to_string(),
            message: "Farmer supplies both categories; one must be selected".to_string(),
        }),
        (FarmerCategory::Cow, Some(MilkCategory::Buffalo))
        | (FarmerCategory::Buffalo, Some(MilkCategory::Cow)) => Err(AppError::Validation {
            field: "category".to_string(),
            message: format!("Farmer is registered for {} only", farmer.category),
        }),
        (FarmerCategory::Cow, _) => Ok(MilkCategory::Cow),
        (FarmerCategory::Buffalo, _) => Ok(MilkCategory::Buffalo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farmer(category: FarmerCategory) -> Farmer {
        Farmer {
            farmer_code: 1,
            name: "Test".to_string(),
            village: None,
            contact: None,
            category,
        }
    }

    #[test]
    fn single_category_farmer_ignores_missing_selection() {
        let got = record_category(&farmer(FarmerCategory::Buffalo), None).unwrap();
        assert_eq!(got, MilkCategory::Buffalo);
    }

    #[test]
    fn both_farmer_requires_selection() {
        assert!(record_category(&farmer(FarmerCategory::Both), None).is_err());
        let got =
            record_category(&farmer(FarmerCategory::Both), Some(MilkCategory::Cow)).unwrap();
        assert_eq!(got, MilkCategory::Cow);
    }

    #[test]
    fn mismatched_selection_rejected() {
        assert!(record_category(&farmer(FarmerCategory::Cow), Some(MilkCategory::Buffalo)).is_err());
    }
}
