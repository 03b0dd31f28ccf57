//! Monthly farmer settlement: bill preview, deduction capture and PDF bills

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::pdf::PdfWriter;
use crate::services::{AdvanceService, FarmerService, MilkService};
use shared::{
    net_payable, round2, suggested_deduction, validate_deduction, Farmer, MilkCategory,
    MilkRecord, Month,
};

/// Monthly settlement service
#[derive(Clone)]
pub struct BillingService {
    db: SqlitePool,
    bills_dir: PathBuf,
}

/// Milk totals for one category within the bill month
#[derive(Debug, Clone, Serialize)]
pub struct BillCategorySection {
    pub category: MilkCategory,
    pub records: usize,
    pub litres: f64,
    pub amount: f64,
}

/// Figures shown before the operator confirms a settlement
#[derive(Debug, Clone, Serialize)]
pub struct BillPreview {
    pub farmer: Farmer,
    pub month: Month,
    pub sections: Vec<BillCategorySection>,
    pub earnings: f64,
    pub month_advances: f64,
    pub advance_balance: f64,
    pub suggested_deduction: f64,
}

/// Input for confirming a settlement
#[derive(Debug, Deserialize)]
pub struct SettleBillInput {
    pub farmer_code: i64,
    pub month: Month,
    /// Defaults to the suggested deduction
    pub deduction: Option<f64>,
    /// Permit deducting more than this month's earnings
    #[serde(default)]
    pub allow_exceeding_earnings: bool,
}

/// Result of a confirmed settlement
#[derive(Debug, Clone, Serialize)]
pub struct BillSettlement {
    pub farmer_code: i64,
    pub month: Month,
    pub earnings: f64,
    pub deduction: f64,
    pub net_payable: f64,
    pub remaining_balance: f64,
    pub bill_path: String,
}

impl BillingService {
    /// Create a new BillingService instance
    pub fn new(db: SqlitePool, bills_dir: PathBuf) -> Self {
        Self { db, bills_dir }
    }

    /// Earnings, outstanding advances and the suggested deduction for a month
    pub async fn preview(&self, farmer_code: i64, month: Month) -> AppResult<BillPreview> {
        let farmer = FarmerService::new(self.db.clone())
            .get_farmer(farmer_code)
            .await?;
        let milk = MilkService::new(self.db.clone());

        let mut sections = Vec::new();
        for category in farmer.category.milk_categories().iter().copied() {
            let records = milk.month_records(farmer_code, category, month).await?;
            if records.is_empty() {
                continue;
            }
            sections.push(section_totals(category, &records));
        }
        let earnings = milk.month_earnings(farmer_code, month).await?;

        let advances = AdvanceService::new(self.db.clone());
        let month_advances = advances.month_advances(farmer_code, month).await?;
        let balance = advances.balance_before(farmer_code, month).await?.balance;

        Ok(BillPreview {
            farmer,
            month,
            sections,
            earnings,
            month_advances,
            advance_balance: balance,
            suggested_deduction: suggested_deduction(balance, earnings),
        })
    }

    /// Confirm a settlement: validate the deduction, record it in the ledger
    /// and write the bill PDF
    pub async fn settle(&self, input: SettleBillInput) -> AppResult<BillSettlement> {
        let preview = self.preview(input.farmer_code, input.month).await?;
        if preview.sections.is_empty() {
            return Err(AppError::NoData(format!(
                "farmer {} in {}",
                input.farmer_code, input.month
            )));
        }

        let deduction = round2(input.deduction.unwrap_or(preview.suggested_deduction));
        validate_deduction(
            deduction,
            preview.advance_balance,
            preview.earnings,
            input.allow_exceeding_earnings,
        )
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let net = net_payable(preview.earnings, deduction);
        let remaining = round2(preview.advance_balance - deduction);

        // the ledger row is written only once the bill is safely on disk, so
        // a failed write can be retried without deducting twice
        let bill_path = self
            .bills_dir
            .join(format!("Bill_{}_{}.pdf", input.farmer_code, input.month));
        self.write_bill_pdf(&preview, deduction, net, remaining, &bill_path)
            .await?;

        if deduction > 0.0 {
            AdvanceService::new(self.db.clone())
                .record_deduction(
                    input.farmer_code,
                    input.month,
                    deduction,
                    Some(format!("Monthly settlement for {}", input.month)),
                )
                .await?;
        }
        tracing::info!(
            "Settled {} for farmer {}: net payable {:.2}",
            input.month,
            input.farmer_code,
            net
        );

        Ok(BillSettlement {
            farmer_code: input.farmer_code,
            month: input.month,
            earnings: preview.earnings,
            deduction,
            net_payable: net,
            remaining_balance: remaining,
            bill_path: bill_path.display().to_string(),
        })
    }

    /// Fetches all section records first; the PDF itself is rendered
    /// synchronously so the writer never spans an await point
    async fn write_bill_pdf(
        &self,
        preview: &BillPreview,
        deduction: f64,
        net: f64,
        remaining: f64,
        path: &Path,
    ) -> AppResult<()> {
        let milk = MilkService::new(self.db.clone());
        let mut section_records = Vec::with_capacity(preview.sections.len());
        for section in &preview.sections {
            let records = milk
                .month_records(preview.farmer.farmer_code, section.category, preview.month)
                .await?;
            section_records.push(records);
        }

        render_bill_pdf(preview, &section_records, deduction, net, remaining, path)
    }
}

fn render_bill_pdf(
    preview: &BillPreview,
    section_records: &[Vec<MilkRecord>],
    deduction: f64,
    net: f64,
    remaining: f64,
    path: &Path,
) -> AppResult<()> {
    let mut pdf = PdfWriter::new("Monthly Milk Bill")?;

    pdf.heading("Dairy Management System", 16.0);
    pdf.heading(&format!("Milk Bill - {}", preview.month), 12.0);
    pdf.space(4.0);
    pdf.line(
        &format!(
            "Farmer: {} ({})",
            preview.farmer.name, preview.farmer.farmer_code
        ),
        10.0,
    );
    if let Some(village) = &preview.farmer.village {
        pdf.line(&format!("Village: {}", village), 10.0);
    }
    pdf.space(4.0);

    for (section, records) in preview.sections.iter().zip(section_records) {
        pdf.bold_line(&format!("{} milk", section.category), 11.0);
        pdf.row(
            &[
                (0.0, "Date"),
                (30.0, "Shift"),
                (60.0, "Litres"),
                (85.0, "FAT"),
                (105.0, "SNF"),
                (125.0, "Rate"),
                (150.0, "Amount"),
            ],
            9.0,
            true,
        );
        for r in records {
            pdf.row(
                &[
                    (0.0, r.date.to_string().as_str()),
                    (30.0, r.shift.as_str()),
                    (60.0, &format!("{:.1}", r.litres)),
                    (85.0, &format!("{:.1}", r.fat)),
                    (105.0, &format!("{:.1}", r.snf)),
                    (125.0, &format!("{:.2}", r.rate)),
                    (150.0, &format!("{:.2}", r.amount)),
                ],
                9.0,
                false,
            );
        }
        pdf.row(
            &[
                (0.0, "Subtotal"),
                (60.0, format!("{:.1}", section.litres).as_str()),
                (150.0, &format!("{:.2}", section.amount)),
            ],
            9.0,
            true,
        );
        pdf.space(3.0);
    }

    pdf.space(2.0);
    pdf.bold_line(&format!("Total earnings: {:.2}", preview.earnings), 11.0);
    pdf.line(
        &format!("Outstanding advance: {:.2}", preview.advance_balance),
        10.0,
    );
    pdf.line(&format!("Advance deducted: {:.2}", deduction), 10.0);
    pdf.line(&format!("Remaining advance: {:.2}", remaining), 10.0);
    pdf.bold_line(&format!("Net payable: {:.2}", net), 12.0);

    pdf.save(path)
}

fn section_totals(category: MilkCategory, records: &[MilkRecord]) -> BillCategorySection {
    let litres: f64 = records.iter().map(|r| r.litres).sum();
    let amount: f64 = records.iter().map(|r| r.amount).sum();
    BillCategorySection {
        category,
        records: records.len(),
        litres: round2(litres),
        amount: round2(amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    // axum handler registration requires the settle future to be Send
    #[allow(dead_code)]
    fn settle_future_is_send(service: BillingService, input: SettleBillInput) {
        fn assert_send<F: std::future::Future + Send>(_: F) {}
        assert_send(async move { service.settle(input).await });
    }

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
        sqlx::query(
            "INSERT INTO milk_records \
             (farmer_code, date, shift, category, litres, fat, snf, rate, amount) \
             VALUES (1, '2025-03-05', 'Morning', 'Cow', 10.0, 4.0, 8.0, 35.0, 350.0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO advances (farmer_code, date, amount) VALUES (1, '2025-03-10', 200.0)")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn settle_input() -> SettleBillInput {
        SettleBillInput {
            farmer_code: 1,
            month: "2025-03".parse().unwrap(),
            deduction: None,
            allow_exceeding_earnings: false,
        }
    }

    #[tokio::test]
    async fn settle_deducts_and_writes_the_bill() {
        let pool = test_pool().await;
        let bills_dir = std::env::temp_dir().join("dms-settle-ok");
        let service = BillingService::new(pool.clone(), bills_dir);

        let settlement = service.settle(settle_input()).await.unwrap();
        // the advance paid within the month counts toward the balance
        assert_eq!(settlement.deduction, 200.0);
        assert_eq!(settlement.net_payable, 150.0);
        assert_eq!(settlement.remaining_balance, 0.0);
        assert!(std::path::Path::new(&settlement.bill_path).exists());

        let deductions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM advance_deductions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(deductions, 1);
    }

    #[tokio::test]
    async fn failed_bill_write_leaves_the_ledger_untouched() {
        let pool = test_pool().await;
        // /dev/null is not a directory, so the bill write must fail
        let service = BillingService::new(pool.clone(), PathBuf::from("/dev/null/bills"));

        let result = service.settle(settle_input()).await;
        assert!(result.is_err());

        let deductions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM advance_deductions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(deductions, 0);
    }
}
