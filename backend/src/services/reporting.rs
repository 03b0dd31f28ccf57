//! Monthly reports: wholesale sales and the consolidated farmer report.
//!
//! Each report exists as typed data first; the CSV and PDF renderings are
//! derived from the same struct so the three output formats cannot drift.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::services::pdf::PdfWriter;
use crate::services::{AdvanceService, FarmerService, MilkService, SaleService};
use shared::{round2, suggested_deduction, MilkCategory, Month, Sale, Shift};

/// Report generation service
#[derive(Clone)]
pub struct ReportingService {
    db: SqlitePool,
    reports_dir: PathBuf,
}

/// Wholesale sales for one month
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub month: Month,
    pub sales: Vec<Sale>,
    pub total_litres: f64,
    pub total_amount: f64,
}

/// One shift's quantities within a day
#[derive(Debug, Clone, Serialize)]
pub struct ShiftEntry {
    pub litres: f64,
    pub fat: f64,
    pub snf: f64,
    pub rate: f64,
    pub amount: f64,
}

/// One day of a farmer's intake, split by shift
#[derive(Debug, Clone, Serialize)]
pub struct DailyIntake {
    pub date: NaiveDate,
    pub morning: Option<ShiftEntry>,
    pub evening: Option<ShiftEntry>,
    pub litres: f64,
    pub amount: f64,
}

/// One farmer's records for one category within the report month
#[derive(Debug, Clone, Serialize)]
pub struct FarmerCategorySection {
    pub category: MilkCategory,
    pub days: Vec<DailyIntake>,
    pub total_litres: f64,
    pub total_amount: f64,
}

/// One farmer's slice of the consolidated report
#[derive(Debug, Clone, Serialize)]
pub struct FarmerMonthlySection {
    pub farmer_code: i64,
    pub farmer_name: String,
    pub sections: Vec<FarmerCategorySection>,
    pub earnings: f64,
    pub month_advances: f64,
    pub advance_balance: f64,
    pub suggested_deduction: f64,
    pub net_payable: f64,
}

/// Consolidated intake report for one month, all farmers
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: Month,
    pub farmers: Vec<FarmerMonthlySection>,
    pub total_litres: f64,
    pub total_amount: f64,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(db: SqlitePool, reports_dir: PathBuf) -> Self {
        Self { db, reports_dir }
    }

    /// Sales report data for a month
    pub async fn sales_report(&self, month: Month) -> AppResult<SalesReport> {
        let sales = SaleService::new(self.db.clone()).month_sales(month).await?;
        if sales.is_empty() {
            return Err(AppError::NoData(format!("sales in {}", month)));
        }

        let total_litres = round2(sales.iter().map(|s| s.litres).sum());
        let total_amount = round2(sales.iter().map(|s| s.amount).sum());
        Ok(SalesReport {
            month,
            sales,
            total_litres,
            total_amount,
        })
    }

    /// Sales report rendered as CSV
    pub async fn sales_report_csv(&self, month: Month) -> AppResult<String> {
        let report = self.sales_report(month).await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["date", "dairy_name", "category", "litres", "fat", "rate", "amount"])
            .map_err(|e| AppError::Report(e.to_string()))?;
        for sale in &report.sales {
            writer
                .write_record([
                    sale.date.to_string(),
                    sale.dairy_name.clone(),
                    sale.category.to_string(),
                    format!("{:.1}", sale.litres),
                    format!("{:.1}", sale.fat),
                    format!("{:.2}", sale.rate),
                    format!("{:.2}", sale.amount),
                ])
                .map_err(|e| AppError::Report(e.to_string()))?;
        }
        writer
            .write_record([
                "total".to_string(),
                String::new(),
                String::new(),
                format!("{:.1}", report.total_litres),
                String::new(),
                String::new(),
                format!("{:.2}", report.total_amount),
            ])
            .map_err(|e| AppError::Report(e.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Report(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AppError::Report(e.to_string()))
    }

    /// Sales report rendered as a PDF file; returns the written path
    pub async fn sales_report_pdf(&self, month: Month) -> AppResult<String> {
        let report = self.sales_report(month).await?;

        let mut pdf = PdfWriter::new("Sales Report")?;
        pdf.heading("Dairy Management System", 16.0);
        pdf.heading(&format!("Sales Report - {}", report.month), 12.0);
        pdf.space(4.0);
        pdf.row(
            &[
                (0.0, "Date"),
                (30.0, "Dairy"),
                (80.0, "Category"),
                (105.0, "Litres"),
                (125.0, "FAT"),
                (145.0, "Rate"),
                (165.0, "Amount"),
            ],
            9.0,
            true,
        );
        for sale in &report.sales {
            pdf.row(
                &[
                    (0.0, sale.date.to_string().as_str()),
                    (30.0, sale.dairy_name.as_str()),
                    (80.0, sale.category.as_str()),
                    (105.0, &format!("{:.1}", sale.litres)),
                    (125.0, &format!("{:.1}", sale.fat)),
                    (145.0, &format!("{:.2}", sale.rate)),
                    (165.0, &format!("{:.2}", sale.amount)),
                ],
                9.0,
                false,
            );
        }
        pdf.space(2.0);
        pdf.row(
            &[
                (0.0, "Total"),
                (105.0, format!("{:.1}", report.total_litres).as_str()),
                (165.0, &format!("{:.2}", report.total_amount)),
            ],
            10.0,
            true,
        );

        let path = self
            .reports_dir
            .join(format!("Sales_Report_{}.pdf", report.month));
        pdf.save(&path)?;
        Ok(path.display().to_string())
    }

    /// Consolidated farmer report data for a month
    pub async fn monthly_report(&self, month: Month) -> AppResult<MonthlyReport> {
        let farmers = FarmerService::new(self.db.clone()).list_farmers().await?;
        let milk = MilkService::new(self.db.clone());
        let advances = AdvanceService::new(self.db.clone());

        let mut sections = Vec::new();
        let mut total_litres = 0.0;
        let mut total_amount = 0.0;

        for farmer in farmers {
            let mut category_sections = Vec::new();
            for category in farmer.category.milk_categories().iter().copied() {
                let records = milk
                    .month_records(farmer.farmer_code, category, month)
                    .await?;
                if records.is_empty() {
                    continue;
                }

                let mut by_day: BTreeMap<NaiveDate, DailyIntake> = BTreeMap::new();
                for record in &records {
                    let entry = by_day.entry(record.date).or_insert_with(|| DailyIntake {
                        date: record.date,
                        morning: None,
                        evening: None,
                        litres: 0.0,
                        amount: 0.0,
                    });
                    let shift_entry = ShiftEntry {
                        litres: record.litres,
                        fat: record.fat,
                        snf: record.snf,
                        rate: record.rate,
                        amount: record.amount,
                    };
                    match record.shift {
                        Shift::Morning => entry.morning = Some(shift_entry),
                        Shift::Evening => entry.evening = Some(shift_entry),
                    }
                    entry.litres = round2(entry.litres + record.litres);
                    entry.amount = round2(entry.amount + record.amount);
                }

                let litres = round2(records.iter().map(|r| r.litres).sum());
                let amount = round2(records.iter().map(|r| r.amount).sum());
                total_litres += litres;
                total_amount += amount;
                category_sections.push(FarmerCategorySection {
                    category,
                    days: by_day.into_values().collect(),
                    total_litres: litres,
                    total_amount: amount,
                });
            }
            if category_sections.is_empty() {
                continue;
            }

            let earnings = milk.month_earnings(farmer.farmer_code, month).await?;
            let month_advances = advances.month_advances(farmer.farmer_code, month).await?;
            let balance = advances
                .balance_before(farmer.farmer_code, month)
                .await?
                .balance;
            let deduction = suggested_deduction(balance, earnings);

            sections.push(FarmerMonthlySection {
                farmer_code: farmer.farmer_code,
                farmer_name: farmer.name,
                sections: category_sections,
                earnings,
                month_advances,
                advance_balance: balance,
                suggested_deduction: deduction,
                net_payable: shared::net_payable(earnings, deduction),
            });
        }

        if sections.is_empty() {
            return Err(AppError::NoData(format!("milk records in {}", month)));
        }

        Ok(MonthlyReport {
            month,
            farmers: sections,
            total_litres: round2(total_litres),
            total_amount: round2(total_amount),
        })
    }

    /// Consolidated report rendered as a PDF file; returns the written path
    pub async fn monthly_report_pdf(&self, month: Month) -> AppResult<String> {
        let report = self.monthly_report(month).await?;

        let mut pdf = PdfWriter::new("Consolidated Monthly Report")?;
        pdf.heading("Dairy Management System", 16.0);
        pdf.heading(&format!("Consolidated Report - {}", report.month), 12.0);
        pdf.space(4.0);

        for farmer in &report.farmers {
            pdf.bold_line(
                &format!("{} ({})", farmer.farmer_name, farmer.farmer_code),
                11.0,
            );
            for (idx, section) in farmer.sections.iter().enumerate() {
                pdf.line(&format!("{} milk", section.category), 10.0);
                pdf.row(
                    &[
                        (0.0, "Date"),
                        (28.0, "M-L"),
                        (44.0, "M-FAT"),
                        (60.0, "M-Rate"),
                        (78.0, "E-L"),
                        (94.0, "E-FAT"),
                        (110.0, "E-Rate"),
                        (128.0, "Litres"),
                        (150.0, "Amount"),
                    ],
                    9.0,
                    true,
                );
                for day in &section.days {
                    pdf.row(
                        &[
                            (0.0, day.date.to_string().as_str()),
                            (28.0, &fmt_shift(day.morning.as_ref(), |e| e.litres)),
                            (44.0, &fmt_shift(day.morning.as_ref(), |e| e.fat)),
                            (60.0, &fmt_shift2(day.morning.as_ref(), |e| e.rate)),
                            (78.0, &fmt_shift(day.evening.as_ref(), |e| e.litres)),
                            (94.0, &fmt_shift(day.evening.as_ref(), |e| e.fat)),
                            (110.0, &fmt_shift2(day.evening.as_ref(), |e| e.rate)),
                            (128.0, &format!("{:.1}", day.litres)),
                            (150.0, &format!("{:.2}", day.amount)),
                        ],
                        9.0,
                        false,
                    );
                }
                pdf.row(
                    &[
                        (0.0, "Subtotal"),
                        (128.0, format!("{:.1}", section.total_litres).as_str()),
                        (150.0, &format!("{:.2}", section.total_amount)),
                    ],
                    9.0,
                    true,
                );
                // advance figures appear once per farmer, on the first section
                if idx == 0 {
                    pdf.line(
                        &format!(
                            "Earnings {:.2}  Advances this month {:.2}  Outstanding {:.2}",
                            farmer.earnings, farmer.month_advances, farmer.advance_balance
                        ),
                        9.0,
                    );
                    pdf.line(
                        &format!(
                            "Suggested deduction {:.2}  Net payable {:.2}",
                            farmer.suggested_deduction, farmer.net_payable
                        ),
                        9.0,
                    );
                }
                pdf.space(2.0);
            }
            pdf.space(3.0);
        }

        pdf.bold_line(
            &format!(
                "Grand total: {:.1} L, {:.2}",
                report.total_litres, report.total_amount
            ),
            11.0,
        );

        let path = self
            .reports_dir
            .join(format!("Combined_Report_{}.pdf", report.month));
        pdf.save(&path)?;
        Ok(path.display().to_string())
    }
}

fn fmt_shift(entry: Option<&ShiftEntry>, field: impl Fn(&ShiftEntry) -> f64) -> String {
    match entry {
        Some(e) => format!("{:.1}", field(e)),
        None => "-".to_string(),
    }
}

fn fmt_shift2(entry: Option<&ShiftEntry>, field: impl Fn(&ShiftEntry) -> f64) -> String {
    match entry {
        Some(e) => format!("{:.2}", field(e)),
        None => "-".to_string(),
    }
}
