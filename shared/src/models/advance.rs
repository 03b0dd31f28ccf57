//! Advance (cash loan) ledger models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{round2, Month};

/// A cash advance handed to a farmer, repaid through monthly deductions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advance {
    pub id: i64,
    pub farmer_code: i64,
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub amount: f64,
}

/// A repayment entry charged against a settlement month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceDeduction {
    pub id: i64,
    pub farmer_code: i64,
    pub date: NaiveDate,
    pub month: Month,
    pub amount: f64,
    pub note: Option<String>,
}

/// Outstanding balance: everything lent minus everything repaid
pub fn advance_balance(total_advances: f64, total_deductions: f64) -> f64 {
    round2(total_advances - total_deductions)
}
