//! Milk intake record models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{round2, MilkCategory, Shift};

/// SNF assumed when a tester does not report one
pub const DEFAULT_SNF: f64 = 8.0;

/// One weighed and graded delivery for a farmer, date, shift and category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilkRecord {
    pub id: i64,
    pub farmer_code: i64,
    pub date: NaiveDate,
    pub shift: Shift,
    pub category: MilkCategory,
    pub litres: f64,
    pub fat: f64,
    pub snf: f64,
    pub rate: f64,
    pub amount: f64,
}

/// Payable amount for a delivery
pub fn amount_for(litres: f64, rate: f64) -> f64 {
    round2(litres * rate)
}
