//! Wholesale milk sale models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::MilkCategory;

/// A bulk sale to another dairy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub date: NaiveDate,
    pub dairy_name: String,
    pub category: MilkCategory,
    pub litres: f64,
    pub fat: f64,
    pub rate: f64,
    pub amount: f64,
}
