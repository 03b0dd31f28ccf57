//! Farmer (milk supplier) models

use serde::{Deserialize, Serialize};

use crate::types::FarmerCategory;

/// A registered milk supplier. The code doubles as the display identifier on
/// bills and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farmer {
    pub farmer_code: i64,
    pub name: String,
    pub village: Option<String>,
    pub contact: Option<String>,
    pub category: FarmerCategory,
}

/// Smallest positive code not present in `existing`.
///
/// `existing` must be sorted ascending. Codes freed by deleting farmers are
/// reused before new ones are issued.
pub fn next_farmer_code(existing: &[i64]) -> i64 {
    let mut next = 1;
    for &code in existing {
        if code == next {
            next += 1;
        } else if code > next {
            break;
        }
    }
    next
}
