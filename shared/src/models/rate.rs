//! Rate table models and the fat/SNF rate resolution arithmetic

use serde::{Deserialize, Serialize};

use crate::types::{round2, MilkCategory};

/// One row of the price-per-litre lookup table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateSlab {
    pub category: MilkCategory,
    /// Fat percentage, stored on a 0.1 grid
    pub fat: f64,
    pub snf: f64,
    /// Price per litre
    pub rate: f64,
}

/// Base points of the linear fallback formula
const COW_BASE_FAT: f64 = 3.0;
const COW_BASE_RATE: f64 = 30.0;
const BUFFALO_BASE_FAT: f64 = 5.0;
const BUFFALO_BASE_RATE: f64 = 45.0;
const RATE_PER_FAT_POINT: f64 = 5.0;

/// Round a fat reading to the nearest 0.1 slab
pub fn slab_fat(fat: f64) -> f64 {
    (fat * 10.0).round() / 10.0
}

/// Linear formula used when the rate table has no usable entry.
///
/// Never negative: very low fat readings clamp to zero rather than producing
/// a charge against the farmer.
pub fn formula_rate(category: MilkCategory, fat: f64) -> f64 {
    let (base_fat, base_rate) = match category {
        MilkCategory::Cow => (COW_BASE_FAT, COW_BASE_RATE),
        MilkCategory::Buffalo => (BUFFALO_BASE_FAT, BUFFALO_BASE_RATE),
    };
    round2((base_rate + (fat - base_fat) * RATE_PER_FAT_POINT).max(0.0))
}

/// Resolve the per-litre rate for a fat/SNF reading.
///
/// Precedence:
/// 1. slabs matching the rounded fat exactly, nearest SNF wins
/// 2. otherwise the slab with the nearest fat
/// 3. otherwise (no slabs for the category) the linear formula
pub fn resolve_rate(slabs: &[RateSlab], category: MilkCategory, fat: f64, snf: f64) -> f64 {
    let fat_r = slab_fat(fat);
    let in_category: Vec<&RateSlab> = slabs.iter().filter(|s| s.category == category).collect();

    let exact_fat = in_category
        .iter()
        .filter(|s| (s.fat - fat_r).abs() < 1e-9)
        .min_by(|a, b| {
            (a.snf - snf)
                .abs()
                .partial_cmp(&(b.snf - snf).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(slab) = exact_fat {
        return round2(slab.rate);
    }

    let nearest_fat = in_category.iter().min_by(|a, b| {
        (a.fat - fat_r)
            .abs()
            .partial_cmp(&(b.fat - fat_r).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(slab) = nearest_fat {
        return round2(slab.rate);
    }

    formula_rate(category, fat)
}

/// Default slab set seeded into an empty rate table: Cow 3.0-6.0% fat,
/// Buffalo 5.0-11.0% fat, 0.1 steps at SNF 8.0, priced by the formula.
pub fn default_slabs() -> Vec<RateSlab> {
    let mut slabs = Vec::new();
    let mut push_range = |category: MilkCategory, from: f64, to: f64| {
        let mut tenths = (from * 10.0).round() as i64;
        let end = (to * 10.0).round() as i64;
        while tenths <= end {
            let fat = tenths as f64 / 10.0;
            slabs.push(RateSlab {
                category,
                fat,
                snf: 8.0,
                rate: formula_rate(category, fat),
            });
            tenths += 1;
        }
    };
    push_range(MilkCategory::Cow, 3.0, 6.0);
    push_range(MilkCategory::Buffalo, 5.0, 11.0);
    slabs
}
