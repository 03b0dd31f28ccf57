//! Validation and settlement rules for the Dairy Management System

use crate::types::{round2, MilkCategory};

// ============================================================================
// Intake validations
// ============================================================================

/// Reject negative litres, fat or SNF on an intake entry
pub fn validate_intake_quantities(litres: f64, fat: f64, snf: f64) -> Result<(), &'static str> {
    if litres < 0.0 || fat < 0.0 || snf < 0.0 {
        return Err("litres, fat and SNF cannot be negative");
    }
    Ok(())
}

/// Plausibility check on a fat reading; out-of-range readings are flagged to
/// the operator but not rejected
pub fn fat_in_expected_range(category: MilkCategory, fat: f64) -> bool {
    match category {
        MilkCategory::Cow => (0.0..=8.0).contains(&fat),
        MilkCategory::Buffalo => (0.0..=12.0).contains(&fat),
    }
}

/// Reject negative money amounts (advances, sales, rates)
pub fn validate_amount(amount: f64) -> Result<(), &'static str> {
    if amount < 0.0 {
        return Err("amount cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Monthly settlement rules
// ============================================================================

/// Deduction proposed when settling a month: recover as much of the balance
/// as the month's earnings cover
pub fn suggested_deduction(advance_balance: f64, earnings: f64) -> f64 {
    round2(advance_balance.min(earnings).max(0.0))
}

/// A deduction must not be negative and must not exceed the balance carried
/// into the month. Exceeding the month's earnings needs an explicit override.
pub fn validate_deduction(
    deduction: f64,
    advance_balance: f64,
    earnings: f64,
    allow_exceeding_earnings: bool,
) -> Result<(), &'static str> {
    if deduction < 0.0 {
        return Err("deduction cannot be negative");
    }
    if deduction > advance_balance {
        return Err("deduction cannot exceed the advance balance");
    }
    if deduction > earnings && !allow_exceeding_earnings {
        return Err("deduction exceeds the month's earnings");
    }
    Ok(())
}

/// Amount actually paid out for the month
pub fn net_payable(earnings: f64, deduction: f64) -> f64 {
    round2(earnings - deduction)
}
