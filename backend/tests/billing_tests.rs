//! Monthly settlement rule tests
//!
//! Unit and property-based tests for the deduction bookkeeping:
//! - the suggested deduction never exceeds the balance or the earnings
//! - deductions above the month's earnings need the explicit override
//! - the net payable and remaining balance always reconcile

use proptest::prelude::*;

use shared::{
    advance_balance, amount_for, net_payable, round2, suggested_deduction, validate_amount,
    validate_deduction,
};

mod suggestions {
    use super::*;

    #[test]
    fn covers_balance_when_earnings_allow() {
        assert_eq!(suggested_deduction(500.0, 1200.0), 500.0);
    }

    #[test]
    fn capped_at_earnings() {
        assert_eq!(suggested_deduction(1500.0, 1200.0), 1200.0);
    }

    #[test]
    fn zero_when_nothing_outstanding() {
        assert_eq!(suggested_deduction(0.0, 1200.0), 0.0);
    }

    #[test]
    fn overpaid_ledger_suggests_nothing() {
        // deductions recorded past the advances leave a negative balance
        assert_eq!(suggested_deduction(-50.0, 1200.0), 0.0);
    }
}

mod validation {
    use super::*;

    #[test]
    fn negative_deduction_rejected() {
        assert!(validate_deduction(-1.0, 500.0, 1200.0, false).is_err());
    }

    #[test]
    fn deduction_beyond_balance_rejected() {
        assert!(validate_deduction(600.0, 500.0, 1200.0, false).is_err());
        assert!(validate_deduction(600.0, 500.0, 1200.0, true).is_err());
    }

    #[test]
    fn deduction_beyond_earnings_needs_override() {
        assert!(validate_deduction(800.0, 1000.0, 600.0, false).is_err());
        assert!(validate_deduction(800.0, 1000.0, 600.0, true).is_ok());
    }

    #[test]
    fn deduction_within_both_limits_accepted() {
        assert!(validate_deduction(400.0, 500.0, 1200.0, false).is_ok());
        assert!(validate_deduction(0.0, 500.0, 1200.0, false).is_ok());
    }

    #[test]
    fn negative_amounts_rejected() {
        assert!(validate_amount(-0.01).is_err());
        assert!(validate_amount(0.0).is_ok());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn balance_is_advances_minus_deductions() {
        assert_eq!(advance_balance(1000.0, 400.0), 600.0);
        assert_eq!(advance_balance(400.0, 1000.0), -600.0);
    }

    #[test]
    fn net_payable_subtracts_the_deduction() {
        assert_eq!(net_payable(1234.56, 234.56), 1000.0);
    }

    #[test]
    fn amount_rounds_to_paise() {
        assert_eq!(amount_for(7.5, 33.333), 250.0);
        assert_eq!(amount_for(2.0, 31.255), 62.51);
    }
}

proptest! {
    /// The suggestion is bounded by both the balance and the earnings and is
    /// never negative
    #[test]
    fn suggestion_bounds(balance in -1e6f64..1e6, earnings in 0.0f64..1e6) {
        let suggested = suggested_deduction(balance, earnings);
        prop_assert!(suggested >= 0.0);
        prop_assert!(suggested <= round2(earnings.max(0.0)) + 0.01);
        if balance >= 0.0 {
            prop_assert!(suggested <= round2(balance) + 0.01);
        }
    }

    /// The suggested deduction always passes validation without the override
    #[test]
    fn suggestion_always_valid(balance in 0.0f64..1e6, earnings in 0.0f64..1e6) {
        let suggested = suggested_deduction(balance, earnings);
        prop_assert!(validate_deduction(suggested, balance, earnings, false).is_ok());
    }

    /// Settling reconciles: net payable plus the deduction equals the
    /// earnings, within rounding
    #[test]
    fn settlement_reconciles(earnings in 0.0f64..1e6, balance in 0.0f64..1e6) {
        let deduction = suggested_deduction(balance, earnings);
        let net = net_payable(earnings, deduction);
        prop_assert!((net + deduction - round2(earnings)).abs() < 0.02);
        prop_assert!(net >= -0.01);
    }

    /// A deduction leaves the ledger with a smaller, still reconcilable
    /// balance
    #[test]
    fn ledger_balance_shrinks(advances in 0.0f64..1e6, prior in 0.0f64..1e6, earnings in 0.0f64..1e6) {
        let prior = prior.min(advances);
        let balance = advance_balance(advances, prior);
        let deduction = suggested_deduction(balance, earnings);
        let after = advance_balance(advances, prior + deduction);
        prop_assert!(after <= balance + 0.01);
        prop_assert!(after >= -0.02);
    }
}
