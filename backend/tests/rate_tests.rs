//! Rate resolution tests
//!
//! Unit and property-based tests for the fat/SNF rate lookup:
//! - exact fat match picks the nearest SNF slab
//! - otherwise the nearest fat slab wins
//! - an empty table falls back to the linear formula, clamped at zero

use proptest::prelude::*;

use shared::{
    default_slabs, formula_rate, resolve_rate, slab_fat, MilkCategory, RateSlab,
};

fn slab(category: MilkCategory, fat: f64, snf: f64, rate: f64) -> RateSlab {
    RateSlab {
        category,
        fat,
        snf,
        rate,
    }
}

mod slab_rounding {
    use super::*;

    #[test]
    fn rounds_to_nearest_tenth() {
        assert_eq!(slab_fat(4.26), 4.3);
        assert_eq!(slab_fat(4.24), 4.2);
        assert_eq!(slab_fat(4.0), 4.0);
    }

    #[test]
    fn midpoint_rounds_up() {
        assert_eq!(slab_fat(4.25), 4.3);
    }
}

mod precedence {
    use super::*;

    #[test]
    fn exact_fat_prefers_nearest_snf() {
        let slabs = vec![
            slab(MilkCategory::Cow, 4.0, 7.5, 31.0),
            slab(MilkCategory::Cow, 4.0, 8.5, 33.0),
            slab(MilkCategory::Cow, 4.5, 8.0, 40.0),
        ];
        // SNF 8.2 is closer to 8.5 than to 7.5
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 4.0, 8.2), 33.0);
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 4.0, 7.6), 31.0);
    }

    #[test]
    fn fat_reading_rounds_onto_the_grid_before_matching() {
        let slabs = vec![slab(MilkCategory::Cow, 4.0, 8.0, 32.0)];
        // 3.96 rounds to 4.0, an exact match
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 3.96, 8.0), 32.0);
    }

    #[test]
    fn no_exact_fat_falls_back_to_nearest_fat() {
        let slabs = vec![
            slab(MilkCategory::Cow, 3.5, 8.0, 28.0),
            slab(MilkCategory::Cow, 5.0, 8.0, 42.0),
        ];
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 3.8, 8.0), 28.0);
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 4.7, 8.0), 42.0);
    }

    #[test]
    fn equidistant_snf_prefers_the_earlier_slab() {
        let slabs = vec![
            slab(MilkCategory::Cow, 4.0, 7.5, 31.0),
            slab(MilkCategory::Cow, 4.0, 8.5, 33.0),
        ];
        // SNF 8.0 sits exactly between 7.5 and 8.5
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 4.0, 8.0), 31.0);
    }

    #[test]
    fn equidistant_fat_prefers_the_earlier_slab() {
        let slabs = vec![
            slab(MilkCategory::Cow, 3.5, 8.0, 28.0),
            slab(MilkCategory::Cow, 4.5, 8.0, 40.0),
        ];
        // fat 4.0 sits exactly between 3.5 and 4.5
        assert_eq!(resolve_rate(&slabs, MilkCategory::Cow, 4.0, 8.0), 28.0);
    }

    #[test]
    fn other_category_slabs_are_ignored() {
        let slabs = vec![slab(MilkCategory::Buffalo, 6.0, 9.0, 55.0)];
        // no Cow slabs, so the Cow formula applies
        assert_eq!(
            resolve_rate(&slabs, MilkCategory::Cow, 4.0, 8.0),
            formula_rate(MilkCategory::Cow, 4.0)
        );
    }

    #[test]
    fn empty_table_uses_formula() {
        assert_eq!(
            resolve_rate(&[], MilkCategory::Cow, 4.0, 8.0),
            35.0 // 30 + (4.0 - 3.0) * 5
        );
        assert_eq!(
            resolve_rate(&[], MilkCategory::Buffalo, 7.0, 9.0),
            55.0 // 45 + (7.0 - 5.0) * 5
        );
    }
}

mod formula {
    use super::*;

    #[test]
    fn base_points() {
        assert_eq!(formula_rate(MilkCategory::Cow, 3.0), 30.0);
        assert_eq!(formula_rate(MilkCategory::Buffalo, 5.0), 45.0);
    }

    #[test]
    fn very_low_fat_clamps_to_zero() {
        // 30 + (0.0 - 3.0) * 5 would be 15, still positive; but a Buffalo
        // reading far below base would go negative without the clamp
        assert_eq!(formula_rate(MilkCategory::Buffalo, 0.0), 20.0);
        assert_eq!(formula_rate(MilkCategory::Cow, 0.0), 15.0);
        // contrived deep-negative case
        let slabs: Vec<RateSlab> = Vec::new();
        assert!(resolve_rate(&slabs, MilkCategory::Cow, 0.0, 0.0) >= 0.0);
    }
}

mod defaults {
    use super::*;

    #[test]
    fn seeded_ranges_and_snf() {
        let slabs = default_slabs();
        let cow: Vec<_> = slabs
            .iter()
            .filter(|s| s.category == MilkCategory::Cow)
            .collect();
        let buffalo: Vec<_> = slabs
            .iter()
            .filter(|s| s.category == MilkCategory::Buffalo)
            .collect();

        // Cow 3.0..=6.0 and Buffalo 5.0..=11.0 in 0.1 steps
        assert_eq!(cow.len(), 31);
        assert_eq!(buffalo.len(), 61);
        assert!(slabs.iter().all(|s| (s.snf - 8.0).abs() < 1e-9));
    }

    #[test]
    fn seeded_rates_match_the_formula() {
        for s in default_slabs() {
            assert_eq!(s.rate, formula_rate(s.category, s.fat));
        }
    }
}

proptest! {
    /// The resolved rate is never negative, whatever the table holds
    #[test]
    fn resolved_rate_never_negative(
        fat in 0.0f64..15.0,
        snf in 0.0f64..12.0,
        slab_fats in proptest::collection::vec(0.0f64..15.0, 0..20),
    ) {
        let slabs: Vec<RateSlab> = slab_fats
            .iter()
            .map(|&f| slab(MilkCategory::Cow, slab_fat(f), 8.0, formula_rate(MilkCategory::Cow, f)))
            .collect();
        prop_assert!(resolve_rate(&slabs, MilkCategory::Cow, fat, snf) >= 0.0);
        prop_assert!(resolve_rate(&slabs, MilkCategory::Buffalo, fat, snf) >= 0.0);
    }

    /// With an exact-fat slab present, the resolved rate is always taken from
    /// one of the slabs at that fat
    #[test]
    fn exact_fat_resolves_from_that_fat(
        fat_tenths in 0i64..150,
        snf in 0.0f64..12.0,
        rates in proptest::collection::vec(0.0f64..100.0, 1..5),
    ) {
        let fat = fat_tenths as f64 / 10.0;
        let slabs: Vec<RateSlab> = rates
            .iter()
            .enumerate()
            .map(|(i, &r)| slab(MilkCategory::Cow, fat, 6.0 + i as f64, shared::round2(r)))
            .collect();
        let resolved = resolve_rate(&slabs, MilkCategory::Cow, fat, snf);
        prop_assert!(slabs.iter().any(|s| (s.rate - resolved).abs() < 1e-9));
    }

    /// The fallback formula is monotonic in fat
    #[test]
    fn formula_monotonic_in_fat(a in 0.0f64..15.0, b in 0.0f64..15.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            formula_rate(MilkCategory::Cow, lo) <= formula_rate(MilkCategory::Cow, hi)
        );
        prop_assert!(
            formula_rate(MilkCategory::Buffalo, lo) <= formula_rate(MilkCategory::Buffalo, hi)
        );
    }
}
