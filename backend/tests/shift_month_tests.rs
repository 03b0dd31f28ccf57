//! Shift assignment, settlement month and farmer code tests

use chrono::NaiveDate;
use proptest::prelude::*;

use shared::{next_farmer_code, Month, Shift};

mod shifts {
    use super::*;

    #[test]
    fn morning_window_boundaries() {
        assert_eq!(Shift::for_hour(6), Shift::Morning);
        assert_eq!(Shift::for_hour(15), Shift::Morning);
    }

    #[test]
    fn evening_outside_the_window() {
        assert_eq!(Shift::for_hour(5), Shift::Evening);
        assert_eq!(Shift::for_hour(16), Shift::Evening);
        assert_eq!(Shift::for_hour(0), Shift::Evening);
        assert_eq!(Shift::for_hour(23), Shift::Evening);
    }

    #[test]
    fn round_trips_through_text() {
        for shift in [Shift::Morning, Shift::Evening] {
            assert_eq!(shift.as_str().parse::<Shift>().unwrap(), shift);
        }
        assert!("Noon".parse::<Shift>().is_err());
    }
}

mod months {
    use super::*;

    #[test]
    fn parse_and_display() {
        let month: Month = "2025-03".parse().unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("2025-13".parse::<Month>().is_err());
        assert!("2025-00".parse::<Month>().is_err());
        assert!("202503".parse::<Month>().is_err());
        assert!("march".parse::<Month>().is_err());
    }

    #[test]
    fn day_range_covers_the_month() {
        let month: Month = "2025-04".parse().unwrap();
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn leap_february() {
        let month: Month = "2024-02".parse().unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let month: Month = "2025-02".parse().unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn december_rolls_into_the_next_year() {
        let month: Month = "2025-12".parse().unwrap();
        assert_eq!(month.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn contains_matches_the_day_range() {
        let month: Month = "2025-06".parse().unwrap();
        assert!(month.contains(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));
    }

    #[test]
    fn text_order_is_chronological() {
        // deduction queries compare stored YYYY-MM strings
        let a: Month = "2024-12".parse().unwrap();
        let b: Month = "2025-01".parse().unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }
}

mod farmer_codes {
    use super::*;

    #[test]
    fn empty_registry_starts_at_one() {
        assert_eq!(next_farmer_code(&[]), 1);
    }

    #[test]
    fn dense_registry_appends() {
        assert_eq!(next_farmer_code(&[1, 2, 3]), 4);
    }

    #[test]
    fn gap_from_a_deleted_farmer_is_reused() {
        assert_eq!(next_farmer_code(&[1, 3, 4]), 2);
        assert_eq!(next_farmer_code(&[2, 3]), 1);
    }

    #[test]
    fn only_the_first_gap_matters() {
        assert_eq!(next_farmer_code(&[1, 2, 5, 9]), 3);
    }
}

proptest! {
    /// Every hour maps to exactly one shift, and only 6..=15 is Morning
    #[test]
    fn shift_partition(hour in 0u32..24) {
        let shift = Shift::for_hour(hour);
        prop_assert_eq!(shift == Shift::Morning, (6..=15).contains(&hour));
    }

    /// Month survives a text round trip
    #[test]
    fn month_text_round_trip(year in 1970i32..=9999, month in 1u32..=12) {
        let m = Month::new(year, month).unwrap();
        let parsed: Month = m.to_string().parse().unwrap();
        prop_assert_eq!(parsed, m);
    }

    /// first_day and last_day bound exactly the dates the month contains
    #[test]
    fn month_day_bounds(year in 1971i32..9999, month in 1u32..=12) {
        let m = Month::new(year, month).unwrap();
        prop_assert!(m.contains(m.first_day()));
        prop_assert!(m.contains(m.last_day()));
        prop_assert!(!m.contains(m.first_day() - chrono::Duration::days(1)));
        prop_assert!(!m.contains(m.last_day() + chrono::Duration::days(1)));
    }

    /// The assigned code is positive and never collides with an existing one
    #[test]
    fn assigned_code_is_fresh(mut codes in proptest::collection::vec(1i64..200, 0..50)) {
        codes.sort_unstable();
        codes.dedup();
        let code = next_farmer_code(&codes);
        prop_assert!(code >= 1);
        prop_assert!(!codes.contains(&code));
    }
}
