//! Common types used across the system

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Milk collection shift
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Shift {
    Morning,
    Evening,
}

impl Shift {
    /// Shift for a wall-clock hour: 06:00-15:59 is Morning, the rest Evening
    pub fn for_hour(hour: u32) -> Self {
        if (6..16).contains(&hour) {
            Shift::Morning
        } else {
            Shift::Evening
        }
    }

    pub fn for_time(time: NaiveTime) -> Self {
        Self::for_hour(time.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Evening => "Evening",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Morning" => Ok(Shift::Morning),
            "Evening" => Ok(Shift::Evening),
            _ => Err("shift must be Morning or Evening"),
        }
    }
}

/// Category of a single milk record or rate slab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MilkCategory {
    Cow,
    Buffalo,
}

impl MilkCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilkCategory::Cow => "Cow",
            MilkCategory::Buffalo => "Buffalo",
        }
    }
}

impl fmt::Display for MilkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilkCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cow" => Ok(MilkCategory::Cow),
            "Buffalo" => Ok(MilkCategory::Buffalo),
            _ => Err("category must be Cow or Buffalo"),
        }
    }
}

/// Category a farmer supplies under; `Both` farmers choose per record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FarmerCategory {
    #[default]
    Cow,
    Buffalo,
    Both,
}

impl FarmerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FarmerCategory::Cow => "Cow",
            FarmerCategory::Buffalo => "Buffalo",
            FarmerCategory::Both => "Both",
        }
    }

    /// Milk categories this farmer can deliver under
    pub fn milk_categories(&self) -> &'static [MilkCategory] {
        match self {
            FarmerCategory::Cow => &[MilkCategory::Cow],
            FarmerCategory::Buffalo => &[MilkCategory::Buffalo],
            FarmerCategory::Both => &[MilkCategory::Cow, MilkCategory::Buffalo],
        }
    }
}

impl FromStr for FarmerCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cow" => Ok(FarmerCategory::Cow),
            "Buffalo" => Ok(FarmerCategory::Buffalo),
            "Both" => Ok(FarmerCategory::Both),
            _ => Err("category must be Cow, Buffalo or Both"),
        }
    }
}

impl fmt::Display for FarmerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar month in `YYYY-MM` form, used as the settlement period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid month, expected YYYY-MM: {0}")]
pub struct MonthParseError(String);

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) || !(1970..=9999).contains(&year) {
            return Err(MonthParseError(format!("{year:04}-{month:02}")));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month validated at construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    pub fn last_day(&self) -> NaiveDate {
        let (next_y, next_m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_y, next_m, 1).unwrap() - chrono::Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError(s.to_string()))?;
        let year: i32 = y.parse().map_err(|_| MonthParseError(s.to_string()))?;
        let month: u32 = m.parse().map_err(|_| MonthParseError(s.to_string()))?;
        Month::new(year, month).map_err(|_| MonthParseError(s.to_string()))
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Round a currency or quantity value to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
