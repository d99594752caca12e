// src/model.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single calendar year-month, the unit of analysis.
///
/// Periods order chronologically, so a `BTreeMap` keyed by `Period`
/// iterates in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The next calendar month, rolling over the year boundary.
    pub fn succ(&self) -> Self {
        Period(self.0 + Months::new(1))
    }

    /// Iterate from `self` through `end`, inclusive on both sides.
    pub fn range_inclusive(self, end: Period) -> impl Iterator<Item = Period> {
        let mut cur = self;
        std::iter::from_fn(move || {
            if cur > end {
                return None;
            }
            let out = cur;
            cur = cur.succ();
            Some(out)
        })
    }

    /// Human-readable label for log output, e.g. "March 2023".
    pub fn long_label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for Period {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").map(Period)
    }
}

/// Canonical per-month usage document, as stored under `pretty/usage.json`.
///
/// A document without the entity mapping deserializes to an empty one;
/// degrading that to "no data" is the store's job.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsageDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_battles: Option<u64>,
    /// Entity records keyed by name, in document (rank) order.
    #[serde(default)]
    pub pokemon_data: IndexMap<String, EntityStats>,
}

/// Per-entity attributes carried by the usage document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub usage_perc: f64,
    #[serde(default)]
    pub raw_count: Option<u64>,
}

/// One entity's usage share for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub name: String,
    pub usage_perc: f64,
}

/// Records of one month's usage document, in document order.
pub type RecordSet = Vec<UsageRecord>;

/// The top-N records of one month, sorted by usage share descending.
pub type RankingEntry = Vec<UsageRecord>;

/// Month-by-month rankings in chronological key order. Months without
/// data map to an empty entry rather than being omitted.
pub type RankingTable = BTreeMap<Period, RankingEntry>;

/// How many months of the analyzed range each entity ranked in.
pub type AppearanceTally = BTreeMap<String, usize>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_advances_within_a_year() {
        let p = Period::new(2023, 5).unwrap();
        assert_eq!(p.succ(), Period::new(2023, 6).unwrap());
    }

    #[test]
    fn successor_rolls_over_the_year_boundary() {
        let p = Period::new(2023, 12).unwrap();
        assert_eq!(p.succ(), Period::new(2024, 1).unwrap());
    }

    #[test]
    fn inclusive_range_spans_a_rollover() {
        let start = Period::new(2023, 11).unwrap();
        let end = Period::new(2024, 2).unwrap();
        let months: Vec<String> = start.range_inclusive(end).map(|p| p.to_string()).collect();
        assert_eq!(months, ["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn single_month_range_yields_one_period() {
        let p = Period::new(2022, 7).unwrap();
        assert_eq!(p.range_inclusive(p).count(), 1);
    }

    #[test]
    fn parse_and_display_round_trip() {
        let p: Period = "2023-07".parse().unwrap();
        assert_eq!(p.year(), 2023);
        assert_eq!(p.month(), 7);
        assert_eq!(p.to_string(), "2023-07");
    }

    #[test]
    fn rejects_invalid_months() {
        assert!("2023-13".parse::<Period>().is_err());
        assert!("not-a-month".parse::<Period>().is_err());
    }

    #[test]
    fn periods_order_chronologically() {
        let a = Period::new(2023, 12).unwrap();
        let b = Period::new(2024, 1).unwrap();
        assert!(a < b);
    }
}
