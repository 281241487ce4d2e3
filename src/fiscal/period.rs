use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::FiscalError;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// A calendar month, keyed `"YYYY-MM"`.
///
/// Every constructor, including date conversion and month arithmetic, goes through
/// [`Period::new`], so `month` is always within `1..=12` and `year` within `1..=9999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, FiscalError> {
        if !(1..=12).contains(&month) {
            return Err(FiscalError::InvalidPeriod(format!(
                "month {month} is outside 1..=12"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(FiscalError::InvalidPeriod(format!(
                "year {year} is outside {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Result<Self, FiscalError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn next(&self) -> Result<Self, FiscalError> {
        self.offset(1)
    }

    pub fn previous(&self) -> Result<Self, FiscalError> {
        self.offset(-1)
    }

    /// Moves by `months`, wrapping the year in either direction. Fails when the result leaves
    /// the supported year range.
    pub fn offset(&self, months: i32) -> Result<Self, FiscalError> {
        let index = self.index().checked_add(months).ok_or_else(|| {
            FiscalError::InvalidPeriod(format!("{self} shifted by {months} months overflows"))
        })?;
        Self::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: Period) -> i32 {
        other.index() - self.index()
    }

    /// Inclusive iteration from `self` to `end`; empty when `end` precedes `self`.
    pub fn through(self, end: Period) -> impl Iterator<Item = Period> {
        let count = self.months_until(end).max(-1) + 1;
        // both ends are valid, so every step in between is too
        (0..count).filter_map(move |step| self.offset(step).ok())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        ymd(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> NaiveDate {
        ymd(self.year, self.month, self.days_in_month())
    }

    /// Returns the given day of this month, clamped to the month length.
    pub fn day(&self, day: u32) -> NaiveDate {
        ymd(self.year, self.month, day.clamp(1, self.days_in_month()))
    }

    /// Returns the given day of the following month; December rolls into January.
    ///
    /// The following month of `9999-12` is not a `Period`, but its dates still exist.
    pub fn day_in_next_month(&self, day: u32) -> NaiveDate {
        let (year, month) = match self.month {
            12 => (self.year + 1, 1),
            month => (self.year, month + 1),
        };
        ymd(year, month, day.clamp(1, month_length(year, month)))
    }

    pub fn days_in_month(&self) -> u32 {
        month_length(self.year, self.month)
    }

    fn index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }
}

fn month_length(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Years stay within `1..=10000` and days are clamped, far inside chrono's range; the
/// fallback saturates at the calendar bound.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = FiscalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || FiscalError::InvalidPeriod(format!("`{value}` is not a YYYY-MM key"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = FiscalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(key: &str) -> Period {
        key.parse().expect("valid period")
    }

    #[test]
    fn parses_and_displays_canonical_key() {
        let period = p("2025-03");
        assert_eq!(period.year(), 2025);
        assert_eq!(period.month(), 3);
        assert_eq!(period.key(), "2025-03");
    }

    #[test]
    fn rejects_malformed_keys() {
        for key in ["2025-13", "2025-00", "2025-3", "25-03", "2025/03", "abcd-ef", "2025-03-01"] {
            assert!(key.parse::<Period>().is_err(), "{key} should be rejected");
        }
    }

    #[test]
    fn next_and_previous_wrap_the_year() {
        assert_eq!(p("2025-12").next().unwrap(), p("2026-01"));
        assert_eq!(p("2026-01").previous().unwrap(), p("2025-12"));
        assert_eq!(p("2025-05").offset(-17).unwrap(), p("2023-12"));
        assert_eq!(p("2025-05").offset(20).unwrap(), p("2027-01"));
    }

    #[test]
    fn conversions_stay_inside_the_year_range() {
        assert!(Period::from_date(NaiveDate::MAX).is_err());
        assert!(Period::from_date(NaiveDate::MIN).is_err());
        assert_eq!(
            Period::from_date(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()).unwrap(),
            p("2025-03")
        );
        assert!(p("9999-12").next().is_err());
        assert!(p("0001-01").previous().is_err());
        assert!(p("2025-01").offset(i32::MAX).is_err());
        assert_eq!(p("9999-12").through(p("9999-12")).count(), 1);
    }

    #[test]
    fn last_supported_month_still_has_deadline_dates() {
        assert_eq!(
            p("9999-12").day_in_next_month(31),
            NaiveDate::from_ymd_opt(10000, 1, 31).unwrap()
        );
    }

    #[test]
    fn day_in_next_month_rolls_over_december() {
        let december = p("2025-12");
        assert_eq!(
            december.day_in_next_month(12),
            NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()
        );
    }

    #[test]
    fn day_is_clamped_to_month_length() {
        assert_eq!(p("2024-02").day(31), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(p("2025-02").last_day(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(p("1900-02").days_in_month(), 28);
    }

    #[test]
    fn through_is_inclusive_and_ordered() {
        let keys: Vec<String> = p("2024-11").through(p("2025-02")).map(|p| p.key()).collect();
        assert_eq!(keys, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(p("2025-02").through(p("2024-11")).count(), 0);
    }

    #[test]
    fn serde_uses_the_key_string() {
        let json = serde_json::to_string(&p("2025-07")).unwrap();
        assert_eq!(json, "\"2025-07\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p("2025-07"));
        assert!(serde_json::from_str::<Period>("\"2025-13\"").is_err());
    }
}
