//! Month-granularity dates, written `MM-YYYY` on the wire.

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire format accepted and produced for month-year values.
pub const MONTH_YEAR_FORMAT: &str = "MM-YYYY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month-year '{0}', expected MM-YYYY")]
pub struct ParseMonthYearError(String);

/// A calendar month, stored as the first day of that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        // Day component carries no meaning; pin it to the 1st.
        Self(date.with_day(1).unwrap_or(date))
    }
}

impl FromStr for MonthYear {
    type Err = ParseMonthYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthYearError(s.to_string());

        let (month, year) = s.split_once('-').ok_or_else(err)?;
        if month.len() != 2
            || year.len() != 4
            || !month.bytes().all(|b| b.is_ascii_digit())
            || !year.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let month: u32 = month.parse().map_err(|_| err())?;
        let year: i32 = year.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_digit_month_and_four_digit_year() {
        let value: MonthYear = "05-2024".parse().unwrap();
        assert_eq!(value.month(), 5);
        assert_eq!(value.year(), 2024);
        assert_eq!(value.as_date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn rejects_other_layouts() {
        for input in [
            "2024-05", "5-2024", "05/2024", "05-24", "13-2024", "00-2024", "", "ab-cdef", "+5-2024",
        ] {
            assert!(input.parse::<MonthYear>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn display_round_trips() {
        let value = MonthYear::new(2020, 1).unwrap();
        assert_eq!(value.to_string(), "01-2020");
        assert_eq!(value.to_string().parse::<MonthYear>().unwrap(), value);
    }

    #[test]
    fn from_date_drops_day() {
        let value = MonthYear::from(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
        assert_eq!(value, MonthYear::new(2024, 3).unwrap());
    }

    #[test]
    fn ordering_follows_calendar() {
        let dec: MonthYear = "12-2023".parse().unwrap();
        let jan: MonthYear = "01-2024".parse().unwrap();
        assert!(dec < jan);
    }

    #[test]
    fn serde_uses_month_year_strings() {
        let value: MonthYear = serde_json::from_str("\"06-2024\"").unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"06-2024\"");
        assert!(serde_json::from_str::<MonthYear>("\"2024-06\"").is_err());
    }
}
