//! Calendar month identifiers used to key the monthly series.
//!
//! A [MonthKey] is rendered as `YYYY-MM` (zero-padded), which is the format
//! consumers of the report rely on.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::Error;

/// A calendar month, e.g. November 2025.
///
/// Month keys order chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    /// Create a month key from a year and month.
    pub const fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that `date` falls in. The day is discarded.
    pub fn from_date(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The year of the month.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The first day of the month, or `None` if the year is outside the range
    /// of dates the `time` crate can represent.
    pub fn first_day(&self) -> Option<Date> {
        Date::from_calendar_date(self.year, self.month, 1).ok()
    }

    /// The month `months` months before this one, e.g. three months before
    /// February 2025 is November 2024.
    ///
    /// Returns `None` if the result falls outside the range of dates the
    /// `time` crate can represent.
    pub fn checked_sub_months(self, months: u32) -> Option<Self> {
        let ordinal = self.ordinal() - i64::from(months);
        let year = i32::try_from(ordinal.div_euclid(12)).ok()?;

        if year < Date::MIN.year() {
            return None;
        }

        // rem_euclid(12) is always in 0..12.
        let month = Month::January.nth_next(ordinal.rem_euclid(12) as u8);

        Some(Self::new(year, month))
    }

    /// The number of months from `earlier` to `self`. Negative when `earlier`
    /// is actually later than `self`.
    pub fn months_since(&self, earlier: MonthKey) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(u8::from(self.month)) - 1
    }
}

impl Ord for MonthKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl PartialOrd for MonthKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonthKey(text.to_owned());

        let (year, month) = text.split_once('-').ok_or_else(invalid)?;

        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self::new(year, month))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::Error;

    use super::MonthKey;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(MonthKey::new(2025, Month::March).to_string(), "2025-03");
        assert_eq!(MonthKey::new(2025, Month::November).to_string(), "2025-11");
        assert_eq!(MonthKey::new(987, Month::January).to_string(), "0987-01");
    }

    #[test]
    fn parses_what_it_formats() {
        let key = MonthKey::new(2024, Month::February);

        assert_eq!(key.to_string().parse::<MonthKey>(), Ok(key));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["2025-1", "25-01", "2025-13", "2025-00", "2025/01", "2025-01-01", ""] {
            assert_eq!(
                text.parse::<MonthKey>(),
                Err(Error::InvalidMonthKey(text.to_owned())),
                "expected {text:?} to be rejected"
            );
        }
    }

    #[test]
    fn from_date_discards_day() {
        let key = MonthKey::from_date(date!(2024 - 02 - 29));

        assert_eq!(key, MonthKey::new(2024, Month::February));
        assert_eq!(key.first_day(), Some(date!(2024 - 02 - 01)));
    }

    #[test]
    fn first_day_of_unrepresentable_year_is_none() {
        assert_eq!(MonthKey::new(20_000, Month::January).first_day(), None);
        assert_eq!(MonthKey::new(i32::MIN, Month::December).first_day(), None);
    }

    #[test]
    fn sub_months_crosses_year_boundary() {
        let key = MonthKey::new(2025, Month::February);

        assert_eq!(key.checked_sub_months(0), Some(key));
        assert_eq!(
            key.checked_sub_months(2),
            Some(MonthKey::new(2024, Month::December))
        );
        assert_eq!(
            key.checked_sub_months(14),
            Some(MonthKey::new(2023, Month::December))
        );
        assert_eq!(
            key.checked_sub_months(25),
            Some(MonthKey::new(2023, Month::January))
        );
    }

    #[test]
    fn sub_months_out_of_range_is_none() {
        let key = MonthKey::new(2025, Month::January);

        assert_eq!(key.checked_sub_months(u32::MAX), None);
    }

    #[test]
    fn months_since_counts_calendar_months() {
        let november = MonthKey::new(2024, Month::November);
        let february = MonthKey::new(2025, Month::February);

        assert_eq!(february.months_since(november), 3);
        assert_eq!(november.months_since(february), -3);
        assert_eq!(november.months_since(november), 0);
    }

    #[test]
    fn orders_chronologically() {
        let mut keys = vec![
            MonthKey::new(2025, Month::January),
            MonthKey::new(2024, Month::December),
            MonthKey::new(2024, Month::February),
        ];

        keys.sort();

        assert_eq!(
            keys,
            vec![
                MonthKey::new(2024, Month::February),
                MonthKey::new(2024, Month::December),
                MonthKey::new(2025, Month::January),
            ]
        );
    }

    #[test]
    fn serializes_as_text() {
        let key = MonthKey::new(2025, Month::November);

        let json = serde_json::to_string(&key).unwrap();

        assert_eq!(json, "\"2025-11\"");
        assert_eq!(serde_json::from_str::<MonthKey>(&json).unwrap(), key);
    }
}
