//! Date-keyed security numbers
//!
//! A security number is a `YYMMDD` birth-date prefix followed by a four-digit serial. Formatted
//! numbers carry a separator at index 6 (`YYMMDD-SSSS`, 11 characters); unformatted numbers are
//! the same ten digits without it. Serials are unique per date and each date has room for
//! exactly [`DAILY_CAPACITY`] numbers.

use chrono::NaiveDate;
use fabricate::unique::{UniqueBuilder, WithoutReplacement, capacity_exhausted};
use fabricate::{ExhaustionStrategy, Generator, RandomSource, Result, UniqueValueBuilder};

/// Number of distinct serials available for one date
pub const DAILY_CAPACITY: u64 = 10_000;

/// Character between the date prefix and the serial in formatted numbers
pub const SEPARATOR: char = '-';

/// Position of [`SEPARATOR`] in formatted numbers
pub const SEPARATOR_INDEX: usize = 6;

/// Length of a formatted number
pub const FORMATTED_LEN: usize = 11;

const SERIAL_DIGITS: usize = 4;

/// Serial sampling rules for security numbers
#[derive(Debug, Clone)]
pub struct SecurityNumberStrategy {
    formatted: bool,
}

impl SecurityNumberStrategy {
    fn render(&self, date: &NaiveDate, serial: u64) -> String {
        let prefix = date.format("%y%m%d");
        if self.formatted {
            format!("{}{}{:0width$}", prefix, SEPARATOR, serial, width = SERIAL_DIGITS)
        } else {
            format!("{}{:0width$}", prefix, serial, width = SERIAL_DIGITS)
        }
    }
}

impl ExhaustionStrategy for SecurityNumberStrategy {
    type Request = NaiveDate;
    type Key = NaiveDate;
    type Value = String;
    type Cursor = WithoutReplacement;

    fn kind(&self) -> &'static str {
        "security number"
    }

    fn identity_key(&self, request: &NaiveDate) -> Result<NaiveDate> {
        Ok(*request)
    }

    fn new_cursor(&self, _key: &NaiveDate) -> WithoutReplacement {
        WithoutReplacement::new(DAILY_CAPACITY)
    }

    fn next_candidate(
        &self,
        key: &NaiveDate,
        _request: &NaiveDate,
        cursor: &mut WithoutReplacement,
        source: &RandomSource,
    ) -> Result<String> {
        match cursor.draw(source)? {
            Some(serial) => Ok(self.render(key, serial)),
            None => Err(capacity_exhausted(self.kind(), key, DAILY_CAPACITY)),
        }
    }
}

/// Issues security numbers that never repeat for the same birth date
pub struct SecurityNumberUniqueBuilder {
    inner: UniqueBuilder<SecurityNumberStrategy>,
}

impl SecurityNumberUniqueBuilder {
    /// Create a builder; `formatted` inserts the separator at index 6
    pub fn new(source: &RandomSource, formatted: bool) -> Self {
        Self {
            inner: UniqueBuilder::new(SecurityNumberStrategy { formatted }, source),
        }
    }

    /// Issue the next number for `date`
    pub fn for_date(&mut self, date: NaiveDate) -> Result<String> {
        self.issue(&date)
    }

    /// Draw a birth date from `dates` and issue a number for it
    pub fn random_date<G>(&mut self, dates: &G) -> Result<String>
    where
        G: Generator<Value = NaiveDate>,
    {
        let date = dates.generate()?;
        self.issue(&date)
    }

    /// Whether issued numbers contain the separator
    pub fn is_formatted(&self) -> bool {
        self.inner.strategy().formatted
    }

    /// Number of serials issued for `date`
    pub fn issued_count_for(&self, date: &NaiveDate) -> usize {
        self.inner.issued_count_for(date)
    }

    /// Serials still available for `date`
    pub fn remaining_for(&self, date: &NaiveDate) -> u64 {
        self.inner
            .space(date)
            .map_or(DAILY_CAPACITY, |space| space.cursor().remaining())
    }
}

impl UniqueValueBuilder for SecurityNumberUniqueBuilder {
    type Request = NaiveDate;
    type Value = String;

    fn issue(&mut self, request: &NaiveDate) -> Result<String> {
        self.inner.issue(request)
    }

    fn issued_count(&self) -> usize {
        self.inner.issued_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabricate::GenerateError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_formatted_layout() {
        let source = RandomSource::seeded(1);
        let mut numbers = SecurityNumberUniqueBuilder::new(&source, true);

        let number = numbers.for_date(date(1985, 7, 4)).unwrap();
        assert_eq!(number.len(), FORMATTED_LEN);
        assert_eq!(number.chars().nth(SEPARATOR_INDEX), Some(SEPARATOR));
        assert!(number.starts_with("850704"));
        assert!(number[SEPARATOR_INDEX + 1..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_unformatted_is_digits_only() {
        let source = RandomSource::seeded(2);
        let mut numbers = SecurityNumberUniqueBuilder::new(&source, false);
        assert!(!numbers.is_formatted());

        let number = numbers.for_date(date(2001, 12, 31)).unwrap();
        assert_eq!(number.len(), FORMATTED_LEN - 1);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
        assert!(number.starts_with("011231"));
    }

    #[test]
    fn test_formatting_only_adds_separator() {
        let formatted = SecurityNumberUniqueBuilder::new(&RandomSource::seeded(3), true)
            .for_date(date(1990, 1, 1))
            .unwrap();
        let plain = SecurityNumberUniqueBuilder::new(&RandomSource::seeded(3), false)
            .for_date(date(1990, 1, 1))
            .unwrap();

        assert_eq!(formatted.replace(SEPARATOR, ""), plain);
    }

    #[test]
    fn test_dates_have_independent_capacity() {
        let source = RandomSource::seeded(4);
        let mut numbers = SecurityNumberUniqueBuilder::new(&source, true);
        let first = date(1970, 1, 1);
        let second = date(1970, 1, 2);

        for _ in 0..50 {
            numbers.for_date(first).unwrap();
        }
        numbers.for_date(second).unwrap();

        assert_eq!(numbers.issued_count_for(&first), 50);
        assert_eq!(numbers.issued_count_for(&second), 1);
        assert_eq!(numbers.remaining_for(&first), DAILY_CAPACITY - 50);
        assert_eq!(numbers.remaining_for(&date(2000, 1, 1)), DAILY_CAPACITY);
        assert_eq!(numbers.issued_count(), 51);
    }

    #[test]
    fn test_random_dates_come_from_generator() {
        let source = RandomSource::seeded(5);
        let min = date(1950, 1, 1);
        let max = date(1950, 1, 8);
        let dates = source.dates(Some(min), Some(max)).unwrap();
        let mut numbers = SecurityNumberUniqueBuilder::new(&source, true);

        for _ in 0..20 {
            let number = numbers.random_date(&dates).unwrap();
            assert!(number.starts_with("50010"));
        }

        let bad = source.dates(Some(max), Some(min));
        assert!(matches!(bad, Err(GenerateError::InvalidRange { .. })));
    }
}
