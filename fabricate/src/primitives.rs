//! Leaf generators for primitive values drawn from a [`RandomSource`].
//!
//! Numeric and date generators take optional bounds and draw from the half-open range
//! `[min, max)`. Bounds are validated when the generator is built; `min == max` is legal and
//! always yields `min`.

use chrono::{Days, NaiveDate};
use num_traits::{Bounded, PrimInt, Zero};
use rand::Rng;
use rand::distributions::Alphanumeric as AlphanumericChars;

use crate::error::{GenerateError, Result};
use crate::generator::Generator;
use crate::rng::{RandomSource, RangeBound, check_range, check_sample_range};

/// Generator for values in a half-open numeric range
#[derive(Debug, Clone)]
pub struct Ranged<T> {
    source: RandomSource,
    min: T,
    max: T,
}

impl<T: Copy> Ranged<T> {
    /// Inclusive lower bound
    pub fn min(&self) -> T {
        self.min
    }

    /// Exclusive upper bound
    pub fn max(&self) -> T {
        self.max
    }
}

impl<T: RangeBound> Generator for Ranged<T> {
    type Value = T;

    fn generate(&self) -> Result<T> {
        self.source.range(self.min, self.max)
    }
}

/// Generator for booleans with a fixed probability of `true`
#[derive(Debug, Clone)]
pub struct Booleans {
    source: RandomSource,
    probability: f64,
}

impl Generator for Booleans {
    type Value = bool;

    fn generate(&self) -> Result<bool> {
        Ok(self.source.with_rng(|rng| rng.gen_bool(self.probability)))
    }
}

/// Generator for calendar dates in a half-open range
#[derive(Debug, Clone)]
pub struct Dates {
    source: RandomSource,
    min: NaiveDate,
    span_days: u64,
}

impl Generator for Dates {
    type Value = NaiveDate;

    fn generate(&self) -> Result<NaiveDate> {
        let offset = self.source.range(0, self.span_days)?;
        self.min
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| GenerateError::invalid_range(self.min, offset))
    }
}

/// Generator for ASCII alphanumeric strings
#[derive(Debug, Clone)]
pub struct Alphanumeric {
    source: RandomSource,
    min_len: usize,
    max_len: usize,
}

impl Generator for Alphanumeric {
    type Value = String;

    fn generate(&self) -> Result<String> {
        let len = self.source.range(self.min_len, self.max_len)?;
        Ok(self.source.with_rng(|rng| {
            (0..len)
                .map(|_| char::from(rng.sample(AlphanumericChars)))
                .collect()
        }))
    }
}

/// Earliest date produced when no lower bound is given
pub fn default_min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Exclusive upper date bound used when none is given
pub fn default_max_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2100, 1, 1).unwrap_or(NaiveDate::MAX)
}

// Integers default to [0, MAX); a negative explicit max pulls the default min down to the
// type's minimum so that `max` alone is always accepted.
fn integer_bounds<T: PrimInt>(min: Option<T>, max: Option<T>) -> (T, T) {
    let max = max.unwrap_or_else(T::max_value);
    let min = min.unwrap_or_else(|| {
        if max < T::zero() {
            <T as Bounded>::min_value()
        } else {
            T::zero()
        }
    });
    (min, max)
}

fn date_bounds(min: Option<NaiveDate>, max: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    match (min, max) {
        (Some(min), Some(max)) => (min, max),
        (Some(min), None) if min < default_max_date() => (min, default_max_date()),
        (Some(min), None) => (min, NaiveDate::MAX),
        (None, Some(max)) if max > default_min_date() => (default_min_date(), max),
        (None, Some(max)) => (NaiveDate::MIN, max),
        (None, None) => (default_min_date(), default_max_date()),
    }
}

impl RandomSource {
    /// Generator for values in `[min, max)` with explicit bounds
    ///
    /// Float bounds must be finite and `max - min` must not overflow.
    pub fn ranged<T: RangeBound>(&self, min: T, max: T) -> Result<Ranged<T>> {
        check_sample_range(min, max)?;
        Ok(Ranged {
            source: self.clone(),
            min,
            max,
        })
    }

    /// Generator for `i32` values; defaults to `[0, i32::MAX)`
    pub fn integers(&self, min: Option<i32>, max: Option<i32>) -> Result<Ranged<i32>> {
        let (min, max) = integer_bounds(min, max);
        self.ranged(min, max)
    }

    /// Generator for `i64` values; defaults to `[0, i64::MAX)`
    pub fn longs(&self, min: Option<i64>, max: Option<i64>) -> Result<Ranged<i64>> {
        let (min, max) = integer_bounds(min, max);
        self.ranged(min, max)
    }

    /// Generator for `f64` values; defaults to `[0.0, 1.0)`
    pub fn doubles(&self, min: Option<f64>, max: Option<f64>) -> Result<Ranged<f64>> {
        let max = max.unwrap_or(1.0);
        let min = min.unwrap_or_else(|| f64::zero().min(max));
        self.ranged(min, max)
    }

    /// Generator for fair booleans
    pub fn booleans(&self) -> Booleans {
        Booleans {
            source: self.clone(),
            probability: 0.5,
        }
    }

    /// Generator for booleans that are `true` with the given probability
    pub fn weighted_booleans(&self, probability: f64) -> Result<Booleans> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GenerateError::invalid_argument(format!(
                "probability {} is outside [0, 1]",
                probability
            )));
        }
        Ok(Booleans {
            source: self.clone(),
            probability,
        })
    }

    /// Generator for dates; defaults to `[1900-01-01, 2100-01-01)`
    ///
    /// A missing bound that would fall on the wrong side of the given one widens to the
    /// earliest or latest representable date instead.
    pub fn dates(&self, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Result<Dates> {
        let (min, max) = date_bounds(min, max);
        check_range(min, max)?;
        let span_days = u64::try_from((max - min).num_days())
            .map_err(|_| GenerateError::invalid_range(min, max))?;
        Ok(Dates {
            source: self.clone(),
            min,
            span_days,
        })
    }

    /// Generator for alphanumeric strings whose length is drawn from `[min_len, max_len)`
    pub fn alphanumeric(&self, min_len: usize, max_len: usize) -> Result<Alphanumeric> {
        check_range(min_len, max_len)?;
        Ok(Alphanumeric {
            source: self.clone(),
            min_len,
            max_len,
        })
    }
}
