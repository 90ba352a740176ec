//! Fixed-length numeric codes ("number by length")
//!
//! A code of length `L` is a zero-padded decimal string drawn from `10^L` possibilities. In
//! unique mode the whole builder shares one space and the `(10^L + 1)`-th request fails; in
//! repeating mode codes are drawn with replacement and nothing is tracked.

use fabricate::unique::{UniqueBuilder, WithoutReplacement};
use fabricate::{
    ExhaustionStrategy, GenerateError, GeneratorConfig, RandomSource, Result, UniqueValueBuilder,
};

/// Longest supported code; `10^18` still fits in a `u64`
pub const MAX_CODE_LENGTH: u32 = 18;

/// Sampling rules for fixed-length codes
#[derive(Debug, Clone)]
pub struct NumericCodeStrategy {
    length: u32,
    capacity: u64,
}

impl NumericCodeStrategy {
    fn format(&self, value: u64) -> String {
        format!("{:0width$}", value, width = self.length as usize)
    }
}

impl ExhaustionStrategy for NumericCodeStrategy {
    type Request = ();
    type Key = ();
    type Value = String;
    type Cursor = WithoutReplacement;

    fn kind(&self) -> &'static str {
        "numeric code"
    }

    fn identity_key(&self, _request: &()) -> Result<()> {
        Ok(())
    }

    fn new_cursor(&self, _key: &()) -> WithoutReplacement {
        WithoutReplacement::new(self.capacity)
    }

    fn next_candidate(
        &self,
        _key: &(),
        _request: &(),
        cursor: &mut WithoutReplacement,
        source: &RandomSource,
    ) -> Result<String> {
        match cursor.draw(source)? {
            Some(value) => Ok(self.format(value)),
            None => Err(GenerateError::capacity_exhausted(
                self.kind(),
                format!("length {}", self.length),
                self.capacity,
            )),
        }
    }
}

enum Mode {
    Unique(UniqueBuilder<NumericCodeStrategy>),
    Repeating {
        strategy: NumericCodeStrategy,
        source: RandomSource,
        issued: usize,
    },
}

/// Issues fixed-length numeric codes, optionally without repeats
pub struct NumericCodeUniqueBuilder {
    mode: Mode,
}

impl NumericCodeUniqueBuilder {
    /// Create a builder for codes of `length` digits
    ///
    /// `unique` selects sampling without replacement; otherwise codes may repeat.
    pub fn new(source: &RandomSource, length: u32, unique: bool) -> Result<Self> {
        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(GenerateError::invalid_argument(format!(
                "code length must be between 1 and {}, got {}",
                MAX_CODE_LENGTH, length
            )));
        }
        let strategy = NumericCodeStrategy {
            length,
            capacity: 10u64.pow(length),
        };

        let mode = if unique {
            Mode::Unique(UniqueBuilder::new(strategy, source))
        } else {
            Mode::Repeating {
                strategy,
                source: source.clone(),
                issued: 0,
            }
        };
        Ok(Self { mode })
    }

    /// Create a builder whose mode follows the configuration's `unique_tracking` flag
    pub fn from_config(
        source: &RandomSource,
        length: u32,
        config: &GeneratorConfig,
    ) -> Result<Self> {
        Self::new(source, length, config.unique_tracking)
    }

    /// Issue the next code
    pub fn next_code(&mut self) -> Result<String> {
        self.issue(&())
    }

    /// Number of digits per code
    pub fn length(&self) -> u32 {
        self.strategy().length
    }

    /// Number of distinct codes of this length
    pub fn capacity(&self) -> u64 {
        self.strategy().capacity
    }

    /// Whether issued codes are tracked and never repeated
    pub fn is_unique(&self) -> bool {
        matches!(self.mode, Mode::Unique(_))
    }

    /// Codes still available in unique mode; `None` when codes may repeat
    pub fn remaining(&self) -> Option<u64> {
        match &self.mode {
            Mode::Unique(builder) => Some(
                builder
                    .space(&())
                    .map_or(builder.strategy().capacity, |space| space.cursor().remaining()),
            ),
            Mode::Repeating { .. } => None,
        }
    }

    fn strategy(&self) -> &NumericCodeStrategy {
        match &self.mode {
            Mode::Unique(builder) => builder.strategy(),
            Mode::Repeating { strategy, .. } => strategy,
        }
    }
}

impl UniqueValueBuilder for NumericCodeUniqueBuilder {
    type Request = ();
    type Value = String;

    fn issue(&mut self, request: &()) -> Result<String> {
        match &mut self.mode {
            Mode::Unique(builder) => builder.issue(request),
            Mode::Repeating {
                strategy,
                source,
                issued,
            } => {
                let value = source.range(0, strategy.capacity)?;
                *issued += 1;
                Ok(strategy.format(value))
            }
        }
    }

    fn issued_count(&self) -> usize {
        match &self.mode {
            Mode::Unique(builder) => builder.issued_count(),
            Mode::Repeating { issued, .. } => *issued,
        }
    }
}
