//! # Fabricate Extras
//!
//! Uniqueness-constrained builders for the Fabricate test data library.
//!
//! This crate provides builders for:
//! - **Email**: addresses derived from 1–7 name parts, cycling domains and escalating through
//!   separators and numeric suffixes
//! - **Numeric codes**: zero-padded codes of a fixed length, unique until the `10^L` space is
//!   spent (or repeating, when tracking is disabled)
//! - **Security numbers**: `YYMMDD-SSSS` identifiers with 10,000 unique serials per birth date
//!
//! Builders are plain mutable values. Call them directly, or share one through
//! [`fabricate::shared`] and plug it into a pipeline with [`fabricate::issuing`].
//!
//! ## Quick Start
//!
//! ```rust
//! use fabricate::{Generator, RandomSource, UniqueValueBuilder, issuing, shared};
//! use fabricate_extras::prelude::*;
//!
//! let source = RandomSource::seeded(7);
//!
//! let mut emails = EmailUniqueBuilder::new(&source, ["test.com"]).unwrap();
//! assert_eq!(emails.email(&["bob", "cool"]).unwrap(), "bob.cool@test.com");
//! assert_eq!(emails.email(&["bob", "cool"]).unwrap(), "bob_cool@test.com");
//!
//! let codes = shared(NumericCodeUniqueBuilder::new(&source, 3, true).unwrap());
//! let pins = issuing(&codes, ()).sample(1000).unwrap();
//! assert_eq!(pins.len(), 1000);
//! assert!(codes.borrow_mut().issue(&()).unwrap_err().is_capacity_exhausted());
//! ```

pub mod builders;

pub use builders::email::{EmailUniqueBuilder, NameParts};
pub use builders::numeric_code::NumericCodeUniqueBuilder;
pub use builders::security_number::SecurityNumberUniqueBuilder;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builders::email::{DEFAULT_DOMAINS, EmailUniqueBuilder, NameParts};
    pub use crate::builders::numeric_code::{MAX_CODE_LENGTH, NumericCodeUniqueBuilder};
    pub use crate::builders::security_number::{
        DAILY_CAPACITY, FORMATTED_LEN, SEPARATOR, SEPARATOR_INDEX, SecurityNumberUniqueBuilder,
    };
}
