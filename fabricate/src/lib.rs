//! # Fabricate - Lazy Test Data Pipelines for Rust
//!
//! Fabricate composes pull-based generators of test data. Leaf generators draw from a shared,
//! optionally seeded [`RandomSource`]; combinators ([`Generator::map`], [`Generator::bind`],
//! [`Generator::zip`], [`Generator::filter`], [`Generator::skip`], [`Generator::take`], ...)
//! build larger pipelines without drawing anything until a value is pulled. Unique builders
//! ([`unique::UniqueValueBuilder`]) guarantee that issued values never collide for the same
//! identity key.
//!
//! ## Quick Start
//!
//! ```rust
//! use fabricate::{Generator, RandomSource, one_of};
//!
//! let source = RandomSource::seeded(42);
//! let ages = source.integers(Some(18), Some(65)).unwrap();
//! let names = one_of(&source, ["ada", "grace", "linus"]).unwrap();
//!
//! let people = names.zip(ages, |name, age| format!("{name} ({age})"));
//! let sample = people.sample(3).unwrap();
//! assert_eq!(sample.len(), 3);
//! ```
//!
//! ## Determinism
//!
//! Two pipelines built the same way over sources with the same seed produce the same values.
//! Combinators never reorder draws: `zip` always draws left before right, `skip` discards
//! exactly once, and `filter` keeps (does not roll back) the draws it rejected.
//!
//! ## Threading
//!
//! Random sources and unique builders are shared through `Rc` and mutated without locks, so
//! pipelines are `!Send` and must be driven from the thread that built them.

pub mod combinators;
pub mod config;
pub mod error;
pub mod generator;
pub mod primitives;
pub mod rng;
pub mod unique;

// Re-export the main public API
pub use combinators::{Bind, Cast, Filter, Map, Skip, Take, Zip};
pub use config::{
    ConfigError, ConfigManager, DEFAULT_FILTER_THRESHOLD, GeneratorConfig, GlobalConfig,
    create_generator_config, create_generator_config_with_overrides, get_global_config,
    set_global_config,
};
pub use error::{GenerateError, Result};
pub use generator::{
    BoxedGenerator, Constant, FromFn, Generator, OneOf, TryFromFn, WeightedOneOf, constant,
    from_fn, one_of, try_from_fn, weighted_one_of,
};
pub use primitives::{Alphanumeric, Booleans, Dates, Ranged};
pub use rng::{DefaultRngProvider, RandomSource, RangeBound, RngProvider};
pub use unique::{
    ExhaustionStrategy, SharedBuilder, UniqueBuilder, UniqueGenerator, UniqueValueBuilder,
    WithoutReplacement, issuing, issuing_from, shared,
};
