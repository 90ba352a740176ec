//! RNG backend integration and the shared random source handle.
//!
//! Every generator built "from" a [`RandomSource`] holds a clone of the same handle, so all of
//! them advance one underlying PRNG cursor. The handle is reference counted without locking and
//! is therefore neither `Send` nor `Sync`: a pipeline stays on the thread that built it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};

/// Trait for providing random number generators
pub trait RngProvider {
    /// The type of RNG this provider creates
    type Rng: RngCore + 'static;

    /// Create a new RNG instance with an optional seed
    fn create_rng(&self, seed: Option<u64>) -> Self::Rng;

    /// Create a new RNG instance with a random seed
    fn create_random_rng(&self) -> Self::Rng {
        self.create_rng(None)
    }
}

/// Default RNG provider using the standard library's StdRng
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRngProvider;

impl RngProvider for DefaultRngProvider {
    type Rng = StdRng;

    fn create_rng(&self, seed: Option<u64>) -> Self::Rng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Shared handle to a single pseudo-random generator
///
/// Cloning the handle does not copy the PRNG: clones share and advance the same state. Two
/// sources constructed independently with the same seed produce identical draws for identical
/// call sequences.
#[derive(Clone)]
pub struct RandomSource {
    rng: Rc<RefCell<Box<dyn RngCore>>>,
    seed: Option<u64>,
}

impl RandomSource {
    /// Create a source seeded from OS entropy
    pub fn new() -> Self {
        Self::with_provider(&DefaultRngProvider, None)
    }

    /// Create a deterministic source from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_provider(&DefaultRngProvider, Some(seed))
    }

    /// Create a source using the seed carried by a generator configuration
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::with_provider(&DefaultRngProvider, config.seed)
    }

    /// Create a source backed by a custom RNG provider
    pub fn with_provider<P: RngProvider>(provider: &P, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => tracing::debug!(seed, "creating seeded random source"),
            None => tracing::debug!("creating random source from entropy"),
        }
        Self {
            rng: Rc::new(RefCell::new(Box::new(provider.create_rng(seed)))),
            seed,
        }
    }

    /// The seed this source was created with, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether two handles advance the same underlying PRNG
    pub fn shares_state_with(&self, other: &RandomSource) -> bool {
        Rc::ptr_eq(&self.rng, &other.rng)
    }

    /// Derive an independent source whose seed is drawn from this one
    ///
    /// The child is deterministic whenever the parent is, but draws from it no longer advance
    /// the parent.
    pub fn fork(&self) -> RandomSource {
        let seed = self.next_u64();
        Self::seeded(seed)
    }

    /// Run a closure against the underlying RNG
    ///
    /// The closure must not draw from this source again; the PRNG is mutably borrowed for the
    /// duration of the call.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut dyn RngCore) -> R) -> R {
        let mut rng = self.rng.borrow_mut();
        f(rng.as_mut())
    }

    /// Draw a uniformly distributed u32
    pub fn next_u32(&self) -> u32 {
        self.with_rng(|rng| rng.next_u32())
    }

    /// Draw a uniformly distributed u64
    pub fn next_u64(&self) -> u64 {
        self.with_rng(|rng| rng.next_u64())
    }

    /// Draw a fair boolean
    pub fn next_bool(&self) -> bool {
        self.with_rng(|rng| rng.r#gen())
    }

    /// Draw an f64 in `[0.0, 1.0)`
    pub fn next_f64(&self) -> f64 {
        self.with_rng(|rng| rng.r#gen())
    }

    /// Draw an index in `[0, len)`
    pub fn index(&self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(GenerateError::EmptyCollection);
        }
        Ok(self.with_rng(|rng| rng.gen_range(0..len)))
    }

    /// Draw a value from the half-open range `[min, max)`
    ///
    /// `min == max` is legal and yields `min` without consuming entropy.
    pub fn range<T: RangeBound>(&self, min: T, max: T) -> Result<T> {
        check_sample_range(min, max)?;
        if min == max {
            return Ok(min);
        }
        Ok(self.with_rng(|rng| rng.gen_range(min..max)))
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSource")
            .field("seed", &self.seed)
            .field("handles", &Rc::strong_count(&self.rng))
            .finish()
    }
}

/// Numeric types that can bound a uniformly sampled range
pub trait RangeBound: SampleUniform + PartialOrd + Copy + fmt::Display {
    /// Whether `[min, max)` can be sampled; `min <= max` is already checked
    fn is_sampleable(_min: Self, _max: Self) -> bool {
        true
    }
}

macro_rules! integer_range_bound {
    ($($t:ty),*) => {
        $(impl RangeBound for $t {})*
    };
}

macro_rules! float_range_bound {
    ($($t:ty),*) => {
        $(
            impl RangeBound for $t {
                // The sampler needs finite bounds and a span that does not overflow.
                fn is_sampleable(min: Self, max: Self) -> bool {
                    min.is_finite() && max.is_finite() && (max - min).is_finite()
                }
            }
        )*
    };
}

integer_range_bound!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
float_range_bound!(f32, f64);

/// Reject ranges whose lower bound is above the upper bound (or that are not comparable)
pub(crate) fn check_range<T: PartialOrd + fmt::Display>(min: T, max: T) -> Result<()> {
    match min.partial_cmp(&max) {
        Some(std::cmp::Ordering::Greater) | None => Err(GenerateError::invalid_range(min, max)),
        _ => Ok(()),
    }
}

/// Reject ranges the uniform sampler cannot draw from
pub(crate) fn check_sample_range<T: RangeBound>(min: T, max: T) -> Result<()> {
    check_range(min, max)?;
    if !T::is_sampleable(min, max) {
        return Err(GenerateError::invalid_range(min, max));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rng_provider() {
        let provider = DefaultRngProvider;

        let mut rng1 = provider.create_rng(Some(12345));
        let mut rng2 = provider.create_rng(Some(12345));
        assert_eq!(rng1.next_u32(), rng2.next_u32());

        let mut rng3 = provider.create_random_rng();
        let _value = rng3.next_u64();
    }

    #[test]
    fn test_seeded_sources_replay() {
        let first = RandomSource::seeded(42);
        let second = RandomSource::seeded(42);

        let a: Vec<u64> = (0..20).map(|_| first.next_u64()).collect();
        let b: Vec<u64> = (0..20).map(|_| second.next_u64()).collect();
        assert_eq!(a, b);
        assert_eq!(first.seed(), Some(42));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let first = RandomSource::seeded(1);
        let second = RandomSource::seeded(2);

        let a: Vec<u64> = (0..20).map(|_| first.next_u64()).collect();
        let b: Vec<u64> = (0..20).map(|_| second.next_u64()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_clones_share_cursor() {
        let source = RandomSource::seeded(9);
        let clone = source.clone();
        assert!(source.shares_state_with(&clone));

        let reference = RandomSource::seeded(9);
        let expected = [reference.next_u64(), reference.next_u64()];

        // Alternating between handles walks the single shared sequence.
        assert_eq!(source.next_u64(), expected[0]);
        assert_eq!(clone.next_u64(), expected[1]);
    }

    #[test]
    fn test_fork_is_deterministic_and_independent() {
        let parent_a = RandomSource::seeded(5);
        let parent_b = RandomSource::seeded(5);

        let child_a = parent_a.fork();
        let child_b = parent_b.fork();
        assert!(!child_a.shares_state_with(&parent_a));
        assert_eq!(child_a.next_u64(), child_b.next_u64());
        assert_eq!(parent_a.next_u64(), parent_b.next_u64());
    }

    #[test]
    fn test_range_validation() {
        let source = RandomSource::seeded(3);

        for _ in 0..100 {
            let value = source.range(10, 20).unwrap();
            assert!((10..20).contains(&value));
        }

        assert_eq!(source.range(7, 7).unwrap(), 7);
        assert_eq!(source.range(1.5, 1.5).unwrap(), 1.5);

        assert!(matches!(
            source.range(5, 1),
            Err(GenerateError::InvalidRange { .. })
        ));
        assert!(source.range(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_float_range_must_be_finite() {
        let source = RandomSource::seeded(3);

        assert!(matches!(
            source.range(0.0, f64::INFINITY),
            Err(GenerateError::InvalidRange { .. })
        ));
        assert!(matches!(
            source.range(-f64::MAX, f64::MAX),
            Err(GenerateError::InvalidRange { .. })
        ));
        assert!(source.range(f32::NEG_INFINITY, 0.0).is_err());

        let value = source.range(-1.0e300, 1.0e300).unwrap();
        assert!((-1.0e300..1.0e300).contains(&value));
    }

    #[test]
    fn test_index_rejects_empty() {
        let source = RandomSource::seeded(3);
        assert_eq!(source.index(0), Err(GenerateError::EmptyCollection));
        assert_eq!(source.index(1).unwrap(), 0);
    }

    #[test]
    fn test_from_config_uses_seed() {
        let config = GeneratorConfig::seeded(11);
        let a = RandomSource::from_config(&config);
        let b = RandomSource::seeded(11);
        assert_eq!(a.next_u32(), b.next_u32());
    }
}
