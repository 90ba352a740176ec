//! Combinator adapters returned by the [`Generator`] default methods.
//!
//! Each adapter holds its inner generator(s) by value and performs exactly the draws documented
//! on it, in a fixed order, so pipelines built over a seeded random source replay identically.

use std::any::type_name;
use std::cell::{Cell, OnceCell};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::error::{GenerateError, Result};
use crate::generator::Generator;

/// A generator that maps values from one type to another
#[derive(Clone)]
pub struct Map<G, F> {
    inner: G,
    mapper: F,
}

impl<G, F> Map<G, F> {
    pub(crate) fn new(inner: G, mapper: F) -> Self {
        Self { inner, mapper }
    }
}

impl<G, F, U> Generator for Map<G, F>
where
    G: Generator,
    F: Fn(G::Value) -> U,
{
    type Value = U;

    fn generate(&self) -> Result<U> {
        let value = self.inner.generate()?;
        Ok((self.mapper)(value))
    }
}

/// A generator that builds a new generator from every drawn value and draws from it
#[derive(Clone)]
pub struct Bind<G, F> {
    inner: G,
    selector: F,
}

impl<G, F> Bind<G, F> {
    pub(crate) fn new(inner: G, selector: F) -> Self {
        Self { inner, selector }
    }
}

impl<G, F, H> Generator for Bind<G, F>
where
    G: Generator,
    F: Fn(G::Value) -> H,
    H: Generator,
{
    type Value = H::Value;

    fn generate(&self) -> Result<H::Value> {
        let value = self.inner.generate()?;
        let selected = (self.selector)(value);
        selected.generate()
    }
}

/// A generator that combines two generators, always drawing the left one first
#[derive(Clone)]
pub struct Zip<L, R, F> {
    left: L,
    right: R,
    combiner: F,
}

impl<L, R, F> Zip<L, R, F> {
    pub(crate) fn new(left: L, right: R, combiner: F) -> Self {
        Self {
            left,
            right,
            combiner,
        }
    }
}

impl<L, R, F, U> Generator for Zip<L, R, F>
where
    L: Generator,
    R: Generator,
    F: Fn(L::Value, R::Value) -> U,
{
    type Value = U;

    fn generate(&self) -> Result<U> {
        let left_value = self.left.generate()?;
        let right_value = self.right.generate()?;
        Ok((self.combiner)(left_value, right_value))
    }
}

/// A generator that redraws until a predicate accepts the value
///
/// Failed attempts are not rolled back: the shared random source stays advanced by every
/// rejected draw.
#[derive(Clone)]
pub struct Filter<G, P> {
    inner: G,
    predicate: P,
    threshold: usize,
}

impl<G, P> Filter<G, P> {
    pub(crate) fn new(inner: G, predicate: P, threshold: usize) -> Self {
        Self {
            inner,
            predicate,
            threshold,
        }
    }

    /// Maximum number of draws attempted per call
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl<G, P> Generator for Filter<G, P>
where
    G: Generator,
    P: Fn(&G::Value) -> bool,
{
    type Value = G::Value;

    fn generate(&self) -> Result<G::Value> {
        for _ in 0..self.threshold {
            let value = self.inner.generate()?;
            if (self.predicate)(&value) {
                return Ok(value);
            }
        }
        tracing::warn!(
            attempts = self.threshold,
            "filter predicate was never satisfied"
        );
        Err(GenerateError::PredicateNotSatisfied {
            attempts: self.threshold,
        })
    }
}

/// A generator that discards a fixed number of draws the first time it is pulled
///
/// A failed draw during the discard still counts toward `count`. The error is returned and the
/// next pull resumes the discard where it stopped, so exactly `count` draws are ever discarded.
pub struct Skip<G> {
    inner: G,
    count: usize,
    discarded: Cell<usize>,
    skipped: OnceCell<()>,
}

impl<G> Skip<G> {
    pub(crate) fn new(inner: G, count: usize) -> Self {
        Self {
            inner,
            count,
            discarded: Cell::new(0),
            skipped: OnceCell::new(),
        }
    }

    /// Whether the discard has already happened
    pub fn has_skipped(&self) -> bool {
        self.skipped.get().is_some()
    }
}

impl<G: Generator> Generator for Skip<G> {
    type Value = G::Value;

    fn generate(&self) -> Result<G::Value> {
        if self.skipped.get().is_none() {
            tracing::debug!(
                count = self.count,
                done = self.discarded.get(),
                "skipping draws on first pull"
            );
            while self.discarded.get() < self.count {
                let draw = self.inner.generate();
                self.discarded.set(self.discarded.get() + 1);
                draw?;
            }
            let _ = self.skipped.set(());
        }
        self.inner.generate()
    }
}

/// A finite, forward-only run of draws from a generator
#[derive(Debug)]
pub struct Take<'a, G> {
    generator: &'a G,
    remaining: usize,
}

impl<'a, G> Take<'a, G> {
    pub(crate) fn new(generator: &'a G, count: usize) -> Self {
        Self {
            generator,
            remaining: count,
        }
    }
}

impl<G: Generator> Iterator for Take<'_, G> {
    type Item = Result<G::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<G: Generator> ExactSizeIterator for Take<'_, G> {}

impl<G: Generator> FusedIterator for Take<'_, G> {}

/// A generator that converts every drawn value to `U`
pub struct Cast<G, U> {
    inner: G,
    _target: PhantomData<fn() -> U>,
}

impl<G, U> Cast<G, U> {
    pub(crate) fn new(inner: G) -> Self {
        Self {
            inner,
            _target: PhantomData,
        }
    }
}

impl<G, U> Generator for Cast<G, U>
where
    G: Generator,
    U: TryFrom<G::Value>,
{
    type Value = U;

    fn generate(&self) -> Result<U> {
        let value = self.inner.generate()?;
        U::try_from(value).map_err(|_| GenerateError::InvalidCast {
            from: type_name::<G::Value>(),
            to: type_name::<U>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{constant, from_fn, one_of, try_from_fn};
    use crate::rng::RandomSource;

    fn counter() -> (std::rc::Rc<Cell<u32>>, impl Generator<Value = u32>) {
        let calls = std::rc::Rc::new(Cell::new(0));
        let handle = calls.clone();
        let generator = from_fn(move || {
            let value = handle.get();
            handle.set(value + 1);
            value
        });
        (calls, generator)
    }

    #[test]
    fn test_map_composition() {
        let source = RandomSource::seeded(10);
        let chained = one_of(&source, 0..100)
            .unwrap()
            .map(|x| x + 1)
            .map(|x| x * 3);

        let replay = RandomSource::seeded(10);
        let fused = one_of(&replay, 0..100).unwrap().map(|x| (x + 1) * 3);

        for _ in 0..50 {
            assert_eq!(chained.generate().unwrap(), fused.generate().unwrap());
        }
    }

    #[test]
    fn test_bind_reconstructs_selected_generator() {
        let built = Cell::new(0);
        let generator = constant(()).bind(|_| {
            built.set(built.get() + 1);
            constant(built.get())
        });

        let first = generator.generate().unwrap();
        let second = generator.generate().unwrap();
        assert_ne!(first, second);
        assert_eq!(built.get(), 2);
    }

    #[test]
    fn test_zip_draws_left_before_right() {
        let (calls, left) = counter();
        let right = from_fn(|| calls.get());

        // The right side observes the counter after the left side advanced it.
        let zipped = left.zip(right, |l, r| (l, r));
        assert_eq!(zipped.generate().unwrap(), (0, 1));
        assert_eq!(zipped.generate().unwrap(), (1, 2));
    }

    #[test]
    fn test_filter_returns_first_match() {
        let (_, numbers) = counter();
        let evens = numbers.filter_with_threshold(|x| x % 2 == 0, 5).unwrap();

        assert_eq!(evens.generate().unwrap(), 0);
        assert_eq!(evens.generate().unwrap(), 2);
        assert_eq!(evens.threshold(), 5);
    }

    #[test]
    fn test_filter_threshold_exhaustion() {
        let (calls, numbers) = counter();
        let never = numbers.filter_with_threshold(|_| false, 10).unwrap();

        assert_eq!(
            never.generate(),
            Err(GenerateError::PredicateNotSatisfied { attempts: 10 })
        );
        assert_eq!(calls.get(), 10);

        // Each call restarts the retry loop.
        assert!(never.generate().is_err());
        assert_eq!(calls.get(), 20);
    }

    #[test]
    fn test_filter_rejects_zero_threshold() {
        let result = constant(1).filter_with_threshold(|_| true, 0);
        assert!(matches!(result, Err(GenerateError::InvalidArgument { .. })));
    }

    #[test]
    fn test_default_filter_threshold_comes_from_config() {
        let filter = constant(1).filter(|_| true);
        assert_eq!(
            filter.threshold(),
            crate::config::get_global_config()
                .generator_config
                .filter_threshold
        );
    }

    #[test]
    fn test_release_discards_eagerly() {
        let (calls, numbers) = counter();
        let released = numbers.release(3).unwrap();

        assert_eq!(calls.get(), 3);
        assert_eq!(released.generate().unwrap(), 3);
    }

    #[test]
    fn test_skip_discards_once_on_first_pull() {
        let (calls, numbers) = counter();
        let skipped = numbers.skip(3);

        assert_eq!(calls.get(), 0);
        assert!(!skipped.has_skipped());

        let values = skipped.sample(5).unwrap();
        assert_eq!(values, vec![3, 4, 5, 6, 7]);
        assert_eq!(calls.get(), 8);
        assert!(skipped.has_skipped());
    }

    #[test]
    fn test_skip_resumes_after_failed_discard() {
        let calls = Cell::new(0u32);
        let flaky = try_from_fn(|| {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                Err(GenerateError::EmptyCollection)
            } else {
                Ok(calls.get())
            }
        });
        let skipped = flaky.skip(3);

        assert_eq!(skipped.generate(), Err(GenerateError::EmptyCollection));
        assert_eq!(calls.get(), 2);
        assert!(!skipped.has_skipped());

        // Only the third discard is left before the first kept draw.
        assert_eq!(skipped.generate(), Ok(4));
        assert_eq!(skipped.generate(), Ok(5));
        assert_eq!(calls.get(), 5);
        assert!(skipped.has_skipped());
    }

    #[test]
    fn test_take_yields_exact_count() {
        let (_, numbers) = counter();
        let mut run = numbers.take(3).unwrap();

        assert_eq!(run.len(), 3);
        assert_eq!(run.next(), Some(Ok(0)));
        assert_eq!(run.next(), Some(Ok(1)));
        assert_eq!(run.next(), Some(Ok(2)));
        assert_eq!(run.next(), None);

        // A second run continues from the advanced state.
        let rest: Vec<u32> = numbers.sample(2).unwrap();
        assert_eq!(rest, vec![3, 4]);
    }

    #[test]
    fn test_take_rejects_zero_count() {
        let source = constant(1);
        let result = source.take(0);
        assert!(matches!(result, Err(GenerateError::InvalidArgument { .. })));
    }

    #[test]
    fn test_cast_identity_and_failure() {
        let same = constant(5u8).cast::<u8>();
        assert_eq!(same.generate().unwrap(), 5);

        let widened = constant(200u8).cast::<u32>();
        assert_eq!(widened.generate().unwrap(), 200);

        let narrowed = constant(300u32).cast::<u8>();
        assert!(matches!(
            narrowed.generate(),
            Err(GenerateError::InvalidCast { from: "u32", to: "u8" })
        ));
    }

    #[test]
    fn test_errors_propagate_through_pipelines() {
        let failing = constant(1)
            .filter_with_threshold(|_| false, 1)
            .unwrap()
            .map(|x| x + 1)
            .zip(constant(2), |a, b| a + b);

        assert!(matches!(
            failing.generate(),
            Err(GenerateError::PredicateNotSatisfied { attempts: 1 })
        ));
    }
}
