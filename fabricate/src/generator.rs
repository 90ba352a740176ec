//! Core generator contract and leaf generators.
//!
//! A [`Generator`] performs one logical draw per [`Generator::generate`] call. Leaf generators
//! either ignore randomness ([`Constant`], [`FromFn`]) or draw from a shared
//! [`RandomSource`](crate::RandomSource) ([`OneOf`], [`WeightedOneOf`] and the ranged primitives).
//! Combinators wrap other generators and are provided as default methods on the trait.

use std::rc::Rc;

use crate::combinators::{Bind, Cast, Filter, Map, Skip, Take, Zip};
use crate::config::get_global_config;
use crate::error::{GenerateError, Result};
use crate::rng::RandomSource;

/// Pull-based producer of values
///
/// `generate` never caches results behind the caller's back: every call is a fresh draw, and the
/// only state it may touch is shared state captured at construction (a random source or a
/// unique builder).
pub trait Generator {
    /// The type of values this generator produces
    type Value;

    /// Perform one draw
    fn generate(&self) -> Result<Self::Value>;

    /// Transform every drawn value with `f`
    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Value) -> U,
    {
        Map::new(self, f)
    }

    /// Use every drawn value to build a fresh generator and draw from that instead
    ///
    /// The selector `f` runs on every call; the generator it returns is never cached.
    fn bind<F, G>(self, f: F) -> Bind<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Value) -> G,
        G: Generator,
    {
        Bind::new(self, f)
    }

    /// Draw from `self` then from `other`, combining both values with `f`
    fn zip<G, F, U>(self, other: G, f: F) -> Zip<Self, G, F>
    where
        Self: Sized,
        G: Generator,
        F: Fn(Self::Value, G::Value) -> U,
    {
        Zip::new(self, other, f)
    }

    /// Keep drawing until `predicate` accepts a value
    ///
    /// The attempt budget is taken from the global configuration when the adapter is built.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Value) -> bool,
    {
        let threshold = get_global_config().generator_config.filter_threshold;
        Filter::new(self, predicate, threshold)
    }

    /// Keep drawing until `predicate` accepts a value, giving up after `threshold` attempts
    fn filter_with_threshold<P>(self, predicate: P, threshold: usize) -> Result<Filter<Self, P>>
    where
        Self: Sized,
        P: Fn(&Self::Value) -> bool,
    {
        if threshold == 0 {
            return Err(GenerateError::invalid_argument(
                "filter threshold must be positive",
            ));
        }
        Ok(Filter::new(self, predicate, threshold))
    }

    /// Discard `count` draws right now and hand back the advanced generator
    fn release(self, count: usize) -> Result<Self>
    where
        Self: Sized,
    {
        tracing::debug!(count, "releasing draws eagerly");
        for _ in 0..count {
            self.generate()?;
        }
        Ok(self)
    }

    /// Discard `count` draws on the first pull only
    fn skip(self, count: usize) -> Skip<Self>
    where
        Self: Sized,
    {
        Skip::new(self, count)
    }

    /// Produce exactly `count` values as a forward-only sequence
    fn take(&self, count: usize) -> Result<Take<'_, Self>>
    where
        Self: Sized,
    {
        if count == 0 {
            return Err(GenerateError::invalid_argument(
                "take count must be positive",
            ));
        }
        Ok(Take::new(self, count))
    }

    /// Collect exactly `count` values
    fn sample(&self, count: usize) -> Result<Vec<Self::Value>>
    where
        Self: Sized,
    {
        self.take(count)?.collect()
    }

    /// Convert every drawn value to `U`, failing the draw when the conversion is rejected
    fn cast<U>(self) -> Cast<Self, U>
    where
        Self: Sized,
        U: TryFrom<Self::Value>,
    {
        Cast::new(self)
    }

    /// Erase the concrete pipeline type
    fn boxed(self) -> BoxedGenerator<Self::Value>
    where
        Self: Sized + 'static,
    {
        BoxedGenerator::new(self)
    }

    /// Borrow this generator so it can be composed without giving it up
    fn by_ref(&self) -> &Self
    where
        Self: Sized,
    {
        self
    }
}

impl<G: Generator + ?Sized> Generator for &G {
    type Value = G::Value;

    fn generate(&self) -> Result<Self::Value> {
        (**self).generate()
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    type Value = G::Value;

    fn generate(&self) -> Result<Self::Value> {
        (**self).generate()
    }
}

impl<G: Generator + ?Sized> Generator for Rc<G> {
    type Value = G::Value;

    fn generate(&self) -> Result<Self::Value> {
        (**self).generate()
    }
}

/// A type-erased generator
pub struct BoxedGenerator<T> {
    generator: Box<dyn Generator<Value = T>>,
}

impl<T> BoxedGenerator<T> {
    /// Create a new boxed generator
    pub fn new<G: Generator<Value = T> + 'static>(generator: G) -> Self {
        Self {
            generator: Box::new(generator),
        }
    }
}

impl<T> Generator for BoxedGenerator<T> {
    type Value = T;

    fn generate(&self) -> Result<T> {
        self.generator.generate()
    }
}

/// A generator that always produces the same value
#[derive(Debug, Clone)]
pub struct Constant<T> {
    value: T,
}

impl<T: Clone> Generator for Constant<T> {
    type Value = T;

    fn generate(&self) -> Result<T> {
        Ok(self.value.clone())
    }
}

/// A generator backed by an infallible closure
#[derive(Clone)]
pub struct FromFn<F> {
    f: F,
}

impl<F, T> Generator for FromFn<F>
where
    F: Fn() -> T,
{
    type Value = T;

    fn generate(&self) -> Result<T> {
        Ok((self.f)())
    }
}

/// A generator backed by a fallible closure
#[derive(Clone)]
pub struct TryFromFn<F> {
    f: F,
}

impl<F, T> Generator for TryFromFn<F>
where
    F: Fn() -> Result<T>,
{
    type Value = T;

    fn generate(&self) -> Result<T> {
        (self.f)()
    }
}

/// A generator that picks uniformly from a fixed collection
#[derive(Debug, Clone)]
pub struct OneOf<T> {
    source: RandomSource,
    values: Vec<T>,
}

impl<T: Clone> OneOf<T> {
    /// The candidates this generator picks from
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: Clone> Generator for OneOf<T> {
    type Value = T;

    fn generate(&self) -> Result<T> {
        let index = self.source.index(self.values.len())?;
        Ok(self.values[index].clone())
    }
}

/// A generator that picks from a fixed collection proportionally to per-candidate weights
#[derive(Debug, Clone)]
pub struct WeightedOneOf<T> {
    source: RandomSource,
    // Running totals of the weights, so a draw is a binary search.
    cumulative: Vec<u64>,
    values: Vec<T>,
}

impl<T: Clone> Generator for WeightedOneOf<T> {
    type Value = T;

    fn generate(&self) -> Result<T> {
        let total = self.cumulative.last().copied().unwrap_or(0);
        let point = self.source.range(0, total)?;
        let index = self.cumulative.partition_point(|&bound| bound <= point);
        Ok(self.values[index].clone())
    }
}

/// Create a generator that always produces `value`
pub fn constant<T: Clone>(value: T) -> Constant<T> {
    Constant { value }
}

/// Create a generator that calls `f` on every draw
pub fn from_fn<F, T>(f: F) -> FromFn<F>
where
    F: Fn() -> T,
{
    FromFn { f }
}

/// Create a generator that calls a fallible `f` on every draw
pub fn try_from_fn<F, T>(f: F) -> TryFromFn<F>
where
    F: Fn() -> Result<T>,
{
    TryFromFn { f }
}

/// Create a generator that picks one of `values` per draw
pub fn one_of<T: Clone>(
    source: &RandomSource,
    values: impl IntoIterator<Item = T>,
) -> Result<OneOf<T>> {
    let values: Vec<T> = values.into_iter().collect();
    if values.is_empty() {
        return Err(GenerateError::EmptyCollection);
    }
    Ok(OneOf {
        source: source.clone(),
        values,
    })
}

/// Create a generator that picks one of `candidates` per draw, weighted by the paired `u32`
///
/// Zero-weight candidates are never picked; at least one weight must be positive.
pub fn weighted_one_of<T: Clone>(
    source: &RandomSource,
    candidates: impl IntoIterator<Item = (u32, T)>,
) -> Result<WeightedOneOf<T>> {
    let mut cumulative = Vec::new();
    let mut values = Vec::new();
    let mut total = 0u64;

    for (weight, value) in candidates {
        if weight == 0 {
            continue;
        }
        total += u64::from(weight);
        cumulative.push(total);
        values.push(value);
    }

    if values.is_empty() {
        return Err(GenerateError::EmptyCollection);
    }
    Ok(WeightedOneOf {
        source: source.clone(),
        cumulative,
        values,
    })
}
