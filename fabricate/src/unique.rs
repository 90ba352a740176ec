//! Collision-free value issuance.
//!
//! A [`UniqueValueBuilder`] hands out values that never repeat for the same identity key. The
//! generic [`UniqueBuilder`] owns the per-key bookkeeping (issued set plus a strategy cursor)
//! and delegates candidate production to an [`ExhaustionStrategy`], which decides what happens
//! once the obvious candidates for a key run out: escalate to new formats, or fail with
//! [`GenerateError::CapacityExhausted`].
//!
//! Builders are plain mutable state with no locking. Share one between pipelines through
//! [`SharedBuilder`] and keep all of them on one thread.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::error::{GenerateError, Result};
use crate::generator::Generator;
use crate::rng::RandomSource;

/// Stateful issuer of values that are unique per identity key
pub trait UniqueValueBuilder {
    /// Caller-supplied arguments; the identity key is derived from them
    type Request: ?Sized;
    /// The issued value
    type Value;

    /// Issue a value not previously issued for the request's identity key
    fn issue(&mut self, request: &Self::Request) -> Result<Self::Value>;

    /// Total number of values issued so far, across all keys
    fn issued_count(&self) -> usize;
}

/// Value-kind-specific rules for producing candidates within one identity key's space
///
/// `next_candidate` must make progress: repeated calls for a key either yield a value that has
/// not been issued for that key yet, or return an error.
pub trait ExhaustionStrategy {
    /// Caller-supplied arguments
    type Request: ?Sized;
    /// Scope of one exhaustion space
    type Key: Eq + Hash + Clone + Debug;
    /// The issued value
    type Value: Eq + Hash + Clone;
    /// Per-key strategy state (tier, suffix, remaining pool)
    type Cursor;

    /// Short human-readable name of the value kind, used in errors and logs
    fn kind(&self) -> &'static str;

    /// Validate the request and derive its identity key
    fn identity_key(&self, request: &Self::Request) -> Result<Self::Key>;

    /// Fresh cursor for a key seen for the first time
    fn new_cursor(&self, key: &Self::Key) -> Self::Cursor;

    /// Produce the next candidate for a key, advancing its cursor
    fn next_candidate(
        &self,
        key: &Self::Key,
        request: &Self::Request,
        cursor: &mut Self::Cursor,
        source: &RandomSource,
    ) -> Result<Self::Value>;
}

/// Issued values and strategy cursor for one identity key
#[derive(Debug, Clone)]
pub struct IssuedSpace<V, C> {
    issued: HashSet<V>,
    cursor: C,
}

impl<V: Eq + Hash, C> IssuedSpace<V, C> {
    fn new(cursor: C) -> Self {
        Self {
            issued: HashSet::new(),
            cursor,
        }
    }

    /// Whether `value` has been issued in this space
    pub fn contains(&self, value: &V) -> bool {
        self.issued.contains(value)
    }

    /// Number of values issued in this space
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    /// Whether nothing has been issued in this space yet
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Current strategy cursor
    pub fn cursor(&self) -> &C {
        &self.cursor
    }
}

/// Generic unique builder driven by an exhaustion strategy
pub struct UniqueBuilder<S: ExhaustionStrategy> {
    strategy: S,
    source: RandomSource,
    spaces: HashMap<S::Key, IssuedSpace<S::Value, S::Cursor>>,
    issued: usize,
}

impl<S: ExhaustionStrategy> UniqueBuilder<S> {
    /// Create a builder drawing any randomness it needs from `source`
    pub fn new(strategy: S, source: &RandomSource) -> Self {
        Self {
            strategy,
            source: source.clone(),
            spaces: HashMap::new(),
            issued: 0,
        }
    }

    /// The strategy driving this builder
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The random source this builder draws from
    pub fn source(&self) -> &RandomSource {
        &self.source
    }

    /// Bookkeeping for one identity key, if anything was issued for it
    pub fn space(&self, key: &S::Key) -> Option<&IssuedSpace<S::Value, S::Cursor>> {
        self.spaces.get(key)
    }

    /// Number of values issued for one identity key
    pub fn issued_count_for(&self, key: &S::Key) -> usize {
        self.spaces.get(key).map_or(0, IssuedSpace::len)
    }

    /// Number of distinct identity keys seen so far
    pub fn key_count(&self) -> usize {
        self.spaces.len()
    }
}

impl<S: ExhaustionStrategy> UniqueValueBuilder for UniqueBuilder<S> {
    type Request = S::Request;
    type Value = S::Value;

    fn issue(&mut self, request: &S::Request) -> Result<S::Value> {
        let key = self.strategy.identity_key(request)?;
        let strategy = &self.strategy;

        let space = match self.spaces.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let cursor = strategy.new_cursor(entry.key());
                entry.insert(IssuedSpace::new(cursor))
            }
        };

        loop {
            let candidate =
                match strategy.next_candidate(&key, request, &mut space.cursor, &self.source) {
                    Ok(candidate) => candidate,
                    Err(error) => {
                        if error.is_capacity_exhausted() {
                            tracing::warn!(
                                kind = strategy.kind(),
                                key = ?key,
                                issued = space.len(),
                                "unique space exhausted"
                            );
                        }
                        return Err(error);
                    }
                };

            if space.issued.insert(candidate.clone()) {
                self.issued += 1;
                tracing::trace!(kind = strategy.kind(), key = ?key, "issued unique value");
                return Ok(candidate);
            }
            tracing::trace!(kind = strategy.kind(), key = ?key, "candidate collided, retrying");
        }
    }

    fn issued_count(&self) -> usize {
        self.issued
    }
}

/// Sampler that draws from `[0, capacity)` without replacement
///
/// Implemented as a lazily materialised Fisher-Yates shuffle: only swapped positions are
/// stored, so memory grows with the number of draws rather than with the capacity.
#[derive(Debug, Clone)]
pub struct WithoutReplacement {
    capacity: u64,
    remaining: u64,
    swaps: HashMap<u64, u64>,
}

impl WithoutReplacement {
    /// Create a sampler over `[0, capacity)`
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            remaining: capacity,
            swaps: HashMap::new(),
        }
    }

    /// Size of the whole space
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of values not drawn yet
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Draw a value not drawn before, or `None` once the space is spent
    pub fn draw(&mut self, source: &RandomSource) -> Result<Option<u64>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let position = source.range(0, self.remaining)?;
        let last = self.remaining - 1;

        let value = self.swaps.get(&position).copied().unwrap_or(position);
        let tail = self.swaps.remove(&last).unwrap_or(last);
        if position != last {
            self.swaps.insert(position, tail);
        }
        self.remaining -= 1;
        Ok(Some(value))
    }
}

/// A builder shared between several pipelines
pub type SharedBuilder<B> = Rc<RefCell<B>>;

/// Wrap a builder so several generators can issue from it
pub fn shared<B: UniqueValueBuilder>(builder: B) -> SharedBuilder<B> {
    Rc::new(RefCell::new(builder))
}

/// Leaf generator that issues from a shared builder with a fixed request
pub struct UniqueGenerator<B, R> {
    builder: SharedBuilder<B>,
    request: R,
}

impl<B, R> Generator for UniqueGenerator<B, R>
where
    B: UniqueValueBuilder,
    R: Borrow<B::Request>,
{
    type Value = B::Value;

    fn generate(&self) -> Result<B::Value> {
        self.builder.borrow_mut().issue(self.request.borrow())
    }
}

/// Create a generator that issues from `builder` for `request` on every draw
pub fn issuing<B, R>(builder: &SharedBuilder<B>, request: R) -> UniqueGenerator<B, R>
where
    B: UniqueValueBuilder,
    R: Borrow<B::Request>,
{
    UniqueGenerator {
        builder: Rc::clone(builder),
        request,
    }
}

/// Create a generator that issues from `builder` for every request drawn from `requests`
pub fn issuing_from<B, G>(
    builder: &SharedBuilder<B>,
    requests: G,
) -> impl Generator<Value = B::Value> + use<B, G>
where
    B: UniqueValueBuilder,
    G: Generator,
    G::Value: Borrow<B::Request>,
{
    let builder = Rc::clone(builder);
    requests.bind(move |request| issuing(&builder, request))
}

/// Capacity error helper for strategies
pub fn capacity_exhausted<K: Debug>(kind: &'static str, key: &K, capacity: u64) -> GenerateError {
    GenerateError::capacity_exhausted(kind, format!("{:?}", key), capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{constant, one_of};

    // Issues "<prefix><n>" with n drawn without replacement from a small pool.
    struct Tagged {
        pool: u64,
    }

    impl ExhaustionStrategy for Tagged {
        type Request = str;
        type Key = String;
        type Value = String;
        type Cursor = WithoutReplacement;

        fn kind(&self) -> &'static str {
            "tag"
        }

        fn identity_key(&self, request: &str) -> Result<String> {
            if request.is_empty() {
                return Err(GenerateError::invalid_argument("prefix must not be empty"));
            }
            Ok(request.to_string())
        }

        fn new_cursor(&self, _key: &String) -> WithoutReplacement {
            WithoutReplacement::new(self.pool)
        }

        fn next_candidate(
            &self,
            key: &String,
            request: &str,
            cursor: &mut WithoutReplacement,
            source: &RandomSource,
        ) -> Result<String> {
            match cursor.draw(source)? {
                Some(n) => Ok(format!("{}{}", request, n)),
                None => Err(capacity_exhausted(self.kind(), key, self.pool)),
            }
        }
    }

    #[test]
    fn test_without_replacement_covers_space() {
        let source = RandomSource::seeded(1);
        let mut sampler = WithoutReplacement::new(50);

        let mut seen = HashSet::new();
        while let Some(value) = sampler.draw(&source).unwrap() {
            assert!(value < 50);
            assert!(seen.insert(value));
        }
        assert_eq!(seen.len(), 50);
        assert_eq!(sampler.remaining(), 0);
        assert_eq!(sampler.capacity(), 50);
        assert_eq!(sampler.draw(&source).unwrap(), None);
    }

    #[test]
    fn test_builder_issues_unique_values_per_key() {
        let source = RandomSource::seeded(2);
        let mut builder = UniqueBuilder::new(Tagged { pool: 5 }, &source);

        let issued: HashSet<String> = (0..5).map(|_| builder.issue("a").unwrap()).collect();
        assert_eq!(issued.len(), 5);
        assert_eq!(builder.issued_count_for(&"a".to_string()), 5);

        let error = builder.issue("a").unwrap_err();
        assert!(error.is_capacity_exhausted());

        // Other keys have their own space, and earlier issuances stay tracked.
        assert!(builder.issue("b").is_ok());
        assert_eq!(builder.issued_count(), 6);
        assert_eq!(builder.key_count(), 2);
        let space = builder.space(&"a".to_string()).unwrap();
        assert!(issued.iter().all(|value| space.contains(value)));
    }

    #[test]
    fn test_invalid_request_is_rejected_before_tracking() {
        let source = RandomSource::seeded(3);
        let mut builder = UniqueBuilder::new(Tagged { pool: 5 }, &source);

        assert!(matches!(
            builder.issue(""),
            Err(GenerateError::InvalidArgument { .. })
        ));
        assert_eq!(builder.key_count(), 0);
    }

    #[test]
    fn test_unique_generator_in_pipeline() {
        let source = RandomSource::seeded(4);
        let builder = shared(UniqueBuilder::new(Tagged { pool: 3 }, &source));

        let generator = issuing(&builder, "x".to_string()).map(|s| s.to_uppercase());
        let values = generator.sample(3).unwrap();
        assert!(values.iter().all(|v| v.starts_with('X')));
        assert!(generator.generate().unwrap_err().is_capacity_exhausted());
        assert_eq!(RefCell::borrow(&builder).issued_count(), 3);
    }

    #[test]
    fn test_issuing_from_request_generator() {
        let source = RandomSource::seeded(5);
        let builder = shared(UniqueBuilder::new(Tagged { pool: 10 }, &source));
        let prefixes = one_of(&source, vec!["p".to_string(), "q".to_string()]).unwrap();

        let generator = issuing_from(&builder, prefixes);
        let values: HashSet<String> = generator.sample(10).unwrap().into_iter().collect();
        assert_eq!(values.len(), 10);

        let constant_requests = issuing_from(&builder, constant("r".to_string()));
        assert!(constant_requests.generate().unwrap().starts_with('r'));
    }
}
