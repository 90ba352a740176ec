//! Unique email addresses derived from name parts
//!
//! For one set of name parts, addresses escalate deterministically:
//!
//! 1. every domain in order, parts joined with `.`
//! 2. (2+ parts) every domain again with `_`, then with `-`
//! 3. a strictly increasing numeric suffix on the local part, still cycling domains and
//!    separators
//!
//! The suffix space is unbounded, so this builder never reports exhaustion.

use fabricate::unique::UniqueBuilder;
use fabricate::{ExhaustionStrategy, GenerateError, RandomSource, Result, UniqueValueBuilder};

/// Domains used by [`EmailUniqueBuilder::with_default_domains`]
pub const DEFAULT_DOMAINS: [&str; 3] = ["example.com", "example.org", "example.net"];

/// Maximum number of name parts in one local part
pub const MAX_NAME_PARTS: usize = 7;

// Escalation order for multi-part local parts.
const SEPARATORS: [&str; 3] = [".", "_", "-"];

/// Validated, normalized name parts forming an email identity key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameParts(Vec<String>);

impl NameParts {
    /// Build name parts from plain strings
    ///
    /// Parts are trimmed and lower-cased. The first part, and the second when more than one is
    /// given, must not be blank; blank later parts are dropped.
    pub fn new<I, S>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_optional(parts.into_iter().map(Some))
    }

    /// Build name parts where any slot may be missing
    ///
    /// Every slot counts toward [`MAX_NAME_PARTS`], including blank ones that are later dropped.
    pub fn from_optional<I, S>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let slots: Vec<Option<S>> = parts.into_iter().collect();
        if slots.len() > MAX_NAME_PARTS {
            return Err(GenerateError::invalid_argument(format!(
                "at most {} name parts are supported, got {}",
                MAX_NAME_PARTS,
                slots.len()
            )));
        }

        let mut normalized = Vec::new();
        for (index, part) in slots.into_iter().enumerate() {
            let part = part
                .as_ref()
                .map(|p| p.as_ref().trim().to_lowercase())
                .unwrap_or_default();

            if part.is_empty() {
                if index < 2 {
                    return Err(GenerateError::MissingNamePart { index });
                }
                continue;
            }
            normalized.push(part);
        }

        if normalized.is_empty() {
            return Err(GenerateError::MissingNamePart { index: 0 });
        }
        Ok(Self(normalized))
    }

    /// The normalized parts
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parts
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

/// Position within one name's escalation sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailCursor {
    position: u64,
}

impl EmailCursor {
    /// Number of candidates produced so far for this name
    pub fn position(&self) -> u64 {
        self.position
    }
}

/// Escalation rules for email addresses
#[derive(Debug, Clone)]
pub struct EmailStrategy {
    domains: Vec<String>,
}

impl EmailStrategy {
    fn tiers(parts: &NameParts) -> u64 {
        if parts.len() == 1 {
            1
        } else {
            SEPARATORS.len() as u64
        }
    }
}

impl ExhaustionStrategy for EmailStrategy {
    type Request = NameParts;
    type Key = NameParts;
    type Value = String;
    type Cursor = EmailCursor;

    fn kind(&self) -> &'static str {
        "email"
    }

    fn identity_key(&self, request: &NameParts) -> Result<NameParts> {
        Ok(request.clone())
    }

    fn new_cursor(&self, _key: &NameParts) -> EmailCursor {
        EmailCursor::default()
    }

    fn next_candidate(
        &self,
        key: &NameParts,
        _request: &NameParts,
        cursor: &mut EmailCursor,
        _source: &RandomSource,
    ) -> Result<String> {
        let domains = self.domains.len() as u64;
        let tiers = Self::tiers(key);
        let position = cursor.position;
        cursor.position += 1;

        let formatted_span = tiers * domains;
        let (local, domain) = if position < formatted_span {
            let separator = SEPARATORS[(position / domains) as usize];
            (key.join(separator), position % domains)
        } else {
            let step = position - formatted_span;
            let separator = SEPARATORS[(step % tiers) as usize];
            let suffix = step + 1;
            (
                format!("{}{}", key.join(separator), suffix),
                step % domains,
            )
        };

        tracing::trace!(position, tiers, domains, "email escalation step");
        Ok(format!("{}@{}", local, self.domains[domain as usize]).to_lowercase())
    }
}

/// Issues email addresses that never repeat for the same name parts
pub struct EmailUniqueBuilder {
    inner: UniqueBuilder<EmailStrategy>,
}

impl EmailUniqueBuilder {
    /// Create a builder cycling through `domains` in order
    pub fn new<I, S>(source: &RandomSource, domains: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains: Vec<String> = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .collect();

        if domains.is_empty() {
            return Err(GenerateError::EmptyCollection);
        }
        if domains.iter().any(|d| d.is_empty() || d.contains('@')) {
            return Err(GenerateError::invalid_argument(
                "domains must be non-blank and must not contain '@'",
            ));
        }

        Ok(Self {
            inner: UniqueBuilder::new(EmailStrategy { domains }, source),
        })
    }

    /// Create a builder over [`DEFAULT_DOMAINS`]
    pub fn with_default_domains(source: &RandomSource) -> Self {
        Self {
            inner: UniqueBuilder::new(
                EmailStrategy {
                    domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
                },
                source,
            ),
        }
    }

    /// Validate `parts` and issue the next address for them
    pub fn email<S: AsRef<str>>(&mut self, parts: &[S]) -> Result<String> {
        let parts = NameParts::new(parts)?;
        self.issue(&parts)
    }

    /// The domains cycled through, in order
    pub fn domains(&self) -> &[String] {
        &self.inner.strategy().domains
    }

    /// Number of addresses issued for one set of name parts
    pub fn issued_count_for(&self, parts: &NameParts) -> usize {
        self.inner.issued_count_for(parts)
    }
}

impl UniqueValueBuilder for EmailUniqueBuilder {
    type Request = NameParts;
    type Value = String;

    fn issue(&mut self, request: &NameParts) -> Result<String> {
        self.inner.issue(request)
    }

    fn issued_count(&self) -> usize {
        self.inner.issued_count()
    }
}
