//! Request-value validation helpers.
//!
//! [`Validator`] bundles the checks adapters run on incoming values before
//! handing them to the marshaler: emptiness, email and mobile formats,
//! arbitrary patterns and byte prefixes. Compiled patterns are cached for
//! the life of the validator, so repeated checks against the same pattern
//! text compile it once.

mod emptiness;

pub use emptiness::{is_empty_iter, Emptiness};

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// Email addresses: dotted or hyphenated ASCII word runs on both sides of
/// `@`.
pub const EMAIL_PATTERN: &str =
    r"^(?:[A-Za-z0-9_]+\.?-?)*[A-Za-z0-9_]+@(?:[A-Za-z0-9_]+\.?-?)*[A-Za-z0-9_]+$";

/// Mobile numbers: eleven ASCII digits with a leading `1`.
pub const MOBILE_PATTERN: &str = r"^1[0-9]{10}$";

/// Pattern cache entry. `None` records a pattern that failed to compile so
/// it is not recompiled on every call.
type Compiled = Option<Arc<Regex>>;

#[derive(Debug, Default)]
pub struct Validator {
    patterns: RwLock<HashMap<String, Compiled>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True for `None`, whitespace-only strings and empty collections.
    pub fn is_empty<T: Emptiness + ?Sized>(&self, value: &T) -> bool {
        value.is_blank()
    }

    pub fn is_email(&self, email: &str) -> bool {
        self.is_match_regex(EMAIL_PATTERN, email)
    }

    pub fn is_mobile(&self, mobile: &str) -> bool {
        self.is_match_regex(MOBILE_PATTERN, mobile)
    }

    /// Whether `pattern` matches the whole of `value`.
    ///
    /// The pattern is anchored at both ends regardless of how it is written.
    /// A pattern that does not compile on its own never matches, even when
    /// the anchored form would.
    pub fn is_match_regex(&self, pattern: &str, value: &str) -> bool {
        self.pattern(pattern)
            .is_some_and(|regex| regex.is_match(value))
    }

    /// Byte-wise prefix test. Empty input or an empty prefix never matches.
    pub fn starts_with(&self, bytes: &[u8], prefix: &[u8]) -> bool {
        if bytes.is_empty() || prefix.is_empty() || bytes.len() < prefix.len() {
            return false;
        }
        bytes[..prefix.len()] == *prefix
    }

    /// Number of distinct pattern texts seen so far, including invalid ones.
    pub fn cached_patterns(&self) -> usize {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn pattern(&self, pattern: &str) -> Compiled {
        {
            let patterns = self.patterns.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(compiled) = patterns.get(pattern) {
                return compiled.clone();
            }
        }

        let compiled = match compile_anchored(pattern) {
            Ok(regex) => {
                debug!(pattern, "Compiled validation pattern");
                Some(Arc::new(regex))
            }
            Err(e) => {
                warn!(pattern, error = %e, "Invalid validation pattern");
                None
            }
        };

        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        patterns
            .entry(pattern.to_string())
            .or_insert(compiled)
            .clone()
    }
}

/// Compiles `pattern` as written, then wrapped in `^(?:...)$`.
///
/// In verbose mode a trailing `#` comment would swallow the closing `)$`,
/// so a second attempt ends the comment with a newline first; verbose mode
/// ignores that newline.
fn compile_anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(pattern)?;
    Regex::new(&format!("^(?:{pattern})$"))
        .or_else(|_| Regex::new(&format!("^(?:{pattern}\n)$")))
}
