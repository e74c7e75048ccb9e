//! Email normalization and shape validation.
//!
//! # Invariants
//! - Every lookup or comparison uses the normalized form (trimmed, lowercase).
//! - Validation runs on the normalized form, so surrounding whitespace and
//!   letter case never cause a rejection on their own.

use once_cell::sync::Lazy;
use regex::Regex;

// Dot-atom local part (RFC 5322 atext) and dot-separated host labels. A
// single-label host such as `localhost` is accepted.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[a-z0-9!#$%&'*+/=?^_`{|}~\-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~\-]+)*",
        r"@[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?)*$",
    ))
    .expect("valid email regex")
});

/// Trims surrounding whitespace and lower-cases the address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns whether a normalized address is non-empty and `local@domain` shaped.
pub fn is_valid_email(normalized: &str) -> bool {
    !normalized.is_empty() && EMAIL_RE.is_match(normalized)
}

/// Normalizes then validates; `None` means the address is unusable.
pub fn parse_email(email: &str) -> Option<String> {
    let normalized = normalize_email(email);
    is_valid_email(&normalized).then_some(normalized)
}
