//! Identifier model and normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors produced while validating or normalizing an identifier
#[derive(Debug, Error)]
pub enum IdentifierError {
    /// Input was empty or whitespace only
    #[error("identifier is empty")]
    Empty,

    /// XRI identifiers (xri:// scheme or a GCS prefix character) are not supported
    #[error("XRI identifiers are not supported: {0}")]
    XriUnsupported(String),

    /// Input could not be parsed as a URL
    #[error("identifier is not a valid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },
}

/// Role an identifier plays during discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// What the end user typed in
    Supplied,
    /// The identifier the provider ultimately vouches for
    Claimed,
    /// The identifier the OP uses internally (delegation)
    OpLocal,
}

/// A URL identifier tagged with the role it plays in discovery.
///
/// Equality compares the string value only; the role is bookkeeping and two
/// identifiers with the same value are the same identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    value: String,
    role: Role,
}

impl Identifier {
    pub fn new(value: impl Into<String>, role: Role) -> Self {
        Self {
            value: value.into(),
            role,
        }
    }

    /// A user-supplied identifier
    pub fn supplied(value: impl Into<String>) -> Self {
        Self::new(value, Role::Supplied)
    }

    /// A claimed identifier
    pub fn claimed(value: impl Into<String>) -> Self {
        Self::new(value, Role::Claimed)
    }

    /// An OP-local identifier
    pub fn op_local(value: impl Into<String>) -> Self {
        Self::new(value, Role::OpLocal)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Identifier {}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Normalize a user-supplied identifier into an absolute URL usable for
/// discovery.
///
/// - rejects empty input and XRI forms (explicitly unsupported),
/// - prepends `http://` when no scheme is present,
/// - lowercases scheme and host, ensures a path, and strips any fragment.
pub fn normalize(input: &str) -> Result<String, IdentifierError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdentifierError::Empty);
    }
    if is_xri(trimmed) {
        return Err(IdentifierError::XriUnsupported(trimmed.to_string()));
    }

    let with_scheme = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| IdentifierError::InvalidUrl {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    url.set_fragment(None);

    Ok(url.to_string())
}

/// True only when the input starts with a well-formed RFC 3986 scheme
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )` followed by `://`); a
/// `://` buried in a path or query does not count.
fn has_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// XRI forms: explicit xri:// scheme or a leading global context symbol.
fn is_xri(s: &str) -> bool {
    s.to_ascii_lowercase().starts_with("xri://")
        || matches!(s.chars().next(), Some('=' | '@' | '+' | '$' | '!'))
}
