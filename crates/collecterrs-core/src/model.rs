//! The data model shared by every analysis stage.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `[ProviderName].MethodName`, the unresolved cross-service placeholder
/// shape.
fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([a-zA-Z0-9]+)\]\.([a-zA-Z0-9]+)$").expect("static pattern"))
}

/// A short symbolic identifier derived from a recognized error-value name,
/// optionally carrying a parenthesised detail schema. Equality is textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub String);

impl ErrorCode {
    pub fn new(code: impl Into<String>) -> Self {
        ErrorCode(code.into())
    }

    /// The code with any ` (k1:T,...)` detail suffix stripped.
    pub fn bare(&self) -> &str {
        self.0.split(' ').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unresolved cross-service dependency: `[providerName].methodName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderCall {
    pub provider: String,
    pub method: String,
}

impl ProviderCall {
    pub fn new(provider: impl Into<String>, method: impl Into<String>) -> Self {
        ProviderCall { provider: provider.into(), method: method.into() }
    }
}

impl fmt::Display for ProviderCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}].{}", self.provider, self.method)
    }
}

/// `ErrorCode | ProviderCall`. The per-function analysis emits an ordered,
/// deduplicated sequence of these.
///
/// Serializes as its rendered string (not a tagged enum), since the report
/// format is a flat `[error_code, ...]` JSON array with no
/// way to distinguish a resolved code from a still-unresolved provider
/// placeholder except by shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExitError {
    Code(ErrorCode),
    Provider(ProviderCall),
}

impl Serialize for ExitError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

impl<'de> Deserialize<'de> for ExitError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ExitError::parse(&raw))
    }
}

impl ExitError {
    pub fn code(code: impl Into<String>) -> Self {
        ExitError::Code(ErrorCode::new(code))
    }

    pub fn provider(provider: impl Into<String>, method: impl Into<String>) -> Self {
        ExitError::Provider(ProviderCall::new(provider, method))
    }

    /// String rendering used as the sole key/value shape once the report is
    /// assembled; also how linker input/output is compared against the
    /// placeholder regex.
    pub fn render(&self) -> String {
        match self {
            ExitError::Code(c) => c.0.clone(),
            ExitError::Provider(p) => p.to_string(),
        }
    }

    /// Parses a raw report-value string back into structured form by
    /// matching it against the `[Provider].Method` placeholder pattern;
    /// anything that doesn't match is taken as a plain code.
    pub fn parse(raw: &str) -> Self {
        match placeholder_pattern().captures(raw) {
            Some(caps) => ExitError::provider(caps[1].to_string(), caps[2].to_string()),
            None => ExitError::code(raw),
        }
    }

    /// `true` if this renders as an unresolved `[Provider].Method`
    /// placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ExitError::Provider(_))
    }
}

/// Append `value` to `list` unless an equal element is already present,
/// preserving first-seen order.
pub fn dedup_push<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// A mapping from function identifier to its exit-error sequence. Storage
/// functions are keyed with the synthetic prefix `[Storage].`.
pub type PackageErrors = HashMap<String, Vec<ExitError>>;

/// Per function, the set of error codes observed handled locally.
pub type HandledSet = HashSet<String>;

pub const STORAGE_PREFIX: &str = "[Storage]";

pub fn storage_key(fn_name: &str) -> String {
    format!("{STORAGE_PREFIX}.{fn_name}")
}
