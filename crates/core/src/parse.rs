//! Parsing helpers for the closed enumerations stored as text.

use thiserror::Error;

/// A text value that does not name any variant of the target enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Name of the enumeration being parsed.
    pub kind: &'static str,

    /// The rejected input.
    pub value: String,
}

impl UnknownVariant {
    /// Creates a new error for the given enumeration and input.
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lower-cases and trims `value`, folding `-` and spaces into `_`.
pub(crate) fn normalise_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
