//! Error types for the lazyseq crate.

use thiserror::Error;

/// Errors that can occur when building or evaluating sequences.
///
/// Construction-time problems (bad parameters, unsupported sources, bad
/// patterns) are returned directly by the operator that detected them.
/// Problems found while a sequence is being pulled are yielded as `Err` items
/// and surface from the terminal operation that drives the enumeration.
#[derive(Debug, Error)]
pub enum LinqError {
    /// A factory or operator parameter is out of its valid domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The value handed to `from()` cannot act as a sequence source.
    #[error("unsupported source type: {0} is not an array, sequence or sequence provider")]
    UnsupportedSourceType(&'static str),

    /// Aggregation or selection over an empty sequence with no default.
    #[error("Sequence contains no elements.")]
    NoElements,

    /// No element satisfied the predicate and no default was supplied.
    #[error("Sequence contains no matching elements.")]
    NoMatches,

    /// More than one element satisfied a `single` query.
    #[error("Sequence contains more than one matching element.")]
    ManyMatches,

    /// Keyed access to a key the sequence does not contain.
    #[error("Sequence does not contain the key.")]
    NoKey,

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// The value graph cannot be represented in the target format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LinqError {
    fn from(err: serde_json::Error) -> Self {
        LinqError::Serialization(err.to_string())
    }
}

/// Result type for lazyseq operations.
pub type Result<T> = std::result::Result<T, LinqError>;
