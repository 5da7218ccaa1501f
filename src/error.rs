//! Error types shared by the library and the command-line tools.

use thiserror::Error;

use crate::entity::EntityKind;

/// A malformed numeric range such as `01-0a` or `3-1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("malformed range string: {0}")]
    Malformed(String),

    #[error("range bounds differ in width: {0}")]
    MixedWidth(String),

    #[error("descending range: {0}")]
    Descending(String),
}

#[derive(Debug, Error)]
pub enum Error {
    /// A tag-file line that does not follow the grammar.
    #[error("line {line}: {reason}: {text}")]
    Format {
        line: usize,
        text: String,
        reason: String,
    },

    #[error(transparent)]
    Range(#[from] RangeError),

    /// An entity of the wrong kind reached code that dispatches on kind.
    #[error("expected {expected} entity, found {found}")]
    UnsupportedKind {
        expected: &'static str,
        found: EntityKind,
    },

    #[error("unsupported file type: {0}")]
    FileType(String),

    #[error("audio tag error: {0}")]
    Audio(#[from] lofty::error::LoftyError),

    #[error("metadata lookup failed: {0}")]
    Lookup(String),

    #[error("invalid path expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn format(line: usize, text: &str, reason: impl Into<String>) -> Self {
        Error::Format {
            line,
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_names_the_line() {
        let err = Error::format(7, "t 01-0a Title=X", "malformed disc/track line");
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("t 01-0a Title=X"));
    }

    #[test]
    fn test_range_error_converts() {
        let err: Error = RangeError::Descending("3-1".into()).into();
        assert!(matches!(err, Error::Range(RangeError::Descending(_))));
    }
}
