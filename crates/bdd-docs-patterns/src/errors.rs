//! Errors raised while compiling step patterns.

use thiserror::Error;

/// Errors surfaced while converting step patterns into regular expressions.
///
/// Positions are zero-based byte offsets into the original pattern.
///
/// # Examples
/// ```
/// use bdd_docs_patterns::{PatternError, build_regex_from_pattern};
///
/// let err = build_regex_from_pattern("total}").unwrap_err();
/// assert!(matches!(err, PatternError::UnmatchedClosingBrace { position: 5 }));
/// ```
#[derive(Debug, Error)]
pub enum PatternError {
    /// A placeholder name was followed by something other than `:` or `}`,
    /// or its type hint was empty or malformed.
    #[error("invalid placeholder `{name}` at byte {position}")]
    InvalidPlaceholder {
        /// Placeholder name parsed so far.
        name: String,
        /// Offset of the opening brace.
        position: usize,
    },
    /// The pattern ended before a placeholder was closed.
    #[error("missing closing '}}' for placeholder `{name}` at byte {position}")]
    UnclosedPlaceholder {
        /// Placeholder name parsed so far.
        name: String,
        /// Offset of the opening brace.
        position: usize,
    },
    /// A closing brace appeared without a matching stray opening brace.
    #[error("unmatched closing brace '}}' at byte {position}")]
    UnmatchedClosingBrace {
        /// Offset of the closing brace.
        position: usize,
    },
    /// Stray opening braces remained open at the end of the pattern.
    #[error("unbalanced braces in step pattern")]
    UnbalancedBraces,
    /// The generated regular expression was rejected by the `regex` crate.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_placeholder_errors_with_name_and_offset() {
        let err = PatternError::InvalidPlaceholder {
            name: "count".into(),
            position: 4,
        };
        assert_eq!(err.to_string(), "invalid placeholder `count` at byte 4");
    }

    #[test]
    fn formats_unclosed_placeholder_with_literal_brace() {
        let err = PatternError::UnclosedPlaceholder {
            name: "value".into(),
            position: 0,
        };
        assert_eq!(
            err.to_string(),
            "missing closing '}' for placeholder `value` at byte 0"
        );
    }

    #[test]
    fn forwards_regex_error_display() {
        let err = PatternError::Regex(regex::Error::Syntax("bad".into()));
        assert_eq!(
            err.to_string(),
            regex::Error::Syntax("bad".into()).to_string()
        );
    }
}
