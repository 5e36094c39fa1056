//! Exceptions raised by API misuse.
//!
//! [WebIDL § 2.8.1 DOMException](https://webidl.spec.whatwg.org/#idl-DOMException)
//!
//! Malformed stylesheet text is never an error: it is dropped during parsing.
//! These variants are only returned by object-model calls whose arguments
//! cannot be honored.

use thiserror::Error;

/// [WebIDL § 2.8.1 Error names](https://webidl.spec.whatwg.org/#idl-DOMException-error-names)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomException {
    /// "IndexSizeError: The index is not in the allowed range."
    #[error("IndexSizeError: index {index} is out of range for a list of length {length}")]
    IndexSize {
        /// The index that was requested.
        index: usize,
        /// The length of the list at the time of the call.
        length: usize,
    },

    /// "SyntaxError: The string did not match the expected pattern."
    #[error("SyntaxError: {0}")]
    Syntax(String),
}

impl DomException {
    /// The WebIDL error name, e.g. `"IndexSizeError"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IndexSize { .. } => "IndexSizeError",
            Self::Syntax(_) => "SyntaxError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_size_message() {
        let err = DomException::IndexSize { index: 4, length: 2 };
        assert_eq!(err.name(), "IndexSizeError");
        assert_eq!(
            err.to_string(),
            "IndexSizeError: index 4 is out of range for a list of length 2"
        );
    }

    #[test]
    fn test_syntax_message() {
        let err = DomException::Syntax("failed to parse rule 'a {'".to_string());
        assert_eq!(err.name(), "SyntaxError");
        assert!(err.to_string().starts_with("SyntaxError: "));
    }
}
