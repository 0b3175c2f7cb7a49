//! Extraction error taxonomy.
//!
//! Data problems (bad source, too deep, too slow) drop the file. Invariant
//! violations mean the tree builder itself is broken; they abort the file as
//! well but are reported loudly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("invalid source: {0}")]
    Value(String),

    #[error("maximum nesting depth of {0} exceeded")]
    RecursionLimit(usize),

    #[error("extraction deadline expired")]
    Timeout,

    #[error("parser setup failed: {0}")]
    Parser(String),

    #[error("leaf element left on the ancestor stack")]
    LeafOnStack,

    #[error("candidate paths share no common ancestor")]
    NoCommonAncestor,

    #[error("candidate path is a prefix of another path")]
    DegeneratePath,

    #[error("vertex does not list the element on the path as a child")]
    MissingChild,
}

impl ExtractError {
    /// True for problems with the input rather than with the builder.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::Io(_)
                | ExtractError::Syntax { .. }
                | ExtractError::Value(_)
                | ExtractError::RecursionLimit(_)
                | ExtractError::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violations_are_not_recoverable() {
        assert!(!ExtractError::LeafOnStack.is_recoverable());
        assert!(!ExtractError::NoCommonAncestor.is_recoverable());
        assert!(!ExtractError::DegeneratePath.is_recoverable());
        assert!(!ExtractError::MissingChild.is_recoverable());
    }

    #[test]
    fn test_data_errors_are_recoverable() {
        assert!(ExtractError::Syntax { line: 1, column: 0 }.is_recoverable());
        assert!(ExtractError::Value("nul".into()).is_recoverable());
        assert!(ExtractError::RecursionLimit(10).is_recoverable());
        assert!(ExtractError::Timeout.is_recoverable());
    }
}
