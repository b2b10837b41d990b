use std::{
    fmt::{self, Display, Formatter},
    num::ParseIntError,
};

use thiserror::Error;
use velvet_common::Span;

use crate::utils::display_expected_of_any;

/// Thrown when lexing, expanding or parsing bad input
///
/// Contains the location in the source where the error occurred.
/// Every error aborts the current parse, there is no partial result.
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum ParseError {
    #[error("unrecognized character at position {}", .span.start)]
    UnrecognizedCharacter { span: Span },
    #[error(
        "expected {}, got {actual} at position {}",
        display_expected_of_any(.expected),
        .span.start
    )]
    SyntaxError {
        /// The span of the offending token
        span: Span,
        /// Token kinds or items which were expected instead
        expected: Vec<String>,
        /// The kind of the token that was found
        actual: String,
    },
    #[error("type `{base}` takes {expected} parameter(s), but {got} were given")]
    UnknownTypeArity {
        span: Span,
        base: String,
        expected: Arity,
        got: usize,
    },
    #[error("no macro named `{name}` was declared")]
    MacroNotFound { span: Span, name: String },
    #[error("invalid int literal: {error}")]
    InvalidIntLiteral { span: Span, error: ParseIntError },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnrecognizedCharacter { span }
            | ParseError::SyntaxError { span, .. }
            | ParseError::UnknownTypeArity { span, .. }
            | ParseError::MacroNotFound { span, .. }
            | ParseError::InvalidIntLiteral { span, .. } => *span,
        }
    }

    /// The byte offset at which this error occurred
    pub fn position(&self) -> usize {
        self.span().start
    }

    pub(crate) fn help(&self) -> Option<String> {
        match self {
            ParseError::UnrecognizedCharacter { .. } => {
                Some("This character is not part of the velvet syntax".to_string())
            }
            ParseError::MacroNotFound { name, .. } => Some(format!(
                "Declare the macro with `!macro {name} {{ ... }};` or call `{name}(...)` as a function"
            )),
            ParseError::SyntaxError { .. }
            | ParseError::UnknownTypeArity { .. }
            | ParseError::InvalidIntLiteral { .. } => None,
        }
    }
}

/// The number of generic parameters a type expects
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use velvet_common::Span;

    use super::{Arity, ParseError};

    #[test]
    fn syntax_error_message() {
        let error = ParseError::SyntaxError {
            span: Span::new(4, 1),
            expected: vec!["Semicolon".to_string()],
            actual: "BraceClose".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "expected Semicolon, got BraceClose at position 4"
        );
        assert_eq!(error.position(), 4);
    }

    #[test]
    fn arity_message() {
        let error = ParseError::UnknownTypeArity {
            span: Span::new(0, 8),
            base: "map".to_string(),
            expected: Arity::Exactly(2),
            got: 1,
        };
        assert_eq!(
            error.to_string(),
            "type `map` takes 2 parameter(s), but 1 were given"
        );
    }

    #[test]
    fn arity_accepts() {
        assert!(Arity::Exactly(1).accepts(1));
        assert!(!Arity::Exactly(1).accepts(2));
        assert!(Arity::AtLeast(1).accepts(3));
        assert!(!Arity::AtLeast(1).accepts(0));
    }
}
