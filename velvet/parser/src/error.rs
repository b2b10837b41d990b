//! Helpers for building the parse errors of this crate

use std::fmt;

use velvet_error::ParseError;

use crate::token::{Token, TokenKind};

/// Something the parser expected at a given position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedItem {
    TokenKind(TokenKind),
    Statement,
    Value,
    Pattern,
}

impl From<TokenKind> for ExpectedItem {
    fn from(kind: TokenKind) -> Self {
        Self::TokenKind(kind)
    }
}

impl fmt::Display for ExpectedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedItem::TokenKind(kind) => write!(f, "{kind}"),
            ExpectedItem::Statement => f.write_str("Statement"),
            ExpectedItem::Value => f.write_str("Value"),
            ExpectedItem::Pattern => f.write_str("Pattern"),
        }
    }
}

/// Creates a syntax error for `got`, which is not any of `expected`
pub(crate) fn unexpected_token<I>(got: Token, expected: I) -> ParseError
where
    I: IntoIterator,
    I::Item: Into<ExpectedItem>,
{
    ParseError::SyntaxError {
        span: got.span,
        expected: expected
            .into_iter()
            .map(|item| item.into().to_string())
            .collect(),
        actual: got.kind.to_string(),
    }
}
