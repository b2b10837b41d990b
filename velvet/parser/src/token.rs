use core::fmt;

use velvet_common::Span;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let start = self.span.start();
        let end = self.span.end();
        write!(f, "{}@{start}..{end}", self.kind)
    }
}

/// Every kind of token
///
/// Literal tokens always win over the identifier regex, and the longest match wins
/// between literal tokens, so `match` is a keyword, `matches` an identifier,
/// `!macro` is never split into `!` and `macro` and `=>` is never split into `=` and `>`.
#[derive(logos::Logos, Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    /// Opens a dependency tag or a generic parameter list, or compares
    #[token("<")]
    AngleOpen,

    /// Closes a dependency tag or a generic parameter list, or compares
    #[token(">")]
    AngleClose,

    #[token("=")]
    Assign,

    /// Variable sigil
    #[token("~")]
    Tilde,

    /// Function sigil
    #[token("!")]
    Bang,

    /// Conditional sigil
    #[token("?")]
    Question,

    /// Loop sigil, or the multiplication operator
    #[token("*")]
    Star,

    /// Prefixes the return expression of a function
    #[token("^")]
    Caret,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("(")]
    ParenthesisOpen,

    #[token(")")]
    ParenthesisClose,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token("..")]
    DotDot,

    #[token("=>")]
    FatArrow,

    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    Decorator,

    /// A complete inline block: `#lang { code }`.
    /// The block ends at the first closing brace.
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_]*[ \t\r\n]*\{[^}]*\}")]
    InlineBlock,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"\d+")]
    Int,

    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[token("!macro")]
    KwMacro,

    #[token("match")]
    KwMatch,

    #[token("let")]
    KwLet,

    #[token("async")]
    KwAsync,

    #[token("await")]
    KwAwait,

    #[token("import")]
    KwImport,

    #[token("+")]
    OpPlus,

    #[token("-")]
    OpMinus,

    #[token("/")]
    OpDivide,

    #[token("==")]
    OpEqual,

    #[token("!=")]
    OpNotEqual,

    EndOfInput,
}

impl fmt::Display for TokenKind {
    #[allow(clippy::use_debug)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl TokenKind {
    /// Returns the binary operator this token stands for in operator position.
    ///
    /// `<=` and `>=` are two tokens, the parser joins them.
    pub fn infix_operator(self) -> Option<BinaryOperator> {
        let operator = match self {
            TokenKind::OpPlus => BinaryOperator::Plus,
            TokenKind::OpMinus => BinaryOperator::Minus,
            TokenKind::Star => BinaryOperator::Times,
            TokenKind::OpDivide => BinaryOperator::Divide,
            TokenKind::OpEqual => BinaryOperator::Equal,
            TokenKind::OpNotEqual => BinaryOperator::NotEqual,
            TokenKind::AngleOpen => BinaryOperator::Less,
            TokenKind::AngleClose => BinaryOperator::Greater,
            _ => return None,
        };

        Some(operator)
    }

    /// Whether an expression statement may start with this token
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Int
                | TokenKind::String
                | TokenKind::ParenthesisOpen
                | TokenKind::BracketOpen
                | TokenKind::KwAwait
                | TokenKind::OpMinus
        )
    }
}

/// Any operator that can be used between two values
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Plus,
    Minus,
    Times,
    Divide,
}

impl BinaryOperator {
    /// Returns the precedence of this [`BinaryOperator`].
    /// The higher the precedence the tighter the operator binds.
    /// Every operator is left-associative.
    #[allow(clippy::match_same_arms)]
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::Less
            | BinaryOperator::LessOrEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterOrEqual => 1,
            BinaryOperator::Plus => 2,
            BinaryOperator::Minus => 2,
            BinaryOperator::Times => 3,
            BinaryOperator::Divide => 3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessOrEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterOrEqual => ">=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Returns the index of the token that closes the bracket opened at `open`.
///
/// Only brackets of the same kind are counted.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let open_kind = tokens.get(open)?.kind;
    let close_kind = match open_kind {
        TokenKind::BraceOpen => TokenKind::BraceClose,
        TokenKind::BracketOpen => TokenKind::BracketClose,
        TokenKind::ParenthesisOpen => TokenKind::ParenthesisClose,
        _ => return None,
    };

    let mut depth = 0_usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if token.kind == open_kind {
            depth += 1;
        } else if token.kind == close_kind {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}
