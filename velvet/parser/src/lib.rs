//! The velvet front-end: lexer, macro expander and parser
//!
//! [`parse`] runs the whole pipeline on a single file:
//! The raw text is macro expanded, the expanded text is parsed into an [`Ast`](ast::Ast),
//! and the inline blocks of the raw text are attached to the result.

use tracing::debug;
use velvet_error::ParseResult;

pub mod ast;
pub mod ast_visitor;
pub mod error;
mod inline;
pub mod lexer;
pub mod macro_expand;
pub mod parser;
pub mod token;

pub use inline::extract_inline;
pub use lexer::lex;
pub use macro_expand::{
    collect_macros, expand_source, MacroDefinition, MacroExpander, MacroTable, TextualExpander,
    MACRO_PLACEHOLDER,
};

use ast::Ast;

/// Parses a single file with a fresh macro table
pub fn parse(input: &str) -> ParseResult<Ast> {
    parse_with_macros(input, &mut MacroTable::default(), &TextualExpander)
}

/// Parses a single file.
///
/// The macros declared in `input` are added to `table`.
/// Error positions of syntax errors refer to the expanded text.
pub fn parse_with_macros(
    input: &str,
    table: &mut MacroTable,
    expander: &dyn MacroExpander,
) -> ParseResult<Ast> {
    let expanded = expand_source(input, table, expander)?;
    let mut ast = parse_expanded(&expanded)?;
    ast.inline = extract_inline(input)?;
    Ok(ast)
}

/// Parses text which was already macro expanded.
///
/// No inline blocks are extracted, see [`extract_inline`].
pub fn parse_expanded(expanded: &str) -> ParseResult<Ast> {
    let ast = parser::parse(expanded)?;
    debug!(nodes = ast.nodes.len(), "parsed expanded source");
    Ok(ast)
}
