//! Extraction of inline foreign code blocks
//!
//! The blocks are taken from the text before macro expansion,
//! so that their content is handed on exactly as it was written.

use tracing::debug;
use velvet_error::ParseResult;

use crate::{
    ast::Inline,
    lexer::{lex, token_text},
    token::{Token, TokenKind},
};

/// Returns every `#lang { code }` block of `raw`, in the order of appearance
pub fn extract_inline(raw: &str) -> ParseResult<Vec<Inline>> {
    let blocks: Vec<Inline> = lex(raw)?
        .iter()
        .filter(|token| token.kind == TokenKind::InlineBlock)
        .map(|token| split_inline_block(raw, token))
        .collect();

    debug!(count = blocks.len(), "extracted inline blocks");
    Ok(blocks)
}

/// Splits an [`TokenKind::InlineBlock`] token into its language tag and its code
pub(crate) fn split_inline_block(input: &str, token: &Token) -> Inline {
    let text = token_text(input, token);

    // The lexer guarantees the shape `#tag <whitespace> { code }`
    let tag_end = text
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(text.len());
    let code_start = text.find('{').map_or(text.len(), |index| index + 1);
    let code_end = text.len().saturating_sub(1).max(code_start);

    Inline {
        span: token.span,
        lang: text[1..tag_end].into(),
        code: text[code_start..code_end].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use velvet_common::Span;

    use super::extract_inline;
    use crate::ast::Inline;

    #[test]
    fn blocks_in_order() {
        let raw = "#python { print(\"Hi\") }\n~x = 1;\n#shell {echo hi};";
        let blocks = extract_inline(raw).unwrap();
        assert_eq!(
            blocks,
            vec![
                Inline {
                    span: Span::new(0, 23),
                    lang: "python".into(),
                    code: " print(\"Hi\") ".to_string(),
                },
                Inline {
                    span: Span::new(32, 16),
                    lang: "shell".into(),
                    code: "echo hi".to_string(),
                },
            ]
        );
    }

    #[test]
    fn code_is_not_tokenized() {
        let blocks = extract_inline("#c { int $x = 'a'; }").unwrap();
        assert_eq!(blocks[0].code, " int $x = 'a'; ");
    }

    #[test]
    fn block_ends_at_first_closing_brace() {
        let blocks = extract_inline("#rust { fn f() { 1 } }").unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, " fn f() { 1 ");
    }

    #[test]
    fn no_blocks() {
        assert!(extract_inline("~x = 1;").unwrap().is_empty());
    }
}
