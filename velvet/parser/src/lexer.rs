//! Turns text into the token stream consumed by the parser and the macro expander

use logos::Logos;
use tracing::trace;
use velvet_common::Span;
use velvet_error::{ParseError, ParseResult};

use crate::token::{Token, TokenKind};

/// Lexes the whole input.
///
/// Whitespace and comments are dropped, every other byte must belong to a token.
/// Fails at the first character that does not start any token.
pub fn lex(input: &str) -> ParseResult<Vec<Token>> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(kind) => push_token(&mut tokens, input, Token { span, kind }),
            Err(()) => {
                let width = input[span.start..]
                    .chars()
                    .next()
                    .map_or(0, char::len_utf8);
                return Err(ParseError::UnrecognizedCharacter {
                    span: Span::new(span.start, width),
                });
            }
        }
    }

    trace!(count = tokens.len(), "lexed input");
    Ok(tokens)
}

/// Pushes a token, splitting `!macro` when it is really the start of a
/// function declaration like `!macros()`.
/// Logos has no lookahead, so the longest literal match has to be undone here.
fn push_token(tokens: &mut Vec<Token>, input: &str, token: Token) {
    if let Some(previous) = tokens.last().copied() {
        let glued = previous.kind == TokenKind::KwMacro
            && previous.span.end() == token.span.start
            && matches!(token.kind, TokenKind::Ident | TokenKind::Int);
        if glued {
            tokens.pop();
            let bang = Span::new(previous.span.start, 1);
            let ident = Span::new(bang.end(), token.span.end() - bang.end());
            debug_assert!(input[ident.as_range()].starts_with("macro"));
            tokens.push(Token {
                span: bang,
                kind: TokenKind::Bang,
            });
            tokens.push(Token {
                span: ident,
                kind: TokenKind::Ident,
            });
            return;
        }
    }
    tokens.push(token);
}

/// Returns the text of `token`
pub fn token_text<'a>(input: &'a str, token: &Token) -> &'a str {
    &input[token.span.as_range()]
}

/// Joins the text of consecutive `tokens` without the comments between them.
///
/// Whitespace between two tokens is kept. A gap that contains a comment becomes
/// a single newline or space, so the joined text can be pasted anywhere.
/// Also returns the offset of every token in the joined text.
pub fn join_tokens(input: &str, tokens: &[Token]) -> (String, Vec<usize>) {
    let mut text = String::new();
    let mut offsets = Vec::with_capacity(tokens.len());
    let mut previous_end = None;

    for token in tokens {
        if let Some(previous_end) = previous_end {
            let gap = &input[previous_end..token.span.start];
            if gap.trim().is_empty() {
                text.push_str(gap);
            } else if gap.contains('\n') {
                text.push('\n');
            } else {
                text.push(' ');
            }
        }
        offsets.push(text.len());
        text.push_str(token_text(input, token));
        previous_end = Some(token.span.end());
    }

    (text, offsets)
}

#[cfg(test)]
mod tests {
    use expect_test::{expect, Expect};
    use itertools::Itertools;
    use proptest::prelude::*;
    use velvet_error::ParseError;

    use super::{join_tokens, lex, token_text};
    use crate::token::TokenKind;

    fn check(input: &str, expect: Expect) {
        let tokens = lex(input).unwrap();
        expect.assert_eq(&tokens.iter().join(" "));
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_var() {
        check(
            "~x: int = 5;",
            expect!["Tilde@0..1 Ident@1..2 Colon@2..3 Ident@4..7 Assign@8..9 Int@10..11 Semicolon@11..12"],
        );
    }

    #[test]
    fn keywords_before_identifiers() {
        assert_eq!(
            kinds("match matches let letter async await import importer"),
            vec![
                TokenKind::KwMatch,
                TokenKind::Ident,
                TokenKind::KwLet,
                TokenKind::Ident,
                TokenKind::KwAsync,
                TokenKind::KwAwait,
                TokenKind::KwImport,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn multi_char_punctuation_first() {
        assert_eq!(
            kinds("=> == = != ! .. !macro"),
            vec![
                TokenKind::FatArrow,
                TokenKind::OpEqual,
                TokenKind::Assign,
                TokenKind::OpNotEqual,
                TokenKind::Bang,
                TokenKind::DotDot,
                TokenKind::KwMacro,
            ]
        );
    }

    #[test]
    fn macro_prefixed_function_name() {
        let input = "!macros(){};";
        let tokens = lex(input).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Bang);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(token_text(input, &tokens[1]), "macros");
    }

    #[test]
    fn sigils_and_markers() {
        check(
            "@inline <std> ? * ^",
            expect!["Decorator@0..7 AngleOpen@8..9 Ident@9..12 AngleClose@12..13 Question@14..15 Star@16..17 Caret@18..19"],
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            kinds("~a = 1; // the answer\n~b = 2;"),
            kinds("~a = 1;\n~b = 2;")
        );
    }

    #[test]
    fn inline_block_is_one_token() {
        let input = "#rust { println!(\"Hi\"); }";
        let tokens = lex(input).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::InlineBlock);
        assert_eq!(token_text(input, &tokens[0]), input);
    }

    #[test]
    fn strings_keep_escapes() {
        let input = r#"~s = "say \"hi\"";"#;
        let tokens = lex(input).unwrap();
        assert_eq!(token_text(input, &tokens[3]), r#""say \"hi\"""#);
    }

    #[test]
    fn unrecognized_character() {
        assert_eq!(
            lex("~x = 1 $ 2;"),
            Err(ParseError::UnrecognizedCharacter {
                span: velvet_common::Span::new(7, 1)
            })
        );
        assert_eq!(lex("~ä = 1;").unwrap_err().position(), 1);
        assert_eq!(lex("~x = \"open").unwrap_err().position(), 5);
    }

    #[test]
    fn joined_tokens_drop_comments() {
        let input = "f( a, // c\n b )";
        let tokens = lex(input).unwrap();
        let (text, offsets) = join_tokens(input, &tokens);
        assert_eq!(text, "f( a,\nb )");
        assert_eq!(offsets, vec![0, 1, 3, 4, 6, 8]);

        assert_eq!(join_tokens(input, &[]), (String::new(), Vec::new()));
    }

    const LEXEMES: &[&str] = &[
        "<", ">", "=", "~", "!", "?", "*", "^", "{", "}", "[", "]", "(", ")", ",", ":", ";", "..",
        "=>", "@deco", "#py {x = 1}", "name", "_tmp", "42", "\"text with spaces\"", "!macro",
        "match", "let", "async", "await", "import", "+", "-", "/", "==", "!=",
    ];

    proptest! {
        #[test]
        fn lexing_is_total_and_lossless(indices in prop::collection::vec(0..LEXEMES.len(), 0..40)) {
            let lexemes: Vec<&str> = indices.iter().map(|&i| LEXEMES[i]).collect();
            let input = lexemes.join(" ");
            let tokens = lex(&input).unwrap();
            let texts: Vec<&str> = tokens.iter().map(|t| token_text(&input, t)).collect();
            prop_assert_eq!(texts, lexemes);
        }

        #[test]
        fn stray_character_is_reported(
            indices in prop::collection::vec(0..LEXEMES.len(), 0..20),
            insert_at in 0_usize..20,
        ) {
            let mut lexemes: Vec<&str> = indices.iter().map(|&i| LEXEMES[i]).collect();
            let insert_at = insert_at.min(lexemes.len());
            lexemes.insert(insert_at, "$");
            let input = lexemes.join(" ");
            let expected_position = input.find('$').unwrap();
            prop_assert_eq!(lex(&input).unwrap_err().position(), expected_position);
        }
    }
}
