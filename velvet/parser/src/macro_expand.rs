//! Textual macro expansion
//!
//! Macros are expanded before the parser sees the input:
//! First every `!macro name { body };` declaration is collected into a [`MacroTable`],
//! then every invocation of a collected macro is replaced by its body.
//! Expansion works on text, the parser later lexes the expanded text again.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use velvet_common::{Ident, Span};
use velvet_error::{ParseError, ParseResult};

use crate::{
    lexer::{join_tokens, lex, token_text},
    token::{matching_close, Token, TokenKind},
};

/// The name of the variable that stands for the macro argument, written `~x` in a macro body
pub const MACRO_PLACEHOLDER: &str = "x";

/// A declared macro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: Ident,
    /// The tokens between the braces of the declaration, without comments
    pub body: String,
    /// The span of the whole declaration
    pub span: Span,
    /// Spans of every `~x` relative to the start of `body`, in ascending order
    placeholders: Vec<Span>,
}

impl MacroDefinition {
    /// Returns the body with every placeholder replaced by `args`
    pub fn substitute(&self, args: &str) -> String {
        let mut output = String::with_capacity(self.body.len());
        let mut copied_until = 0;
        for placeholder in &self.placeholders {
            output.push_str(&self.body[copied_until..placeholder.start]);
            output.push_str(args);
            copied_until = placeholder.end();
        }
        output.push_str(&self.body[copied_until..]);
        output
    }
}

/// Maps macro names to their definitions
///
/// The table is owned by the caller, so that it can be inspected after parsing
/// or shared between multiple expansions of the same file.
#[derive(Debug, Default, Clone)]
pub struct MacroTable {
    macros: FxHashMap<Ident, MacroDefinition>,
}

impl MacroTable {
    /// Registers a macro and returns the definition it replaced, if any
    pub fn register(&mut self, definition: MacroDefinition) -> Option<MacroDefinition> {
        self.macros.insert(definition.name.clone(), definition)
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Replaces macro invocations in source text
pub trait MacroExpander {
    /// Expands every invocation in `text` using the macros in `table`.
    ///
    /// The table must already contain the macros declared in `text`.
    fn expand(&self, text: &str, table: &MacroTable) -> ParseResult<String>;
}

/// Substitutes macro bodies without any hygiene
///
/// `name(args)` is replaced if `name` is a declared macro, otherwise it is left as a call.
/// `name!(args)` is always an invocation and fails if `name` was never declared.
/// The substituted text is not scanned again, so macros expand exactly one level deep.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextualExpander;

impl MacroExpander for TextualExpander {
    fn expand(&self, text: &str, table: &MacroTable) -> ParseResult<String> {
        let tokens = lex(text)?;
        let mut output = String::with_capacity(text.len());
        let mut copied_until = 0;
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            let next_kind = tokens.get(index + 1).map(|token| token.kind);
            match token.kind {
                TokenKind::KwMacro => {
                    index = declaration_end(&tokens, index).unwrap_or(index) + 1;
                }
                // The name of a function declaration is never an invocation
                TokenKind::Bang if next_kind == Some(TokenKind::Ident) => index += 2,
                TokenKind::Ident => {
                    let Some(invocation) = invocation_at(text, &tokens, index, table)? else {
                        index += 1;
                        continue;
                    };
                    let definition = invocation.definition;
                    debug!(name = %definition.name, args = %invocation.args, "expanding macro");

                    output.push_str(&text[copied_until..invocation.span.start]);
                    output.push_str(&definition.substitute(&invocation.args));
                    copied_until = invocation.span.end();
                    index = invocation.last_token + 1;
                }
                _ => index += 1,
            }
        }

        output.push_str(&text[copied_until..]);
        Ok(output)
    }
}

struct Invocation<'a> {
    definition: &'a MacroDefinition,
    /// The argument text without comments
    args: String,
    span: Span,
    last_token: usize,
}

/// Checks whether the identifier at `index` starts a macro invocation
fn invocation_at<'a>(
    text: &'a str,
    tokens: &[Token],
    index: usize,
    table: &'a MacroTable,
) -> ParseResult<Option<Invocation<'a>>> {
    let name_token = tokens[index];
    let name = token_text(text, &name_token);
    let kind_at = |offset: usize| tokens.get(index + offset).map(|token| token.kind);

    let (definition, open) = match (kind_at(1), kind_at(2)) {
        (Some(TokenKind::Bang), Some(TokenKind::ParenthesisOpen)) => {
            let definition = table.get(name).ok_or_else(|| ParseError::MacroNotFound {
                span: name_token.span.until(tokens[index + 1].span),
                name: name.to_string(),
            })?;
            (definition, index + 2)
        }
        (Some(TokenKind::ParenthesisOpen), _) => match table.get(name) {
            Some(definition) => (definition, index + 1),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    let Some(close) = matching_close(tokens, open) else {
        return Ok(None);
    };

    Ok(Some(Invocation {
        definition,
        args: join_tokens(text, &tokens[open + 1..close]).0,
        span: name_token.span.until(tokens[close].span),
        last_token: close,
    }))
}

/// Returns the index of the closing brace of the macro declaration at `index`,
/// or `None` if the declaration is malformed.
fn declaration_end(tokens: &[Token], index: usize) -> Option<usize> {
    let name = tokens.get(index + 1)?;
    let open = tokens.get(index + 2)?;
    if name.kind != TokenKind::Ident || open.kind != TokenKind::BraceOpen {
        return None;
    }
    matching_close(tokens, index + 2)
}

/// Registers every macro declared in `text`.
///
/// Redeclaring a macro replaces the previous definition.
pub fn collect_macros(text: &str, table: &mut MacroTable) -> ParseResult<()> {
    let tokens = lex(text)?;

    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].kind != TokenKind::KwMacro {
            index += 1;
            continue;
        }
        let Some(close) = declaration_end(&tokens, index) else {
            index += 1;
            continue;
        };

        let definition = read_definition(text, &tokens[index..=close]);
        trace!(name = %definition.name, body = %definition.body, "registered macro");
        if let Some(previous) = table.register(definition) {
            debug!(name = %previous.name, "macro redefined, the last definition wins");
        }
        index = close + 1;
    }

    Ok(())
}

/// Builds a definition from the tokens `!macro name { ... }`
///
/// The body is rebuilt from the tokens between the braces, so comments never reach a call site.
fn read_definition(text: &str, tokens: &[Token]) -> MacroDefinition {
    let (first, name, close) = (tokens[0], tokens[1], tokens[tokens.len() - 1]);
    let body_tokens = &tokens[3..tokens.len() - 1];
    let (body, offsets) = join_tokens(text, body_tokens);

    let placeholders = body_tokens
        .windows(2)
        .zip(&offsets)
        .filter(|(pair, _)| {
            pair[0].kind == TokenKind::Tilde
                && pair[1].kind == TokenKind::Ident
                && pair[0].span.end() == pair[1].span.start
                && token_text(text, &pair[1]) == MACRO_PLACEHOLDER
        })
        .map(|(pair, &offset)| Span::new(offset, pair[0].span.len + pair[1].span.len))
        .collect();

    MacroDefinition {
        name: token_text(text, &name).into(),
        body,
        span: first.span.until(close.span),
        placeholders,
    }
}

/// Collects the macros of `text` into `table` and expands `text` with `expander`
pub fn expand_source(
    text: &str,
    table: &mut MacroTable,
    expander: &dyn MacroExpander,
) -> ParseResult<String> {
    collect_macros(text, table)?;
    let expanded = expander.expand(text, table)?;
    debug!(
        macros = table.len(),
        changed = expanded != text,
        "macro expansion done"
    );
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use velvet_common::Span;
    use velvet_error::ParseError;

    use super::{collect_macros, expand_source, MacroTable, TextualExpander};
    use crate::ast::Node;

    fn expand(text: &str) -> String {
        expand_source(text, &mut MacroTable::default(), &TextualExpander).unwrap()
    }

    #[test]
    fn collects_declarations() {
        let mut table = MacroTable::default();
        collect_macros("!macro inc { ~x + 1 };\n!macro zero {0};", &mut table).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("inc").unwrap().body, "~x + 1");
        assert_eq!(table.get("zero").unwrap().body, "0");
        assert_eq!(table.get("inc").unwrap().span, Span::new(0, 21));
    }

    #[test]
    fn last_declaration_wins() {
        let mut table = MacroTable::default();
        collect_macros("!macro m { 1 }; !macro m { 2 };", &mut table).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("m").unwrap().body, "2");
    }

    #[test]
    fn substitutes_placeholder() {
        assert_eq!(
            expand("!macro inc { ~x + 1 };\n~y = inc(5);"),
            "!macro inc { ~x + 1 };\n~y = 5 + 1;"
        );
    }

    #[test]
    fn placeholder_is_a_whole_identifier() {
        let mut table = MacroTable::default();
        collect_macros("!macro m { ~x + ~xs + x };", &mut table).unwrap();
        assert_eq!(table.get("m").unwrap().substitute("a"), "a + ~xs + x");
    }

    #[test]
    fn unknown_calls_are_kept() {
        let text = "print(inc);";
        assert_eq!(expand(text), text);
    }

    #[test]
    fn expansion_is_not_recursive() {
        assert_eq!(
            expand("!macro twice { twice(~x) };\ntwice(1);"),
            "!macro twice { twice(~x) };\ntwice(1);"
        );
    }

    #[test]
    fn nested_arguments() {
        assert_eq!(
            expand("!macro neg { 0 - ~x };\n~y = neg(f(a, (b)));"),
            "!macro neg { 0 - ~x };\n~y = 0 - f(a, (b));"
        );
    }

    #[test]
    fn explicit_invocation() {
        assert_eq!(
            expand("!macro one { 1 };\n~y = one!();"),
            "!macro one { 1 };\n~y = 1;"
        );
    }

    #[test]
    fn explicit_invocation_of_unknown_macro() {
        let result = expand_source("~y = nope!(1);", &mut MacroTable::default(), &TextualExpander);
        assert_eq!(
            result,
            Err(ParseError::MacroNotFound {
                span: Span::new(5, 5),
                name: "nope".to_string(),
            })
        );
    }

    #[test]
    fn verbatim_regions() {
        let text = "!macro f { 1 };\n!f(~a) { ^a };\n~s = \"f(2)\";\n#py { f(3) }";
        assert_eq!(expand(text), text);
    }

    #[test]
    fn comments_in_the_body_are_dropped() {
        let text = "!macro m { ~x // note\n};\n~y = [m(1), 2\n];";
        assert_eq!(expand(text), "!macro m { ~x // note\n};\n~y = [1, 2\n];");

        let ast = crate::parse(text).unwrap();
        let Node::Var(var) = &ast.nodes[1] else {
            panic!("expected a var");
        };
        assert_eq!(var.value.to_string(), "[1, 2]");
    }

    #[test]
    fn placeholders_after_comments() {
        let mut table = MacroTable::default();
        collect_macros("!macro m { // leading\n ~x // middle\n + ~x };", &mut table).unwrap();
        let definition = table.get("m").unwrap();
        assert_eq!(definition.body, "~x\n+ ~x");
        assert_eq!(definition.substitute("2"), "2\n+ 2");
    }

    #[test]
    fn comments_in_arguments_are_dropped() {
        assert_eq!(
            expand("!macro inc { ~x + 1 };\n~y = [inc(1 // one\n), 2];"),
            "!macro inc { ~x + 1 };\n~y = [1 + 1, 2];"
        );
    }

    #[test]
    fn table_is_kept_by_the_caller() {
        let mut table = MacroTable::default();
        expand_source("!macro a { 1 };", &mut table, &TextualExpander).unwrap();
        assert!(table.contains("a"));
        assert!(!table.is_empty());
    }
}
