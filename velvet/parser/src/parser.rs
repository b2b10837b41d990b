use core::fmt;

use tracing::{debug, trace};
use velvet_common::Span;
use velvet_error::{ParseError, ParseResult};

use crate::{
    ast::{
        Ast, Decorator, Dependency, Destructure, Expr, ExprKind, Func, If, Import, Loop, Macro,
        Match, MatchCase, Node, Param, Pattern, PatternKind, Type, Var,
    },
    error::{unexpected_token, ExpectedItem},
    inline::split_inline_block,
    lexer::{join_tokens, lex},
    token::{matching_close, BinaryOperator, Token, TokenKind},
};

/// Parses already expanded source text into an [`Ast`]
///
/// The `inline` list of the returned ast is left empty,
/// inline blocks are extracted from the text before expansion.
pub fn parse(input: &str) -> ParseResult<Ast> {
    parse_with(input, &parse_root)
}

/// Lexes `input` and runs `parse_fn` on the tokens.
///
/// Fails if `parse_fn` does not consume every token.
pub fn parse_with<T>(
    input: &str,
    parse_fn: &dyn Fn(&mut Parser) -> ParseResult<T>,
) -> ParseResult<T> {
    let tokens = lex(input)?;
    let mut parser = Parser::new(input, tokens);
    let value = parse_fn(&mut parser)?;
    parser.expect(TokenKind::EndOfInput)?;
    Ok(value)
}

/// A cursor over a token stream
///
/// The parser never backtracks: every parse function either consumes the
/// tokens it understands or fails at the first token it does not.
pub struct Parser<'a> {
    pub input: &'a str,
    tokens: Vec<Token>,
    position: usize,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        let mut parser = Parser {
            input,
            tokens,
            position: 0,
            current: Token {
                span: Span::EMPTY,
                kind: TokenKind::EndOfInput,
            },
        };
        parser.current = parser.nth_next(0);
        parser
    }

    fn end_of_input(&self) -> Token {
        Token {
            span: Span::new(self.input.len(), 0),
            kind: TokenKind::EndOfInput,
        }
    }

    /// Returns the token `n` positions after the current token
    fn nth_next(&self, n: usize) -> Token {
        self.tokens
            .get(self.position + n)
            .copied()
            .unwrap_or_else(|| self.end_of_input())
    }

    /// Consumes the current token
    fn bump(&mut self) -> Token {
        let token = self.current;
        if token.kind != TokenKind::EndOfInput {
            self.position += 1;
        }
        self.current = self.nth_next(0);
        token
    }

    /// Expects that the current token has given `kind`.
    /// Errors if that is not the case.
    fn expect(&self, kind: TokenKind) -> ParseResult<Token> {
        if self.current.kind == kind {
            Ok(self.current)
        } else {
            Err(unexpected_token(self.current, [kind]))
        }
    }

    /// Consumes the current token if it has the given `kind`
    fn consume(&mut self, kind: TokenKind) -> ParseResult<Token> {
        self.expect(kind)?;
        Ok(self.bump())
    }

    fn consume_maybe(&mut self, kind: TokenKind) -> Option<Token> {
        (self.current.kind == kind).then(|| self.bump())
    }

    /// Consumes the first matching token of `options`
    /// Returns [`Err`] if no option matches
    fn consume_first_of(&mut self, options: &[TokenKind]) -> ParseResult<Token> {
        if options.contains(&self.current.kind) {
            Ok(self.bump())
        } else {
            Err(unexpected_token(self.current, options.iter().copied()))
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        &self.input[token.span.as_range()]
    }
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Parser")
            .field("position", &self.position)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Parses a comma separated list of items, a trailing comma is allowed.
/// Consumes the `end` token and returns it alongside the items.
fn parse_comma_separated<T>(
    parser: &mut Parser,
    mut parse: impl FnMut(&mut Parser) -> ParseResult<T>,
    end: TokenKind,
) -> ParseResult<(Vec<T>, Token)> {
    let mut items = Vec::new();
    loop {
        if let Some(end_token) = parser.consume_maybe(end) {
            return Ok((items, end_token));
        }
        items.push(parse(parser)?);

        let separator = parser.consume_first_of(&[TokenKind::Comma, end])?;
        if separator.kind == end {
            return Ok((items, separator));
        }
    }
}

pub fn parse_root(parser: &mut Parser) -> ParseResult<Ast> {
    let mut ast = Ast::default();

    while parser.current.kind == TokenKind::KwImport {
        ast.imports.push(parse_import(parser)?);
    }
    while parser.current.kind == TokenKind::AngleOpen {
        ast.deps.push(parse_dependency(parser)?);
    }
    while parser.current.kind != TokenKind::EndOfInput {
        ast.nodes.push(parse_statement(parser)?);
    }

    debug!(
        deps = ast.deps.len(),
        imports = ast.imports.len(),
        nodes = ast.nodes.len(),
        "parsed program"
    );
    Ok(ast)
}

fn parse_import(parser: &mut Parser) -> ParseResult<Import> {
    let keyword = parser.consume(TokenKind::KwImport)?;
    let path = parser.consume(TokenKind::String)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Import {
        span: keyword.span.until(semicolon.span),
        path: string_content(parser.text(&path)).to_string(),
    })
}

/// Parses `<name>`, where the name may contain dashes, like `<crich-cli>`
fn parse_dependency(parser: &mut Parser) -> ParseResult<Dependency> {
    let open = parser.consume(TokenKind::AngleOpen)?;
    let first = parser.consume(TokenKind::Ident)?;
    let mut last = first;
    while parser.consume_maybe(TokenKind::OpMinus).is_some() {
        last = parser.consume(TokenKind::Ident)?;
    }
    let close = parser.consume(TokenKind::AngleClose)?;

    Ok(Dependency {
        span: open.span.until(close.span),
        name: parser.input[first.span.until(last.span).as_range()].into(),
    })
}

pub fn parse_statement(parser: &mut Parser) -> ParseResult<Node> {
    let mut decorators = Vec::new();
    while let Some(decorator) = parser.consume_maybe(TokenKind::Decorator) {
        decorators.push(decorator);
    }

    let mut node = match parser.current.kind {
        TokenKind::Tilde => parse_var(parser).map(Node::Var),
        TokenKind::Bang | TokenKind::KwAsync => parse_function(parser).map(Node::Func),
        TokenKind::KwMacro => parse_macro(parser).map(Node::Macro),
        TokenKind::KwMatch => parse_match(parser).map(Node::Match),
        TokenKind::KwLet => parse_destructure(parser).map(Node::Pattern),
        TokenKind::Question => parse_if(parser).map(Node::If),
        TokenKind::Star => parse_loop(parser).map(Node::Loop),
        TokenKind::KwImport => parse_import(parser).map(Node::Import),
        TokenKind::InlineBlock => {
            let token = parser.bump();
            parser.consume_maybe(TokenKind::Semicolon);
            Ok(Node::Inline(split_inline_block(parser.input, &token)))
        }
        kind if kind.starts_expression() => {
            let expr = parse_expr(parser)?;
            parser.consume(TokenKind::Semicolon)?;
            Ok(Node::Expr(expr))
        }
        _ => Err(unexpected_token(parser.current, [ExpectedItem::Statement])),
    }?;

    // The first decorator is the outermost one
    for decorator in decorators.into_iter().rev() {
        node = Node::Decorator(Decorator {
            span: decorator.span.until(node.span()),
            name: parser.text(&decorator)[1..].into(),
            target: Box::new(node),
        });
    }

    trace!(start = node.span().start, "parsed statement");
    Ok(node)
}

/// Parses statements until the closing brace of a block
fn parse_block(parser: &mut Parser) -> ParseResult<Vec<Node>> {
    parser.consume(TokenKind::BraceOpen)?;
    let mut body = Vec::new();
    while parser.current.kind != TokenKind::BraceClose {
        body.push(parse_statement(parser)?);
    }
    parser.bump();
    Ok(body)
}

fn parse_var(parser: &mut Parser) -> ParseResult<Var> {
    let tilde = parser.consume(TokenKind::Tilde)?;
    let name = parser.consume(TokenKind::Ident)?;
    let ty = parse_type_annotation_maybe(parser)?;
    parser.consume(TokenKind::Assign)?;
    let value = parse_expr(parser)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Var {
        span: tilde.span.until(semicolon.span),
        name: parser.text(&name).into(),
        ty,
        value,
    })
}

fn parse_type_annotation_maybe(parser: &mut Parser) -> ParseResult<Option<Type>> {
    match parser.consume_maybe(TokenKind::Colon) {
        Some(_) => parse_type(parser).map(Some),
        None => Ok(None),
    }
}

/// Parses a type like `int` or `map<str, list<int>>` and checks the number of its parameters
pub fn parse_type(parser: &mut Parser) -> ParseResult<Type> {
    let base = parser.consume(TokenKind::Ident)?;
    let (params, end) = match parser.consume_maybe(TokenKind::AngleOpen) {
        Some(_) => parse_comma_separated(parser, parse_type, TokenKind::AngleClose)?,
        None => (Vec::new(), base),
    };

    let ty = Type {
        span: base.span.until(end.span),
        base: parser.text(&base).into(),
        params,
    };

    let arity = Type::arity_of(ty.base.as_str());
    if !arity.accepts(ty.params.len()) {
        return Err(ParseError::UnknownTypeArity {
            span: ty.span,
            base: ty.base.to_string(),
            expected: arity,
            got: ty.params.len(),
        });
    }

    Ok(ty)
}

fn parse_function(parser: &mut Parser) -> ParseResult<Func> {
    let start = parser.current;
    let is_async = parser.consume_maybe(TokenKind::KwAsync).is_some();
    parser.consume(TokenKind::Bang)?;
    let name = parser.consume(TokenKind::Ident)?;
    parser.consume(TokenKind::ParenthesisOpen)?;
    let (params, _) = parse_comma_separated(parser, parse_param, TokenKind::ParenthesisClose)?;

    parser.consume(TokenKind::BraceOpen)?;
    let mut body = Vec::new();
    let mut ret = None;
    loop {
        match parser.current.kind {
            TokenKind::BraceClose => break,
            TokenKind::Caret => {
                parser.bump();
                ret = Some(parse_expr(parser)?);
                parser.consume_maybe(TokenKind::Semicolon);
                break;
            }
            _ => body.push(parse_statement(parser)?),
        }
    }
    parser.consume(TokenKind::BraceClose)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Func {
        span: start.span.until(semicolon.span),
        name: parser.text(&name).into(),
        params,
        body,
        ret,
        is_async,
    })
}

fn parse_param(parser: &mut Parser) -> ParseResult<Param> {
    let tilde = parser.consume(TokenKind::Tilde)?;
    let name = parser.consume(TokenKind::Ident)?;
    let ty = parse_type_annotation_maybe(parser)?;
    let default = match parser.consume_maybe(TokenKind::Assign) {
        Some(_) => Some(parse_expr(parser)?),
        None => None,
    };

    let end = match (&default, &ty) {
        (Some(default), _) => default.span,
        (None, Some(ty)) => ty.span,
        (None, None) => name.span,
    };
    Ok(Param {
        span: tilde.span.until(end),
        name: parser.text(&name).into(),
        ty,
        default,
    })
}

/// Parses a macro declaration, the body is kept as text without comments
fn parse_macro(parser: &mut Parser) -> ParseResult<Macro> {
    let keyword = parser.consume(TokenKind::KwMacro)?;
    let name = parser.consume(TokenKind::Ident)?;
    parser.expect(TokenKind::BraceOpen)?;

    let Some(close_position) = matching_close(&parser.tokens, parser.position) else {
        return Err(unexpected_token(parser.end_of_input(), [TokenKind::BraceClose]));
    };
    let body_tokens = &parser.tokens[parser.position + 1..close_position];
    let (body, _) = join_tokens(parser.input, body_tokens);
    parser.position = close_position;
    parser.current = parser.nth_next(0);
    parser.consume(TokenKind::BraceClose)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Macro {
        span: keyword.span.until(semicolon.span),
        name: parser.text(&name).into(),
        body,
    })
}

fn parse_match(parser: &mut Parser) -> ParseResult<Match> {
    let keyword = parser.consume(TokenKind::KwMatch)?;
    let scrutinee = parse_expr(parser)?;
    parser.consume(TokenKind::BraceOpen)?;

    let mut cases = Vec::new();
    while parser.current.kind != TokenKind::BraceClose {
        let pattern = parse_pattern(parser)?;
        parser.consume(TokenKind::FatArrow)?;
        let consequent = parse_match_arm(parser)?;
        parser.consume_maybe(TokenKind::Comma);
        cases.push(MatchCase {
            pattern,
            consequent: Box::new(consequent),
        });
    }
    parser.bump();
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Match {
        span: keyword.span.until(semicolon.span),
        scrutinee,
        cases,
    })
}

/// An arm is either a full statement or a bare expression with an optional semicolon
fn parse_match_arm(parser: &mut Parser) -> ParseResult<Node> {
    if parser.current.kind.starts_expression() {
        let expr = parse_expr(parser)?;
        parser.consume_maybe(TokenKind::Semicolon);
        Ok(Node::Expr(expr))
    } else {
        parse_statement(parser)
    }
}

fn parse_destructure(parser: &mut Parser) -> ParseResult<Destructure> {
    let keyword = parser.consume(TokenKind::KwLet)?;
    let pattern = parse_pattern(parser)?;
    parser.consume(TokenKind::Assign)?;
    let value = parse_expr(parser)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Destructure {
        span: keyword.span.until(semicolon.span),
        pattern,
        value,
    })
}

pub fn parse_pattern(parser: &mut Parser) -> ParseResult<Pattern> {
    let start = parser.current;
    let (kind, end) = match start.kind {
        TokenKind::ParenthesisOpen => {
            parser.bump();
            let (parts, end) =
                parse_comma_separated(parser, parse_pattern, TokenKind::ParenthesisClose)?;
            (PatternKind::Tuple(parts), end)
        }
        TokenKind::BracketOpen => {
            parser.bump();
            let (parts, end) =
                parse_comma_separated(parser, parse_pattern, TokenKind::BracketClose)?;
            (PatternKind::List(parts), end)
        }
        TokenKind::BraceOpen => {
            parser.bump();
            let mut parts = Vec::new();
            while parser.current.kind != TokenKind::BraceClose {
                let key = parse_expr(parser)?;
                parser.consume(TokenKind::Colon)?;
                let value = parse_pattern(parser)?;
                parser.consume_maybe(TokenKind::Comma);
                parts.push((key, value));
            }
            (PatternKind::Dict(parts), parser.bump())
        }
        TokenKind::Ident => (PatternKind::Var(parser.text(&start).into()), parser.bump()),
        TokenKind::Int | TokenKind::String | TokenKind::OpMinus => {
            let literal = parse_operand(parser)?;
            let span = literal.span;
            return Ok(Pattern {
                span,
                kind: PatternKind::Literal(literal),
            });
        }
        _ => return Err(unexpected_token(start, [ExpectedItem::Pattern])),
    };

    Ok(Pattern {
        span: start.span.until(end.span),
        kind,
    })
}

fn parse_if(parser: &mut Parser) -> ParseResult<If> {
    let question = parser.consume(TokenKind::Question)?;
    let condition = parse_expr(parser)?;
    let body = parse_block(parser)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(If {
        span: question.span.until(semicolon.span),
        condition,
        body,
    })
}

fn parse_loop(parser: &mut Parser) -> ParseResult<Loop> {
    let star = parser.consume(TokenKind::Star)?;
    let var = parser.consume(TokenKind::Ident)?;
    parser.consume(TokenKind::Assign)?;
    let start = parse_expr(parser)?;
    parser.consume(TokenKind::DotDot)?;
    let end = parse_expr(parser)?;
    let body = parse_block(parser)?;
    let semicolon = parser.consume(TokenKind::Semicolon)?;

    Ok(Loop {
        span: star.span.until(semicolon.span),
        var: parser.text(&var).into(),
        start,
        end,
        body,
    })
}

enum StackItem {
    Operator(BinaryOperator),
    Parenthesis(Token),
}

/// Parses an expression with the shunting-yard algorithm.
///
/// The expression ends at the first token that cannot continue it,
/// including a closing parenthesis that was not opened inside the expression.
pub fn parse_expr(parser: &mut Parser) -> ParseResult<Expr> {
    let mut operands: Vec<Expr> = Vec::new();
    let mut operators: Vec<StackItem> = Vec::new();
    let mut open_parentheses = 0_usize;

    loop {
        while let Some(open) = parser.consume_maybe(TokenKind::ParenthesisOpen) {
            operators.push(StackItem::Parenthesis(open));
            open_parentheses += 1;
        }
        operands.push(parse_operand(parser)?);

        while open_parentheses > 0 {
            let Some(close) = parser.consume_maybe(TokenKind::ParenthesisClose) else {
                break;
            };
            while let Some(item) = operators.pop() {
                match item {
                    StackItem::Operator(operator) => reduce(&mut operands, operator),
                    StackItem::Parenthesis(open) => {
                        if let Some(inner) = operands.last_mut() {
                            inner.span = open.span.until(close.span);
                        }
                        break;
                    }
                }
            }
            open_parentheses -= 1;
        }

        let Some(operator) = parse_infix_operator_maybe(parser) else {
            break;
        };
        while let Some(StackItem::Operator(top)) = operators.last() {
            if top.precedence() < operator.precedence() {
                break;
            }
            let top = *top;
            operators.pop();
            reduce(&mut operands, top);
        }
        operators.push(StackItem::Operator(operator));
    }

    if open_parentheses > 0 {
        return Err(unexpected_token(
            parser.current,
            [TokenKind::ParenthesisClose],
        ));
    }

    while let Some(StackItem::Operator(operator)) = operators.pop() {
        reduce(&mut operands, operator);
    }

    match operands.pop() {
        Some(expr) if operands.is_empty() => Ok(expr),
        _ => unreachable!("the operand stack always reduces to a single expression"),
    }
}

/// Replaces the two topmost operands with a binary operation
fn reduce(operands: &mut Vec<Expr>, operator: BinaryOperator) {
    let rhs = operands.pop();
    let lhs = operands.pop();
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => operands.push(Expr {
            span: lhs.span.until(rhs.span),
            kind: ExprKind::Binary {
                operator,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }),
        _ => unreachable!("every operator has two operands"),
    }
}

/// Consumes a binary operator, joining `<` or `>` with a directly following `=`
fn parse_infix_operator_maybe(parser: &mut Parser) -> Option<BinaryOperator> {
    let operator = parser.current.kind.infix_operator()?;
    let token = parser.bump();

    let joined = match operator {
        BinaryOperator::Less => BinaryOperator::LessOrEqual,
        BinaryOperator::Greater => BinaryOperator::GreaterOrEqual,
        _ => return Some(operator),
    };
    if parser.current.kind == TokenKind::Assign && parser.current.span.start == token.span.end() {
        parser.bump();
        Some(joined)
    } else {
        Some(operator)
    }
}

fn parse_operand(parser: &mut Parser) -> ParseResult<Expr> {
    create_neg_int_literal_maybe(parser);

    let token = parser.current;
    let kind = match token.kind {
        TokenKind::Int => {
            parser.bump();
            let value = parser
                .text(&token)
                .parse()
                .map_err(|error| ParseError::InvalidIntLiteral {
                    span: token.span,
                    error,
                })?;
            ExprKind::Int(value)
        }
        TokenKind::String => {
            parser.bump();
            ExprKind::String(string_content(parser.text(&token)).to_string())
        }
        TokenKind::Ident => {
            parser.bump();
            let name = parser.text(&token).into();
            if parser.consume_maybe(TokenKind::ParenthesisOpen).is_some() {
                let (args, close) =
                    parse_comma_separated(parser, parse_expr, TokenKind::ParenthesisClose)?;
                return Ok(Expr {
                    span: token.span.until(close.span),
                    kind: ExprKind::Call { callee: name, args },
                });
            }
            ExprKind::Ident(name)
        }
        TokenKind::KwAwait => {
            parser.bump();
            let inner = match parser.consume_maybe(TokenKind::ParenthesisOpen) {
                Some(open) => {
                    let mut inner = parse_expr(parser)?;
                    let close = parser.consume(TokenKind::ParenthesisClose)?;
                    inner.span = open.span.until(close.span);
                    inner
                }
                None => parse_operand(parser)?,
            };
            return Ok(Expr {
                span: token.span.until(inner.span),
                kind: ExprKind::Await(Box::new(inner)),
            });
        }
        TokenKind::BracketOpen => {
            parser.bump();
            let (items, close) =
                parse_comma_separated(parser, parse_expr, TokenKind::BracketClose)?;
            return Ok(Expr {
                span: token.span.until(close.span),
                kind: ExprKind::List(items),
            });
        }
        TokenKind::BraceOpen => {
            parser.bump();
            let (entries, close) =
                parse_comma_separated(parser, parse_dict_entry, TokenKind::BraceClose)?;
            return Ok(Expr {
                span: token.span.until(close.span),
                kind: ExprKind::Dict(entries),
            });
        }
        _ => return Err(unexpected_token(token, [ExpectedItem::Value])),
    };

    Ok(Expr {
        span: token.span,
        kind,
    })
}

fn parse_dict_entry(parser: &mut Parser) -> ParseResult<(Expr, Expr)> {
    let key = parse_expr(parser)?;
    parser.consume(TokenKind::Colon)?;
    let value = parse_expr(parser)?;
    Ok((key, value))
}

/// This function implements a hack that combines a minus
/// token with a directly following int token.
/// This is only done in operand position, so `a-2` is still a subtraction.
fn create_neg_int_literal_maybe(parser: &mut Parser) {
    let first = parser.current;
    let second = parser.nth_next(1);

    if first.kind == TokenKind::OpMinus
        && second.kind == TokenKind::Int
        && first.span.end() == second.span.start
    {
        parser.bump();
        parser.current.span = first.span.until(second.span);
    }
}

/// Strips the quotes of a string literal
fn string_content(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(literal)
}
