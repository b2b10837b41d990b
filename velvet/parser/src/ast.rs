//! The abstract syntax tree produced by the parser
//!
//! Every node owns its children. The tree is never modified after parsing.

use std::{fmt, ops::ControlFlow};

use itertools::Itertools;
use velvet_common::{Ident, Span};
use velvet_error::Arity;

use crate::ast_visitor::{AstFlow, AstVisitor};
pub use crate::token::BinaryOperator;

/// A parsed file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ast {
    /// Dependency tags, like `<std>`
    pub deps: Vec<Dependency>,
    /// Imports at the top of the file
    pub imports: Vec<Import>,
    /// Top level statements, in source order
    pub nodes: Vec<Node>,
    /// Inline blocks of foreign code, in the order they appear in the raw source
    pub inline: Vec<Inline>,
}

impl Ast {
    /// Every imported path: the file header first, then imports in statement position
    pub fn import_paths(&self) -> impl Iterator<Item = &Import> {
        let statement_imports = self.nodes.iter().filter_map(|node| match node {
            Node::Import(import) => Some(import),
            _ => None,
        });
        self.imports.iter().chain(statement_imports)
    }

    pub fn visit(&self, visitor: &mut impl AstVisitor) {
        let _ = visit_all(&self.nodes, visitor);
    }
}

trait AstItem {
    #[must_use]
    fn visit(&self, visitor: &mut impl AstVisitor) -> AstFlow;
}

fn visit_all<'a, T: AstItem + 'a>(
    items: impl IntoIterator<Item = &'a T>,
    visitor: &mut impl AstVisitor,
) -> AstFlow {
    for item in items {
        item.visit(visitor)?;
    }
    ControlFlow::Continue(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub span: Span,
    pub name: Ident,
}

/// Any statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Var(Var),
    Func(Func),
    Macro(Macro),
    Match(Match),
    Pattern(Destructure),
    Import(Import),
    Decorator(Decorator),
    Inline(Inline),
    If(If),
    Loop(Loop),
    Expr(Expr),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Var(Var { span, .. })
            | Node::Func(Func { span, .. })
            | Node::Macro(Macro { span, .. })
            | Node::Match(Match { span, .. })
            | Node::Pattern(Destructure { span, .. })
            | Node::Import(Import { span, .. })
            | Node::Decorator(Decorator { span, .. })
            | Node::Inline(Inline { span, .. })
            | Node::If(If { span, .. })
            | Node::Loop(Loop { span, .. })
            | Node::Expr(Expr { span, .. }) => *span,
        }
    }
}

/// `~name: type = value;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub span: Span,
    pub name: Ident,
    pub ty: Option<Type>,
    pub value: Expr,
}

/// A function parameter: `~name: type = default`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub span: Span,
    pub name: Ident,
    pub ty: Option<Type>,
    pub default: Option<Expr>,
}

/// `async? !name(params) { body ^ret };`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    pub span: Span,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Vec<Node>,
    pub ret: Option<Expr>,
    pub is_async: bool,
}

/// `!macro name { body };`
///
/// The body is kept as raw text, it only becomes code when it is expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub span: Span,
    pub name: Ident,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub span: Span,
    pub scrutinee: Expr,
    pub cases: Vec<MatchCase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub consequent: Box<Node>,
}

/// `let pattern = value;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destructure {
    pub span: Span,
    pub pattern: Pattern,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub span: Span,
    /// The path without its quotes
    pub path: String,
}

/// Wraps exactly one node.
///
/// `@a @b stmt` becomes `Decorator(a, Decorator(b, stmt))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    pub span: Span,
    pub name: Ident,
    pub target: Box<Node>,
}

/// A block of foreign code, `#lang { code }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    pub span: Span,
    pub lang: Ident,
    /// Everything between the braces, unmodified
    pub code: String,
}

/// `? condition { body };`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub span: Span,
    pub condition: Expr,
    pub body: Vec<Node>,
}

/// `* var = start..end { body };`, `end` is exclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    pub span: Span,
    pub var: Ident,
    pub start: Expr,
    pub end: Expr,
    pub body: Vec<Node>,
}

/// A declared type, like `map<int, str>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub span: Span,
    pub base: Ident,
    pub params: Vec<Type>,
}

impl Type {
    /// The number of generic parameters a type with this base name takes
    pub fn arity_of(base: &str) -> Arity {
        match base {
            "list" | "set" => Arity::Exactly(1),
            "map" => Arity::Exactly(2),
            "tuple" => Arity::AtLeast(1),
            _ => Arity::Exactly(0),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if !self.params.is_empty() {
            write!(f, "<{}>", self.params.iter().join(","))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub span: Span,
    pub kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    /// Binds a single name. `_` is a name as well.
    Var(Ident),
    /// Matches a literal value, only useful in match cases
    Literal(Expr),
    Tuple(Vec<Pattern>),
    List(Vec<Pattern>),
    /// Pairs of key expressions and the patterns their values are bound to
    Dict(Vec<(Expr, Pattern)>),
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Var(_) => "var",
            PatternKind::Literal(_) => "literal",
            PatternKind::Tuple(_) => "tuple",
            PatternKind::List(_) => "list",
            PatternKind::Dict(_) => "dict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Ident(Ident),
    Int(i64),
    /// The string content without quotes, escapes are not processed
    String(String),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    Await(Box<Expr>),
    Binary {
        operator: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// One item of an expression in postfix order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixItem<'a> {
    Operand(&'a Expr),
    Operator(BinaryOperator),
}

impl Expr {
    /// Returns this expression in postfix (reverse polish) order.
    ///
    /// Only binary operations are flattened, every other expression is a single operand.
    pub fn to_postfix(&self) -> Vec<PostfixItem<'_>> {
        let mut items = Vec::new();
        self.write_postfix(&mut items);
        items
    }

    fn write_postfix<'a>(&'a self, items: &mut Vec<PostfixItem<'a>>) {
        match &self.kind {
            ExprKind::Binary { operator, lhs, rhs } => {
                lhs.write_postfix(items);
                rhs.write_postfix(items);
                items.push(PostfixItem::Operator(*operator));
            }
            _ => items.push(PostfixItem::Operand(self)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Ident(ident) => write!(f, "{ident}"),
            ExprKind::Int(value) => write!(f, "{value}"),
            ExprKind::String(value) => write!(f, "\"{value}\""),
            ExprKind::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            ExprKind::Dict(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .join(", ")
            ),
            ExprKind::Call { callee, args } => write!(f, "{callee}({})", args.iter().join(", ")),
            ExprKind::Await(inner) => write!(f, "await {inner}"),
            ExprKind::Binary { operator, lhs, rhs } => write!(f, "({lhs} {operator} {rhs})"),
        }
    }
}

impl fmt::Display for PostfixItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixItem::Operand(expr) => write!(f, "{expr}"),
            PostfixItem::Operator(operator) => write!(f, "{operator}"),
        }
    }
}

impl AstItem for Node {
    fn visit(&self, visitor: &mut impl AstVisitor) -> AstFlow {
        visitor.visit_node(self)?;
        match self {
            Node::Var(var) => {
                visit_all(&var.ty, visitor)?;
                var.value.visit(visitor)
            }
            Node::Func(func) => {
                visit_all(&func.params, visitor)?;
                visit_all(&func.body, visitor)?;
                visit_all(&func.ret, visitor)
            }
            Node::Match(m) => {
                m.scrutinee.visit(visitor)?;
                for case in &m.cases {
                    case.pattern.visit(visitor)?;
                    case.consequent.visit(visitor)?;
                }
                ControlFlow::Continue(())
            }
            Node::Pattern(destructure) => {
                destructure.pattern.visit(visitor)?;
                destructure.value.visit(visitor)
            }
            Node::Decorator(decorator) => decorator.target.visit(visitor),
            Node::If(branch) => {
                branch.condition.visit(visitor)?;
                visit_all(&branch.body, visitor)
            }
            Node::Loop(lp) => {
                lp.start.visit(visitor)?;
                lp.end.visit(visitor)?;
                visit_all(&lp.body, visitor)
            }
            Node::Expr(expr) => expr.visit(visitor),
            Node::Macro(_) | Node::Import(_) | Node::Inline(_) => ControlFlow::Continue(()),
        }
    }
}

impl AstItem for Param {
    fn visit(&self, visitor: &mut impl AstVisitor) -> AstFlow {
        visitor.visit_param(self)?;
        visit_all(&self.ty, visitor)?;
        visit_all(&self.default, visitor)
    }
}

impl AstItem for Type {
    fn visit(&self, visitor: &mut impl AstVisitor) -> AstFlow {
        visitor.visit_type(self)?;
        visit_all(&self.params, visitor)
    }
}

impl AstItem for Pattern {
    fn visit(&self, visitor: &mut impl AstVisitor) -> AstFlow {
        visitor.visit_pattern(self)?;
        match &self.kind {
            PatternKind::Var(_) => ControlFlow::Continue(()),
            PatternKind::Literal(literal) => literal.visit(visitor),
            PatternKind::Tuple(parts) | PatternKind::List(parts) => visit_all(parts, visitor),
            PatternKind::Dict(entries) => {
                for (key, value) in entries {
                    key.visit(visitor)?;
                    value.visit(visitor)?;
                }
                ControlFlow::Continue(())
            }
        }
    }
}

impl AstItem for Expr {
    fn visit(&self, visitor: &mut impl AstVisitor) -> AstFlow {
        visitor.visit_expr(self)?;
        match &self.kind {
            ExprKind::Ident(_) | ExprKind::Int(_) | ExprKind::String(_) => ControlFlow::Continue(()),
            ExprKind::List(items) | ExprKind::Call { args: items, .. } => visit_all(items, visitor),
            ExprKind::Dict(entries) => {
                for (key, value) in entries {
                    key.visit(visitor)?;
                    value.visit(visitor)?;
                }
                ControlFlow::Continue(())
            }
            ExprKind::Await(inner) => inner.visit(visitor),
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.visit(visitor)?;
                rhs.visit(visitor)
            }
        }
    }
}
