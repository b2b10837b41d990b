//! The language agnostic intermediate representation
//!
//! Every item serializes to a json object. Nodes are tagged with a `type` field,
//! expressions and patterns with a `kind` field.

use serde::Serialize;
use velvet_common::Ident;

use crate::type_table::TypeProjection;

/// The ir of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrDocument {
    pub deps: Vec<Ident>,
    pub imports: Vec<String>,
    pub nodes: Vec<IrNode>,
    pub inline: Vec<IrInline>,
}

impl IrDocument {
    /// Returns every type projection that had no entry in the type table, in source order
    pub fn unresolved_types(&self) -> Vec<&TypeProjection> {
        let mut unresolved = Vec::new();
        for node in &self.nodes {
            node.collect_types(&mut unresolved);
        }
        unresolved.retain(|projection| !projection.resolved);
        unresolved
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A block of foreign code, handed on to whatever runs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrInline {
    pub lang: Ident,
    pub code: String,
    /// Inline blocks are always embedded into the generated code
    pub embed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IrNode {
    /// A variable or a function parameter. Parameters use `expr` for their default value.
    Var {
        name: Ident,
        typ: Option<TypeProjection>,
        expr: Option<IrExpr>,
    },
    Func {
        name: Ident,
        #[serde(rename = "async")]
        is_async: bool,
        params: Vec<IrNode>,
        body: Vec<IrNode>,
        ret: Option<IrExpr>,
    },
    Macro {
        name: Ident,
        body: String,
    },
    Match {
        expr: IrExpr,
        cases: Vec<IrCase>,
    },
    Pattern {
        kind: &'static str,
        pattern: IrPattern,
        expr: IrExpr,
    },
    Import {
        path: String,
    },
    Decorator {
        name: Ident,
        target: Box<IrNode>,
    },
    Inline {
        lang: Ident,
        code: String,
    },
    If {
        cond: IrExpr,
        body: Vec<IrNode>,
    },
    Loop {
        var: Ident,
        start: IrExpr,
        end: IrExpr,
        body: Vec<IrNode>,
    },
    Expr {
        expr: IrExpr,
    },
}

impl IrNode {
    fn collect_types<'a>(&'a self, types: &mut Vec<&'a TypeProjection>) {
        match self {
            IrNode::Var { typ, .. } => types.extend(typ),
            IrNode::Func { params, body, .. } => {
                for node in params.iter().chain(body) {
                    node.collect_types(types);
                }
            }
            IrNode::Match { cases, .. } => {
                for case in cases {
                    case.consequent.collect_types(types);
                }
            }
            IrNode::Decorator { target, .. } => target.collect_types(types),
            IrNode::If { body, .. } | IrNode::Loop { body, .. } => {
                for node in body {
                    node.collect_types(types);
                }
            }
            IrNode::Macro { .. }
            | IrNode::Pattern { .. }
            | IrNode::Import { .. }
            | IrNode::Inline { .. }
            | IrNode::Expr { .. } => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrCase {
    pub pattern: IrPattern,
    pub consequent: IrNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IrPattern {
    Var { name: Ident },
    Literal { value: IrExpr },
    Tuple { parts: Vec<IrPattern> },
    List { parts: Vec<IrPattern> },
    Dict { parts: Vec<IrDictPattern> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrDictPattern {
    pub key: IrExpr,
    pub pattern: IrPattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IrExpr {
    Ident {
        name: Ident,
    },
    Int {
        value: i64,
    },
    String {
        value: String,
    },
    List {
        items: Vec<IrExpr>,
    },
    Dict {
        entries: Vec<IrDictEntry>,
    },
    Call {
        callee: Ident,
        args: Vec<IrExpr>,
    },
    Await {
        expr: Box<IrExpr>,
    },
    Binary {
        op: &'static str,
        lhs: Box<IrExpr>,
        rhs: Box<IrExpr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrDictEntry {
    pub key: IrExpr,
    pub value: IrExpr,
}
