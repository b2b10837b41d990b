use tracing::{debug, warn};
use velvet_parser::ast::{Ast, Expr, ExprKind, Node, Param, Pattern, PatternKind, Type};

use crate::{
    ir_nodes::{IrCase, IrDictEntry, IrDictPattern, IrDocument, IrExpr, IrInline, IrNode, IrPattern},
    type_table::{TypeProjection, TypeTable},
};

/// Generates the ir of `ast` with the standard type table
pub fn generate(ast: &Ast) -> IrDocument {
    IrGenerator::new(&TypeTable::default()).generate(ast)
}

/// Converts an [`Ast`] into an [`IrDocument`]
///
/// The ast is only read, so generating twice yields the same document.
#[derive(Debug, Clone, Copy)]
pub struct IrGenerator<'a> {
    table: &'a TypeTable,
}

impl<'a> IrGenerator<'a> {
    pub fn new(table: &'a TypeTable) -> Self {
        IrGenerator { table }
    }

    pub fn generate(&self, ast: &Ast) -> IrDocument {
        let document = IrDocument {
            deps: ast.deps.iter().map(|dep| dep.name.clone()).collect(),
            imports: ast.imports.iter().map(|import| import.path.clone()).collect(),
            nodes: self.nodes(&ast.nodes),
            inline: ast
                .inline
                .iter()
                .map(|block| IrInline {
                    lang: block.lang.clone(),
                    code: block.code.clone(),
                    embed: true,
                })
                .collect(),
        };

        debug!(
            nodes = document.nodes.len(),
            inline = document.inline.len(),
            "generated ir"
        );
        document
    }

    fn nodes(&self, nodes: &[Node]) -> Vec<IrNode> {
        nodes.iter().map(|node| self.node(node)).collect()
    }

    fn node(&self, node: &Node) -> IrNode {
        match node {
            Node::Var(var) => IrNode::Var {
                name: var.name.clone(),
                typ: var.ty.as_ref().map(|ty| self.projection(ty)),
                expr: Some(expr(&var.value)),
            },
            Node::Func(func) => IrNode::Func {
                name: func.name.clone(),
                is_async: func.is_async,
                params: func.params.iter().map(|param| self.param(param)).collect(),
                body: self.nodes(&func.body),
                ret: func.ret.as_ref().map(expr),
            },
            Node::Macro(m) => IrNode::Macro {
                name: m.name.clone(),
                body: m.body.clone(),
            },
            Node::Match(m) => IrNode::Match {
                expr: expr(&m.scrutinee),
                cases: m
                    .cases
                    .iter()
                    .map(|case| IrCase {
                        pattern: pattern(&case.pattern),
                        consequent: self.node(&case.consequent),
                    })
                    .collect(),
            },
            Node::Pattern(destructure) => IrNode::Pattern {
                kind: destructure.pattern.kind.name(),
                pattern: pattern(&destructure.pattern),
                expr: expr(&destructure.value),
            },
            Node::Import(import) => IrNode::Import {
                path: import.path.clone(),
            },
            Node::Decorator(decorator) => IrNode::Decorator {
                name: decorator.name.clone(),
                target: Box::new(self.node(&decorator.target)),
            },
            Node::Inline(inline) => IrNode::Inline {
                lang: inline.lang.clone(),
                code: inline.code.clone(),
            },
            Node::If(branch) => IrNode::If {
                cond: expr(&branch.condition),
                body: self.nodes(&branch.body),
            },
            Node::Loop(lp) => IrNode::Loop {
                var: lp.var.clone(),
                start: expr(&lp.start),
                end: expr(&lp.end),
                body: self.nodes(&lp.body),
            },
            Node::Expr(value) => IrNode::Expr { expr: expr(value) },
        }
    }

    /// Parameters have the same shape as variables
    fn param(&self, param: &Param) -> IrNode {
        IrNode::Var {
            name: param.name.clone(),
            typ: param.ty.as_ref().map(|ty| self.projection(ty)),
            expr: param.default.as_ref().map(expr),
        }
    }

    fn projection(&self, ty: &Type) -> TypeProjection {
        let projection = self.table.project(ty);
        if !projection.resolved {
            warn!(name = %projection.name, "type has no entry in the type table");
        }
        projection
    }
}

fn expr(value: &Expr) -> IrExpr {
    match &value.kind {
        ExprKind::Ident(name) => IrExpr::Ident { name: name.clone() },
        ExprKind::Int(value) => IrExpr::Int { value: *value },
        ExprKind::String(value) => IrExpr::String {
            value: value.clone(),
        },
        ExprKind::List(items) => IrExpr::List {
            items: items.iter().map(expr).collect(),
        },
        ExprKind::Dict(entries) => IrExpr::Dict {
            entries: entries
                .iter()
                .map(|(key, value)| IrDictEntry {
                    key: expr(key),
                    value: expr(value),
                })
                .collect(),
        },
        ExprKind::Call { callee, args } => IrExpr::Call {
            callee: callee.clone(),
            args: args.iter().map(expr).collect(),
        },
        ExprKind::Await(inner) => IrExpr::Await {
            expr: Box::new(expr(inner)),
        },
        ExprKind::Binary { operator, lhs, rhs } => IrExpr::Binary {
            op: operator.symbol(),
            lhs: Box::new(expr(lhs)),
            rhs: Box::new(expr(rhs)),
        },
    }
}

fn pattern(value: &Pattern) -> IrPattern {
    match &value.kind {
        PatternKind::Var(name) => IrPattern::Var { name: name.clone() },
        PatternKind::Literal(literal) => IrPattern::Literal {
            value: expr(literal),
        },
        PatternKind::Tuple(parts) => IrPattern::Tuple {
            parts: parts.iter().map(pattern).collect(),
        },
        PatternKind::List(parts) => IrPattern::List {
            parts: parts.iter().map(pattern).collect(),
        },
        PatternKind::Dict(parts) => IrPattern::Dict {
            parts: parts
                .iter()
                .map(|(key, value)| IrDictPattern {
                    key: expr(key),
                    pattern: pattern(value),
                })
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use velvet_parser::parse;

    use super::generate;
    use crate::{type_table::TargetLanguage, IrDocument};

    fn ir(input: &str) -> IrDocument {
        generate(&parse(input).unwrap())
    }

    fn ir_json(input: &str) -> Value {
        serde_json::to_value(ir(input)).unwrap()
    }

    #[test]
    fn var_type_is_projected() {
        let json = ir_json("~x: int = 5;");
        let node = &json["nodes"][0];
        assert_eq!(node["type"], "var");
        assert_eq!(node["name"], "x");
        assert_eq!(node["typ"]["rust"], "i32");
        assert_eq!(node["typ"]["python"], "int");
        assert_eq!(node["typ"]["go"], "int");
        assert_eq!(node["typ"]["java"], "int");
        assert_eq!(node["typ"]["resolved"], true);
        assert_eq!(node["expr"], json!({"kind": "int", "value": 5}));
    }

    #[test]
    fn unknown_type_is_unresolved() {
        let document = ir("~w: widget = make();\n~n: int = 1;");
        let unresolved = document.unresolved_types();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].name, "widget");
        assert!(TargetLanguage::ALL
            .iter()
            .all(|&language| unresolved[0].get(language) == "widget"));

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["nodes"][0]["typ"]["resolved"], false);
        assert_eq!(json["nodes"][0]["typ"]["powershell"], "widget");
    }

    #[test]
    fn unresolved_types_in_nested_nodes() {
        let document = ir("@cached !f(~a: gadget) {\n  ?a > 1 { ~b: widget = a; };\n};");
        let names: Vec<&str> = document
            .unresolved_types()
            .iter()
            .map(|projection| projection.name.as_str())
            .collect();
        assert_eq!(names, vec!["gadget", "widget"]);
    }

    #[test]
    fn generation_is_idempotent() {
        let ast = parse("<std>\nimport \"a.vel\";\n~x: map<int,str> = {};\nmatch x { 1 => y, _ => z };")
            .unwrap();
        let first = generate(&ast);
        let second = generate(&ast);
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn async_function() {
        let json = ir_json("async !f(~a: str, ~b = 2){ ^1 };");
        let node = &json["nodes"][0];
        assert_eq!(node["type"], "func");
        assert_eq!(node["async"], true);
        assert_eq!(node["ret"]["value"], 1);
        assert_eq!(node["params"][0]["type"], "var");
        assert_eq!(node["params"][0]["typ"]["rust"], "&str");
        assert_eq!(node["params"][0]["expr"], Value::Null);
        assert_eq!(node["params"][1]["expr"]["value"], 2);
    }

    #[test]
    fn match_cases() {
        let json = ir_json("match x { 1 => y, _ => z };");
        let node = &json["nodes"][0];
        assert_eq!(node["type"], "match");
        assert_eq!(node["cases"].as_array().unwrap().len(), 2);
        assert_eq!(node["cases"][0]["pattern"]["kind"], "literal");
        assert_eq!(node["cases"][1]["pattern"], json!({"kind": "var", "name": "_"}));
        assert_eq!(node["cases"][1]["consequent"]["type"], "expr");
    }

    #[test]
    fn header_and_inline() {
        let json = ir_json(
            "import \"util.vel\";\n<std>\n#python { print(1) }\n#shell { echo 2 };",
        );
        assert_eq!(json["deps"], json!(["std"]));
        assert_eq!(json["imports"], json!(["util.vel"]));
        assert_eq!(
            json["inline"],
            json!([
                {"lang": "python", "code": " print(1) ", "embed": true},
                {"lang": "shell", "code": " echo 2 ", "embed": true},
            ])
        );
        assert_eq!(json["nodes"][0]["type"], "inline");
    }

    #[test]
    fn statement_shapes() {
        let document = ir("let (a, [b]) = c;\n*i = 0..3 { ? i > 1 { }; };\n!macro m { 1 };");
        let rendered = document
            .nodes
            .iter()
            .map(|node| serde_json::to_string(node).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        expect![[r#"
            {"type":"pattern","kind":"tuple","pattern":{"kind":"tuple","parts":[{"kind":"var","name":"a"},{"kind":"list","parts":[{"kind":"var","name":"b"}]}]},"expr":{"kind":"ident","name":"c"}}
            {"type":"loop","var":"i","start":{"kind":"int","value":0},"end":{"kind":"int","value":3},"body":[{"type":"if","cond":{"kind":"binary","op":">","lhs":{"kind":"ident","name":"i"},"rhs":{"kind":"int","value":1}},"body":[]}]}
            {"type":"macro","name":"m","body":"1"}"#]]
        .assert_eq(&rendered);
    }
}
