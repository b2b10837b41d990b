use std::ops::ControlFlow;

use crate::ast;

pub type AstFlow = ControlFlow<()>;

/// Visits the items of an [`ast::Ast`] in source order.
///
/// Returning [`ControlFlow::Break`] stops the whole walk.
pub trait AstVisitor {
    #[must_use]
    fn visit_node(&mut self, #[allow(unused)] node: &ast::Node) -> AstFlow {
        ControlFlow::Continue(())
    }
    #[must_use]
    fn visit_param(&mut self, #[allow(unused)] param: &ast::Param) -> AstFlow {
        ControlFlow::Continue(())
    }
    #[must_use]
    fn visit_type(&mut self, #[allow(unused)] ty: &ast::Type) -> AstFlow {
        ControlFlow::Continue(())
    }
    #[must_use]
    fn visit_pattern(&mut self, #[allow(unused)] pattern: &ast::Pattern) -> AstFlow {
        ControlFlow::Continue(())
    }
    #[must_use]
    fn visit_expr(&mut self, #[allow(unused)] expr: &ast::Expr) -> AstFlow {
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use std::ops::ControlFlow;

    use super::{AstFlow, AstVisitor};
    use crate::{ast, parse};

    #[derive(Default)]
    struct Collector {
        types: Vec<String>,
        idents: Vec<String>,
    }

    impl AstVisitor for Collector {
        fn visit_type(&mut self, ty: &ast::Type) -> AstFlow {
            self.types.push(ty.to_string());
            ControlFlow::Continue(())
        }

        fn visit_expr(&mut self, expr: &ast::Expr) -> AstFlow {
            if let ast::ExprKind::Ident(ident) = &expr.kind {
                self.idents.push(ident.to_string());
            }
            ControlFlow::Continue(())
        }
    }

    #[test]
    fn visits_nested_items() {
        let ast = parse(
            "@log !f(~a: list<int>, ~b: str = c) {\n  ?a > b { ~d: widget = e; };\n  ^a;\n};",
        )
        .unwrap();
        let mut collector = Collector::default();
        ast.visit(&mut collector);

        assert_eq!(collector.types, vec!["list<int>", "int", "str", "widget"]);
        assert_eq!(collector.idents, vec!["c", "a", "b", "e", "a"]);
    }

    #[test]
    fn break_stops_the_walk() {
        struct FirstVar(usize);
        impl AstVisitor for FirstVar {
            fn visit_node(&mut self, node: &ast::Node) -> AstFlow {
                self.0 += 1;
                match node {
                    ast::Node::Var(_) => ControlFlow::Break(()),
                    _ => ControlFlow::Continue(()),
                }
            }
        }

        let ast = parse("print(1);\n~x = 1;\n~y = 2;").unwrap();
        let mut visitor = FirstVar(0);
        ast.visit(&mut visitor);
        assert_eq!(visitor.0, 2);
    }
}
