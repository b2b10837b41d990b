//! Turns a parsed velvet [`Ast`](velvet_parser::ast::Ast) into a language agnostic ir
//!
//! Declared types are projected onto every [`TargetLanguage`] with the [`TypeTable`].

mod generator;
pub mod ir_nodes;
pub mod type_table;

pub use generator::{generate, IrGenerator};
pub use ir_nodes::{IrDocument, IrExpr, IrInline, IrNode, IrPattern};
pub use type_table::{TargetLanguage, TypeProjection, TypeTable};
