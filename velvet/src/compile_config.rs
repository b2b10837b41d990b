use std::{
    ops::ControlFlow,
    path::{Component, Path, PathBuf},
};

use indexmap::IndexMap;
use tracing::{debug, trace};
use velvet_common::{file_provider::FileProvider, Code, CodeId, CompileContext, Span};
use velvet_error::{CompileError, LangError, LangErrorKind, Result};
use velvet_ir::{IrDocument, IrGenerator, TypeTable};
use velvet_parser::{
    ast::{self, Ast},
    ast_visitor::{AstFlow, AstVisitor},
    expand_source, extract_inline, parse_expanded, MacroTable, TextualExpander,
};

/// A parsed file
#[derive(Debug)]
pub struct Module {
    /// The raw text of this module
    pub code: CodeId,
    /// The text the spans of `ast` refer to.
    /// This is the macro expanded text if expansion changed anything, else the same as `code`.
    pub expanded: CodeId,
    pub ast: Ast,
}

pub struct CompileConfig {
    pub compile_context: CompileContext,
    pub file_provider: Box<dyn FileProvider>,
    pub type_table: TypeTable,
    /// Every imported module by its normalized path, imported modules before their importers
    modules: IndexMap<PathBuf, Module>,
}

impl CompileConfig {
    pub fn new(file_provider: Box<dyn FileProvider>) -> Self {
        CompileConfig {
            compile_context: CompileContext::default(),
            file_provider,
            type_table: TypeTable::default(),
            modules: IndexMap::new(),
        }
    }

    /// Reads the file at `path` from the file provider, returns `None` if it does not exist
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Option<CodeId> {
        let path = path.into();
        let source = self.file_provider.read_file(&path)?;
        Some(self.compile_context.add_input_file(Code {
            source,
            path: Some(path),
        }))
    }

    /// Expands and parses a single file with its own macro table.
    ///
    /// If expansion changed the text, the expanded text is stored as a new input file,
    /// so that syntax errors can point into it.
    pub fn parse_file(&mut self, code: CodeId) -> Result<Module> {
        let input = self.compile_context.get_input_file(code);
        let source = input.source.clone();
        let path = input.path.clone();

        let mut macros = MacroTable::default();
        let expanded_source = expand_source(&source, &mut macros, &TextualExpander)
            .map_err(|error| CompileError::ParseError { code, error })?;
        let expanded = if expanded_source.as_str() == &*source {
            code
        } else {
            self.compile_context.add_input_file(Code {
                source: expanded_source.clone().into_boxed_str(),
                path,
            })
        };

        let mut ast = parse_expanded(&expanded_source).map_err(|error| CompileError::ParseError {
            code: expanded,
            error,
        })?;
        ast.inline =
            extract_inline(&source).map_err(|error| CompileError::ParseError { code, error })?;

        debug!(
            macros = macros.len(),
            nodes = ast.nodes.len(),
            inline = ast.inline.len(),
            "parsed file"
        );
        Ok(Module {
            code,
            expanded,
            ast,
        })
    }

    /// Loads every module that `module` imports, and their imports in turn.
    ///
    /// Import paths are relative to the importing file.
    /// Each module is parsed only once, even if it is imported by multiple files.
    pub fn load_imports(&mut self, module: &Module) -> Result<()> {
        let mut stack = Vec::new();
        if let Some(path) = &self.compile_context.get_input_file(module.code).path {
            stack.push(normalize(path));
        }
        self.load_imports_of(module, &mut stack)
    }

    /// `stack` contains the paths of every module that is currently being loaded
    fn load_imports_of(&mut self, module: &Module, stack: &mut Vec<PathBuf>) -> Result<()> {
        let directory = self
            .compile_context
            .get_input_file(module.code)
            .path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        for import in module.ast.import_paths() {
            let path = normalize(&directory.join(&import.path));
            let lang_error = |kind| CompileError::LangError {
                code: module.expanded,
                error: LangError::new(kind, import.span),
            };

            if stack.contains(&path) {
                return Err(lang_error(LangErrorKind::CircularImport { module: path }));
            }
            if self.modules.contains_key(&path) {
                trace!(path = %path.display(), "module already loaded");
                continue;
            }

            let Some(code) = self.add_file(path.clone()) else {
                return Err(lang_error(LangErrorKind::MissingModule { path }));
            };
            let imported = self.parse_file(code)?;

            stack.push(path.clone());
            self.load_imports_of(&imported, stack)?;
            stack.pop();

            debug!(path = %path.display(), "loaded module");
            self.modules.insert(path, imported);
        }

        Ok(())
    }

    /// The loaded modules, every module comes after the modules it imports
    pub fn modules(&self) -> impl Iterator<Item = (&Path, &Module)> {
        self.modules
            .iter()
            .map(|(path, module)| (path.as_path(), module))
    }

    pub fn get_module(&self, path: &Path) -> Option<&Module> {
        self.modules.get(&normalize(path))
    }

    /// Fails on the first type, in source order, that has no entry in the type table.
    ///
    /// Generic parameters are checked too.
    pub fn check_types(&self, module: &Module) -> Result<()> {
        let mut finder = UnresolvedTypeFinder {
            table: &self.type_table,
            found: None,
        };
        module.ast.visit(&mut finder);

        match finder.found {
            Some((span, name)) => Err(CompileError::LangError {
                code: module.expanded,
                error: LangError::new(LangErrorKind::UnresolvedType { name }, span),
            }),
            None => Ok(()),
        }
    }

    /// Generates the ir of `module`.
    ///
    /// With [`strict_types`](velvet_common::Config::strict_types) set, unresolved types are an error.
    pub fn compute_ir(&self, module: &Module) -> Result<IrDocument> {
        if self.compile_context.config.strict_types {
            self.check_types(module)?;
        }
        Ok(IrGenerator::new(&self.type_table).generate(&module.ast))
    }

    /// Parses the file `code`, loads its imports if configured and generates its ir
    pub fn compile(&mut self, code: CodeId) -> Result<IrDocument> {
        let module = self.parse_file(code)?;

        if self.compile_context.config.load_imports {
            self.load_imports(&module)?;
            if self.compile_context.config.strict_types {
                for imported in self.modules.values() {
                    self.check_types(imported)?;
                }
            }
        }

        self.compute_ir(&module)
    }
}

struct UnresolvedTypeFinder<'a> {
    table: &'a TypeTable,
    found: Option<(Span, String)>,
}

impl AstVisitor for UnresolvedTypeFinder<'_> {
    fn visit_type(&mut self, ty: &ast::Type) -> AstFlow {
        if self.table.contains(ty.base.as_str()) {
            ControlFlow::Continue(())
        } else {
            self.found = Some((ty.span, ty.base.to_string()));
            ControlFlow::Break(())
        }
    }
}

/// Removes `.` and resolves `..` without touching the file system,
/// so that every file has exactly one key
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::normalize;

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize(Path::new("./a/b.vel")), PathBuf::from("a/b.vel"));
        assert_eq!(normalize(Path::new("a/../b.vel")), PathBuf::from("b.vel"));
        assert_eq!(normalize(Path::new("a/./c/../b.vel")), PathBuf::from("a/b.vel"));
        assert_eq!(normalize(Path::new("../../b.vel")), PathBuf::from("../../b.vel"));
    }
}
