use std::path::PathBuf;

use thiserror::Error;
use velvet_common::Span;

/// An error which gets thrown after parsing succeeded
///
/// Contains a more specific [`LangErrorKind`]
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct LangError {
    /// The specific error
    pub kind: LangErrorKind,
    pub span: Span,
}

impl LangError {
    pub fn new(kind: LangErrorKind, span: Span) -> Self {
        LangError { kind, span }
    }
}

/// Specifies a specific error reason
#[derive(Debug, Eq, PartialEq, Clone, Error)]
pub enum LangErrorKind {
    #[error("could not find module `{}`", .path.display())]
    MissingModule { path: PathBuf },
    #[error("module `{}` imports itself", .module.display())]
    CircularImport { module: PathBuf },
    #[error("type `{name}` has no entry in the type table")]
    UnresolvedType { name: String },
}

impl LangErrorKind {
    pub(crate) fn help(&self) -> Option<String> {
        match self {
            LangErrorKind::MissingModule { .. } => {
                Some("Import paths are relative to the importing file".to_string())
            }
            LangErrorKind::CircularImport { .. } => None,
            LangErrorKind::UnresolvedType { .. } => Some(
                "Known types are int, str, list<T>, map<K,V>, set<T> and tuple<...>".to_string(),
            ),
        }
    }
}
