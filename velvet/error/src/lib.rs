//! Error handling for the velvet front-end
//!
//! Exports the default Result type, which is used by the driver.
//! Parsing functions return [`ParseError`] directly, because they do not know
//! which input file they are working on.
use std::fmt::{self, Display, Formatter};

use velvet_common::{CodeId, InputFiles};

pub use lang_error::{LangError, LangErrorKind};
pub use parse_error::{Arity, ParseError};

mod lang_error;
mod parse_error;
mod snippet;
mod utils;

pub use utils::display_expected_of_any;

/// Used to determine whether the error messages should use console colors
/// Or be plain text
pub const COLORED: bool = cfg!(feature = "colored_errors");

/// The result type used by the driver
pub type Result<T> = std::result::Result<T, CompileError>;

/// The result type used by the lexer, the macro expander and the parser
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A Compile Error
///
/// Every error remembers the input file its span refers to,
/// so that a rust-style error message can be printed.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum CompileError {
    /// An error which happens when lexing, expanding or parsing the input
    ParseError { code: CodeId, error: ParseError },
    /// An error which happens when loading modules or generating the ir
    LangError { code: CodeId, error: LangError },
}

impl CompileError {
    pub fn code(&self) -> CodeId {
        match self {
            CompileError::ParseError { code, .. } | CompileError::LangError { code, .. } => *code,
        }
    }

    /// Renders this error with a snippet of the code it refers to
    pub fn format(&self, input_files: &InputFiles) -> String {
        let code = input_files.get_input(self.code());
        match self {
            CompileError::ParseError { error, .. } => snippet::render(
                code,
                "Parse",
                "Parsing error",
                error.span(),
                &error.to_string(),
                error.help(),
            ),
            CompileError::LangError { error, .. } => snippet::render(
                code,
                "Lang",
                "Compilation error",
                error.span,
                &error.kind.to_string(),
                error.kind.help(),
            ),
        }
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::ParseError { error, .. } => write!(f, "Parsing error: {error}"),
            CompileError::LangError { error, .. } => write!(f, "Compilation error: {}", error.kind),
        }
    }
}

impl std::error::Error for CompileError {}
