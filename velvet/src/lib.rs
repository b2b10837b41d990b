//! The velvet front-end.
//!
//! [`CompileConfig`] drives a file through every stage:
//! The file is macro expanded and parsed by [`velvet_parser`], its imports are resolved
//! through a [`FileProvider`](velvet_common::file_provider::FileProvider),
//! and [`velvet_ir`] turns the ast into an ir with types for every target language.

pub use velvet_common as common;
pub use velvet_error as error;
pub use velvet_ir as ir;
pub use velvet_parser as parser;

mod compile_config;

pub use compile_config::{CompileConfig, Module};
