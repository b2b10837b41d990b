//! Common items used by every stage of the velvet front-end

pub mod file_provider;
mod ident;

pub use ident::Ident;

mod input_file;
pub use input_file::{Code, CodeId, InputFiles};

mod span;
pub use span::Span;

mod compile_context;
pub use compile_context::CompileContext;

mod config;
pub use config::Config;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
