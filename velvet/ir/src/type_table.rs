//! The catalog of velvet types and their spelling in every target language

use std::fmt;

use serde::Serialize;
use velvet_common::FxIndexMap;
use velvet_parser::ast::Type;

/// Every language the ir can be turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    Rust,
    Python,
    Go,
    Crystal,
    Ruby,
    C,
    Cpp,
    Csharp,
    Julia,
    Zig,
    Lua,
    Java,
    Javascript,
    Shell,
    Powershell,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 15] = [
        TargetLanguage::Rust,
        TargetLanguage::Python,
        TargetLanguage::Go,
        TargetLanguage::Crystal,
        TargetLanguage::Ruby,
        TargetLanguage::C,
        TargetLanguage::Cpp,
        TargetLanguage::Csharp,
        TargetLanguage::Julia,
        TargetLanguage::Zig,
        TargetLanguage::Lua,
        TargetLanguage::Java,
        TargetLanguage::Javascript,
        TargetLanguage::Shell,
        TargetLanguage::Powershell,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TargetLanguage::Rust => "rust",
            TargetLanguage::Python => "python",
            TargetLanguage::Go => "go",
            TargetLanguage::Crystal => "crystal",
            TargetLanguage::Ruby => "ruby",
            TargetLanguage::C => "c",
            TargetLanguage::Cpp => "cpp",
            TargetLanguage::Csharp => "csharp",
            TargetLanguage::Julia => "julia",
            TargetLanguage::Zig => "zig",
            TargetLanguage::Lua => "lua",
            TargetLanguage::Java => "java",
            TargetLanguage::Javascript => "javascript",
            TargetLanguage::Shell => "shell",
            TargetLanguage::Powershell => "powershell",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The spellings of one velvet type, in the order of [`TargetLanguage::ALL`]
type Spellings = [&'static str; 15];

/// `(base, template, spellings)`
///
/// Generic parameters stay as placeholders (`T`, `K`, `V`, ...), they are never substituted.
const STANDARD_TYPES: [(&str, &str, Spellings); 6] = [
    (
        "int",
        "int",
        [
            "i32", "int", "int", "Int32", "Integer", "int", "int", "int", "Int", "i32", "number",
            "int", "number", "int", "int",
        ],
    ),
    (
        "str",
        "str",
        [
            "&str",
            "str",
            "string",
            "String",
            "String",
            "char*",
            "std::string",
            "string",
            "String",
            "[]const u8",
            "string",
            "String",
            "string",
            "string",
            "string",
        ],
    ),
    (
        "list",
        "list<T>",
        [
            "Vec<T>",
            "list",
            "[]T",
            "Array(T)",
            "Array",
            "array",
            "std::vector<T>",
            "List<T>",
            "Vector{T}",
            "[]T",
            "table",
            "List<T>",
            "array",
            "array",
            "array",
        ],
    ),
    (
        "map",
        "map<K,V>",
        [
            "HashMap<K,V>",
            "dict",
            "map[K]V",
            "Hash(K,V)",
            "Hash",
            "map",
            "std::map<K,V>",
            "Dictionary<K,V>",
            "Dict{K,V}",
            "std.HashMap(K,V)",
            "table",
            "Map<K,V>",
            "object",
            "assoc",
            "hashtable",
        ],
    ),
    (
        "set",
        "set<T>",
        [
            "HashSet<T>",
            "set",
            "map[T]struct{}",
            "Set(T)",
            "Set",
            "set",
            "std::set<T>",
            "HashSet<T>",
            "Set{T}",
            "std.HashSet(T)",
            "table",
            "Set<T>",
            "Set",
            "set",
            "hashset",
        ],
    ),
    (
        "tuple",
        "tuple<T1,T2>",
        [
            "(T1,T2)",
            "tuple",
            "struct{T1;T2}",
            "Tuple(T1,T2)",
            "Array",
            "struct",
            "std::tuple<T1,T2>",
            "Tuple<T1,T2>",
            "Tuple{T1,T2}",
            "struct {T1, T2}",
            "table",
            "Pair<T1,T2>",
            "array",
            "array",
            "array",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// The key of this entry as it is written in the catalog, like `map<K,V>`
    pub template: &'static str,
    spellings: Spellings,
}

impl TypeEntry {
    pub fn spelling(&self, language: TargetLanguage) -> &'static str {
        self.spellings[language as usize]
    }
}

/// Maps base type names to their spelling in every [`TargetLanguage`]
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: FxIndexMap<&'static str, TypeEntry>,
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable {
            entries: STANDARD_TYPES
                .iter()
                .map(|&(base, template, spellings)| {
                    (
                        base,
                        TypeEntry {
                            template,
                            spellings,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl TypeTable {
    pub fn get(&self, base: &str) -> Option<&TypeEntry> {
        self.entries.get(base)
    }

    pub fn contains(&self, base: &str) -> bool {
        self.entries.contains_key(base)
    }

    /// Projects a declared type onto every target language.
    ///
    /// Only the base name is looked up. Unknown base names are used verbatim
    /// for every language and the projection is marked as unresolved.
    pub fn project(&self, ty: &Type) -> TypeProjection {
        let base = ty.base.as_str();
        let (template, resolved, targets) = match self.get(base) {
            Some(entry) => (
                entry.template.to_string(),
                true,
                TargetLanguage::ALL
                    .iter()
                    .map(|&language| (language, entry.spelling(language).to_string()))
                    .collect(),
            ),
            None => (
                base.to_string(),
                false,
                TargetLanguage::ALL
                    .iter()
                    .map(|&language| (language, base.to_string()))
                    .collect(),
            ),
        };

        TypeProjection {
            name: ty.to_string(),
            template,
            resolved,
            targets,
        }
    }
}

/// A declared type together with its spelling in every target language
///
/// Serializes to a flat object, so `typ.rust` is the rust spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeProjection {
    /// The declared type, like `map<int,str>`
    pub name: String,
    /// The catalog entry that was used, or the base name if there was none
    pub template: String,
    pub resolved: bool,
    #[serde(flatten)]
    pub targets: FxIndexMap<TargetLanguage, String>,
}

impl TypeProjection {
    pub fn get(&self, language: TargetLanguage) -> &str {
        self.targets.get(&language).map_or("", String::as_str)
    }
}
