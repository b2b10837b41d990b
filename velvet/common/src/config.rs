/// Specifies how a file is compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether a type that is missing from the type table fails the compilation.
    /// If false, such types are passed through verbatim and only flagged in the ir.
    pub strict_types: bool,
    /// Whether `import` statements are resolved and the imported modules parsed
    pub load_imports: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict_types: false,
            load_imports: true,
        }
    }
}
