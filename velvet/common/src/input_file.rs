use std::path::PathBuf;

/// Identifies one [`Code`] inside of [`InputFiles`]
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy, Ord, PartialOrd)]
pub struct CodeId(pub usize);

#[derive(Debug, Eq, PartialEq, Hash)]
pub struct Code {
    pub source: Box<str>,
    pub path: Option<PathBuf>,
}

/// Stores every text the compiler has seen, so that errors can be rendered later
///
/// Macro expansion produces new text, which is stored as its own entry.
#[derive(Debug, Default)]
pub struct InputFiles {
    input_files: Vec<Code>,
}

impl InputFiles {
    pub fn add_input(&mut self, code: Code) -> CodeId {
        let id = CodeId(self.input_files.len());
        self.input_files.push(code);
        id
    }

    pub fn get_input(&self, CodeId(id): CodeId) -> &Code {
        &self.input_files[id]
    }

    pub fn len(&self) -> usize {
        self.input_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_files.is_empty()
    }
}
