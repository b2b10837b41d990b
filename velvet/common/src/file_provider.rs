//! This module has the [`FileProvider`] trait, which is used by the compile config to resolve import statements.

use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;

pub trait FileProvider {
    /// Gets the contents of the file with the specified path
    fn read_file(&self, path: &Path) -> Option<Box<str>>;
}

impl<T, U> FileProvider for T
where
    T: Deref<Target = U>,
    U: FileProvider + ?Sized,
{
    fn read_file(&self, path: &Path) -> Option<Box<str>> {
        self.deref().read_file(path)
    }
}

/// A [`FileProvider`] implementation that reads files from the file system
#[derive(Debug, Default)]
pub struct FsFileProvider {
    pub root: PathBuf,
}

impl FsFileProvider {
    pub fn new(root: PathBuf) -> Self {
        FsFileProvider { root }
    }
}

impl FileProvider for FsFileProvider {
    fn read_file(&self, path: &Path) -> Option<Box<str>> {
        std::fs::read_to_string(self.root.join(path))
            .ok()
            .map(String::into_boxed_str)
    }
}

/// A [`FileProvider`] implementation that has an in-memory pool of files
#[derive(Debug, Default)]
pub struct MemoryFileProvider {
    files: FxHashMap<PathBuf, Box<str>>,
}

impl MemoryFileProvider {
    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<Box<str>>) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileProvider for MemoryFileProvider {
    fn read_file(&self, path: &Path) -> Option<Box<str>> {
        self.files.get(path).cloned()
    }
}
