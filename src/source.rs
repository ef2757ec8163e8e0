//! Loaded source files and the arena tokens point back into.
//!
//! Tokens never own their file. They carry a [`SourceId`] that indexes into a
//! [`SourceMap`]; when a file is evicted from the map, locations for its tokens
//! are still printable but lose the path component.

use crate::token::Token;
use std::io;
use std::path::{Path, PathBuf};

/// Index of a file inside a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One source file: its path and full text.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    contents: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            contents: contents.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn string_contents(&self) -> &str {
        &self.contents
    }
}

/// Arena of loaded files. Slots are never reused, so a stale [`SourceId`]
/// resolves to "unknown" rather than to a different file.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<Option<SourceFile>>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> SourceId {
        self.files.push(Some(SourceFile::new(path, contents)));
        SourceId(self.files.len() - 1)
    }

    /// Read a file from disk and add it to the map.
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<SourceId> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::debug!("loaded {} ({} bytes)", path.display(), contents.len());
        Ok(self.insert(path, contents))
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.get(id.0).and_then(Option::as_ref)
    }

    /// Release a file's text. Tokens referring to it keep their line/offset.
    pub fn evict(&mut self, id: SourceId) -> Option<SourceFile> {
        self.files.get_mut(id.0).and_then(Option::take)
    }

    pub fn len(&self) -> usize {
        self.files.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `path:line:offset`, or `line:offset` when the token has no live source.
    pub fn location(&self, token: &Token) -> String {
        match token.source().and_then(|id| self.get(id)) {
            Some(file) => format!("{}:{}:{}", file.path().display(), token.line(), token.offset()),
            None => format!("{}:{}", token.line(), token.offset()),
        }
    }
}
