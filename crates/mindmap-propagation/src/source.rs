//! Read access to the source text the graph was built from

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where the engine reads file contents from, keyed by root-relative path.
pub trait SourceProvider {
    /// `None` when the file is missing or unreadable.
    fn read(&self, path: &str) -> Option<String>;
}

/// Reads files under a project root.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceProvider for FsSource {
    fn read(&self, path: &str) -> Option<String> {
        match std::fs::read_to_string(self.root.join(path)) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Cannot read {}: {}", path, e);
                None
            }
        }
    }
}

/// In-memory sources, path → contents.
impl SourceProvider for HashMap<String, String> {
    fn read(&self, path: &str) -> Option<String> {
        self.get(path).cloned()
    }
}

/// Per-analysis cache of split files.
pub(crate) struct SourceCache<'a> {
    provider: &'a dyn SourceProvider,
    files: HashMap<String, Option<Vec<String>>>,
}

impl<'a> SourceCache<'a> {
    pub(crate) fn new(provider: &'a dyn SourceProvider) -> Self {
        SourceCache {
            provider,
            files: HashMap::new(),
        }
    }

    /// Lines of `path` without terminators. Empty if the file cannot be read.
    pub(crate) fn lines(&mut self, path: &str) -> &[String] {
        let provider = self.provider;
        self.files
            .entry(path.to_string())
            .or_insert_with(|| {
                provider
                    .read(path)
                    .map(|text| text.lines().map(str::to_string).collect())
            })
            .as_deref()
            .unwrap_or(&[])
    }

    /// Text of 1-based `line`, if present.
    pub(crate) fn line(&mut self, path: &str, line: u32) -> Option<String> {
        let index = (line as usize).checked_sub(1)?;
        self.lines(path).get(index).cloned()
    }
}
