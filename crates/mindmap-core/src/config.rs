//! Project configuration: `.mindmap/config.toml`

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{MindMapError, Result};

/// State directory: .mindmap/
pub const STATE_DIR: &str = ".mindmap";

/// Config file inside the state directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get state directory path
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

/// Get config file path
pub fn config_path(root: &Path) -> PathBuf {
    state_dir(root).join(CONFIG_FILE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindMapConfig {
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    /// Extra glob patterns (relative to the root) to skip.
    pub exclude_globs: Vec<String>,
    /// Source file extensions the scanner parses.
    pub extensions: Vec<String>,
    /// Files larger than this are skipped with a warning.
    pub max_file_bytes: u64,
    /// A breaking dependent with more dependents than this makes a change critical.
    pub critical_dependents_threshold: usize,
    pub respect_gitignore: bool,
}

impl Default for MindMapConfig {
    fn default() -> Self {
        MindMapConfig {
            exclude_dirs: [
                "node_modules",
                ".git",
                ".next",
                "dist",
                "build",
                "out",
                "coverage",
                "target",
                STATE_DIR,
                ".turbo",
                ".vercel",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_globs: Vec::new(),
            extensions: ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_bytes: 1024 * 1024,
            critical_dependents_threshold: 3,
            respect_gitignore: true,
        }
    }
}

impl MindMapConfig {
    /// Load `<root>/.mindmap/config.toml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = config_path(root);
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config: MindMapConfig = toml::from_str(&text)
            .map_err(|e| MindMapError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Compile `exclude_globs` into a matcher.
    pub fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_globs {
            let glob = Glob::new(pattern)
                .map_err(|e| MindMapError::Config(format!("bad glob '{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| MindMapError::Config(e.to_string()))
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}
