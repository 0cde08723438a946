//! Error taxonomy shared by the scanner, graph, engine and patch applier

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::NodeId;

/// A patch whose `old_code` no longer matches the file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StalePatch {
    pub path: String,
    pub line: u32,
    pub expected: String,
    /// What the line holds now, or `None` if the line or file is gone.
    pub found: Option<String>,
}

impl fmt::Display for StalePatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(
                f,
                "{}:{}: expected `{}`, found `{}`",
                self.path, self.line, self.expected, found
            ),
            None => write!(f, "{}:{}: expected `{}`, line is gone", self.path, self.line, self.expected),
        }
    }
}

/// Primary error type for mind map operations.
#[derive(Error, Debug)]
pub enum MindMapError {
    /// Referenced node id is not in the current graph.
    #[error("node not found: '{0}'")]
    NotFound(NodeId),

    /// The proposed change is malformed.
    #[error("invalid change: {0}")]
    InvalidChange(String),

    /// A patch cannot be applied as submitted.
    #[error("invalid patch for '{path}' line {line}: {reason}")]
    InvalidPatch { path: String, line: u32, reason: String },

    /// One or more patches no longer match disk content; nothing was written.
    #[error("{} patch(es) no longer match the files on disk", .0.len())]
    StaleChange(Vec<StalePatch>),

    /// The write primitive failed partway through a validated batch.
    #[error("patch application partially failed: {} file(s) written, {} failed", .succeeded.len(), .failed.len())]
    PartialApply {
        succeeded: Vec<String>,
        failed: Vec<(String, String)>,
    },

    /// Malformed `.mindmap/config.toml`.
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MindMapError {
    /// One line per failure, as shown next to the patch list.
    pub fn details(&self) -> Vec<String> {
        match self {
            MindMapError::StaleChange(patches) => patches.iter().map(ToString::to_string).collect(),
            MindMapError::PartialApply { failed, .. } => failed
                .iter()
                .map(|(path, reason)| format!("{}: {}", path, reason))
                .collect(),
            other => vec![other.to_string()],
        }
    }
}

pub type Result<T> = std::result::Result<T, MindMapError>;
