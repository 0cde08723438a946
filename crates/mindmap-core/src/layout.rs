//! Persisted user layout: `.mindmap/layout.json`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::state_dir;
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::model::{NodeId, NodeKind, Position, Positions};

/// Layout file inside the state directory
pub const LAYOUT_FILE: &str = "layout.json";

/// Current on-disk format version
pub const STORAGE_VERSION: &str = "1.0";

const COLUMN_WIDTH: f64 = 260.0;
const ROW_HEIGHT: f64 = 90.0;

/// Get layout file path
pub fn layout_path(root: &Path) -> PathBuf {
    state_dir(root).join(LAYOUT_FILE)
}

/// The only state that outlives a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapStorage {
    pub version: String,
    pub last_sync: DateTime<Utc>,
    #[serde(default)]
    pub user_positions: Positions,
    /// Keys written by newer versions, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MindMapStorage {
    pub fn new() -> Self {
        MindMapStorage {
            version: STORAGE_VERSION.to_string(),
            last_sync: Utc::now(),
            user_positions: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

impl Default for MindMapStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads and merge-saves node positions.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    pub fn new(root: &Path) -> Self {
        LayoutStore {
            path: layout_path(root),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved layout, or `None` if the file is absent or unreadable.
    pub fn load(&self) -> Option<MindMapStorage> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Cannot read layout {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(storage) => Some(storage),
            Err(e) => {
                tracing::warn!("Ignoring corrupt layout {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Merge `positions` into the saved layout and write it back.
    pub fn save(&self, positions: &Positions) -> Result<MindMapStorage> {
        let mut storage = self.load().unwrap_or_default();
        storage
            .user_positions
            .extend(positions.iter().map(|(id, pos)| (id.clone(), *pos)));
        storage.version = STORAGE_VERSION.to_string();
        storage.last_sync = Utc::now();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&storage)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            "Saved {} positions ({} total) to {}",
            positions.len(),
            storage.user_positions.len(),
            self.path.display()
        );
        Ok(storage)
    }

    /// Remove the saved layout.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Deterministic default positions: one column per node kind, rows ordered by id.
pub fn auto_layout(graph: &mut DependencyGraph) {
    let mut ids: Vec<(NodeKind, NodeId)> = graph
        .nodes()
        .map(|n| (n.kind, n.id.clone()))
        .collect();
    ids.sort();

    let mut row = 0usize;
    let mut current: Option<NodeKind> = None;
    for (kind, id) in ids {
        if current != Some(kind) {
            current = Some(kind);
            row = 0;
        }
        let column = NodeKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        if let Some(node) = graph.node_mut(&id) {
            node.position = Position::new(column as f64 * COLUMN_WIDTH, row as f64 * ROW_HEIGHT);
        }
        row += 1;
    }
}
