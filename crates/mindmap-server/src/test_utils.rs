//! Test utilities for the session and transport

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mindmap_core::MindMapConfig;
use tempfile::TempDir;

use crate::host::Host;
use crate::session::Session;

/// A component rendered by a page, plus an unrelated helper.
pub const SMALL_APP: &[(&str, &str)] = &[
    (
        "src/Button.tsx",
        "export function Button({ label }: { label: string }) {\n  return <button>{label}</button>;\n}\n",
    ),
    (
        "src/Page.tsx",
        "import { Button } from './Button';\n\nexport function Page() {\n  return <Button label=\"Go\" />;\n}\n",
    ),
    ("src/util.ts", "export function clamp(n: number) {\n  return Math.max(0, n);\n}\n"),
];

/// Records `open_file` calls instead of launching anything.
#[derive(Default)]
pub struct RecordingHost {
    pub opened: Mutex<Vec<(PathBuf, Option<u32>)>>,
}

impl Host for RecordingHost {
    fn open_file(&self, path: &Path, line: Option<u32>) -> anyhow::Result<()> {
        self.opened.lock().unwrap().push((path.to_path_buf(), line));
        Ok(())
    }
}

/// A session over a fresh copy of `structure`, with a recording host.
pub fn create_session(structure: &[(&str, &str)]) -> (TempDir, Session, Arc<RecordingHost>) {
    let repo = create_repo_with_structure(structure);
    let host = Arc::new(RecordingHost::default());
    let session = Session::with_host(repo.path(), MindMapConfig::default(), host.clone());
    (repo, session, host)
}

/// Create a repository with a specific file structure
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}
