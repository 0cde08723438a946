//! All-or-nothing application of accepted fixes
//!
//! Every patch is validated against the files on disk before anything is
//! written. New contents are staged next to their targets and renamed into
//! place only once every file has been staged.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use mindmap_core::{MindMapError, Patch, PropagationResult, Result, StalePatch};
use tracing::{debug, info, warn};

const STAGING_SUFFIX: &str = ".mindmap-tmp";

/// Writes accepted patches under a project root.
#[derive(Debug, Clone)]
pub struct PatchApplier {
    root: PathBuf,
}

impl PatchApplier {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PatchApplier { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Apply `patches`, reporting failures in the result rather than as an error.
    pub fn apply(&self, patches: &[Patch]) -> PropagationResult {
        match self.try_apply(patches) {
            Ok(files) => PropagationResult::succeeded(files),
            Err(e) => {
                let written = match &e {
                    MindMapError::PartialApply { succeeded, .. } => succeeded.clone(),
                    _ => Vec::new(),
                };
                PropagationResult::failed(written, e.details())
            }
        }
    }

    /// Apply `patches`, returning the modified files in path order.
    ///
    /// Nothing is written unless every patch still matches its line.
    pub fn try_apply(&self, patches: &[Patch]) -> Result<Vec<String>> {
        if patches.is_empty() {
            return Ok(Vec::new());
        }

        let by_file = group_patches(patches)?;

        let mut stale = Vec::new();
        let mut rewrites: Vec<(String, String)> = Vec::with_capacity(by_file.len());
        for (path, edits) in &by_file {
            match self.rewrite(path, edits) {
                Ok(contents) => rewrites.push((path.clone(), contents)),
                Err(mut found) => stale.append(&mut found),
            }
        }
        if !stale.is_empty() {
            for patch in &stale {
                warn!("Stale patch: {}", patch);
            }
            return Err(MindMapError::StaleChange(stale));
        }

        let mut staged: Vec<(String, PathBuf)> = Vec::with_capacity(rewrites.len());
        for (path, contents) in &rewrites {
            let tmp = staging_path(&self.root.join(path));
            if let Err(e) = fs::write(&tmp, contents) {
                let _ = fs::remove_file(&tmp);
                remove_staged(&staged);
                return Err(MindMapError::Io(e));
            }
            staged.push((path.clone(), tmp));
        }

        let mut succeeded = Vec::with_capacity(staged.len());
        for (index, (path, tmp)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, self.root.join(path)) {
                warn!("Failed to write {}: {}", path, e);
                remove_staged(&staged[index..]);
                let mut failed = vec![(path.clone(), e.to_string())];
                failed.extend(
                    staged[index + 1..]
                        .iter()
                        .map(|(rest, _)| (rest.clone(), "not written".to_string())),
                );
                return Err(MindMapError::PartialApply { succeeded, failed });
            }
            debug!("Wrote {}", path);
            succeeded.push(path.clone());
        }

        info!("Applied {} patch(es) to {} file(s)", patches.len(), succeeded.len());
        Ok(succeeded)
    }

    /// New contents for `path`, or every patch that no longer matches.
    fn rewrite(&self, path: &str, edits: &BTreeMap<u32, &Patch>) -> std::result::Result<String, Vec<StalePatch>> {
        let stale_all = |found: Option<String>| -> Vec<StalePatch> {
            edits
                .values()
                .map(|p| StalePatch {
                    path: path.to_string(),
                    line: p.line,
                    expected: p.old_code.clone(),
                    found: found.clone(),
                })
                .collect()
        };
        let Ok(original) = fs::read_to_string(self.root.join(path)) else {
            return Err(stale_all(None));
        };

        let mut lines: Vec<String> = original.split_inclusive('\n').map(str::to_string).collect();
        let mut stale = Vec::new();
        for (&line, patch) in edits {
            let index = line as usize - 1;
            match lines.get_mut(index) {
                Some(text) if text.contains(&patch.old_code) => {
                    *text = text.replacen(&patch.old_code, &patch.new_code, 1);
                }
                other => stale.push(StalePatch {
                    path: path.to_string(),
                    line,
                    expected: patch.old_code.clone(),
                    found: other.map(|t| t.trim_end_matches(['\r', '\n']).to_string()),
                }),
            }
        }
        if stale.is_empty() {
            Ok(lines.concat())
        } else {
            Err(stale)
        }
    }
}

/// Validate patches and index them by file, then line.
fn group_patches(patches: &[Patch]) -> Result<BTreeMap<String, BTreeMap<u32, &Patch>>> {
    let mut by_file: BTreeMap<String, BTreeMap<u32, &Patch>> = BTreeMap::new();
    for patch in patches {
        let invalid = |reason: &str| MindMapError::InvalidPatch {
            path: patch.path.clone(),
            line: patch.line,
            reason: reason.to_string(),
        };
        if !patch.auto_fixable {
            return Err(invalid("patch is guidance only and cannot be applied automatically"));
        }
        if patch.line == 0 {
            return Err(invalid("line numbers start at 1"));
        }
        if patch.old_code.is_empty() {
            return Err(invalid("oldCode is empty"));
        }
        if !is_relative_inside(&patch.path) {
            return Err(invalid("path must stay inside the project root"));
        }

        let lines = by_file.entry(patch.path.clone()).or_default();
        match lines.get(&patch.line) {
            Some(existing) if existing.old_code == patch.old_code && existing.new_code == patch.new_code => {}
            Some(_) => return Err(invalid("conflicts with another patch on the same line")),
            None => {
                lines.insert(patch.line, patch);
            }
        }
    }
    Ok(by_file)
}

fn is_relative_inside(path: &str) -> bool {
    let path = Path::new(path);
    path.components().next().is_some() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(STAGING_SUFFIX);
    target.with_file_name(name)
}

fn remove_staged(staged: &[(String, PathBuf)]) {
    for (_, tmp) in staged {
        let _ = fs::remove_file(tmp);
    }
}
