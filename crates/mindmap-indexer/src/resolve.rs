//! Import specifier resolution against the set of scanned files

use std::collections::HashSet;

/// Extensions tried, in order, for an extensionless specifier.
const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// Root aliases and the directories they are tried against.
const ALIASES: &[&str] = &["@/", "~/"];
const ALIAS_BASES: &[&str] = &["src", ""];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A scanned project file, as a root-relative path.
    File(String),
    /// A bare package specifier, reduced to its package name.
    External(String),
    Unresolved,
}

pub struct ImportResolver {
    files: HashSet<String>,
}

impl ImportResolver {
    pub fn new(files: impl IntoIterator<Item = String>) -> Self {
        ImportResolver {
            files: files.into_iter().collect(),
        }
    }

    pub fn resolve(&self, from_file: &str, specifier: &str) -> Resolution {
        if specifier.starts_with('.') {
            let dir = from_file.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
            return self.resolve_path(join(dir, specifier));
        }
        if let Some(rest) = specifier.strip_prefix('/') {
            return self.resolve_path(join("", rest));
        }
        if let Some(rest) = ALIASES.iter().find_map(|a| specifier.strip_prefix(a)) {
            return ALIAS_BASES
                .iter()
                .map(|base| self.resolve_path(join(base, rest)))
                .find(|r| matches!(r, Resolution::File(_)))
                .unwrap_or(Resolution::Unresolved);
        }
        Resolution::External(package_name(specifier).to_string())
    }

    fn resolve_path(&self, path: Option<String>) -> Resolution {
        let Some(path) = path else {
            return Resolution::Unresolved;
        };
        self.candidates(&path)
            .into_iter()
            .find(|c| self.files.contains(c))
            .map(Resolution::File)
            .unwrap_or(Resolution::Unresolved)
    }

    fn candidates(&self, path: &str) -> Vec<String> {
        let mut candidates = vec![path.to_string()];
        // ESM-style `./util.js` that actually points at `util.ts`
        if let Some((stem, ext)) = path.rsplit_once('.') {
            if matches!(ext, "js" | "jsx" | "mjs" | "cjs") {
                candidates.push(format!("{}.ts", stem));
                candidates.push(format!("{}.tsx", stem));
            }
        }
        candidates.extend(EXTENSIONS.iter().map(|ext| format!("{}.{}", path, ext)));
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        candidates.extend(EXTENSIONS.iter().map(|ext| format!("{}index.{}", prefix, ext)));
        candidates
    }
}

/// Join and normalize `dir` + `rel`. `None` if the result escapes the root.
fn join(dir: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// `react-dom/client` → `react-dom`, `@tanstack/react-query/x` → `@tanstack/react-query`.
pub fn package_name(specifier: &str) -> &str {
    let mut boundaries = specifier.match_indices('/').map(|(i, _)| i);
    let end = if specifier.starts_with('@') {
        boundaries.nth(1)
    } else {
        boundaries.next()
    };
    match end {
        Some(i) => &specifier[..i],
        None => specifier,
    }
}
