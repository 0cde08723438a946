//! Full-project scan: walk, parse in parallel, resolve, build the graph

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::WalkBuilder;
use mindmap_core::{
    auto_layout, CodeNode, CoherenceAnalyzer, DependencyGraph, Edge, EdgeKind, GraphMetadata,
    MindMapConfig, MindMapData, NodeId, NodeKind, ScanWarning, Symbol, SymbolTable,
};
use rayon::prelude::*;

use crate::languages::{get_extractor, FileExtraction, Reference, ReferenceKind};
use crate::parser_pool::{create_parser_pool, ParserPool};
use crate::resolve::{ImportResolver, Resolution};

/// A finished scan: the graph plus its summary.
#[derive(Debug)]
pub struct ScanResult {
    pub graph: DependencyGraph,
    pub metadata: GraphMetadata,
}

impl ScanResult {
    pub fn to_data(&self) -> MindMapData {
        self.graph.to_data(self.metadata.clone())
    }
}

enum FileOutcome {
    Parsed(FileExtraction),
    Skipped(ScanWarning),
}

pub struct SourceScanner {
    config: MindMapConfig,
    parser_pool: ParserPool,
}

impl SourceScanner {
    pub fn new(config: MindMapConfig) -> Self {
        Self::with_parser_pool(config, create_parser_pool())
    }

    pub fn with_parser_pool(config: MindMapConfig, parser_pool: ParserPool) -> Self {
        SourceScanner { config, parser_pool }
    }

    pub fn config(&self) -> &MindMapConfig {
        &self.config
    }

    /// Scan `root` into a graph. Individual bad files become warnings; only
    /// an unusable root or config is an error.
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        let started = std::time::Instant::now();
        let (files, mut warnings) = self.discover(root)?;
        tracing::debug!("Discovered {} source files under {}", files.len(), root.display());

        let outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|(abs, rel)| self.extract_file(abs, rel))
            .collect();

        let mut extractions = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                FileOutcome::Parsed(extraction) => {
                    if extraction.has_errors {
                        warnings.push(ScanWarning {
                            path: extraction.path.clone(),
                            message: "syntax errors; some declarations may be missing".to_string(),
                        });
                    }
                    extractions.push(extraction);
                }
                FileOutcome::Skipped(warning) => warnings.push(warning),
            }
        }
        extractions.sort_by(|a, b| a.path.cmp(&b.path));
        for warning in &warnings {
            tracing::warn!("{}: {}", warning.path, warning.message);
        }

        let symbols = build_symbol_table(&extractions);
        let resolver = ImportResolver::new(extractions.iter().map(|e| e.path.clone()));
        let (nodes, edges) = link(&extractions, &symbols, &resolver);

        let mut graph = DependencyGraph::from_parts(nodes, edges);
        auto_layout(&mut graph);

        let issues = CoherenceAnalyzer::analyze(&graph);
        warnings.sort_by(|a, b| a.path.cmp(&b.path));
        let metadata = GraphMetadata {
            total_files: extractions.len(),
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            coherence_score: CoherenceAnalyzer::score(&issues),
            issues,
            warnings,
        };

        tracing::info!(
            "Scanned {} files in {:?}: {} nodes, {} edges, coherence {} ({} warnings)",
            metadata.total_files,
            started.elapsed(),
            metadata.total_nodes,
            metadata.total_edges,
            metadata.coherence_score,
            metadata.warnings.len()
        );
        Ok(ScanResult { graph, metadata })
    }

    /// Source files under `root` as (absolute, root-relative) pairs, sorted.
    fn discover(&self, root: &Path) -> Result<(Vec<(PathBuf, String)>, Vec<ScanWarning>)> {
        if !root.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }
        let excluded_globs = self.config.exclude_set()?;
        let excluded_dirs = self.config.exclude_dirs.clone();
        let respect = self.config.respect_gitignore;

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(false)
            .ignore(respect)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .parents(respect)
            .require_git(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| excluded_dirs.iter().any(|d| d == name)))
            });

        let mut files = Vec::new();
        let mut warnings = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warnings.push(ScanWarning {
                        path: String::new(),
                        message: format!("walk error: {}", e),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let abs = entry.path();
            let Ok(rel_path) = abs.strip_prefix(root) else {
                continue;
            };
            let rel = normalize_rel_path(rel_path);
            if rel.ends_with(".d.ts") || excluded_globs.is_match(&rel) {
                continue;
            }
            let is_source = abs
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| self.config.is_source_extension(e));
            if is_source {
                files.push((abs.to_path_buf(), rel));
            }
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok((files, warnings))
    }

    fn extract_file(&self, abs: &Path, rel: &str) -> FileOutcome {
        let skip = |message: String| {
            FileOutcome::Skipped(ScanWarning {
                path: rel.to_string(),
                message,
            })
        };

        match std::fs::metadata(abs) {
            Ok(meta) if meta.len() > self.config.max_file_bytes => {
                return skip(format!(
                    "skipped: {} bytes exceeds the {} byte limit",
                    meta.len(),
                    self.config.max_file_bytes
                ));
            }
            Ok(_) => {}
            Err(e) => return skip(format!("unreadable: {}", e)),
        }
        let bytes = match std::fs::read(abs) {
            Ok(bytes) => bytes,
            Err(e) => return skip(format!("unreadable: {}", e)),
        };
        let Ok(source) = String::from_utf8(bytes) else {
            return skip("skipped: not valid UTF-8".to_string());
        };
        let Some(extractor) = get_extractor(abs, &self.parser_pool) else {
            return skip("skipped: no extractor for this file type".to_string());
        };
        match extractor.extract(rel, &source) {
            Ok(extraction) => FileOutcome::Parsed(extraction),
            Err(e) => skip(format!("parse failed: {}", e)),
        }
    }
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_symbol_table(extractions: &[FileExtraction]) -> SymbolTable {
    let symbols = SymbolTable::new();
    extractions.par_iter().for_each(|extraction| {
        for decl in &extraction.declarations {
            let declared = decl.declared_name();
            symbols.insert(declared, decl.id.clone(), decl.kind, &extraction.path);
            // Tables are referenced by table name as well as by binding
            if let Some(table) = decl.metadata.get("table").filter(|t| t.as_str() != declared) {
                symbols.insert(table, decl.id.clone(), decl.kind, &extraction.path);
            }
        }
        if let Some(default) = &extraction.default_export {
            symbols.set_default_export(&extraction.path, default);
        }
    });
    symbols
}

fn edge_kind(kind: ReferenceKind) -> EdgeKind {
    match kind {
        ReferenceKind::Call => EdgeKind::Calls,
        ReferenceKind::Jsx => EdgeKind::Renders,
        ReferenceKind::DbRead => EdgeKind::Queries,
        ReferenceKind::DbWrite => EdgeKind::Mutates,
        ReferenceKind::Hook | ReferenceKind::Type | ReferenceKind::Value => EdgeKind::Uses,
    }
}

/// Which node kinds a reference of this shape can point at.
fn accepts(reference: ReferenceKind, target: NodeKind) -> bool {
    match reference {
        ReferenceKind::Call => target.is_callable(),
        ReferenceKind::Hook => target == NodeKind::Hook,
        ReferenceKind::Jsx => matches!(target, NodeKind::Component | NodeKind::Context),
        ReferenceKind::Type => target.is_type_like() || target == NodeKind::Class,
        ReferenceKind::Value => !matches!(
            target,
            NodeKind::File | NodeKind::External | NodeKind::Api | NodeKind::Database
        ),
        ReferenceKind::DbRead | ReferenceKind::DbWrite => target == NodeKind::Database,
    }
}

/// Plain identifiers are too common to match across files without an import.
fn allows_global(reference: ReferenceKind) -> bool {
    reference != ReferenceKind::Value
}

/// Local name bindings introduced by a file's imports. `None` marks a package import.
type Bindings = HashMap<String, Option<Symbol>>;

/// Same file first, then the file's imports, then a unique project-wide match.
fn resolve_reference(
    symbols: &SymbolTable,
    bindings: &Bindings,
    file_path: &str,
    reference: &Reference,
) -> Option<Symbol> {
    if let Some(local) = symbols
        .lookup_in_file(&reference.name, file_path)
        .filter(|s| accepts(reference.kind, s.kind))
    {
        return Some(local);
    }
    if let Some(bound) = bindings.get(&reference.name) {
        return bound.clone().filter(|s| accepts(reference.kind, s.kind));
    }
    if !allows_global(reference.kind) {
        return None;
    }
    let mut candidates = symbols
        .lookup(&reference.name)
        .into_iter()
        .filter(|s| accepts(reference.kind, s.kind));
    match (candidates.next(), candidates.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

fn file_node(extraction: &FileExtraction) -> CodeNode {
    let name = extraction
        .path
        .rsplit('/')
        .next()
        .unwrap_or(&extraction.path);
    let mut node = CodeNode::new(
        NodeId::for_file(&extraction.path),
        name,
        NodeKind::File,
        extraction.path.as_str(),
    );
    node.line = Some(1);
    node.lines_of_code = extraction.lines_of_code;
    node.exports = extraction.exports.clone();
    node.imports = extraction.imports.iter().map(|i| i.source.clone()).collect();
    node
}

/// Turn per-file extractions into nodes and resolved edges.
fn link(
    extractions: &[FileExtraction],
    symbols: &SymbolTable,
    resolver: &ImportResolver,
) -> (Vec<CodeNode>, Vec<Edge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut externals: BTreeMap<String, CodeNode> = BTreeMap::new();

    for extraction in extractions {
        let file_id = NodeId::for_file(&extraction.path);
        nodes.push(file_node(extraction));
        nodes.extend(extraction.declarations.iter().cloned());

        let mut bindings = Bindings::new();
        for import in &extraction.imports {
            match resolver.resolve(&extraction.path, &import.source) {
                Resolution::File(target) => {
                    edges.push(
                        Edge::new(file_id.clone(), NodeId::for_file(&target), EdgeKind::Imports)
                            .at_line(import.line),
                    );
                    for binding in &import.bindings {
                        let imported = match binding.imported.as_str() {
                            "*" => continue,
                            "default" => match symbols.default_export(&target) {
                                Some(name) => name,
                                None => continue,
                            },
                            name => name.to_string(),
                        };
                        if let Some(symbol) = symbols.lookup_in_file(&imported, &target) {
                            edges.push(
                                Edge::new(file_id.clone(), symbol.id.clone(), EdgeKind::Imports)
                                    .at_line(import.line),
                            );
                            bindings.insert(binding.local.clone(), Some(symbol));
                        }
                    }
                }
                Resolution::External(package) => {
                    let id = NodeId::external(&package);
                    externals
                        .entry(package.clone())
                        .or_insert_with(|| CodeNode::new(id.clone(), package.as_str(), NodeKind::External, ""));
                    edges.push(Edge::new(file_id.clone(), id, EdgeKind::Imports).at_line(import.line));
                    for binding in &import.bindings {
                        bindings.insert(binding.local.clone(), None);
                    }
                }
                Resolution::Unresolved => {
                    tracing::debug!(
                        "{}:{}: cannot resolve import '{}'",
                        extraction.path,
                        import.line,
                        import.source
                    );
                }
            }
        }

        for reference in &extraction.references {
            let source = match &reference.owner {
                Some(owner) => match symbols.lookup_in_file(owner, &extraction.path) {
                    Some(symbol) => symbol.id,
                    None => continue,
                },
                None => file_id.clone(),
            };
            let Some(target) = resolve_reference(symbols, &bindings, &extraction.path, reference) else {
                continue;
            };
            if target.id == source {
                continue;
            }
            edges.push(Edge::new(source, target.id, edge_kind(reference.kind)).at_line(reference.line));
        }
    }

    nodes.extend(externals.into_values());
    (nodes, edges)
}
