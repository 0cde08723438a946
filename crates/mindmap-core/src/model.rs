//! Core data structures for the dependency graph and impact reports

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier, derived from the relative file path and the declaration name.
///
/// Two scans of the same source produce the same id for the same declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Id for a declaration inside a file: `src/components/Button.tsx::Button`.
    pub fn new(file_path: &str, name: &str) -> Self {
        NodeId(format!("{}::{}", file_path, name))
    }

    /// Id for a file node: the relative path itself.
    pub fn for_file(file_path: &str) -> Self {
        NodeId(file_path.to_string())
    }

    /// Id for an external package node.
    pub fn external(package: &str) -> Self {
        NodeId(format!("external:{}", package))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Edge identifier (source + target + kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(source: &NodeId, target: &NodeId, kind: EdgeKind) -> Self {
        EdgeId(format!("{}->{}:{}", source, target, kind.as_str()))
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminates what kind of code entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    // ── Structural ──────────────────────────────────────────
    File,

    // ── UI / code entities ──────────────────────────────────
    Component,
    Function,
    Type,
    Interface,
    Hook,
    Context,
    Class,
    Enum,
    Constant,

    // ── Boundaries ──────────────────────────────────────────
    Api,
    Database,
    External,
}

impl NodeKind {
    pub const ALL: [NodeKind; 13] = [
        NodeKind::File,
        NodeKind::Component,
        NodeKind::Function,
        NodeKind::Type,
        NodeKind::Interface,
        NodeKind::Hook,
        NodeKind::Context,
        NodeKind::Class,
        NodeKind::Enum,
        NodeKind::Constant,
        NodeKind::Api,
        NodeKind::Database,
        NodeKind::External,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Component => "component",
            NodeKind::Function => "function",
            NodeKind::Type => "type",
            NodeKind::Interface => "interface",
            NodeKind::Hook => "hook",
            NodeKind::Context => "context",
            NodeKind::Class => "class",
            NodeKind::Enum => "enum",
            NodeKind::Constant => "constant",
            NodeKind::Api => "api",
            NodeKind::Database => "database",
            NodeKind::External => "external",
        }
    }

    /// Kinds that describe a shape rather than behaviour.
    pub fn is_type_like(self) -> bool {
        matches!(self, NodeKind::Type | NodeKind::Interface | NodeKind::Enum)
    }

    /// Kinds that can be the target of a call expression.
    pub fn is_callable(self) -> bool {
        match self {
            NodeKind::Function | NodeKind::Hook | NodeKind::Class | NodeKind::Component | NodeKind::Context => true,
            NodeKind::File
            | NodeKind::Type
            | NodeKind::Interface
            | NodeKind::Enum
            | NodeKind::Constant
            | NodeKind::Api
            | NodeKind::Database
            | NodeKind::External => false,
        }
    }
}

/// Canvas position. Presentation only; never read by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// A component prop as declared in its props type or destructuring pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
}

/// A single node in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeNode {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub lines_of_code: u32,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<PropInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Vec<String>>,
    /// 1-based declaration line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl CodeNode {
    /// A bare node with no exports, imports or position.
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind, path: impl Into<String>) -> Self {
        CodeNode {
            id,
            name: name.into(),
            kind,
            path: path.into(),
            position: Position::default(),
            lines_of_code: 0,
            exports: Vec::new(),
            imports: Vec::new(),
            props: None,
            hooks: None,
            line: None,
            metadata: HashMap::new(),
        }
    }

    /// The identifier this node is referenced by in source text.
    ///
    /// API nodes are named `"POST /api/users"` but declared as `POST`; database
    /// nodes are named after the table but bound to a const.
    pub fn declared_name(&self) -> &str {
        match self.kind {
            NodeKind::Api | NodeKind::Database => self
                .id
                .as_str()
                .rsplit_once("::")
                .map(|(_, decl)| decl)
                .unwrap_or(&self.name),
            _ => &self.name,
        }
    }
}

/// What kind of relationship this edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Imports,
    Calls,
    Renders,
    Queries,
    Mutates,
    Uses,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Imports => "imports",
            EdgeKind::Calls => "calls",
            EdgeKind::Renders => "renders",
            EdgeKind::Queries => "queries",
            EdgeKind::Mutates => "mutates",
            EdgeKind::Uses => "uses",
        }
    }
}

/// A directed edge in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Inferred heuristically rather than observed in source.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_notes: Option<String>,
    /// Where in the source file this relationship is expressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Edge {
            id: EdgeId::new(&source, &target, kind),
            source,
            target,
            kind,
            ai_generated: false,
            ai_notes: None,
            line: None,
        }
    }

    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

/// The kind of edit a user proposes for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    Rename,
    Delete,
    ModifySignature,
}

/// A proposed change, analysed before anything on disk is touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeChange {
    pub node_id: NodeId,
    pub change_type: ChangeType,
    pub before: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl NodeChange {
    pub fn rename(node_id: NodeId, before: impl Into<String>, after: impl Into<String>) -> Self {
        NodeChange {
            node_id,
            change_type: ChangeType::Rename,
            before: before.into(),
            after: Some(after.into()),
        }
    }

    pub fn delete(node_id: NodeId, before: impl Into<String>) -> Self {
        NodeChange {
            node_id,
            change_type: ChangeType::Delete,
            before: before.into(),
            after: None,
        }
    }

    pub fn modify_signature(
        node_id: NodeId,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        NodeChange {
            node_id,
            change_type: ChangeType::ModifySignature,
            before: before.into(),
            after: Some(after.into()),
        }
    }
}

/// Ordered so that `max` picks the worse label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// A dependent that will not compile or run after the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    pub node_id: NodeId,
    pub path: String,
    pub line: u32,
    pub current_code: String,
    pub reason: String,
}

/// A node related to the change target that is not known to break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEntry {
    pub node_id: NodeId,
    pub node_name: String,
    pub path: String,
    pub description: String,
}

/// A suggested repair. Auto-fixable fixes are literal, line-anchored substitutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFix {
    pub node_id: NodeId,
    pub path: String,
    pub line: u32,
    pub description: String,
    pub old_code: String,
    pub new_code: String,
    pub auto_fixable: bool,
}

/// Patches submitted for application are accepted suggested fixes.
pub type Patch = SuggestedFix;

/// Full impact report for one proposed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub target_node: CodeNode,
    pub change: NodeChange,
    pub risk_level: RiskLevel,
    pub breaking_changes: Vec<BreakingChange>,
    pub direct_impact: Vec<ImpactEntry>,
    pub transitive_impact: Vec<ImpactEntry>,
    pub suggested_fixes: Vec<SuggestedFix>,
}

/// Outcome of applying a batch of patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationResult {
    pub success: bool,
    pub files_modified: Vec<String>,
    pub errors: Vec<String>,
}

impl PropagationResult {
    pub fn succeeded(files_modified: Vec<String>) -> Self {
        PropagationResult {
            success: true,
            files_modified,
            errors: Vec::new(),
        }
    }

    pub fn failed(files_modified: Vec<String>, errors: Vec<String>) -> Self {
        PropagationResult {
            success: false,
            files_modified,
            errors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Points subtracted from the coherence score per issue.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Critical => 25,
            Severity::High => 10,
            Severity::Medium => 5,
            Severity::Low => 1,
        }
    }
}

/// A structural problem found by the coherence heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherenceIssue {
    pub severity: Severity,
    pub node_ids: Vec<NodeId>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A file skipped or only partially understood during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: String,
    pub message: String,
}

/// Scan summary attached to every graph snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub total_files: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub coherence_score: u8,
    #[serde(default)]
    pub issues: Vec<CoherenceIssue>,
    #[serde(default)]
    pub warnings: Vec<ScanWarning>,
}

/// Graph plus metadata, as sent to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MindMapData {
    pub nodes: Vec<CodeNode>,
    pub edges: Vec<Edge>,
    pub metadata: GraphMetadata,
}

/// Saved node positions keyed by node id.
pub type Positions = BTreeMap<NodeId, Position>;
