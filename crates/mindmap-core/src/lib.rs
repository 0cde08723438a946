//! Mindmap Core — dependency graph model, coherence heuristics, layout persistence

pub mod coherence;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod model;
pub mod symbols;

#[cfg(test)]
pub mod tests;

pub use coherence::CoherenceAnalyzer;
pub use config::{config_path, state_dir, MindMapConfig, CONFIG_FILE, STATE_DIR};
pub use error::{MindMapError, Result, StalePatch};
pub use graph::DependencyGraph;
pub use layout::{auto_layout, layout_path, LayoutStore, MindMapStorage, LAYOUT_FILE};
pub use model::{
    BreakingChange, ChangeType, CodeNode, CoherenceIssue, Edge, EdgeId, EdgeKind, GraphMetadata,
    ImpactAnalysis, ImpactEntry, MindMapData, NodeChange, NodeId, NodeKind, Patch, Position,
    Positions, PropInfo, PropagationResult, RiskLevel, ScanWarning, Severity, SuggestedFix,
};
pub use symbols::{Symbol, SymbolTable};
