//! Risk labels derived from a materialized impact

use std::collections::BTreeSet;

use mindmap_core::{BreakingChange, DependencyGraph, NodeId, RiskLevel};

/// The parts of an impact that decide its risk.
#[derive(Debug, Clone, Copy)]
pub struct ImpactSummary<'a> {
    pub direct: &'a BTreeSet<NodeId>,
    pub breaking: &'a [BreakingChange],
    /// Transitive dependents escalated to breaking.
    pub promoted: usize,
}

/// `low` when nothing depends on the target, `medium` when something does but
/// nothing breaks, `critical` when a breaking node is itself widely depended
/// upon or the breakage reaches past the first hop, `high` otherwise.
pub fn assess(graph: &DependencyGraph, impact: ImpactSummary<'_>, critical_threshold: usize) -> RiskLevel {
    if impact.direct.is_empty() && impact.breaking.is_empty() {
        return RiskLevel::Low;
    }
    if impact.breaking.is_empty() {
        return RiskLevel::Medium;
    }
    if impact.promoted > 0 {
        return RiskLevel::Critical;
    }

    let breaking_nodes: BTreeSet<&NodeId> = impact.breaking.iter().map(|b| &b.node_id).collect();
    let widely_used = breaking_nodes
        .into_iter()
        .any(|id| graph.dependent_ids(id).len() > critical_threshold);
    if widely_used {
        RiskLevel::Critical
    } else {
        RiskLevel::High
    }
}
