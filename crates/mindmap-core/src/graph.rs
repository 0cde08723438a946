//! Dependency graph over petgraph::StableDiGraph, keyed by stable string ids

use crate::model::*;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// The dependency graph — a directed multigraph with O(1) node lookup by id.
///
/// Edges always point from the dependent to the thing it depends on
/// (`Page -renders-> Button`), so the dependents of a node are its
/// incoming neighbours.
#[derive(Clone)]
pub struct DependencyGraph {
    inner: StableDiGraph<CodeNode, Edge>,
    index: HashMap<NodeId, NodeIndex>,
    edge_ids: HashSet<EdgeId>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            edge_ids: HashSet::new(),
        }
    }

    /// Build a graph from scanner output. Edges whose endpoints are missing are dropped.
    pub fn from_parts(nodes: Vec<CodeNode>, edges: Vec<Edge>) -> Self {
        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.add_node(node);
        }
        let mut dropped = 0usize;
        for edge in edges {
            if !graph.add_edge(edge) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!("Dropped {} dangling or duplicate edges", dropped);
        }
        graph
    }

    /// Add a node, replacing any node with the same id. Existing edges are kept.
    pub fn add_node(&mut self, node: CodeNode) {
        match self.index.get(&node.id) {
            Some(&idx) => {
                if let Some(weight) = self.inner.node_weight_mut(idx) {
                    *weight = node;
                }
            }
            None => {
                let id = node.id.clone();
                let idx = self.inner.add_node(node);
                self.index.insert(id, idx);
            }
        }
    }

    /// Add an edge. Returns false (and stores nothing) if either endpoint is
    /// missing or an edge with the same id already exists.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let (Some(&source), Some(&target)) = (self.index.get(&edge.source), self.index.get(&edge.target)) else {
            return false;
        };
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        self.inner.add_edge(source, target, edge);
        true
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<CodeNode> {
        let idx = self.index.remove(id)?;
        for edge_ref in self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.inner.edges_directed(idx, Direction::Incoming))
        {
            self.edge_ids.remove(&edge_ref.weight().id);
        }
        self.inner.remove_node(idx)
    }

    /// Get a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&CodeNode> {
        self.index.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    /// Get a mutable node by id.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut CodeNode> {
        let idx = *self.index.get(id)?;
        self.inner.node_weight_mut(idx)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &CodeNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from<'a>(&'a self, source: &NodeId) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.directed_edges(source, Direction::Outgoing)
    }

    /// Get all incoming edges to a node.
    pub fn edges_to<'a>(&'a self, target: &NodeId) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.directed_edges(target, Direction::Incoming)
    }

    fn directed_edges<'a>(&'a self, id: &NodeId, dir: Direction) -> impl Iterator<Item = &'a Edge> + use<'a> {
        self.index
            .get(id)
            .copied()
            .into_iter()
            .flat_map(move |idx| self.inner.edges_directed(idx, dir).map(|edge_ref| edge_ref.weight()))
    }

    /// Check if an edge exists between two nodes of a specific kind.
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.edges_from(source)
            .any(|e| &e.target == target && e.kind == kind)
    }

    /// Ids of nodes with an edge into `id`, excluding `id` itself. Sorted.
    pub fn dependent_ids(&self, id: &NodeId) -> BTreeSet<NodeId> {
        self.edges_to(id)
            .map(|e| e.source.clone())
            .filter(|source| source != id)
            .collect()
    }

    /// Ids of nodes `id` has an edge into, excluding `id` itself. Sorted.
    pub fn dependency_ids(&self, id: &NodeId) -> BTreeSet<NodeId> {
        self.edges_from(id)
            .map(|e| e.target.clone())
            .filter(|target| target != id)
            .collect()
    }

    /// Nodes with an edge into `id`.
    pub fn dependents(&self, id: &NodeId) -> Vec<&CodeNode> {
        self.dependent_ids(id)
            .iter()
            .filter_map(|dep| self.node(dep))
            .collect()
    }

    /// Nodes `id` has an edge into.
    pub fn dependencies(&self, id: &NodeId) -> Vec<&CodeNode> {
        self.dependency_ids(id)
            .iter()
            .filter_map(|dep| self.node(dep))
            .collect()
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &CodeNode> + '_ {
        self.nodes().filter(move |n| n.kind == kind)
    }

    /// Nodes declared in the given file, including the file node itself.
    pub fn nodes_in_file<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a CodeNode> + 'a {
        self.nodes().filter(move |n| n.path == path)
    }

    /// Merge AI/planner proposals into the graph. Proposed edges are flagged
    /// `ai_generated`; dangling ones are dropped. Returns the number of edges kept.
    pub fn ingest_proposals(&mut self, nodes: Vec<CodeNode>, edges: Vec<Edge>) -> usize {
        for node in nodes {
            if !self.contains(&node.id) {
                self.add_node(node);
            }
        }
        edges
            .into_iter()
            .map(|mut edge| {
                edge.ai_generated = true;
                edge.id = EdgeId::new(&edge.source, &edge.target, edge.kind);
                edge
            })
            .filter(|edge| self.add_edge(edge.clone()))
            .count()
    }

    /// Overwrite node positions from saved layout. Unknown ids are ignored.
    pub fn apply_positions(&mut self, positions: &Positions) {
        for (id, position) in positions {
            if let Some(node) = self.node_mut(id) {
                node.position = *position;
            }
        }
    }

    /// Strongly connected components with more than one node, over `imports` edges
    /// between file nodes.
    pub fn import_cycles(&self) -> Vec<Vec<NodeId>> {
        let files = self.inner.filter_map(
            |_, node| (node.kind == NodeKind::File).then(|| node.id.clone()),
            |_, edge| (edge.kind == EdgeKind::Imports).then_some(()),
        );
        petgraph::algo::tarjan_scc(&files)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut ids: Vec<NodeId> = component
                    .into_iter()
                    .filter_map(|idx| files.node_weight(idx).cloned())
                    .collect();
                ids.sort();
                ids
            })
            .collect()
    }

    /// Snapshot as plain vectors, sorted by id.
    pub fn to_data(&self, metadata: GraphMetadata) -> MindMapData {
        let mut nodes: Vec<CodeNode> = self.nodes().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges: Vec<Edge> = self.edges().cloned().collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));
        MindMapData { nodes, edges, metadata }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
