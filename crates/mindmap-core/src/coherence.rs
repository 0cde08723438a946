//! Structural health heuristics over a finished graph
//!
//! Each check is an independent pass over the graph; the analyzer runs all of
//! them and concatenates the issues. Nothing here mutates the graph.

use crate::graph::DependencyGraph;
use crate::model::{CodeNode, CoherenceIssue, EdgeKind, NodeKind, Severity};

type Check = fn(&DependencyGraph) -> Vec<CoherenceIssue>;

const CHECKS: &[Check] = &[
    unvalidated_mutations,
    api_without_error_handling,
    props_without_type,
    orphan_nodes,
    hooks_outside_components,
    components_touching_database,
    import_cycles,
];

const MUTATING_METHODS: &[&str] = &["POST", "PUT", "PATCH", "DELETE"];

pub struct CoherenceAnalyzer;

impl CoherenceAnalyzer {
    /// Run every heuristic. O(nodes + edges) per check.
    pub fn analyze(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
        let mut issues: Vec<CoherenceIssue> = CHECKS.iter().flat_map(|check| check(graph)).collect();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.node_ids.cmp(&b.node_ids)));
        issues
    }

    /// 100 minus the severity weights of all issues, floored at 0.
    pub fn score(issues: &[CoherenceIssue]) -> u8 {
        let penalty: u32 = issues.iter().map(|i| i.severity.weight()).sum();
        100u32.saturating_sub(penalty) as u8
    }
}

fn issue(severity: Severity, nodes: &[&CodeNode], message: String, suggestion: &str) -> CoherenceIssue {
    CoherenceIssue {
        severity,
        node_ids: nodes.iter().map(|n| n.id.clone()).collect(),
        message,
        suggestion: Some(suggestion.to_string()),
    }
}

fn is_validation_node(node: &CodeNode) -> bool {
    let name = node.name.to_lowercase();
    name.contains("valid") || name.contains("schema")
}

fn is_mutating_api(graph: &DependencyGraph, api: &CodeNode) -> bool {
    let by_method = api
        .metadata
        .get("method")
        .map(|m| MUTATING_METHODS.contains(&m.as_str()))
        .unwrap_or_else(|| {
            MUTATING_METHODS
                .iter()
                .any(|m| api.name.starts_with(&format!("{} ", m)))
        });
    by_method || graph.edges_from(&api.id).any(|e| e.kind == EdgeKind::Mutates)
}

/// Mutating API route with no validation/schema dependency.
fn unvalidated_mutations(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    graph
        .nodes_of_kind(NodeKind::Api)
        .filter(|api| is_mutating_api(graph, api))
        .filter(|api| !graph.dependencies(&api.id).into_iter().any(is_validation_node))
        .map(|api| {
            issue(
                Severity::High,
                &[api],
                format!("{} writes data without input validation", api.name),
                "Validate the request body with a schema before touching the database",
            )
        })
        .collect()
}

fn api_without_error_handling(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    graph
        .nodes_of_kind(NodeKind::Api)
        .filter(|api| api.metadata.get("handlesErrors").map(String::as_str) == Some("false"))
        .map(|api| {
            issue(
                Severity::Medium,
                &[api],
                format!("{} has no error handling", api.name),
                "Wrap the handler body in try/catch and return an error response",
            )
        })
        .collect()
}

/// Component with props but no matching type declaration.
fn props_without_type(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    graph
        .nodes_of_kind(NodeKind::Component)
        .filter(|c| c.props.as_ref().is_some_and(|p| !p.is_empty()))
        .filter(|c| {
            let props_name = format!("{}Props", c.name);
            let named = graph
                .nodes()
                .any(|n| n.kind.is_type_like() && n.name == props_name);
            let used = graph
                .dependencies(&c.id)
                .into_iter()
                .any(|n| n.kind.is_type_like());
            !named && !used
        })
        .map(|c| {
            issue(
                Severity::Medium,
                &[c],
                format!("{} takes props but has no props type", c.name),
                &format!("Declare an interface {}Props", c.name),
            )
        })
        .collect()
}

/// Node with neither dependents nor dependencies.
fn orphan_nodes(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    graph
        .nodes()
        .filter(|n| !matches!(n.kind, NodeKind::File | NodeKind::External))
        .filter(|n| graph.edges_to(&n.id).next().is_none() && graph.edges_from(&n.id).next().is_none())
        .map(|n| {
            issue(
                Severity::Low,
                &[n],
                format!("{} is not connected to anything and may be dead code", n.name),
                "Remove it or wire it into the code that needs it",
            )
        })
        .collect()
}

fn hooks_outside_components(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    let mut issues = Vec::new();
    for hook in graph.nodes_of_kind(NodeKind::Hook) {
        for user in graph.dependents(&hook.id) {
            let allowed = match user.kind {
                NodeKind::Component | NodeKind::Hook | NodeKind::File => true,
                NodeKind::Function
                | NodeKind::Type
                | NodeKind::Interface
                | NodeKind::Context
                | NodeKind::Class
                | NodeKind::Enum
                | NodeKind::Constant
                | NodeKind::Api
                | NodeKind::Database
                | NodeKind::External => false,
            };
            if !allowed {
                issues.push(issue(
                    Severity::Medium,
                    &[hook, user],
                    format!("{} is called from {}, which is not a component or hook", hook.name, user.name),
                    "Only call hooks from components or other hooks",
                ));
            }
        }
    }
    issues
}

fn components_touching_database(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    let mut issues = Vec::new();
    for component in graph.nodes_of_kind(NodeKind::Component) {
        for edge in graph.edges_from(&component.id) {
            if !matches!(edge.kind, EdgeKind::Queries | EdgeKind::Mutates) {
                continue;
            }
            if let Some(table) = graph.node(&edge.target) {
                issues.push(issue(
                    Severity::High,
                    &[component, table],
                    format!("{} accesses table {} directly", component.name, table.name),
                    "Move data access behind an API route or server action",
                ));
            }
        }
    }
    issues
}

fn import_cycles(graph: &DependencyGraph) -> Vec<CoherenceIssue> {
    graph
        .import_cycles()
        .into_iter()
        .map(|cycle| CoherenceIssue {
            severity: Severity::Medium,
            message: format!(
                "Import cycle between {}",
                cycle.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
            ),
            node_ids: cycle,
            suggestion: Some("Extract the shared code into a module both files import".to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, NodeId, PropInfo};

    fn node(path: &str, name: &str, kind: NodeKind) -> CodeNode {
        CodeNode::new(NodeId::new(path, name), name, kind, path)
    }

    fn users_api() -> (CodeNode, CodeNode) {
        let mut api = CodeNode::new(
            NodeId::new("app/api/users/route.ts", "POST"),
            "POST /users",
            NodeKind::Api,
            "app/api/users/route.ts",
        );
        api.metadata.insert("method".to_string(), "POST".to_string());
        api.metadata.insert("handlesErrors".to_string(), "true".to_string());
        let table = node("db/schema.ts", "users", NodeKind::Database);
        (api, table)
    }

    #[test]
    fn test_mutating_api_without_validation_is_flagged() {
        let (api, table) = users_api();
        let edges = vec![
            Edge::new(api.id.clone(), table.id.clone(), EdgeKind::Queries),
            Edge::new(api.id.clone(), table.id.clone(), EdgeKind::Mutates),
        ];
        let graph = DependencyGraph::from_parts(vec![api.clone(), table], edges);

        let issues = CoherenceAnalyzer::analyze(&graph);
        let flagged = issues
            .iter()
            .find(|i| i.message.contains("without input validation"))
            .expect("missing validation issue");
        assert_eq!(flagged.severity, Severity::High);
        assert_eq!(flagged.node_ids, vec![api.id]);
    }

    #[test]
    fn test_validation_dependency_clears_the_issue() {
        let (api, table) = users_api();
        let schema = node("lib/validation.ts", "userSchema", NodeKind::Constant);
        let edges = vec![
            Edge::new(api.id.clone(), table.id.clone(), EdgeKind::Mutates),
            Edge::new(api.id.clone(), schema.id.clone(), EdgeKind::Uses),
        ];
        let graph = DependencyGraph::from_parts(vec![api, table, schema], edges);

        let issues = CoherenceAnalyzer::analyze(&graph);
        assert!(issues.iter().all(|i| !i.message.contains("without input validation")));
    }

    #[test]
    fn test_orphans_and_score() {
        let lonely = node("src/old.ts", "legacyHelper", NodeKind::Function);
        let file = CodeNode::new(NodeId::for_file("src/old.ts"), "old.ts", NodeKind::File, "src/old.ts");
        let graph = DependencyGraph::from_parts(vec![lonely.clone(), file], vec![]);

        let issues = CoherenceAnalyzer::analyze(&graph);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].node_ids, vec![lonely.id]);
        assert_eq!(CoherenceAnalyzer::score(&issues), 99);
    }

    #[test]
    fn test_props_without_type() {
        let mut card = node("src/Card.tsx", "Card", NodeKind::Component);
        card.props = Some(vec![PropInfo {
            name: "title".to_string(),
            type_name: "unknown".to_string(),
            required: true,
        }]);
        let page = node("src/Page.tsx", "Page", NodeKind::Component);
        let edges = vec![Edge::new(page.id.clone(), card.id.clone(), EdgeKind::Renders)];
        let graph = DependencyGraph::from_parts(vec![card.clone(), page], edges);

        let issues = CoherenceAnalyzer::analyze(&graph);
        assert!(issues
            .iter()
            .any(|i| i.node_ids == vec![card.id.clone()] && i.message.contains("no props type")));
    }

    #[test]
    fn test_score_weights_and_floor() {
        let mk = |severity| CoherenceIssue {
            severity,
            node_ids: vec![],
            message: String::new(),
            suggestion: None,
        };
        let low = vec![mk(Severity::Low); 3];
        let critical = vec![mk(Severity::Critical); 3];
        assert!(CoherenceAnalyzer::score(&critical) < CoherenceAnalyzer::score(&low));
        assert_eq!(CoherenceAnalyzer::score(&vec![mk(Severity::Critical); 5]), 0);
        assert_eq!(CoherenceAnalyzer::score(&[]), 100);
    }
}
