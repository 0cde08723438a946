//! Unit tests for mindmap-core module

use crate::*;

fn node(path: &str, name: &str, kind: NodeKind) -> CodeNode {
    CodeNode::new(NodeId::new(path, name), name, kind, path)
}

#[test]
fn test_node_id_creation() {
    let node_id = NodeId::new("src/components/Button.tsx", "Button");

    // NodeId should be deterministic
    let same_id = NodeId::new("src/components/Button.tsx", "Button");
    assert_eq!(node_id, same_id);

    // Different names should produce different IDs
    let different_id = NodeId::new("src/components/Button.tsx", "IconButton");
    assert_ne!(node_id, different_id);

    assert_eq!(NodeId::for_file("src/index.ts").as_str(), "src/index.ts");
    assert_eq!(NodeId::external("react").as_str(), "external:react");
}

#[test]
fn test_edge_id_includes_kind() {
    let a = NodeId::new("a.tsx", "A");
    let b = NodeId::new("b.tsx", "B");
    assert_ne!(
        EdgeId::new(&a, &b, EdgeKind::Imports),
        EdgeId::new(&a, &b, EdgeKind::Renders)
    );
}

#[test]
fn test_declared_name() {
    let api = CodeNode::new(
        NodeId::new("app/api/users/route.ts", "POST"),
        "POST /api/users",
        NodeKind::Api,
        "app/api/users/route.ts",
    );
    assert_eq!(api.declared_name(), "POST");

    let button = node("src/Button.tsx", "Button", NodeKind::Component);
    assert_eq!(button.declared_name(), "Button");
}

#[test]
fn test_dependents_and_dependencies_are_inverse() {
    let names = ["a", "b", "c", "d", "e"];
    let nodes: Vec<CodeNode> = names
        .iter()
        .map(|n| node(&format!("{}.ts", n), n, NodeKind::Function))
        .collect();
    let id = |i: usize| nodes[i].id.clone();
    let edges = vec![
        Edge::new(id(0), id(1), EdgeKind::Calls),
        Edge::new(id(0), id(1), EdgeKind::Imports),
        Edge::new(id(1), id(2), EdgeKind::Calls),
        Edge::new(id(2), id(0), EdgeKind::Uses),
        Edge::new(id(3), id(2), EdgeKind::Renders),
        Edge::new(id(4), id(4), EdgeKind::Calls),
    ];
    let graph = DependencyGraph::from_parts(nodes.clone(), edges);

    for a in &nodes {
        for b in &nodes {
            let b_depends_on_a = graph.dependent_ids(&a.id).contains(&b.id);
            let a_is_dependency_of_b = graph.dependency_ids(&b.id).contains(&a.id);
            assert_eq!(b_depends_on_a, a_is_dependency_of_b, "{} / {}", a.id, b.id);
        }
    }
    assert!(graph.dependents(&id(4)).is_empty());
}

#[test]
fn test_ingest_proposals_marks_edges() {
    let page = node("src/Page.tsx", "Page", NodeKind::Component);
    let mut graph = DependencyGraph::from_parts(vec![page.clone()], vec![]);

    let proposed = node("src/Chart.tsx", "Chart", NodeKind::Component);
    let mut edge = Edge::new(page.id.clone(), proposed.id.clone(), EdgeKind::Renders);
    edge.ai_notes = Some("planner: page shows a chart".to_string());
    let dangling = Edge::new(page.id.clone(), NodeId::from("nowhere"), EdgeKind::Calls);

    let kept = graph.ingest_proposals(vec![proposed.clone()], vec![edge, dangling]);
    assert_eq!(kept, 1);
    assert_eq!(graph.node_count(), 2);
    let stored = graph.edges_from(&page.id).next().unwrap();
    assert!(stored.ai_generated);
    assert_eq!(stored.target, proposed.id);
}

#[test]
fn test_apply_positions_and_auto_layout() {
    let a = node("a.ts", "a", NodeKind::Function);
    let b = CodeNode::new(NodeId::for_file("a.ts"), "a.ts", NodeKind::File, "a.ts");
    let mut graph = DependencyGraph::from_parts(vec![a.clone(), b.clone()], vec![]);

    auto_layout(&mut graph);
    let file_pos = graph.node(&b.id).unwrap().position;
    let fn_pos = graph.node(&a.id).unwrap().position;
    assert_eq!(file_pos, Position::new(0.0, 0.0));
    assert!(fn_pos.x > file_pos.x);

    let mut saved = Positions::new();
    saved.insert(a.id.clone(), Position::new(42.0, 7.0));
    saved.insert(NodeId::from("gone.ts::gone"), Position::new(1.0, 1.0));
    graph.apply_positions(&saved);
    assert_eq!(graph.node(&a.id).unwrap().position, Position::new(42.0, 7.0));
}

#[test]
fn test_to_data_is_sorted() {
    let b = node("b.ts", "b", NodeKind::Function);
    let a = node("a.ts", "a", NodeKind::Function);
    let graph = DependencyGraph::from_parts(
        vec![b.clone(), a.clone()],
        vec![Edge::new(b.id.clone(), a.id.clone(), EdgeKind::Calls)],
    );
    let data = graph.to_data(GraphMetadata::default());
    let ids: Vec<_> = data.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["a.ts::a", "b.ts::b"]);
    assert_eq!(data.edges.len(), 1);
}

#[test]
fn test_edge_wire_format() {
    let edge = Edge::new(
        NodeId::new("src/Page.tsx", "Page"),
        NodeId::new("src/Button.tsx", "Button"),
        EdgeKind::Renders,
    )
    .at_line(4);

    insta::assert_json_snapshot!(edge, @r###"
    {
      "id": "src/Page.tsx::Page->src/Button.tsx::Button:renders",
      "source": "src/Page.tsx::Page",
      "target": "src/Button.tsx::Button",
      "type": "renders",
      "line": 4
    }
    "###);
}

#[test]
fn test_node_change_wire_format() {
    let change = NodeChange::modify_signature(
        NodeId::new("src/api.ts", "fetchUser"),
        "(id: string)",
        "(id: string, opts: Options)",
    );

    insta::assert_json_snapshot!(change, @r###"
    {
      "nodeId": "src/api.ts::fetchUser",
      "changeType": "modify-signature",
      "before": "(id: string)",
      "after": "(id: string, opts: Options)"
    }
    "###);

    let parsed: NodeChange =
        serde_json::from_str(r#"{"nodeId":"x.ts::X","changeType":"delete","before":"X"}"#).unwrap();
    assert_eq!(parsed.change_type, ChangeType::Delete);
    assert!(parsed.after.is_none());
}

#[test]
fn test_risk_and_severity_ordering() {
    assert!(RiskLevel::Critical > RiskLevel::High);
    assert!(RiskLevel::High > RiskLevel::Medium);
    assert!(RiskLevel::Medium > RiskLevel::Low);
    assert!(Severity::Critical.weight() > Severity::Low.weight());
}
