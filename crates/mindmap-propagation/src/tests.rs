//! Unit tests for impact analysis and patch application

use std::collections::{BTreeSet, HashMap};
use std::fs;

use mindmap_core::{
    DependencyGraph, Edge, EdgeKind, MindMapError, NodeChange, NodeId, RiskLevel,
};

use crate::engine::PropagationEngine;
use crate::patch::PatchApplier;
use crate::source::FsSource;
use crate::test_utils::{create_repo_with_structure, function, rename_app_graph, RENAME_APP};

fn no_sources() -> HashMap<String, String> {
    HashMap::new()
}

/// `target` with 5 direct and 12 transitive dependents. `t1` and `t4` depend
/// on nothing but a direct dependent; every other transitive node also
/// depends on `shared`.
fn fan_out_graph() -> DependencyGraph {
    let names = [
        "target", "shared", "d1", "d2", "d3", "d4", "d5", "t1", "t2", "t3", "t4", "t5", "t6", "t7",
        "t8", "t9", "t10", "t11", "t12",
    ];
    let id = |name: &str| NodeId::new(&format!("src/{}.ts", name), name);
    let mut edges = Vec::new();
    let mut calls = |from: &str, to: &str| edges.push(Edge::new(id(from), id(to), EdgeKind::Calls));

    for d in ["d1", "d2", "d3", "d4", "d5"] {
        calls(d, "target");
    }
    for (t, d) in [
        ("t1", "d1"),
        ("t2", "d1"),
        ("t3", "d1"),
        ("t4", "d2"),
        ("t5", "d2"),
        ("t6", "d2"),
        ("t7", "d3"),
        ("t8", "d3"),
        ("t9", "d4"),
        ("t10", "t1"),
        ("t11", "t2"),
        ("t12", "t10"),
    ] {
        calls(t, d);
        if t != "t1" && t != "t4" {
            calls(t, "shared");
        }
    }

    DependencyGraph::from_parts(names.iter().map(|n| function(n)).collect(), edges)
}

#[test]
fn test_rename_breaks_literal_references() {
    let repo = create_repo_with_structure(RENAME_APP);
    let graph = rename_app_graph();
    let change = NodeChange::rename(NodeId::from("src/foo.tsx::Foo"), "Foo", "Bar");

    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &FsSource::new(repo.path()))
        .unwrap();

    let import = impact
        .breaking_changes
        .iter()
        .find(|b| b.node_id == NodeId::from("src/baz.tsx"))
        .expect("the import line should break");
    assert_eq!(import.line, 1);
    assert_eq!(import.current_code, "import { Foo } from './foo';");

    let import_fix = impact
        .suggested_fixes
        .iter()
        .find(|f| f.path == "src/baz.tsx" && f.line == 1)
        .unwrap();
    assert!(import_fix.auto_fixable);
    assert_eq!(import_fix.new_code, "import { Bar } from './foo';");

    let fixes: Vec<(&str, u32, &str)> = impact
        .suggested_fixes
        .iter()
        .map(|f| (f.path.as_str(), f.line, f.new_code.as_str()))
        .collect();
    assert_eq!(
        fixes,
        vec![
            ("src/foo.tsx", 1, "export function Bar() {"),
            ("src/baz.tsx", 1, "import { Bar } from './foo';"),
            ("src/baz.tsx", 4, "return <Bar />;"),
        ]
    );

    let direct: Vec<&str> = impact.direct_impact.iter().map(|e| e.node_id.as_str()).collect();
    assert_eq!(direct, vec!["src/baz.tsx", "src/baz.tsx::Baz"]);
    assert_eq!(impact.direct_impact[1].description, "renders Foo");
    // App renders Baz, but never mentions Foo
    let transitive: Vec<&str> = impact.transitive_impact.iter().map(|e| e.node_id.as_str()).collect();
    assert_eq!(transitive, vec!["src/app.tsx", "src/app.tsx::App"]);
    assert_eq!(impact.risk_level, RiskLevel::High);
}

#[test]
fn test_accepted_rename_fixes_apply_cleanly() {
    let repo = create_repo_with_structure(RENAME_APP);
    let graph = rename_app_graph();
    let change = NodeChange::rename(NodeId::from("src/foo.tsx::Foo"), "Foo", "Bar");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &FsSource::new(repo.path()))
        .unwrap();

    // Patches are independent, so order does not matter
    let mut patches = impact.suggested_fixes.clone();
    patches.reverse();
    let result = PatchApplier::new(repo.path()).apply(&patches);

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.files_modified, vec!["src/baz.tsx".to_string(), "src/foo.tsx".to_string()]);
    assert_eq!(
        fs::read_to_string(repo.path().join("src/baz.tsx")).unwrap(),
        "import { Bar } from './foo';\n\nexport function Baz() {\n  return <Bar />;\n}\n"
    );
    assert_eq!(
        fs::read_to_string(repo.path().join("src/foo.tsx")).unwrap(),
        "export function Bar() {\n  return <div />;\n}\n"
    );
}

#[test]
fn test_rename_sees_past_apostrophes() {
    let baz = "import { Foo } from './foo';\n// it's Foo that renders here\nexport function Baz() {\n  return <p>Don't panic <Foo /></p>;\n}\n";
    let repo = create_repo_with_structure(&[RENAME_APP[0], ("src/baz.tsx", baz), RENAME_APP[2]]);
    let graph = rename_app_graph();
    let change = NodeChange::rename(NodeId::from("src/foo.tsx::Foo"), "Foo", "Bar");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &FsSource::new(repo.path()))
        .unwrap();

    let breaking: Vec<(&str, u32)> = impact
        .breaking_changes
        .iter()
        .map(|b| (b.node_id.as_str(), b.line))
        .collect();
    assert_eq!(
        breaking,
        vec![("src/baz.tsx", 1), ("src/baz.tsx", 2), ("src/baz.tsx::Baz", 4)]
    );

    let result = PatchApplier::new(repo.path()).apply(&impact.suggested_fixes);
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(
        fs::read_to_string(repo.path().join("src/baz.tsx")).unwrap(),
        "import { Bar } from './foo';\n// it's Bar that renders here\nexport function Baz() {\n  return <p>Don't panic <Bar /></p>;\n}\n"
    );
}

#[test]
fn test_stale_patches_leave_files_untouched() {
    let repo = create_repo_with_structure(RENAME_APP);
    let graph = rename_app_graph();
    let change = NodeChange::rename(NodeId::from("src/foo.tsx::Foo"), "Foo", "Bar");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &FsSource::new(repo.path()))
        .unwrap();

    let edited = "import { Foo as Qux } from './foo';\n\nexport function Baz() {\n  return <Qux />;\n}\n";
    fs::write(repo.path().join("src/baz.tsx"), edited).unwrap();

    let err = PatchApplier::new(repo.path())
        .try_apply(&impact.suggested_fixes)
        .unwrap_err();
    assert!(matches!(err, MindMapError::StaleChange(ref stale) if stale.len() == 2));

    assert_eq!(fs::read_to_string(repo.path().join("src/baz.tsx")).unwrap(), edited);
    assert_eq!(
        fs::read_to_string(repo.path().join("src/foo.tsx")).unwrap(),
        RENAME_APP[0].1
    );
}

#[test]
fn test_delete_with_unresolvable_transitive_dependents_is_critical() {
    let graph = fan_out_graph();
    let change = NodeChange::delete(NodeId::from("src/target.ts::target"), "target");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &no_sources())
        .unwrap();

    assert_eq!(impact.risk_level, RiskLevel::Critical);
    assert_eq!(impact.direct_impact.len(), 5);
    assert_eq!(impact.transitive_impact.len(), 10);

    let breaking: BTreeSet<&str> = impact.breaking_changes.iter().map(|b| b.node_id.as_str()).collect();
    let expected: BTreeSet<&str> = [
        "src/d1.ts::d1",
        "src/d2.ts::d2",
        "src/d3.ts::d3",
        "src/d4.ts::d4",
        "src/d5.ts::d5",
        "src/t1.ts::t1",
        "src/t4.ts::t4",
    ]
    .into_iter()
    .collect();
    assert_eq!(breaking, expected);

    // Deletion fixes need judgement
    assert!(impact.suggested_fixes.iter().all(|f| !f.auto_fixable));
}

#[test]
fn test_every_direct_dependent_of_a_delete_breaks() {
    let graph = fan_out_graph();
    let change = NodeChange::delete(NodeId::from("src/d1.ts::d1"), "d1");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &no_sources())
        .unwrap();

    let breaking: BTreeSet<&NodeId> = impact.breaking_changes.iter().map(|b| &b.node_id).collect();
    for entry in &impact.direct_impact {
        assert!(breaking.contains(&entry.node_id), "{} should break", entry.node_id);
    }
    // t10, t11 and t12 still reach `shared`
    assert_eq!(impact.transitive_impact.len(), 3);
    assert_eq!(impact.risk_level, RiskLevel::High);
}

#[test]
fn test_isolated_delete_is_low_risk() {
    let graph = fan_out_graph();
    for leaf in ["src/t12.ts::t12", "src/t11.ts::t11", "src/d5.ts::d5"] {
        let change = NodeChange::delete(NodeId::from(leaf), "");
        let impact = PropagationEngine::default()
            .analyze_impact(&graph, &change, &no_sources())
            .unwrap();
        assert_eq!(impact.risk_level, RiskLevel::Low, "{}", leaf);
        assert!(impact.breaking_changes.is_empty());
        assert!(impact.direct_impact.is_empty());
        assert!(impact.transitive_impact.is_empty());
    }
}

#[test]
fn test_rename_without_literal_references_is_medium() {
    let graph = fan_out_graph();
    // No sources to read, so nothing can be shown to break
    let change = NodeChange::rename(NodeId::from("src/shared.ts::shared"), "shared", "common");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &no_sources())
        .unwrap();
    assert_eq!(impact.risk_level, RiskLevel::Medium);
    assert_eq!(impact.direct_impact.len(), 10);
}

#[test]
fn test_reported_ids_are_graph_nodes() {
    let graph = fan_out_graph();
    let engine = PropagationEngine::default();
    for node in graph.nodes() {
        for change in [
            NodeChange::delete(node.id.clone(), node.name.clone()),
            NodeChange::rename(node.id.clone(), node.name.clone(), "renamed"),
        ] {
            let impact = engine.analyze_impact(&graph, &change, &no_sources()).unwrap();
            let reported = impact
                .breaking_changes
                .iter()
                .map(|b| &b.node_id)
                .chain(impact.direct_impact.iter().map(|e| &e.node_id))
                .chain(impact.transitive_impact.iter().map(|e| &e.node_id));
            for id in reported {
                assert!(graph.contains(id), "{} is not in the graph", id);
                assert_ne!(id, &node.id);
            }
        }
    }
}

#[test]
fn test_impact_wire_format() {
    let graph = rename_app_graph();
    let repo = create_repo_with_structure(RENAME_APP);
    let change = NodeChange::rename(NodeId::from("src/foo.tsx::Foo"), "Foo", "Bar");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &FsSource::new(repo.path()))
        .unwrap();

    insta::assert_json_snapshot!(impact.breaking_changes, @r###"
    [
      {
        "nodeId": "src/baz.tsx",
        "path": "src/baz.tsx",
        "line": 1,
        "currentCode": "import { Foo } from './foo';",
        "reason": "references `Foo`, which will not resolve after the rename to `Bar`"
      },
      {
        "nodeId": "src/baz.tsx::Baz",
        "path": "src/baz.tsx",
        "line": 4,
        "currentCode": "return <Foo />;",
        "reason": "references `Foo`, which will not resolve after the rename to `Bar`"
      }
    ]
    "###);

    let json = serde_json::to_value(&impact).unwrap();
    assert_eq!(json["riskLevel"], "high");
    assert_eq!(json["change"]["changeType"], "rename");
    assert_eq!(json["suggestedFixes"][0]["autoFixable"], true);
}
