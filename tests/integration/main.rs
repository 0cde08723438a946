//! Integration tests for mindmap
//!
//! These tests drive the scanner, the propagation engine and the patch
//! applier together over real files, and run the CLI binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use mindmap_core::{MindMapConfig, NodeChange, NodeId, NodeKind, RiskLevel};
use mindmap_indexer::{ScanResult, SourceScanner};
use mindmap_propagation::{FsSource, PatchApplier, PropagationEngine};
use mindmap_server::{EngineState, Request, Response, Session};
use tempfile::TempDir;

const PROFILE_APP: &[(&str, &str)] = &[
    (
        "src/api.ts",
        "export function fetchUser(id: string, retries: number) {\n  return id;\n}\n",
    ),
    (
        "src/hooks/useUser.ts",
        "import { fetchUser } from '../api';\n\nexport function useUser(id: string) {\n  return fetchUser(id, 3);\n}\n",
    ),
    (
        "src/Profile.tsx",
        "import { useUser } from './hooks/useUser';\n\nexport function Profile() {\n  const user = useUser('1');\n  return <div>{user}</div>;\n}\n",
    ),
];

fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, content) in structure {
        let full_path = temp_dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }
    temp_dir
}

fn scan(root: &Path) -> ScanResult {
    SourceScanner::new(MindMapConfig::default()).scan(root).unwrap()
}

fn fetch_user() -> NodeId {
    NodeId::from("src/api.ts::fetchUser")
}

#[test]
fn test_signature_change_end_to_end() {
    let repo = create_repo_with_structure(PROFILE_APP);
    let engine = PropagationEngine::default();
    let sources = FsSource::new(repo.path());

    let before = scan(repo.path());
    assert_eq!(before.graph.node(&NodeId::from("src/hooks/useUser.ts::useUser")).unwrap().kind, NodeKind::Hook);

    let change = NodeChange::modify_signature(fetch_user(), "(id: string, retries: number)", "(id: string)");
    let impact = engine.analyze_impact(&before.graph, &change, &sources).unwrap();

    assert_eq!(impact.risk_level, RiskLevel::High);
    assert_eq!(impact.breaking_changes.len(), 1);
    let breaking = &impact.breaking_changes[0];
    assert_eq!(breaking.path, "src/hooks/useUser.ts");
    assert_eq!(breaking.line, 4);
    let transitive: Vec<&str> = impact.transitive_impact.iter().map(|e| e.node_id.as_str()).collect();
    assert!(transitive.contains(&"src/Profile.tsx::Profile"));

    let fixes: Vec<(&str, u32, &str)> = impact
        .suggested_fixes
        .iter()
        .map(|f| (f.path.as_str(), f.line, f.new_code.as_str()))
        .collect();
    assert_eq!(
        fixes,
        vec![
            ("src/api.ts", 1, "export function fetchUser(id: string) {"),
            ("src/hooks/useUser.ts", 4, "return fetchUser(id);"),
        ]
    );

    let result = PatchApplier::new(repo.path()).apply(&impact.suggested_fixes);
    assert!(result.success, "{:?}", result.errors);
    assert_eq!(
        fs::read_to_string(repo.path().join("src/hooks/useUser.ts")).unwrap(),
        "import { fetchUser } from '../api';\n\nexport function useUser(id: string) {\n  return fetchUser(id);\n}\n"
    );

    // The rescanned project no longer has anything to fix
    let after = scan(repo.path());
    assert_eq!(after.graph.node_count(), before.graph.node_count());
    assert_eq!(after.graph.edge_count(), before.graph.edge_count());
    let again = NodeChange::modify_signature(fetch_user(), "(id: string)", "(id: string)");
    let settled = engine.analyze_impact(&after.graph, &again, &sources).unwrap();
    assert!(settled.breaking_changes.is_empty());
    assert_eq!(settled.risk_level, RiskLevel::Medium);
}

#[test]
fn test_delete_fixes_are_guidance_only() {
    let repo = create_repo_with_structure(PROFILE_APP);
    let graph = scan(repo.path()).graph;
    let use_user = NodeId::from("src/hooks/useUser.ts::useUser");

    let change = NodeChange::delete(use_user.clone(), "useUser");
    let impact = PropagationEngine::default()
        .analyze_impact(&graph, &change, &FsSource::new(repo.path()))
        .unwrap();

    assert!(impact.risk_level >= RiskLevel::High);
    for dependent in graph.dependent_ids(&use_user) {
        assert!(
            impact.breaking_changes.iter().any(|b| b.node_id == dependent),
            "{} should break",
            dependent
        );
    }
    assert!(!impact.suggested_fixes.is_empty());
    assert!(impact.suggested_fixes.iter().all(|f| !f.auto_fixable));

    // Guidance cannot be applied, and nothing is written
    let result = PatchApplier::new(repo.path()).apply(&impact.suggested_fixes);
    assert!(!result.success);
    assert!(result.files_modified.is_empty());
    assert_eq!(
        fs::read_to_string(repo.path().join("src/Profile.tsx")).unwrap(),
        PROFILE_APP[2].1
    );
}

#[test]
fn test_cli_scan_json() {
    let repo = create_repo_with_structure(PROFILE_APP);
    let output = Command::new(env!("CARGO_BIN_EXE_mindmap"))
        .arg("--root")
        .arg(repo.path())
        .args(["scan", "--json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let data: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(data["metadata"]["totalFiles"], 3);
    let ids: Vec<&str> = data["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["id"].as_str())
        .collect();
    assert!(ids.contains(&"src/Profile.tsx::Profile"));
}

#[test]
fn test_cli_impact() {
    let repo = create_repo_with_structure(PROFILE_APP);
    let output = Command::new(env!("CARGO_BIN_EXE_mindmap"))
        .arg("--root")
        .arg(repo.path())
        .args(["impact", "src/api.ts::fetchUser", "--rename", "loadUser"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let impact: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(impact["change"]["changeType"], "rename");
    assert_eq!(impact["change"]["before"], "fetchUser");
    assert_eq!(impact["riskLevel"], "high");

    let missing = Command::new(env!("CARGO_BIN_EXE_mindmap"))
        .arg("--root")
        .arg(repo.path())
        .args(["impact", "src/api.ts::nope", "--delete"])
        .output()
        .expect("Failed to execute command");
    assert!(!missing.status.success());
}

#[test]
fn test_session_rename_round_trip() {
    let repo = create_repo_with_structure(PROFILE_APP);
    let session = Session::new(repo.path(), MindMapConfig::default());

    let init = tokio_test::block_on(session.handle(Request::Ready));
    assert!(matches!(init.as_slice(), [Response::Init { generation: 1, .. }]));

    let change = NodeChange::rename(fetch_user(), "fetchUser", "loadUser");
    let analyzed = tokio_test::block_on(session.handle(Request::AnalyzeImpact { change }));
    let [Response::ImpactResult { data: impact, .. }] = analyzed.as_slice() else {
        panic!("expected impact, got {:?}", analyzed);
    };

    let patches = impact.suggested_fixes.clone();
    let applied = tokio_test::block_on(session.handle(Request::ApplyChanges { patches }));
    let [Response::PropagationResult { result, .. }, Response::Init { data, .. }] = applied.as_slice() else {
        panic!("expected result and init, got {:?}", applied);
    };
    assert!(result.success, "{:?}", result.errors);
    assert!(data.nodes.iter().any(|n| n.id == NodeId::from("src/api.ts::loadUser")));
    assert!(data
        .edges
        .iter()
        .any(|e| e.id.0.as_str() == "src/hooks/useUser.ts::useUser->src/api.ts::loadUser:calls"));
    assert_eq!(tokio_test::block_on(session.state()), EngineState::Idle);
}
