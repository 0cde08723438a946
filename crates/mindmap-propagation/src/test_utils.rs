//! Test utilities for impact analysis

use std::fs;

use mindmap_core::{CodeNode, DependencyGraph, Edge, EdgeKind, NodeId, NodeKind};
use tempfile::TempDir;

/// `Foo` is rendered by `Baz`, which `App` renders in turn.
pub const RENAME_APP: &[(&str, &str)] = &[
    ("src/foo.tsx", "export function Foo() {\n  return <div />;\n}\n"),
    (
        "src/baz.tsx",
        "import { Foo } from './foo';\n\nexport function Baz() {\n  return <Foo />;\n}\n",
    ),
    (
        "src/app.tsx",
        "import { Baz } from './baz';\n\nexport function App() {\n  return <Baz />;\n}\n",
    ),
];

/// The graph a scan of [`RENAME_APP`] produces, minus external and file-to-file edges.
pub fn rename_app_graph() -> DependencyGraph {
    let nodes = vec![
        file("src/foo.tsx", 3),
        decl("src/foo.tsx", "Foo", NodeKind::Component, 1, 3),
        file("src/baz.tsx", 5),
        decl("src/baz.tsx", "Baz", NodeKind::Component, 3, 3),
        file("src/app.tsx", 5),
        decl("src/app.tsx", "App", NodeKind::Component, 3, 3),
    ];
    let edges = vec![
        Edge::new(NodeId::from("src/baz.tsx"), NodeId::from("src/foo.tsx::Foo"), EdgeKind::Imports).at_line(1),
        Edge::new(NodeId::from("src/baz.tsx::Baz"), NodeId::from("src/foo.tsx::Foo"), EdgeKind::Renders).at_line(4),
        Edge::new(NodeId::from("src/app.tsx"), NodeId::from("src/baz.tsx::Baz"), EdgeKind::Imports).at_line(1),
        Edge::new(NodeId::from("src/app.tsx::App"), NodeId::from("src/baz.tsx::Baz"), EdgeKind::Renders).at_line(4),
    ];
    DependencyGraph::from_parts(nodes, edges)
}

/// A one-line function declared in `src/<name>.ts`.
pub fn function(name: &str) -> CodeNode {
    decl(&format!("src/{}.ts", name), name, NodeKind::Function, 1, 1)
}

pub fn decl(path: &str, name: &str, kind: NodeKind, line: u32, lines_of_code: u32) -> CodeNode {
    let mut node = CodeNode::new(NodeId::new(path, name), name, kind, path);
    node.line = Some(line);
    node.lines_of_code = lines_of_code;
    node
}

pub fn file(path: &str, lines_of_code: u32) -> CodeNode {
    let mut node = CodeNode::new(NodeId::for_file(path), path, NodeKind::File, path);
    node.line = Some(1);
    node.lines_of_code = lines_of_code;
    node
}

/// Create a repository with a specific file structure
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}
