//! CLI command implementations

use anyhow::Context;
use mindmap_core::{LayoutStore, MindMapConfig, MindMapError, NodeChange, NodeId};
use mindmap_indexer::SourceScanner;
use mindmap_propagation::{FsSource, PropagationEngine};
use mindmap_server::{MindMapServer, Request, Response, ServerConfig, Session};
use std::path::PathBuf;

/// The change described by `mindmap impact` flags.
pub enum ChangeRequest {
    Rename(String),
    Delete,
    Signature { before: String, after: String },
}

pub async fn serve(root: PathBuf, host: String, port: u16, open: bool) -> anyhow::Result<()> {
    let config = MindMapConfig::load(&root)?;
    tracing::info!("Starting mindmap server on {}:{}", host, port);

    let session = Session::new(root, config);
    // Scan up front so the first client gets a graph immediately
    for response in session.handle(Request::Ready).await {
        match response {
            Response::Init { data, .. } => tracing::info!(
                "Indexed {} nodes, {} edges (coherence {})",
                data.metadata.total_nodes,
                data.metadata.total_edges,
                data.metadata.coherence_score
            ),
            Response::Error { message, .. } => anyhow::bail!(message),
            _ => {}
        }
    }

    let server = MindMapServer::new(session, ServerConfig { host, port });
    if open {
        let url = format!("http://{}/api/graph", server.config().address());
        if let Err(e) = open::that(&url) {
            tracing::warn!("Failed to open {}: {}", url, e);
        }
    }

    server.start().await
}

pub async fn scan(root: PathBuf, json: bool) -> anyhow::Result<()> {
    tracing::info!("Scanning project: {}", root.display());

    let config = MindMapConfig::load(&root)?;
    let result = SourceScanner::new(config).scan(&root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.to_data())?);
        return Ok(());
    }

    let metadata = &result.metadata;
    println!(
        "{} files, {} nodes, {} edges",
        metadata.total_files, metadata.total_nodes, metadata.total_edges
    );
    println!("Coherence score: {}", metadata.coherence_score);
    for issue in &metadata.issues {
        println!("  [{:?}] {}", issue.severity, issue.message);
    }
    for warning in &metadata.warnings {
        println!("  warning: {}: {}", warning.path, warning.message);
    }
    Ok(())
}

pub async fn impact(root: PathBuf, node_id: String, change: ChangeRequest) -> anyhow::Result<()> {
    let config = MindMapConfig::load(&root)?;
    let engine = PropagationEngine::from_config(&config);
    let result = SourceScanner::new(config).scan(&root)?;

    let node_id = NodeId::from(node_id.as_str());
    let node = result
        .graph
        .node(&node_id)
        .ok_or_else(|| MindMapError::NotFound(node_id.clone()))?;
    let name = node.declared_name().to_string();

    let change = match change {
        ChangeRequest::Rename(after) => NodeChange::rename(node_id, name, after),
        ChangeRequest::Delete => NodeChange::delete(node_id, name),
        ChangeRequest::Signature { before, after } => NodeChange::modify_signature(node_id, before, after),
    };

    let analysis = engine
        .analyze_impact(&result.graph, &change, &FsSource::new(&root))
        .with_context(|| format!("analyzing {}", change.node_id))?;
    tracing::info!(
        "{} breaking change(s), risk {:?}",
        analysis.breaking_changes.len(),
        analysis.risk_level
    );
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Clearing saved layout for: {}", root.display());

    LayoutStore::new(&root).clear()?;

    tracing::info!("Layout cleared");
    Ok(())
}
