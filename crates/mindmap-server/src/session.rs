//! One analysis session over a project root
//!
//! The session owns the current graph snapshot, the request generation
//! counter and the propagation state machine. Scans, impact analysis and
//! patch application run on the blocking pool; the snapshot is swapped
//! wholesale, never mutated in place.

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mindmap_core::{
    auto_layout, CodeNode, CoherenceAnalyzer, DependencyGraph, Edge, GraphMetadata, LayoutStore,
    MindMapConfig, MindMapData, MindMapError, NodeChange, NodeId, Patch, Positions,
    PropagationResult,
};
use mindmap_indexer::SourceScanner;
use mindmap_propagation::{FsSource, PatchApplier, PropagationEngine};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::host::{Host, SystemHost};
use crate::protocol::{Request, Response};

/// Where the propagation workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Analyzing,
    ImpactReady,
    Applying,
    Applied,
    Failed,
}

/// A graph and its scan summary. Immutable once published.
#[derive(Debug)]
pub struct Snapshot {
    pub graph: DependencyGraph,
    pub metadata: GraphMetadata,
}

impl Snapshot {
    pub fn data(&self) -> MindMapData {
        self.graph.to_data(self.metadata.clone())
    }
}

pub struct Session {
    root: PathBuf,
    scanner: Arc<SourceScanner>,
    engine: PropagationEngine,
    applier: PatchApplier,
    layout: LayoutStore,
    host: Arc<dyn Host>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
    /// Generation of the newest scan or analysis request.
    latest: AtomicU64,
    state: Mutex<EngineState>,
}

impl Session {
    pub fn new(root: impl Into<PathBuf>, config: MindMapConfig) -> Self {
        Self::with_host(root, config, Arc::new(SystemHost))
    }

    pub fn with_host(root: impl Into<PathBuf>, config: MindMapConfig, host: Arc<dyn Host>) -> Self {
        let root = root.into();
        Session {
            engine: PropagationEngine::from_config(&config),
            applier: PatchApplier::new(root.clone()),
            layout: LayoutStore::new(&root),
            scanner: Arc::new(SourceScanner::new(config)),
            host,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
            latest: AtomicU64::new(0),
            state: Mutex::new(EngineState::Idle),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn state(&self) -> EngineState {
        *self.state.lock().await
    }

    /// The published graph, if a scan has completed.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Handle one request. Responses are returned in delivery order; an empty
    /// list means there is nothing to send or the result was superseded.
    pub async fn handle(&self, request: Request) -> Vec<Response> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if request.is_supersedable() {
            self.latest.fetch_max(generation, Ordering::SeqCst);
        }

        match request {
            Request::Ready => match self.snapshot().await {
                Some(snapshot) => vec![Response::Init {
                    generation,
                    data: snapshot.data(),
                }],
                None => {
                    self.latest.fetch_max(generation, Ordering::SeqCst);
                    self.refresh(generation).await.into_iter().collect()
                }
            },
            Request::Refresh => self.refresh(generation).await.into_iter().collect(),
            Request::SelectNode { node_id } => vec![self.select_node(generation, node_id).await],
            Request::AnalyzeImpact { change } => self.analyze(generation, change).await.into_iter().collect(),
            Request::ApplyChanges { patches } => self.apply(generation, patches).await,
            Request::SavePositions { positions } => {
                self.save_positions(positions).await;
                Vec::new()
            }
            Request::OpenFile { path, line } => {
                self.open_file(&path, line);
                Vec::new()
            }
            Request::IngestProposal { nodes, edges } => vec![self.ingest(generation, nodes, edges).await],
        }
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) > generation
    }

    async fn set_state(&self, state: EngineState) {
        *self.state.lock().await = state;
    }

    /// Scan the project and merge saved positions.
    async fn rescan(&self) -> anyhow::Result<Arc<Snapshot>> {
        let scanner = Arc::clone(&self.scanner);
        let root = self.root.clone();
        let layout = self.layout.clone();
        let snapshot = tokio::task::spawn_blocking(move || -> anyhow::Result<Snapshot> {
            let mut result = scanner.scan(&root)?;
            if let Some(saved) = layout.load() {
                result.graph.apply_positions(&saved.user_positions);
            }
            Ok(Snapshot {
                graph: result.graph,
                metadata: result.metadata,
            })
        })
        .await??;
        Ok(Arc::new(snapshot))
    }

    async fn refresh(&self, generation: u64) -> Option<Response> {
        let outcome = self.rescan().await;
        if self.is_superseded(generation) {
            warn!("Discarding scan #{}: superseded by a newer request", generation);
            return None;
        }
        match outcome {
            Ok(snapshot) => {
                let data = snapshot.data();
                *self.snapshot.write().await = Some(snapshot);
                self.set_state(EngineState::Idle).await;
                Some(Response::Init { generation, data })
            }
            Err(e) => {
                warn!("Scan failed: {:#}", e);
                Some(Response::error(generation, format!("scan failed: {:#}", e)))
            }
        }
    }

    async fn select_node(&self, generation: u64, node_id: NodeId) -> Response {
        let Some(snapshot) = self.snapshot().await else {
            return no_graph(generation);
        };
        let graph = &snapshot.graph;
        match graph.node(&node_id) {
            Some(node) => Response::NodeDetails {
                generation,
                node: node.clone(),
                dependents: graph.dependents(&node_id).into_iter().cloned().collect(),
                dependencies: graph.dependencies(&node_id).into_iter().cloned().collect(),
            },
            None => Response::error(generation, MindMapError::NotFound(node_id).to_string()),
        }
    }

    async fn analyze(&self, generation: u64, change: NodeChange) -> Option<Response> {
        let Some(snapshot) = self.snapshot().await else {
            return Some(no_graph(generation));
        };
        self.set_state(EngineState::Analyzing).await;

        let engine = self.engine.clone();
        let sources = FsSource::new(self.root.clone());
        let outcome =
            tokio::task::spawn_blocking(move || engine.analyze_impact(&snapshot.graph, &change, &sources)).await;

        if self.is_superseded(generation) {
            warn!("Discarding impact analysis #{}: superseded by a newer request", generation);
            return None;
        }
        let mut state = self.state.lock().await;
        match outcome {
            Ok(Ok(impact)) => {
                *state = EngineState::ImpactReady;
                Some(Response::ImpactResult { generation, data: impact })
            }
            Ok(Err(e)) => {
                *state = EngineState::Failed;
                Some(Response::error(generation, e.to_string()))
            }
            Err(e) => {
                *state = EngineState::Failed;
                Some(Response::error(generation, format!("impact analysis aborted: {}", e)))
            }
        }
    }

    /// Apply accepted patches, then rescan if anything was written.
    async fn apply(&self, generation: u64, patches: Vec<Patch>) -> Vec<Response> {
        {
            let mut state = self.state.lock().await;
            if *state != EngineState::ImpactReady {
                return vec![Response::error(
                    generation,
                    format!("cannot apply changes in state {:?}; analyze a change first", *state),
                )];
            }
            *state = EngineState::Applying;
        }

        let applier = self.applier.clone();
        let result = match tokio::task::spawn_blocking(move || applier.apply(&patches)).await {
            Ok(result) => result,
            Err(e) => PropagationResult::failed(Vec::new(), vec![format!("patch application aborted: {}", e)]),
        };
        let succeeded = result.success;
        let wrote = !result.files_modified.is_empty();
        if !succeeded {
            warn!("Applying changes failed: {:?}", result.errors);
        }
        self.set_state(if succeeded {
            EngineState::Applied
        } else {
            EngineState::Failed
        })
        .await;

        let mut responses = vec![Response::PropagationResult { generation, result }];
        if succeeded || wrote {
            match self.rescan().await {
                Ok(snapshot) => {
                    let data = snapshot.data();
                    *self.snapshot.write().await = Some(snapshot);
                    if succeeded {
                        self.set_state(EngineState::Idle).await;
                    }
                    responses.push(Response::Init { generation, data });
                }
                Err(e) => responses.push(Response::error(generation, format!("rescan failed: {:#}", e))),
            }
        }
        responses
    }

    async fn save_positions(&self, positions: Positions) {
        let layout = self.layout.clone();
        match tokio::task::spawn_blocking(move || layout.save(&positions)).await {
            Ok(Ok(storage)) => debug!("Saved layout with {} position(s)", storage.user_positions.len()),
            Ok(Err(e)) => warn!("Failed to save layout: {}", e),
            Err(e) => warn!("Failed to save layout: {}", e),
        }
    }

    fn open_file(&self, path: &str, line: Option<u32>) {
        let relative = Path::new(path);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            warn!("Refusing to open '{}': not inside the project", path);
            return;
        }
        if let Err(e) = self.host.open_file(&self.root.join(relative), line) {
            warn!("Failed to open {}: {:#}", path, e);
        }
    }

    /// Merge planner proposals into a copy of the current graph and publish it.
    async fn ingest(&self, generation: u64, nodes: Vec<CodeNode>, edges: Vec<Edge>) -> Response {
        let mut published = self.snapshot.write().await;
        let Some(current) = published.as_ref() else {
            return no_graph(generation);
        };

        let mut graph = current.graph.clone();
        let proposed = edges.len();
        let kept = graph.ingest_proposals(nodes, edges);
        auto_layout(&mut graph);
        if let Some(saved) = self.layout.load() {
            graph.apply_positions(&saved.user_positions);
        }

        let issues = CoherenceAnalyzer::analyze(&graph);
        let metadata = GraphMetadata {
            total_files: current.metadata.total_files,
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            coherence_score: CoherenceAnalyzer::score(&issues),
            issues,
            warnings: current.metadata.warnings.clone(),
        };
        info!("Ingested proposal: kept {} of {} edge(s)", kept, proposed);

        let snapshot = Arc::new(Snapshot { graph, metadata });
        let data = snapshot.data();
        *published = Some(snapshot);
        Response::Init { generation, data }
    }
}

fn no_graph(generation: u64) -> Response {
    Response::error(generation, "no graph yet; send `ready` first")
}
