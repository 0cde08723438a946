//! Request/response messages exchanged with the presentation layer
//!
//! Both directions are JSON objects tagged by `type`.

use mindmap_core::{
    CodeNode, Edge, ImpactAnalysis, MindMapData, NodeChange, NodeId, Patch, Positions,
    PropagationResult,
};
use serde::{Deserialize, Serialize};

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// First message after connecting; scans if needed.
    Ready,
    /// Rescan the project.
    Refresh,
    #[serde(rename_all = "camelCase")]
    SelectNode { node_id: NodeId },
    AnalyzeImpact { change: NodeChange },
    ApplyChanges { patches: Vec<Patch> },
    SavePositions { positions: Positions },
    OpenFile {
        path: String,
        #[serde(default)]
        line: Option<u32>,
    },
    /// Nodes and edges proposed by the planner.
    IngestProposal {
        #[serde(default)]
        nodes: Vec<CodeNode>,
        #[serde(default)]
        edges: Vec<Edge>,
    },
}

impl Request {
    /// Requests whose results a newer request of the same family makes obsolete.
    /// `ready` joins them only when there is no graph yet and it has to scan.
    pub fn is_supersedable(&self) -> bool {
        matches!(self, Request::Refresh | Request::AnalyzeImpact { .. })
    }
}

/// Messages sent by the server. `generation` echoes the request being answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    Init {
        generation: u64,
        data: MindMapData,
    },
    NodeDetails {
        generation: u64,
        node: CodeNode,
        dependents: Vec<CodeNode>,
        dependencies: Vec<CodeNode>,
    },
    ImpactResult {
        generation: u64,
        data: ImpactAnalysis,
    },
    PropagationResult {
        generation: u64,
        #[serde(flatten)]
        result: PropagationResult,
    },
    Error {
        generation: u64,
        message: String,
    },
}

impl Response {
    pub fn generation(&self) -> u64 {
        match self {
            Response::Init { generation, .. }
            | Response::NodeDetails { generation, .. }
            | Response::ImpactResult { generation, .. }
            | Response::PropagationResult { generation, .. }
            | Response::Error { generation, .. } => *generation,
        }
    }

    pub fn error(generation: u64, message: impl Into<String>) -> Self {
        Response::Error {
            generation,
            message: message.into(),
        }
    }
}
