//! REST API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use mindmap_core::MindMapData;
use serde::Serialize;

use crate::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub graph_ready: bool,
}

/// The current graph and metadata; 404 until the first scan finishes.
pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Result<Json<MindMapData>, StatusCode> {
    match state.session.snapshot().await {
        Some(snapshot) => Ok(Json(snapshot.data())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        graph_ready: state.session.snapshot().await.is_some(),
    })
}
