//! HTTP + WebSocket server around an analysis session

pub mod handlers;
pub mod host;
pub mod protocol;
pub mod router;
pub mod session;
pub mod websocket;

#[cfg(test)]
pub mod test_utils;


use std::sync::Arc;

use tracing::info;

pub use host::{Host, SystemHost};
pub use protocol::{Request, Response};
pub use session::{EngineState, Session, Snapshot};

/// Bind address for [`MindMapServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// State shared by every route.
pub struct ServerState {
    pub session: Session,
}

impl ServerState {
    pub fn new(session: Session) -> Self {
        ServerState { session }
    }
}

pub struct MindMapServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl MindMapServer {
    pub fn new(session: Session, config: ServerConfig) -> Self {
        MindMapServer {
            state: Arc::new(ServerState::new(session)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until the process is stopped.
    pub async fn start(self) -> anyhow::Result<()> {
        let address = self.config.address();
        let app = router::create_router(self.state);
        let listener = tokio::net::TcpListener::bind(&address).await?;
        info!("Listening on http://{}", address);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
