//! `ChatServer` — Axum HTTP + WebSocket server.
//!
//! Routes:
//!
//! - `GET /project/{project_id}/chat` — WebSocket upgrade; one session per
//!   connection, created at handshake and evicted when the socket closes
//! - `GET /health` — liveness snapshot
//!
//! Any other path falls through to the router's default: a plain HTTP 404
//! before any upgrade, so a client dialing a wrong path sees a refused
//! handshake rather than an open socket that is later torn down.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use agora_backend::BackendClient;
use agora_core::ProjectId;
use agora_llm::GeminiClient;

use crate::config::ServerConfig;
use crate::connection;
use crate::health::HealthResponse;
use crate::orchestrator::Orchestrator;
use crate::shutdown::ShutdownCoordinator;
use crate::store::SessionStore;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions.
    pub store: Arc<SessionStore>,
    /// Turn pipeline.
    pub orchestrator: Arc<Orchestrator>,
    /// When the server started.
    pub start_time: Instant,
    /// Per-connection outbound queue capacity.
    pub outbound_queue_size: usize,
}

/// The deliberation-chat server.
pub struct ChatServer {
    config: ServerConfig,
    store: Arc<SessionStore>,
    orchestrator: Arc<Orchestrator>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl ChatServer {
    /// Create a new server over shared LLM and backend clients.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        llm: Arc<GeminiClient>,
        backend: Arc<BackendClient>,
    ) -> Self {
        let store = Arc::new(SessionStore::new());
        let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&store), llm, backend));
        Self {
            config,
            store,
            orchestrator,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = AppState {
            store: Arc::clone(&self.store),
            orchestrator: Arc::clone(&self.orchestrator),
            start_time: self.start_time,
            outbound_queue_size: self.config.outbound_queue_size,
        };

        Router::new()
            .route("/project/{project_id}/chat", get(chat_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Get the session store.
    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Get the shutdown coordinator.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn listen(self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until shutdown.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "chat server listening");
        let token = self.shutdown.token();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    }
}

/// GET /project/{project_id}/chat
///
/// The session exists from the moment of the handshake; the connection task
/// evicts it when the socket closes.
async fn chat_handler(
    ws: WebSocketUpgrade,
    Path(project_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let project_id = ProjectId::from(project_id);
    ws.on_upgrade(move |socket| async move {
        let session = state.store.create(project_id.clone());
        connection::run(
            socket,
            session.id,
            project_id,
            Arc::clone(&state.store),
            Arc::clone(&state.orchestrator),
            state.outbound_queue_size,
        )
        .await;
    })
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(
        state.start_time.elapsed().as_secs(),
        state.store.len(),
    ))
}
