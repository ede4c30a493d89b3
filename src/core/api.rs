//! HTTP + WebSocket API for the calibrator
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session state
//! - DELETE /session/{id} - End session
//! - POST /session/{id}/control - Set one control
//! - POST /session/{id}/key - Press a calibrator key
//! - POST /session/{id}/reset - Restart the signal search
//! - GET /session/{id}/logs - System log
//! - GET /session/{id}/intercept - Decoded intercept
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::core::audio::plan_ambience;
use crate::core::commands::Key;
use crate::core::decoder::decode_state;
use crate::core::SignalEngine;
use crate::types::{Control, CuePlan, Intercept, LogEntry, SignalState};

/// One calibration session
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub engine: SignalEngine,
    pub update_tx: broadcast::Sender<SessionUpdate>,
}

impl Session {
    fn status(&self) -> SessionStatusResponse {
        let state = self.engine.state().clone();
        SessionStatusResponse {
            session_id: self.id.clone(),
            ambience: plan_ambience(&state),
            update_count: self.engine.update_count(),
            state,
        }
    }

    fn publish(&self) {
        let update = SessionUpdate {
            state: self.engine.state().clone(),
            latest_log: self.engine.log().last().cloned(),
        };
        // no subscribers is fine
        let _ = self.update_tx.send(update);
    }
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdate {
    pub state: SignalState,
    pub latest_log: Option<LogEntry>,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    pub broadcast_capacity: usize,
    next_session: AtomicU64,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session state response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub state: SignalState,
    pub update_count: u64,
    pub ambience: CuePlan,
}

/// Set control request
#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub control: Control,
    pub value: f64,
}

/// Key press request
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Create the API router
pub fn create_router(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        broadcast_capacity: config.broadcast_capacity.max(1),
        next_session: AtomicU64::new(1),
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/control", post(set_control))
        .route("/session/:id/key", post(press_key))
        .route("/session/:id/reset", post(reset_session))
        .route("/session/:id/logs", get(get_logs))
        .route("/session/:id/intercept", get(get_intercept))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(State(state): State<Arc<AppState>>) -> Json<NewSessionResponse> {
    let seq = state.next_session.fetch_add(1, Ordering::Relaxed);
    let session_id = generate_session_id(seq);
    let (tx, _) = broadcast::channel(state.broadcast_capacity);

    let session = Session {
        id: session_id.clone(),
        engine: SignalEngine::new(),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    info!(session = %session_id, "session created");

    Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
    })
}

/// Get session state
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session.status()))
}

/// End a session; live websocket feeds close with it
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    match sessions.remove(&id) {
        Some(session) => {
            info!(session = %id, updates = session.engine.update_count(), "session ended");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Set one control
async fn set_control(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ControlRequest>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.engine.set(req.control, req.value);
    debug!(session = %id, control = %req.control, value = req.value, "control set");
    session.publish();

    Ok(Json(session.status()))
}

/// Press a calibrator key (arrows step a control)
async fn press_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<KeyRequest>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let key = Key::from_name(&req.key).ok_or(StatusCode::BAD_REQUEST)?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    // mute and close belong to the client
    if key.command().apply(&mut session.engine).is_some() {
        session.publish();
    }

    Ok(Json(session.status()))
}

/// Restart the signal search
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    session.engine.reset();
    session.publish();

    Ok(Json(session.status()))
}

/// System log, oldest first
async fn get_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LogEntry>>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(session.engine.logs()))
}

/// Decoded intercept for the current coherence
async fn get_intercept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Intercept>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(decode_state(session.engine.state())))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward session updates until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SessionUpdate>) {
    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sink.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}

/// Generate session ID
fn generate_session_id(seq: u64) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    format!("session_{:x}{:04x}", nanos, seq)
}

/// Run the API server
pub async fn run_server(config: &ServerConfig) -> Result<(), ApiError> {
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .map_err(|source| ApiError::Bind { addr: config.addr.clone(), source })?;
    info!(addr = %config.addr, "calibrator API listening");
    println!("Signal calibrator API running on {}", config.addr);
    println!("  POST /session/new            - Create session");
    println!("  GET  /session/:id            - Get state");
    println!("  DELETE /session/:id          - End session");
    println!("  POST /session/:id/control    - Set control");
    println!("  POST /session/:id/key        - Press key");
    println!("  POST /session/:id/reset      - Reset");
    println!("  GET  /session/:id/logs       - System log");
    println!("  GET  /session/:id/intercept  - Decoded intercept");
    println!("  WS   /ws/:id                 - Live updates");
    println!("  GET  /health                 - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
