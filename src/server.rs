//! HTTP and WebSocket front end: one session per socket at `/ws`, the
//! browser client served from the static directory.

use anyhow::{Context, Result};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde_json::json;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::core::{DeviceProvider, PngCodec, RenderSettings};
use crate::loaders::AssetSceneLoader;
use crate::protocol::{self, ServerMessage};
use crate::registry::{ConnectionId, SessionRegistry};
use crate::session::SessionContext;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub outbound_capacity: usize,
}

/// Default collaborators: asset loader, software render devices, PNG frames
pub fn build_context(config: &ServerConfig) -> SessionContext {
    SessionContext {
        loader: Arc::new(AssetSceneLoader::new(&config.asset_root)),
        devices: DeviceProvider::software(
            config.viewport,
            RenderSettings::default(),
            config.shared_render_context,
        ),
        codec: Arc::new(PngCodec::default()),
        config: config.session_config(),
    }
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.registry.len(),
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = ConnectionId::new();
    let (outbound, outbound_rx) = mpsc::channel(state.outbound_capacity);
    let session = match state.registry.on_connect(id, outbound) {
        Ok(session) => session,
        Err(err) => {
            warn!("Rejecting connection: {err}");
            return;
        }
    };

    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(write_outbound(id, sink, outbound_rx));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match protocol::decode(text.as_str()) {
                Ok(Some(message)) => session.lock().await.dispatch(message).await,
                Ok(None) => debug!("[{id}] ignoring unknown message kind"),
                Err(err) => debug!("[{id}] ignoring malformed message: {err}"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!("[{id}] socket error: {err}");
                break;
            }
        }
    }

    state.registry.on_disconnect(id).await;
    writer.abort();
}

async fn write_outbound(
    id: ConnectionId,
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<ServerMessage>,
) {
    while let Some(message) = outbound.recv().await {
        let Some(frame) = to_ws_message(message) else {
            continue;
        };
        if let Err(err) = sink.send(frame).await {
            debug!("[{id}] send failed, stopping writer: {err}");
            break;
        }
    }
}

/// Images go out as binary frames, everything else as a JSON text envelope
pub fn to_ws_message(message: ServerMessage) -> Option<Message> {
    match message {
        ServerMessage::Image(bytes) => Some(Message::Binary(bytes.into())),
        other => other.to_json().map(|json| Message::Text(json.into())),
    }
}

/// Serve on `listener` until `shutdown` resolves, then close every session
pub async fn run(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let registry = Arc::new(SessionRegistry::new(Arc::new(build_context(&config))));
    let state = AppState {
        registry: registry.clone(),
        outbound_capacity: config.outbound_capacity,
    };
    let app = router(state, &config.static_dir);

    info!(
        "Listening on http://{} ({}x{} {} @ {} ms, {} render context)",
        listener.local_addr()?,
        config.viewport.width,
        config.viewport.height,
        registry.context().codec.mime_type(),
        config.tick_interval_ms,
        if config.shared_render_context { "shared" } else { "per-session" },
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    registry.close_all().await;
    info!("Server stopped");
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    config.validate()?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    run(listener, config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
