use glam::Vec3;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::camera::{CameraConfig, CameraController, CameraTransform, SharedCamera};
use crate::core::{DeviceProvider, FramePipeline, PipelineStats, DEFAULT_TICK_INTERVAL};
use crate::error::SceneLoadError;
use crate::latency;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::ConnectionId;
use crate::scene::Scene;
use crate::traits::{FrameCodec, SceneLoader};

/// Lifecycle of one connection's session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No scene loaded, pipeline idle
    Connected,
    /// Scene loaded, pipeline running
    SceneReady,
    /// Terminal
    Closed,
}

/// Per-session tuning
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub camera: CameraConfig,
    pub tick_interval: Duration,
    /// Where the camera is placed after each scene load
    pub origin: Vec3,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            origin: Vec3::ZERO,
        }
    }
}

/// Collaborators shared by every session
pub struct SessionContext {
    pub loader: Arc<dyn SceneLoader>,
    pub devices: DeviceProvider,
    pub codec: Arc<dyn FrameCodec>,
    pub config: SessionConfig,
}

/// State and render loop bound to one live connection
pub struct Session {
    id: ConnectionId,
    state: SessionState,
    pointer_locked: bool,
    camera: SharedCamera,
    scene: Option<Arc<Scene>>,
    pipeline: FramePipeline,
    context: Arc<SessionContext>,
    outbound: mpsc::Sender<ServerMessage>,
}

impl Session {
    pub fn new(id: ConnectionId, context: Arc<SessionContext>, outbound: mpsc::Sender<ServerMessage>) -> Self {
        let pipeline = FramePipeline::new(context.devices.acquire(), context.codec.clone(), outbound.clone());
        let camera = Arc::new(Mutex::new(CameraController::new(context.config.camera)));
        Self {
            id,
            state: SessionState::Connected,
            pointer_locked: false,
            camera,
            scene: None,
            pipeline,
            context,
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn camera_transform(&self) -> CameraTransform {
        self.camera().transform()
    }

    pub fn scene_name(&self) -> Option<&str> {
        self.scene.as_deref().map(Scene::name)
    }

    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    fn camera(&self) -> MutexGuard<'_, CameraController> {
        self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route one inbound message. Messages after close are ignored.
    pub async fn dispatch(&mut self, message: ClientMessage) {
        if self.state == SessionState::Closed {
            debug!("[{}] dropping message for closed session", self.id);
            return;
        }

        match message {
            ClientMessage::LoadScene(reference) => {
                if let Err(err) = self.load_scene(&reference).await {
                    warn!("[{}] failed to load scene '{reference}': {err}", self.id);
                }
            }
            ClientMessage::Lock => self.pointer_locked = true,
            ClientMessage::Unlock => self.pointer_locked = false,
            ClientMessage::LockError => warn!("[{}] client could not acquire pointer lock", self.id),
            ClientMessage::MouseMove { movement_x, movement_y } => {
                if self.pointer_locked {
                    self.camera().apply_look_delta(movement_x, movement_y);
                }
            }
            ClientMessage::Move { axis, distance } => self.camera().move_relative(axis, distance),
            ClientMessage::ClientTimestamp(timestamp) => {
                if self.outbound.send(latency::echo(timestamp)).await.is_err() {
                    debug!("[{}] outbound closed, timestamp not echoed", self.id);
                }
            }
        }
    }

    /// Stop streaming, load `reference`, reset the camera and restart the loop.
    ///
    /// On failure the session stays `Connected` with no scene and an idle
    /// pipeline; the camera keeps its previous pose.
    pub async fn load_scene(&mut self, reference: &str) -> Result<(), SceneLoadError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        self.pipeline.stop();
        self.scene = None;
        self.state = SessionState::Connected;

        let loader = self.context.loader.clone();
        let owned = reference.to_string();
        let scene = tokio::task::spawn_blocking(move || loader.load(&owned))
            .await
            .map_err(|err| SceneLoadError::Task(err.to_string()))??;
        let scene = Arc::new(scene);

        self.camera().reset(self.context.config.origin);
        self.pipeline
            .start(scene.clone(), self.camera.clone(), self.context.config.tick_interval);
        info!(
            "[{}] scene '{}' ready ({} triangles)",
            self.id,
            scene.name(),
            scene.triangle_count()
        );
        self.scene = Some(scene);
        self.state = SessionState::SceneReady;
        Ok(())
    }

    /// Stop the pipeline and release the scene. Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.pipeline.stop();
        self.scene = None;
        self.pointer_locked = false;
        self.state = SessionState::Closed;
        debug!("[{}] session closed", self.id);
    }
}
