use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::CameraConfig;
use crate::cli::Cli;
use crate::core::Viewport;
use crate::session::SessionConfig;

/// Everything the server binary needs, loadable from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub viewport: Viewport,
    pub tick_interval_ms: u64,
    pub asset_root: PathBuf,
    pub static_dir: PathBuf,
    pub camera: CameraConfig,
    /// Outbound messages buffered per connection before frames are dropped
    pub outbound_capacity: usize,
    /// One render context for all sessions, or one per session
    pub shared_render_context: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            viewport: Viewport::new(640, 360),
            tick_interval_ms: 100,
            asset_root: PathBuf::from("assets"),
            static_dir: PathBuf::from("static"),
            camera: CameraConfig::default(),
            outbound_capacity: 8,
            shared_render_context: true,
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid server configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json_str(&json).with_context(|| format!("In config file {:?}", path))
    }

    /// Config file (if any) overlaid with explicit flags, then validated
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(width) = cli.width {
            config.viewport.width = width;
        }
        if let Some(height) = cli.height {
            config.viewport.height = height;
        }
        if let Some(ms) = cli.tick_interval_ms {
            config.tick_interval_ms = ms;
        }
        if let Some(root) = &cli.asset_root {
            config.asset_root = root.clone();
        }
        if let Some(dir) = &cli.static_dir {
            config.static_dir = dir.clone();
        }
        if let Some(speed) = cli.pointer_speed {
            config.camera.pointer_speed = speed;
        }
        if cli.dedicated_contexts {
            config.shared_render_context = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.viewport.width > 0 && self.viewport.height > 0,
            "viewport must be non-empty, got {}x{}",
            self.viewport.width,
            self.viewport.height
        );
        ensure!(self.tick_interval_ms > 0, "tick_interval_ms must be positive");
        ensure!(self.outbound_capacity > 0, "outbound_capacity must be positive");
        ensure!(
            self.camera.pointer_speed.is_finite(),
            "camera.pointer_speed must be finite"
        );
        ensure!(
            self.camera.min_polar_angle <= self.camera.max_polar_angle,
            "camera.min_polar_angle exceeds camera.max_polar_angle"
        );
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            camera: self.camera,
            tick_interval: self.tick_interval(),
            ..SessionConfig::default()
        }
    }
}
