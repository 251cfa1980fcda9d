// cli.rs - Command-line interface configuration
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Every option falls back to a `FRAME_STREAM_*` environment variable, then
/// to the `--config` file, then to built-in defaults
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "frame-stream")]
#[command(about = "Streams server-rendered camera views to browser clients", long_about = None)]
pub struct Cli {
    /// JSON file with a full or partial server configuration
    #[arg(long, env = "FRAME_STREAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "FRAME_STREAM_BIND")]
    pub bind: Option<SocketAddr>,

    /// Render width in pixels
    #[arg(long, env = "FRAME_STREAM_WIDTH")]
    pub width: Option<u32>,

    /// Render height in pixels
    #[arg(long, env = "FRAME_STREAM_HEIGHT")]
    pub height: Option<u32>,

    /// Milliseconds between frames
    #[arg(long = "tick-ms", env = "FRAME_STREAM_TICK_MS")]
    pub tick_interval_ms: Option<u64>,

    /// Directory scene files are resolved against
    #[arg(long, env = "FRAME_STREAM_ASSET_ROOT")]
    pub asset_root: Option<PathBuf>,

    /// Directory holding the browser client
    #[arg(long, env = "FRAME_STREAM_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Mouse look multiplier
    #[arg(long, env = "FRAME_STREAM_POINTER_SPEED")]
    pub pointer_speed: Option<f32>,

    /// Give each session its own render context instead of sharing one
    #[arg(long = "dedicated-contexts", env = "FRAME_STREAM_DEDICATED_CONTEXTS")]
    pub dedicated_contexts: bool,
}
