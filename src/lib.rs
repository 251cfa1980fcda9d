pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;
pub mod latency;
pub mod loaders;
pub mod math;
pub mod protocol;
pub mod registry;
pub mod scene;
pub mod scenes;
pub mod server;
pub mod session;
pub mod traits;

pub use camera::{CameraConfig, CameraController, CameraTransform, MoveAxis, SharedCamera};
pub use protocol::{ClientMessage, ServerMessage, Timestamp};
pub use registry::{ConnectionId, SessionHandle, SessionRegistry};
pub use session::{Session, SessionConfig, SessionContext, SessionState};
