use std::path::PathBuf;
use thiserror::Error;

use crate::registry::ConnectionId;

/// Failure to turn a scene reference into a drawable scene
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("scene reference is empty")]
    EmptyReference,
    #[error("scene reference escapes the asset root: {0}")]
    OutsideAssetRoot(String),
    #[error("scene file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("unsupported scene format: {0:?}")]
    UnsupportedFormat(PathBuf),
    #[error("failed to import scene: {0:#}")]
    Import(#[from] anyhow::Error),
    #[error("scene loader task failed: {0}")]
    Task(String),
}

/// Failure while drawing or reading back one frame
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("readback region {region:?} exceeds viewport {width}x{height}")]
    RegionOutOfBounds {
        region: crate::core::display_context::Region,
        width: u32,
        height: u32,
    },
    #[error("render context poisoned")]
    ContextPoisoned,
    #[error("renderer failed: {0}")]
    Backend(String),
}

/// Failure to compress a bitmap for transport
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("bitmap is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Inbound frame that could not be decoded
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("invalid payload for {kind}: {source}")]
    Payload {
        kind: String,
        source: serde_json::Error,
    },
    #[error("clientTimestamp payload is not an integer")]
    NonIntegerTimestamp,
    #[error("{kind} payload is out of range")]
    NonFinite { kind: String },
}

/// Failure of one pipeline tick; the pipeline logs it and keeps running
#[derive(Debug, Error)]
pub enum FrameError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} already has a live session")]
    DuplicateConnection(ConnectionId),
}
