use crate::camera::CameraTransform;
use crate::error::RenderError;
use crate::scene::Scene;

/// Draws a scene into the render target owned by the implementation
///
/// The result is not returned; it is read back through the paired
/// [`FrameSource`](super::FrameSource).
pub trait Renderer: Send + Sync {
    fn render(&self, scene: &Scene, camera: &CameraTransform) -> Result<(), RenderError>;
}
