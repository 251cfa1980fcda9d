use crate::core::display_context::{Region, Viewport};
use crate::error::RenderError;
use crate::frame::Bitmap;

/// Pixel readback for the most recently rendered image
pub trait FrameSource: Send + Sync {
    /// Size of the render target
    fn viewport(&self) -> Viewport;

    /// Read RGBA8 pixels of `region`, rows bottom-to-top
    fn read_pixels(&self, region: Region) -> Result<Bitmap, RenderError>;
}
