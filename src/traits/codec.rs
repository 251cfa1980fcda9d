use crate::error::CodecError;
use crate::frame::Bitmap;

/// Still-image compression for transport
pub trait FrameCodec: Send + Sync {
    fn encode(&self, bitmap: &Bitmap) -> Result<Vec<u8>, CodecError>;

    /// MIME type of the encoded bytes
    fn mime_type(&self) -> &'static str;
}
