use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use crate::error::CodecError;
use crate::frame::Bitmap;
use crate::traits::FrameCodec;

/// PNG encoder tuned for per-frame streaming rather than file size
#[derive(Debug, Clone, Copy)]
pub struct PngCodec {
    compression: CompressionType,
}

impl PngCodec {
    pub fn new(compression: CompressionType) -> Self {
        Self { compression }
    }
}

impl Default for PngCodec {
    fn default() -> Self {
        Self::new(CompressionType::Fast)
    }
}

impl FrameCodec for PngCodec {
    fn encode(&self, bitmap: &Bitmap) -> Result<Vec<u8>, CodecError> {
        let expected = bitmap.width as usize * bitmap.height as usize * 4;
        if bitmap.pixels().len() != expected {
            return Err(CodecError::SizeMismatch {
                width: bitmap.width,
                height: bitmap.height,
                expected,
                actual: bitmap.pixels().len(),
            });
        }

        let mut png = Vec::new();
        PngEncoder::new_with_quality(&mut png, self.compression, FilterType::Adaptive).write_image(
            bitmap.pixels(),
            bitmap.width,
            bitmap.height,
            ExtendedColorType::Rgba8,
        )?;
        Ok(png)
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}
