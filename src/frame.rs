/// Raw RGBA8 pixels as read back from a frame source
///
/// Rows are stored bottom-to-top: row 0 is the bottom of the image. The
/// pipeline never flips them; displaying top-to-bottom is the consumer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of pixel (x, y), y counted from the bottom row
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels
            .get(idx..idx + 4)
            .and_then(|p| p.try_into().ok())
    }
}

/// Metadata for one pipeline tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Position of the tick in the session's tick sequence
    pub number: u64,
}

/// An encoded frame ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    pub info: FrameInfo,
    pub bytes: Vec<u8>,
}
