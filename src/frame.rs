//! Frame representation for uncompressed video data

use std::fmt;

/// Number of channels in every frame (packed BGR)
pub const CHANNELS: usize = 3;

/// A video frame: a packed 3-channel BGR pixel buffer
///
/// Filters may reinterpret channel contents internally (e.g. write the same
/// value into all three channels) but every frame handed to the display or
/// write path keeps this layout: `data.len() == width * height * 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Packed BGR24 pixel data, row-major
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Create a new black frame
    pub fn new(width: u32, height: u32) -> Self {
        VideoFrame {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Create a frame filled with a single BGR color
    pub fn solid(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&bgr);
        }
        VideoFrame {
            width,
            height,
            data,
        }
    }

    /// Create a frame from existing packed BGR24 data
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> crate::Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(crate::Error::invalid_input(format!(
                "Frame data size mismatch: expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(VideoFrame {
            width,
            height,
            data,
        })
    }

    /// Byte offset of the pixel at (x, y)
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Get the BGR triplet at (x, y)
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Set the BGR triplet at (x, y)
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&bgr);
    }

    /// Bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }
}

impl fmt::Display for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} bgr24", self.width, self.height)
    }
}
