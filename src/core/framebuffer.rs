use crate::core::error::RasterError;
use log::info;

/// Caller-owned output surface: row-major 0x00RRGGBB pixels.
///
/// The renderer writes every pixel of the view each frame. Double buffering
/// is the caller's business; this only borrows the slice for one call.
pub struct PixelBuffer<'a> {
    pixels: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> PixelBuffer<'a> {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wraps `pixels` as a `width` x `height` surface. Extra trailing pixels are ignored.
    pub fn new(pixels: &'a mut [u32], width: usize, height: usize) -> Result<Self, RasterError> {
        let expected = width * height;
        if pixels.len() < expected {
            return Err(RasterError::PixelBufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels: &mut pixels[..expected],
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total size of the visible surface in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len() * Self::BYTES_PER_PIXEL
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline(always)]
    pub fn set(&mut self, index: usize, color: u32) {
        self.pixels[index] = color;
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}

/// Per-pixel inverse depth (`1/z`). Cleared to 0; a larger value is closer.
#[derive(Debug, Default)]
pub struct DepthBuffer {
    values: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthBuffer {
    pub const CLEAR_VALUE: f32 = 0.0;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![Self::CLEAR_VALUE; width * height],
            width,
            height,
        }
    }

    /// Reallocates when the dimensions change. Returns true if it did.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        info!(
            "Depth buffer resized {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        self.width = width;
        self.height = height;
        self.values = vec![Self::CLEAR_VALUE; width * height];
        true
    }

    pub fn clear(&mut self) {
        self.values.fill(Self::CLEAR_VALUE);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Keeps `inv_z` if it is strictly closer than the stored value.
    #[inline(always)]
    pub fn test_and_set(&mut self, index: usize, inv_z: f32) -> bool {
        let slot = &mut self.values[index];
        if inv_z > *slot {
            *slot = inv_z;
            true
        } else {
            false
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }
}
