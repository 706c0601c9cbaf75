//! Immutable RGBA pixel buffer with bounds-checked access
//!
//! Every extractor reads the image through this type. Reads outside the image never
//! fail: `get` returns [`Rgba::EMPTY`] and `get_block` clips the block to the image.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Bytes per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// One 8-bit RGBA sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel (0 = fully transparent, 255 = opaque)
    pub a: u8,
}

impl Rgba {
    /// Sentinel returned for coordinates outside the image
    pub const EMPTY: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    /// Create a sample from its four channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque sample
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Unweighted grayscale intensity: (r + g + b) / 3
    #[inline]
    pub fn gray(&self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }

    /// Sum of absolute RGB channel differences (alpha ignored), in [0, 765]
    #[inline]
    pub fn rgb_distance(&self, other: &Rgba) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }
}

/// Row-major RGBA pixel buffer
///
/// Created once per analysis from the decoded image and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes
    ///
    /// # Arguments
    ///
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `data` - Row-major RGBA bytes, exactly `width * height * 4` long
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidBuffer` if either dimension is zero or the byte
    /// length does not match the dimensions.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidBuffer(format!(
                "Image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                AnalysisError::InvalidBuffer(format!(
                    "Image dimensions {}x{} overflow the address space",
                    width, height
                ))
            })?;

        if data.len() != expected {
            return Err(AnalysisError::InvalidBuffer(format!(
                "Expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }

        Ok(Self { width, height, data })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self, AnalysisError>
    where
        F: FnMut(usize, usize) -> Rgba,
    {
        let mut data = Vec::with_capacity(width.saturating_mul(height).saturating_mul(CHANNELS));
        for y in 0..height {
            for x in 0..width {
                let px = f(x, y);
                data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
            }
        }
        Self::new(width, height, data)
    }

    /// Buffer where every pixel has the same value
    pub fn filled(width: usize, height: usize, pixel: Rgba) -> Result<Self, AnalysisError> {
        Self::from_fn(width, height, |_, _| pixel)
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total pixel count
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Raw RGBA bytes
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Sample at (x, y), or `None` outside the image
    #[inline]
    pub fn try_get(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * CHANNELS;
        Some(Rgba::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ))
    }

    /// Sample at (x, y), or [`Rgba::EMPTY`] outside the image
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Rgba {
        self.try_get(x, y).unwrap_or(Rgba::EMPTY)
    }

    /// Grayscale intensity at (x, y); 0.0 outside the image
    #[inline]
    pub fn gray(&self, x: usize, y: usize) -> f64 {
        self.get(x, y).gray()
    }

    /// Samples of the `size`×`size` block whose top-left corner is (x, y)
    ///
    /// Cells outside the image are omitted, so a block straddling the border returns
    /// fewer than `size * size` samples and a block fully outside returns none.
    pub fn get_block(&self, x: usize, y: usize, size: usize) -> Vec<Rgba> {
        let x_end = x.saturating_add(size).min(self.width);
        let y_end = y.saturating_add(size).min(self.height);
        if x >= x_end || y >= y_end {
            return Vec::new();
        }

        let mut block = Vec::with_capacity((x_end - x) * (y_end - y));
        for by in y..y_end {
            for bx in x..x_end {
                block.push(self.get(bx, by));
            }
        }
        block
    }

    /// Iterate all samples in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgba> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 10, vec![]),
            Err(AnalysisError::InvalidBuffer(_))
        ));
        assert!(matches!(
            PixelBuffer::new(10, 0, vec![]),
            Err(AnalysisError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let result = PixelBuffer::new(2, 2, vec![0u8; 15]);
        assert!(matches!(result, Err(AnalysisError::InvalidBuffer(_))));
    }

    #[test]
    fn test_get_out_of_bounds_returns_sentinel() {
        let buffer = PixelBuffer::filled(3, 3, Rgba::opaque(10, 20, 30)).unwrap();
        assert_eq!(buffer.get(1, 1), Rgba::opaque(10, 20, 30));
        assert_eq!(buffer.get(3, 0), Rgba::EMPTY);
        assert_eq!(buffer.get(0, 3), Rgba::EMPTY);
        assert_eq!(buffer.try_get(5, 5), None);
    }

    #[test]
    fn test_row_major_layout() {
        let buffer = PixelBuffer::from_fn(4, 2, |x, y| Rgba::opaque(x as u8, y as u8, 0)).unwrap();
        assert_eq!(buffer.get(3, 1), Rgba::opaque(3, 1, 0));
        assert_eq!(&buffer.as_raw()[4..8], &[1, 0, 0, 255]);
    }

    #[test]
    fn test_get_block_clips_at_edges() {
        let buffer = PixelBuffer::filled(10, 10, Rgba::opaque(1, 2, 3)).unwrap();
        assert_eq!(buffer.get_block(0, 0, 4).len(), 16);
        assert_eq!(buffer.get_block(8, 8, 4).len(), 4);
        assert_eq!(buffer.get_block(9, 0, 4).len(), 4);
        assert!(buffer.get_block(10, 10, 4).is_empty());
    }

    #[test]
    fn test_gray_and_distance() {
        let a = Rgba::opaque(30, 60, 90);
        let b = Rgba::opaque(0, 70, 100);
        assert!((a.gray() - 60.0).abs() < 1e-12);
        assert_eq!(a.rgb_distance(&b), 30 + 10 + 10);
    }
}
