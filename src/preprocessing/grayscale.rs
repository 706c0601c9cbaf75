//! Grayscale conversion (RGBA to single-channel intensity)

use crate::io::pixel_buffer::PixelBuffer;

/// Single-channel intensity plane, same geometry as the source buffer
///
/// Intensity is the unweighted channel mean `(r + g + b) / 3`; alpha is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayPlane {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl GrayPlane {
    /// Convert a pixel buffer to grayscale
    ///
    /// # Arguments
    ///
    /// * `buffer` - Source RGBA buffer
    ///
    /// # Returns
    ///
    /// Gray plane with one value in [0, 255] per pixel
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        log::debug!(
            "Converting {}x{} buffer to grayscale",
            buffer.width(),
            buffer.height()
        );

        let values = buffer.pixels().map(|px| px.gray()).collect();
        Self {
            width: buffer.width(),
            height: buffer.height(),
            values,
        }
    }

    /// Plane width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Plane height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Intensity at (x, y), or `None` outside the plane
    #[inline]
    pub fn try_get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            None
        } else {
            Some(self.values[y * self.width + x])
        }
    }

    /// Intensity at (x, y); 0.0 outside the plane
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.try_get(x, y).unwrap_or(0.0)
    }

    /// Intensity at signed coordinates, `None` when either is negative or out of range
    #[inline]
    pub fn get_signed(&self, x: isize, y: isize) -> Option<f64> {
        if x < 0 || y < 0 {
            return None;
        }
        self.try_get(x as usize, y as usize)
    }
}
