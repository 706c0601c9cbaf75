//! Image input modules
//!
//! The decoded pixel buffer and the container metadata that accompanies it.
//! Decoding itself happens upstream of this crate.

pub mod metadata;
pub mod pixel_buffer;

pub use metadata::{ImageFormat, ImageMetadata};
pub use pixel_buffer::{PixelBuffer, Rgba};
