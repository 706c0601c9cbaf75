//! Image preprocessing modules
//!
//! Derived, read-only views computed once per analysis and shared by the extractors:
//! - Grayscale plane ((r + g + b) / 3 per pixel)

pub mod grayscale;

pub use grayscale::GrayPlane;
