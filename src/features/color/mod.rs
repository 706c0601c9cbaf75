//! Color feature modules
//!
//! Per-pixel color statistics over the whole image:
//! - Quantized color diversity among opaque pixels
//! - Full and partial transparency ratios

pub mod diversity;
pub mod transparency;

pub use diversity::{analyze_color_diversity, ColorDiversityStats};
pub use transparency::{analyze_transparency, TransparencyStats};
