//! Structure feature modules
//!
//! Spatial structure of the image:
//! - Edge sharpness (Sobel magnitude distribution)
//! - Pattern regularity (self-similarity of neighbouring tiles)

pub mod edge;
pub mod pattern;

pub use edge::{analyze_edge_sharpness, EdgeStats};
pub use pattern::{analyze_pattern_regularity, PatternStats};
