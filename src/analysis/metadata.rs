//! Analysis metadata structures

use crate::io::metadata::ImageMetadata;
use serde::{Deserialize, Serialize};

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Analyzed buffer width in pixels
    pub width: usize,

    /// Analyzed buffer height in pixels
    pub height: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,

    /// Whether the extractors ran on the rayon pool
    pub parallel_extraction: bool,

    /// Container metadata the Metadata Signal saw, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_metadata: Option<ImageMetadata>,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            parallel_extraction: false,
            image_metadata: None,
        }
    }
}
