//! Spectral feature modules
//!
//! 8×8 block analyses in the spirit of JPEG coding:
//! - Compression artifacts (block-boundary discontinuities)
//! - Frequency domain (low/high DCT energy balance)

pub mod compression;
pub mod frequency;

pub use compression::{analyze_compression_artifacts, CompressionStats};
pub use frequency::{analyze_frequency_domain, FrequencyStats};
