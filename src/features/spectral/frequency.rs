//! Frequency domain analysis
//!
//! Reduced 2D DCT-II over 8×8 grayscale blocks. Only the 4×4 lowest coefficients are
//! computed, each from every second sample of the block, which keeps the cost to 256
//! multiply-adds per block. Coefficient energy is bucketed by `u + v`:
//! low (≤ 1), mid (≤ 3) and high (> 3).
//!
//! Rendered content concentrates its energy in the lowest coefficients; sensor noise
//! and fine natural detail spread it out.

use crate::error::AnalysisError;
use crate::features::stats::block_origins;
use crate::features::{ExtractionInput, FeatureExtractor, FeatureKind, FeatureResult};
use crate::preprocessing::grayscale::GrayPlane;
use std::f64::consts::PI;

/// DCT block edge length
pub const DCT_BLOCK_SIZE: usize = 8;

/// Coefficients kept per axis
const COEFFICIENTS: usize = 4;

/// Spatial sampling stride inside a block
const SAMPLE_STRIDE: usize = 2;

/// Blocks are taken on a grid twice as wide as the block
const GRID_STEP: usize = DCT_BLOCK_SIZE * 2;

/// Score when the image carries no energy at all
const NEUTRAL_SCORE: f64 = 0.5;

/// Frequency energy statistics
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyStats {
    /// Blocks analyzed
    pub block_count: usize,
    /// Summed |coefficient| with u + v ≤ 1
    pub low_energy: f64,
    /// Summed |coefficient| with u + v in 2..=3
    pub mid_energy: f64,
    /// Summed |coefficient| with u + v > 3
    pub high_energy: f64,
    /// `high_energy / total`
    pub high_freq_ratio: f64,
    /// `low_energy / total`
    pub low_freq_ratio: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
}

impl FrequencyStats {
    fn total_energy(&self) -> f64 {
        self.low_energy + self.mid_energy + self.high_energy
    }

    /// Convert to a generic feature result
    pub fn to_feature_result(&self) -> FeatureResult {
        let interpretation = if self.total_energy() == 0.0 {
            "No frequency energy"
        } else if self.high_freq_ratio < 0.08 {
            "Very few high frequencies (suspicious)"
        } else if self.high_freq_ratio < 0.2 {
            "Moderate frequencies"
        } else {
            "Rich high frequencies (natural)"
        };

        FeatureResult::new(FeatureKind::FrequencyDomain, self.score, interpretation)
            .with_metric("block_count", self.block_count as f64)
            .with_metric("high_freq_ratio", self.high_freq_ratio)
            .with_metric("low_freq_ratio", self.low_freq_ratio)
            .with_metric("mid_energy", self.mid_energy)
    }
}

/// Cosine basis `cos((2i + 1) u π / 16)` for the sampled positions
fn cosine_table() -> [[f64; DCT_BLOCK_SIZE]; COEFFICIENTS] {
    let mut table = [[0.0; DCT_BLOCK_SIZE]; COEFFICIENTS];
    for (u, row) in table.iter_mut().enumerate() {
        for (i, c) in row.iter_mut().enumerate() {
            *c = ((2 * i + 1) as f64 * u as f64 * PI / (2 * DCT_BLOCK_SIZE) as f64).cos();
        }
    }
    table
}

/// Reduced DCT of the block at (x, y), folded into (low, mid, high) energy
fn block_energy(gray: &GrayPlane, x: usize, y: usize, cos: &[[f64; DCT_BLOCK_SIZE]; COEFFICIENTS]) -> (f64, f64, f64) {
    let (mut low, mut mid, mut high) = (0.0, 0.0, 0.0);

    for u in 0..COEFFICIENTS {
        for v in 0..COEFFICIENTS {
            let mut sum = 0.0;
            // u runs down the rows of the block, v across the columns
            for row in (0..DCT_BLOCK_SIZE).step_by(SAMPLE_STRIDE) {
                for col in (0..DCT_BLOCK_SIZE).step_by(SAMPLE_STRIDE) {
                    sum += gray.get(x + col, y + row) * cos[u][row] * cos[v][col];
                }
            }

            let energy = sum.abs();
            match u + v {
                0..=1 => low += energy,
                2..=3 => mid += energy,
                _ => high += energy,
            }
        }
    }

    (low, mid, high)
}

fn balance_score(high_freq_ratio: f64, low_freq_ratio: f64) -> f64 {
    if high_freq_ratio < 0.05 && low_freq_ratio > 0.8 {
        0.9
    } else if high_freq_ratio < 0.1 && low_freq_ratio > 0.7 {
        0.7
    } else if high_freq_ratio < 0.2 {
        0.4
    } else {
        0.2
    }
}

/// Measure the low/high frequency balance
///
/// # Arguments
///
/// * `gray` - Grayscale plane
///
/// # Returns
///
/// Statistics with a score of 0.9 (high < 5% and low > 80%), 0.7 (high < 10% and
/// low > 70%), 0.4 (high < 20%) or 0.2. An image with zero total energy (all black,
/// or smaller than one block) scores 0.5.
pub fn analyze_frequency_domain(gray: &GrayPlane) -> FrequencyStats {
    let cos = cosine_table();
    let (mut low_energy, mut mid_energy, mut high_energy) = (0.0, 0.0, 0.0);
    let mut block_count = 0usize;

    for y in block_origins(gray.height(), DCT_BLOCK_SIZE, GRID_STEP) {
        for x in block_origins(gray.width(), DCT_BLOCK_SIZE, GRID_STEP) {
            let (low, mid, high) = block_energy(gray, x, y, &cos);
            low_energy += low;
            mid_energy += mid;
            high_energy += high;
            block_count += 1;
        }
    }

    let total = low_energy + mid_energy + high_energy;
    if total == 0.0 {
        if block_count == 0 {
            log::warn!(
                "Image {}x{} smaller than one {}px DCT block, using neutral score",
                gray.width(),
                gray.height(),
                DCT_BLOCK_SIZE
            );
        }
        return FrequencyStats {
            block_count,
            low_energy,
            mid_energy,
            high_energy,
            high_freq_ratio: 0.0,
            low_freq_ratio: 0.0,
            score: NEUTRAL_SCORE,
        };
    }

    let high_freq_ratio = high_energy / total;
    let low_freq_ratio = low_energy / total;

    let score = balance_score(high_freq_ratio, low_freq_ratio);

    log::debug!(
        "Frequency: {} blocks, high={:.3}, low={:.3}, score={:.1}",
        block_count,
        high_freq_ratio,
        low_freq_ratio,
        score
    );

    FrequencyStats {
        block_count,
        low_energy,
        mid_energy,
        high_energy,
        high_freq_ratio,
        low_freq_ratio,
        score,
    }
}

/// [`FeatureExtractor`] wrapper around [`analyze_frequency_domain`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyDomainExtractor;

impl FeatureExtractor for FrequencyDomainExtractor {
    fn kind(&self) -> FeatureKind {
        FeatureKind::FrequencyDomain
    }

    fn extract(&self, input: &ExtractionInput<'_>) -> Result<FeatureResult, AnalysisError> {
        Ok(analyze_frequency_domain(input.gray).to_feature_result())
    }
}
