//! Small numeric helpers shared by the extractors

/// Population mean and variance, or `None` for an empty slice
pub(crate) fn mean_and_variance(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    Some((mean, variance))
}

/// `count / total`, or 0.0 when `total` is zero
#[inline]
pub(crate) fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Top-left corners of a block grid
///
/// Visits `start, start + step, ...` while the corner is strictly below
/// `extent - block`, so the trailing partial block is never visited and an image no
/// larger than one block yields nothing.
pub(crate) fn block_origins(extent: usize, block: usize, step: usize) -> impl Iterator<Item = usize> {
    let limit = extent.saturating_sub(block);
    (0..limit).step_by(step.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        let (mean, var) = mean_and_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((var - 4.0).abs() < 1e-12);
        assert!(mean_and_variance(&[]).is_none());
    }

    #[test]
    fn test_ratio_handles_zero_total() {
        assert_eq!(ratio(3, 0), 0.0);
        assert!((ratio(1, 4) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_block_origins_skip_trailing_block() {
        assert_eq!(block_origins(20, 6, 6).collect::<Vec<_>>(), vec![0, 6, 12]);
        assert_eq!(block_origins(18, 6, 6).collect::<Vec<_>>(), vec![0, 6]);
        assert_eq!(block_origins(6, 6, 6).count(), 0);
        assert_eq!(block_origins(4, 8, 8).count(), 0);
    }
}
