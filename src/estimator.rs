//! Size and time estimation for conversion planning
//!
//! Estimates are heuristics over input byte counts only; no parsing
//! happens here. Callers use them to size progress bars and decide
//! whether a batch is worth confirming, so cheap and roughly right
//! beats exact.

/// Conversion size/time estimator using byte-count heuristics
pub struct ConversionEstimator {
    /// Output bytes per input byte (default: 1.2)
    size_factor: f32,
    /// Processed input bytes per millisecond (default: 1024.0)
    bytes_per_ms: f32,
}

impl ConversionEstimator {
    /// Create a new estimator with default settings
    pub fn new() -> Self {
        Self {
            size_factor: 1.2,
            bytes_per_ms: 1024.0,
        }
    }

    /// Create a new estimator with custom factors
    pub fn with_factors(size_factor: f32, bytes_per_ms: f32) -> Self {
        Self {
            size_factor,
            bytes_per_ms,
        }
    }

    /// Estimate output size in bytes for a given total input size
    ///
    /// Markdown and HTML renditions of the same content are near each
    /// other in size; the factor covers added markup.
    ///
    /// # Arguments
    ///
    /// * `input_bytes` - Total input size in bytes
    ///
    /// # Returns
    ///
    /// Estimated output size in bytes
    pub fn estimate_size(&self, input_bytes: u64) -> u64 {
        (input_bytes as f32 * self.size_factor).ceil() as u64
    }

    /// Estimate conversion time in milliseconds for a given total input size
    ///
    /// Never returns zero so callers always see a nonzero budget.
    pub fn estimate_time_ms(&self, input_bytes: u64) -> u64 {
        ((input_bytes as f32 / self.bytes_per_ms).ceil() as u64).max(1)
    }
}

impl Default for ConversionEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_size_estimation() {
        let estimator = ConversionEstimator::new();

        assert_eq!(estimator.estimate_size(0), 0);
        assert_eq!(estimator.estimate_size(1000), 1200);
        // Rounds up
        assert_eq!(estimator.estimate_size(1), 2);
    }

    #[test]
    fn test_time_estimation() {
        let estimator = ConversionEstimator::new();

        // Minimum of 1ms even for empty input
        assert_eq!(estimator.estimate_time_ms(0), 1);
        assert_eq!(estimator.estimate_time_ms(1024), 1);
        assert_eq!(estimator.estimate_time_ms(1025), 2);
        assert_eq!(estimator.estimate_time_ms(1024 * 100), 100);
    }

    #[test]
    fn test_custom_factors() {
        let estimator = ConversionEstimator::with_factors(2.0, 512.0);

        assert_eq!(estimator.estimate_size(100), 200);
        assert_eq!(estimator.estimate_time_ms(1024), 2);
    }

    #[test]
    fn test_default_trait() {
        let estimator = ConversionEstimator::default();
        assert_eq!(estimator.estimate_size(1000), 1200);
    }

    proptest! {
        #[test]
        fn prop_size_is_monotonic(a in 0u64..10_000_000, b in 0u64..10_000_000) {
            let estimator = ConversionEstimator::new();
            let (small, large) = if a <= b { (a, b) } else { (b, a) };

            prop_assert!(
                estimator.estimate_size(small) <= estimator.estimate_size(large),
                "More input must not shrink the size estimate"
            );
        }

        #[test]
        fn prop_time_is_monotonic_and_nonzero(a in 0u64..10_000_000, b in 0u64..10_000_000) {
            let estimator = ConversionEstimator::new();
            let (small, large) = if a <= b { (a, b) } else { (b, a) };

            let t_small = estimator.estimate_time_ms(small);
            let t_large = estimator.estimate_time_ms(large);

            prop_assert!(t_small >= 1);
            prop_assert!(t_small <= t_large);
        }
    }
}
