/// Quantile points of the three quartiles, as fractions of the sample size.
pub const QUARTILE_POINTS: [f64; 3] = [0.25, 0.5, 0.75];

/// The three quartiles of a dataset.
///
/// # Examples
///
/// ```
/// use aed_stats::quantile::Quartiles;
///
/// let quartiles = Quartiles::from_sorted(&[10.0, 20.0, 20.0, 30.0, 100.0]).unwrap();
/// assert_eq!(quartiles.q1, 20.0);
/// assert_eq!(quartiles.median, 20.0);
/// assert_eq!(quartiles.q3, 30.0);
/// assert_eq!(quartiles.iqr(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    /// First quartile (25%).
    pub q1: f64,
    /// Second quartile (50%).
    pub median: f64,
    /// Third quartile (75%).
    pub q3: f64,
}

impl Quartiles {
    /// Computes quartiles from pre-sorted values.
    ///
    /// Returns `None` if the dataset is empty.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        let [q1, median, q3] = QUARTILE_POINTS.map(|q| rank_quantile(sorted_values, q));
        Some(Self {
            q1: q1?,
            median: median?,
            q3: q3?,
        })
    }

    /// Interquartile range (`Q3 - Q1`).
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Computes a single quantile from sorted data.
///
/// This function uses rank selection without interpolation: for a dataset
/// with n values, the q-th quantile is the value at position `floor(n * q)`,
/// clamped to the last element.
///
/// # Arguments
///
/// * `sorted_values` - Values sorted in ascending order
/// * `quantile` - The quantile to compute (0.0 to 1.0)
///
/// # Returns
///
/// The value at the specified quantile, or `None` if the input is empty.
///
/// # Examples
///
/// ```
/// use aed_stats::quantile::rank_quantile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(rank_quantile(&values, 0.5), Some(3.0));
/// assert_eq!(rank_quantile(&values, 1.0), Some(4.0));
/// assert_eq!(rank_quantile(&[], 0.5), None);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn rank_quantile(sorted_values: &[f64], quantile: f64) -> Option<f64> {
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a <= b),
        "values must be sorted in ascending order"
    );

    let last = sorted_values.len().checked_sub(1)?;
    let idx = (sorted_values.len() as f64 * quantile).floor() as usize;
    Some(sorted_values[idx.min(last)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_selection_does_not_interpolate() {
        // Linear interpolation would give 2.5 here
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(rank_quantile(&values, 0.5), Some(3.0));
        assert_eq!(rank_quantile(&values, 0.25), Some(2.0));
        assert_eq!(rank_quantile(&values, 0.75), Some(4.0));
    }

    #[test]
    fn test_single_value() {
        let quartiles = Quartiles::from_sorted(&[7.0]).unwrap();
        assert_eq!(quartiles.q1, 7.0);
        assert_eq!(quartiles.median, 7.0);
        assert_eq!(quartiles.q3, 7.0);
        assert_eq!(quartiles.iqr(), 0.0);
    }

    #[test]
    fn test_empty() {
        assert!(Quartiles::from_sorted(&[]).is_none());
        assert_eq!(rank_quantile(&[], 0.0), None);
    }

    #[test]
    fn test_out_of_range_quantile_is_clamped() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(rank_quantile(&values, 1.5), Some(3.0));
        assert_eq!(rank_quantile(&values, -0.5), Some(1.0));
    }

    #[test]
    fn test_quartiles_are_ordered() {
        for len in 1..40 {
            #[expect(clippy::cast_precision_loss)]
            let values = (0..len).map(|i| ((i * 37) % 11) as f64).collect::<Vec<_>>();
            let mut sorted = values.clone();
            sorted.sort_by(f64::total_cmp);
            let q = Quartiles::from_sorted(&sorted).unwrap();
            assert!(sorted[0] <= q.q1, "len={len}");
            assert!(q.q1 <= q.median, "len={len}");
            assert!(q.median <= q.q3, "len={len}");
            assert!(q.q3 <= sorted[sorted.len() - 1], "len={len}");
        }
    }
}
