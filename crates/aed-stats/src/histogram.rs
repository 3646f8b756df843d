use serde::Serialize;

/// Number of bins used by the attribute panels.
pub const DEFAULT_BIN_COUNT: usize = 20;

/// A histogram representation of a dataset's distribution.
///
/// The histogram divides `[min, max]` into equal-width bins and counts the
/// values falling into each bin. Bin edges depend on the range only, never on
/// quantiles, so the bins are well defined for any non-empty dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Contiguous bins in ascending order.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
///
/// Every bin covers `[start, end)` except the last one, which also includes
/// `end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Lower edge of the bin (inclusive).
    pub start: f64,
    /// Upper edge of the bin (exclusive, inclusive for the last bin).
    pub end: f64,
    /// The number of values that fall within this bin.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram spanning the range of `values`.
    ///
    /// Non-finite values are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aed_stats::histogram::Histogram;
    /// let histogram = Histogram::new([1.0, 2.0, 3.0, 4.0], 2);
    /// assert_eq!(histogram.bins.len(), 2);
    /// assert_eq!(histogram.bins[0].count, 2); // [1.0, 2.5)
    /// assert_eq!(histogram.bins[1].count, 2); // [2.5, 4.0]
    /// ```
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::with_bounds(&values, num_bins, min, max)
    }

    /// Creates a histogram with explicit bounds.
    ///
    /// Values outside `[min, max]` are not counted. When `min == max` the
    /// histogram collapses to a single closed bin `[min, max]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use aed_stats::histogram::Histogram;
    /// let histogram = Histogram::with_bounds(&[0.0, 5.0, 10.0], 20, 0.0, 10.0);
    /// assert_eq!(histogram.bins.len(), 20);
    /// assert_eq!(histogram.bins[19].count, 1); // 10.0 lands in the closed last bin
    /// assert_eq!(histogram.total_count(), 3);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn with_bounds(values: &[f64], num_bins: usize, min: f64, max: f64) -> Self {
        if values.is_empty() || num_bins == 0 || !(min <= max) {
            return Self { bins: vec![] };
        }

        let bins = if max <= min {
            vec![HistogramBin {
                start: min,
                end: max,
                count: 0,
            }]
        } else {
            // `max - min` may overflow, so interpolate between the bounds
            let edge = |idx: usize| {
                if idx == num_bins {
                    return max;
                }
                let t = idx as f64 / num_bins as f64;
                (min * (1.0 - t) + max * t).clamp(min, max)
            };
            (0..num_bins)
                .map(|idx| HistogramBin {
                    start: edge(idx),
                    end: edge(idx + 1),
                    count: 0,
                })
                .collect()
        };

        let mut histogram = Self { bins };
        for &value in values {
            if let Some(idx) = histogram.bin_index(value) {
                histogram.bins[idx].count += 1;
            }
        }
        histogram
    }

    /// Returns the index of the bin containing `value`.
    ///
    /// Returns `None` for values outside the histogram range and for NaN.
    #[must_use]
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let first = self.bins.first()?;
        let last = self.bins.last()?;
        if value.is_nan() || value < first.start || value > last.end {
            return None;
        }
        let idx = self.bins.partition_point(|bin| bin.end <= value);
        Some(idx.min(self.bins.len() - 1))
    }

    /// Sum of all bin counts.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// Largest bin count, or 0 for an empty histogram.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        let histogram = Histogram::new([], DEFAULT_BIN_COUNT);
        assert!(histogram.bins.is_empty());
        assert_eq!(histogram.total_count(), 0);
        assert_eq!(histogram.max_count(), 0);
    }

    #[test]
    fn test_bins_are_contiguous_and_span_range() {
        let values = [3.0, 7.5, 1.0, 9.0, 4.2];
        let histogram = Histogram::new(values, DEFAULT_BIN_COUNT);

        assert_eq!(histogram.bins.len(), DEFAULT_BIN_COUNT);
        assert_eq!(histogram.bins[0].start, 1.0);
        assert_eq!(histogram.bins[DEFAULT_BIN_COUNT - 1].end, 9.0);
        for pair in histogram.bins.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_half_open_bins() {
        // width 1.0: [0,1) [1,2) [2,3) [3,4]
        let histogram = Histogram::with_bounds(&[0.0, 1.0, 1.5, 2.0, 4.0], 4, 0.0, 4.0);
        let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
        assert_eq!(counts, vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_max_lands_in_last_bin() {
        let histogram = Histogram::new([10.0, 20.0, 20.0, 30.0, 100.0], DEFAULT_BIN_COUNT);
        assert_eq!(histogram.bins[DEFAULT_BIN_COUNT - 1].count, 1);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.total_count(), 5);
    }

    #[test]
    fn test_single_distinct_value() {
        let histogram = Histogram::new([42.0; 7], DEFAULT_BIN_COUNT);
        assert_eq!(histogram.bins.len(), 1);
        assert_eq!(histogram.bins[0].start, 42.0);
        assert_eq!(histogram.bins[0].end, 42.0);
        assert_eq!(histogram.bins[0].count, 7);
    }

    #[test]
    fn test_counts_sum_to_sample_size() {
        let values = (0..1000)
            .map(|i: i32| f64::from((i * 7919) % 1013) / 3.0 - 50.0)
            .collect::<Vec<_>>();
        let histogram = Histogram::new(values.iter().copied(), DEFAULT_BIN_COUNT);
        assert_eq!(histogram.total_count(), 1000);
    }

    #[test]
    fn test_out_of_bounds_values_are_not_counted() {
        let histogram = Histogram::with_bounds(&[-1.0, 0.5, 2.0], 2, 0.0, 1.0);
        assert_eq!(histogram.total_count(), 1);
        assert_eq!(histogram.bin_index(f64::NAN), None);
    }

    #[test]
    fn test_range_wider_than_f64_max() {
        let histogram = Histogram::new([-1e308, 0.0, 1e308], DEFAULT_BIN_COUNT);

        assert_eq!(histogram.bins.len(), DEFAULT_BIN_COUNT);
        assert_eq!(histogram.bins[0].start, -1e308);
        assert_eq!(histogram.bins[DEFAULT_BIN_COUNT - 1].end, 1e308);
        for bin in &histogram.bins {
            assert!(bin.start.is_finite() && bin.end.is_finite());
            assert!(bin.start <= bin.end);
        }
        for pair in histogram.bins.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(histogram.total_count(), 3);
        assert_eq!(histogram.bin_index(0.0), Some(DEFAULT_BIN_COUNT / 2));
    }
}
