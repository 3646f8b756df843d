use serde::Serialize;

use crate::{
    boxplot::Fences,
    histogram::{DEFAULT_BIN_COUNT, Histogram},
    quantile::Quartiles,
};

/// Descriptive statistics summarizing one attribute.
///
/// Built from raw cells where `None` marks a value that could not be read as
/// a number. Missing cells are excluded from every statistic and only
/// counted in [`missing`](Self::missing).
///
/// A summary with no numeric values is still well formed: every statistic is
/// 0 and the histogram has no bins (see [`is_empty`](Self::is_empty)).
///
/// # Examples
///
/// ```
/// use aed_stats::summary::NumericSummary;
///
/// let summary = NumericSummary::new([Some(10.0), Some(20.0), None, Some(20.0), Some(30.0), Some(100.0)]);
/// assert_eq!(summary.count, 5);
/// assert_eq!(summary.missing, 1);
/// assert_eq!(summary.distinct, 4);
/// assert_eq!(summary.median, 20.0);
/// assert_eq!(summary.mean, 36.0);
/// assert_eq!(summary.iqr, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Number of present numeric values.
    pub count: usize,
    /// Number of cells that were missing or not numeric.
    pub missing: usize,
    /// Number of distinct numeric values.
    pub distinct: usize,
    /// The minimum value.
    pub min: f64,
    /// The maximum value.
    pub max: f64,
    /// First quartile.
    pub q1: f64,
    /// The median value.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// The arithmetic mean.
    pub mean: f64,
    /// Interquartile range (`q3 - q1`).
    pub iqr: f64,
    /// Equal-width histogram over `[min, max]`.
    pub histogram: Histogram,
}

impl NumericSummary {
    /// Computes the summary from raw cells.
    ///
    /// Non-finite values are treated like missing cells.
    #[must_use]
    pub fn new<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut missing = 0;
        let mut sorted = cells
            .into_iter()
            .filter_map(|cell| match cell {
                Some(value) if value.is_finite() => Some(value),
                _ => {
                    missing += 1;
                    None
                }
            })
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, missing)
    }

    /// Computes the summary from pre-sorted present values.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], missing: usize) -> Self {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let (Some(&min), Some(&max), Some(quartiles)) = (
            sorted_values.first(),
            sorted_values.last(),
            Quartiles::from_sorted(sorted_values),
        ) else {
            return Self::empty(missing);
        };

        let count = sorted_values.len();
        let distinct = 1 + sorted_values.windows(2).filter(|w| w[0] != w[1]).count();
        let sum = sorted_values.iter().sum::<f64>();
        let mean = if sum.is_finite() {
            sum / count as f64
        } else {
            // running mean, for sums beyond f64::MAX
            sorted_values
                .iter()
                .enumerate()
                .fold(0.0, |mean, (i, &v)| {
                    let k = (i + 1) as f64;
                    mean + (v / k - mean / k)
                })
                .clamp(min, max)
        };
        let histogram = Histogram::with_bounds(sorted_values, DEFAULT_BIN_COUNT, min, max);

        Self {
            count,
            missing,
            distinct,
            min,
            max,
            q1: quartiles.q1,
            median: quartiles.median,
            q3: quartiles.q3,
            mean,
            iqr: quartiles.iqr(),
            histogram,
        }
    }

    /// The degenerate summary of an attribute without numeric values.
    #[must_use]
    pub fn empty(missing: usize) -> Self {
        Self {
            count: 0,
            missing,
            distinct: 0,
            min: 0.0,
            max: 0.0,
            q1: 0.0,
            median: 0.0,
            q3: 0.0,
            mean: 0.0,
            iqr: 0.0,
            histogram: Histogram { bins: vec![] },
        }
    }

    /// Returns `true` if no numeric value was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Outlier fences derived from the quartiles.
    #[must_use]
    pub fn fences(&self) -> Fences {
        Fences::from_quartiles(self.q1, self.q3)
    }
}
