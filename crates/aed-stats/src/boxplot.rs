use serde::Serialize;

use crate::summary::NumericSummary;

/// Multiplier of the interquartile range used for the outlier fences.
pub const FENCE_FACTOR: f64 = 1.5;

/// The 1.5×IQR boundary beyond which values are classified as outliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fences {
    /// `Q1 - 1.5 * IQR`
    pub lower: f64,
    /// `Q3 + 1.5 * IQR`
    pub upper: f64,
}

impl Fences {
    #[must_use]
    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            lower: q1 - FENCE_FACTOR * iqr,
            upper: q3 + FENCE_FACTOR * iqr,
        }
    }

    /// Returns `true` if `value` lies strictly outside the fences.
    #[must_use]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Boxplot description of an attribute.
///
/// Outliers are derived on demand from a [`NumericSummary`] and the values it
/// was computed from; they are never stored in the summary itself.
///
/// # Examples
///
/// ```
/// use aed_stats::{boxplot::Boxplot, summary::NumericSummary};
///
/// let values = [10.0, 20.0, 20.0, 30.0, 100.0];
/// let summary = NumericSummary::new(values.map(Some));
/// let boxplot = Boxplot::new(&summary, values);
///
/// assert_eq!(boxplot.fences.lower, 5.0);
/// assert_eq!(boxplot.fences.upper, 45.0);
/// assert_eq!(boxplot.outliers, vec![100.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boxplot {
    /// Left whisker end (the minimum).
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Right whisker end (the maximum).
    pub whisker_high: f64,
    pub iqr: f64,
    pub fences: Fences,
    /// Values outside the fences, in input order.
    pub outliers: Vec<f64>,
}

impl Boxplot {
    #[must_use]
    pub fn new<I>(summary: &NumericSummary, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let fences = summary.fences();
        let outliers = values
            .into_iter()
            .filter(|v| v.is_finite() && fences.is_outlier(*v))
            .collect();
        Self {
            whisker_low: summary.min,
            q1: summary.q1,
            median: summary.median,
            q3: summary.q3,
            whisker_high: summary.max,
            iqr: summary.iqr,
            fences,
            outliers,
        }
    }

    /// Number of outliers.
    #[must_use]
    pub fn outlier_count(&self) -> usize {
        self.outliers.len()
    }
}
