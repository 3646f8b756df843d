//! Population-weighted aggregation across category columns.
//!
//! Each row contributes `value * weight` to every category and `weight` to
//! the shared total. The result for a category is
//! `sum(value * weight) / sum(weight) * scale`.
//!
//! The aggregator does not assume that categories are exhaustive or
//! mutually exclusive, so the results are not guaranteed to sum to 100.
//!
//! # Missing data
//!
//! - A row without a weight is skipped entirely.
//! - A missing category value contributes nothing to that category, while the
//!   row's weight still counts toward the total.
//! - A zero total weight yields 0 for every category.
//!
//! # Examples
//!
//! ```
//! use aed_stats::weighted::{BreakdownScale, weighted_breakdown};
//!
//! let rows = [
//!     (Some(10.0), vec![Some(50.0)]),
//!     (Some(20.0), vec![Some(25.0)]),
//! ];
//! let breakdown = weighted_breakdown(rows, ["a"], BreakdownScale::Identity);
//! assert!((breakdown.shares[0].percentage - 1000.0 / 30.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

/// How weighted averages are reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownScale {
    /// The weighted average as-is.
    #[default]
    Identity,
    /// Columns hold 0..1 shares; the weighted average is multiplied by 100.
    Fraction,
}

impl BreakdownScale {
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            Self::Identity => 1.0,
            Self::Fraction => 100.0,
        }
    }
}

/// Weighted result for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// The category (column) name.
    pub category: String,
    /// Scaled weighted average of the category.
    pub percentage: f64,
}

/// Ordered weighted breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedBreakdown {
    /// One entry per category, in the order the categories were supplied.
    pub shares: Vec<CategoryShare>,
    /// Sum of the weights of all counted rows.
    pub total_weight: f64,
    /// Number of rows that contributed.
    pub rows: usize,
    /// Number of rows skipped for lack of a weight.
    pub skipped_rows: usize,
}

impl WeightedBreakdown {
    /// Looks up the share of a category by name.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<f64> {
        self.shares
            .iter()
            .find(|share| share.category == category)
            .map(|share| share.percentage)
    }
}

/// Incremental builder for a [`WeightedBreakdown`].
#[derive(Debug, Clone)]
pub struct WeightedAccumulator {
    categories: Vec<String>,
    sums: Vec<f64>,
    total_weight: f64,
    rows: usize,
    skipped_rows: usize,
    scale: BreakdownScale,
}

impl WeightedAccumulator {
    #[must_use]
    pub fn new<I, S>(categories: I, scale: BreakdownScale) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = categories.into_iter().map(Into::into).collect::<Vec<_>>();
        let sums = vec![0.0; categories.len()];
        Self {
            categories,
            sums,
            total_weight: 0.0,
            rows: 0,
            skipped_rows: 0,
            scale,
        }
    }

    /// Adds one row.
    ///
    /// `values` are matched positionally with the categories; extra values
    /// are ignored and absent trailing values count as missing.
    pub fn push<I>(&mut self, weight: Option<f64>, values: I)
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let Some(weight) = weight.filter(|w| w.is_finite()) else {
            self.skipped_rows += 1;
            return;
        };
        for (sum, value) in self.sums.iter_mut().zip(values) {
            if let Some(value) = value.filter(|v| v.is_finite()) {
                *sum += value * weight;
            }
        }
        self.total_weight += weight;
        self.rows += 1;
    }

    #[must_use]
    pub fn finish(self) -> WeightedBreakdown {
        let factor = self.scale.factor();
        let total_weight = self.total_weight;
        let shares = self
            .categories
            .into_iter()
            .zip(self.sums)
            .map(|(category, sum)| CategoryShare {
                category,
                percentage: if total_weight == 0.0 {
                    0.0
                } else {
                    sum / total_weight * factor
                },
            })
            .collect();
        WeightedBreakdown {
            shares,
            total_weight,
            rows: self.rows,
            skipped_rows: self.skipped_rows,
        }
    }
}

/// Computes a weighted breakdown over `(weight, values)` rows.
#[must_use]
pub fn weighted_breakdown<R, V, C, S>(rows: R, categories: C, scale: BreakdownScale) -> WeightedBreakdown
where
    R: IntoIterator<Item = (Option<f64>, V)>,
    V: IntoIterator<Item = Option<f64>>,
    C: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut acc = WeightedAccumulator::new(categories, scale);
    for (weight, values) in rows {
        acc.push(weight, values);
    }
    acc.finish()
}

/// Weighted mean of a single column over `(value, weight)` pairs.
///
/// Pairs where either side is missing are skipped. Returns 0 when the
/// remaining weights sum to zero.
///
/// # Examples
///
/// ```
/// use aed_stats::weighted::weighted_mean;
///
/// let mean = weighted_mean([(Some(1.0), Some(1.0)), (Some(4.0), Some(3.0)), (None, Some(100.0))]);
/// assert_eq!(mean, 13.0 / 4.0);
/// ```
#[must_use]
pub fn weighted_mean<I>(pairs: I) -> f64
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let (sum, total) = pairs
        .into_iter()
        .filter_map(|(value, weight)| Some((value?, weight?)))
        .filter(|(value, weight)| value.is_finite() && weight.is_finite())
        .fold((0.0, 0.0), |(sum, total), (value, weight)| {
            (sum + value * weight, total + weight)
        });
    if total == 0.0 { 0.0 } else { sum / total }
}
