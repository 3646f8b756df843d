//! Statistical building blocks for attribute analysis.
//!
//! This crate provides the pure computations behind every analysis panel:
//!
//! - **Numeric summaries**: count, distinct values, min/max, quartiles, mean and IQR
//! - **Quantiles**: rank-based selection (`floor(q * n)`, no interpolation)
//! - **Histograms**: fixed-count equal-width bins over `[min, max]`
//! - **Boxplots**: 1.5×IQR fences and outliers, computed on demand
//! - **Weighted breakdowns**: population-weighted averages across category columns
//!
//! # Modules
//!
//! - [`summary`]: Descriptive statistics for one attribute
//! - [`quantile`]: Rank-based quantile selection
//! - [`histogram`]: Equal-width histogram construction
//! - [`boxplot`]: Outlier fences and boxplot descriptions
//! - [`weighted`]: Weighted aggregation across category columns
//!
//! # Examples
//!
//! ## Summarizing an attribute
//!
//! ```
//! use aed_stats::summary::NumericSummary;
//!
//! let summary = NumericSummary::new([Some(1.0), Some(2.0), None, Some(3.0)]);
//! assert_eq!(summary.count, 3);
//! assert_eq!(summary.missing, 1);
//! assert_eq!(summary.median, 2.0);
//! ```
//!
//! ## Drawing a boxplot
//!
//! ```
//! use aed_stats::{boxplot::Boxplot, summary::NumericSummary};
//!
//! let values = [10.0, 20.0, 20.0, 30.0, 100.0];
//! let summary = NumericSummary::new(values.map(Some));
//! let boxplot = Boxplot::new(&summary, values);
//! assert_eq!(boxplot.outliers, vec![100.0]);
//! ```
//!
//! ## Weighted breakdown
//!
//! ```
//! use aed_stats::weighted::{BreakdownScale, weighted_breakdown};
//!
//! let rows = [(Some(100.0), [Some(0.4)]), (Some(100.0), [Some(0.6)])];
//! let breakdown = weighted_breakdown(rows, ["share"], BreakdownScale::Fraction);
//! assert!((breakdown.shares[0].percentage - 50.0).abs() < 1e-9);
//! ```

pub mod boxplot;
pub mod histogram;
pub mod quantile;
pub mod summary;
pub mod weighted;
