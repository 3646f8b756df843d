use std::collections::BTreeMap;

use aed_stats::{
    summary::NumericSummary,
    weighted::{self, BreakdownScale, WeightedBreakdown},
};
use serde::{Deserialize, Serialize};

use crate::value::RawValue;

static MISSING: RawValue = RawValue::Missing;

/// One row of a dataset: attribute name to raw cell.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, RawValue>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns the cell for `name`, or [`RawValue::Missing`] if the row has
    /// no such field.
    #[must_use]
    pub fn get(&self, name: &str) -> &RawValue {
        self.fields.get(name).unwrap_or(&MISSING)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// A tabular dataset as delivered by a loader.
///
/// Column order follows the source header. The core only ever reads a
/// dataset; every analysis borrows it for the duration of one computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    /// Builds a dataset whose columns are every field name seen in
    /// `records`.
    ///
    /// Records keep their fields sorted by name, so the columns a record
    /// introduces come out alphabetically. Across records, columns are added
    /// in the order the records are seen.
    #[must_use]
    pub fn from_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = vec![];
        for record in &records {
            for (field, _) in record.fields() {
                if !columns.iter().any(|c| c == field) {
                    columns.push(field.to_owned());
                }
            }
        }
        Self::new(name, columns, records)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Iterates over the raw cells of one column.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawValue> + 'a {
        self.records.iter().map(move |record| record.get(name))
    }

    /// Iterates over one column read as numbers.
    pub fn numbers<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<f64>> + 'a {
        self.column(name).map(RawValue::as_number)
    }

    /// Returns `true` if at least one cell of the column reads as a number.
    #[must_use]
    pub fn has_numeric_values(&self, name: &str) -> bool {
        self.numbers(name).any(|v| v.is_some())
    }

    /// Summarizes one column.
    ///
    /// # Examples
    ///
    /// ```
    /// use aed_data::dataset::{Dataset, Record};
    ///
    /// let records = ["10", "x", "30"]
    ///     .into_iter()
    ///     .map(|v| Record::from_iter([("cases", v)]))
    ///     .collect();
    /// let dataset = Dataset::from_records("covid", records);
    ///
    /// let summary = dataset.summarize("cases");
    /// assert_eq!(summary.count, 2);
    /// assert_eq!(summary.missing, 1);
    /// assert_eq!(summary.mean, 20.0);
    /// ```
    #[must_use]
    pub fn summarize(&self, name: &str) -> NumericSummary {
        NumericSummary::new(self.numbers(name))
    }

    /// Weighted average of each category column, weighted by `weight_field`.
    ///
    /// See [`aed_stats::weighted`] for the missing-data policy.
    #[must_use]
    pub fn weighted_breakdown<S>(
        &self,
        weight_field: &str,
        category_fields: &[S],
        scale: BreakdownScale,
    ) -> WeightedBreakdown
    where
        S: AsRef<str>,
    {
        let rows = self.records.iter().map(|record| {
            let weight = record.get(weight_field).as_number();
            let values = category_fields
                .iter()
                .map(move |field| record.get(field.as_ref()).as_number());
            (weight, values)
        });
        weighted::weighted_breakdown(rows, category_fields.iter().map(AsRef::as_ref), scale)
    }

    /// Weighted mean of one column, skipping rows where either side is missing.
    #[must_use]
    pub fn weighted_mean(&self, value_field: &str, weight_field: &str) -> f64 {
        weighted::weighted_mean(self.records.iter().map(|record| {
            (
                record.get(value_field).as_number(),
                record.get(weight_field).as_number(),
            )
        }))
    }
}
