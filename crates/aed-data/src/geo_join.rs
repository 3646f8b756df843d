//! Joining tabular rows to map features by a shared key.
//!
//! Keys are normalized with [`RawValue::as_key`] on both sides and compared
//! as strings. Every feature is emitted exactly once by
//! [`JoinIndex::join`]; features without a matching row carry no value and
//! are rendered with a neutral fill.
//!
//! # Examples
//!
//! ```
//! use aed_data::{
//!     dataset::{Dataset, Record},
//!     geo_join::{DuplicateKeyPolicy, FeatureKeySource, GeoFeature, JoinIndex},
//! };
//!
//! let dataset = Dataset::from_records(
//!     "covid",
//!     vec![Record::from_iter([("FIPS", "06"), ("Confirmed", "120")])],
//! );
//! let index = JoinIndex::build(&dataset, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
//!
//! let features = [GeoFeature::new(()).with_id("06"), GeoFeature::new(()).with_id("48")];
//! let joined = index.join(&features, &FeatureKeySource::Id, "Confirmed", None);
//!
//! assert_eq!(joined.summary.matched, 1);
//! assert_eq!(joined.features[0].value.as_ref().and_then(|v| v.as_number()), Some(120.0));
//! assert!(joined.features[1].value.is_none());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, hash_map::Entry};

use serde::{Deserialize, Serialize};

use crate::{
    dataset::{Dataset, Record},
    value::RawValue,
};

/// Where a feature's join key comes from.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKeySource {
    /// The feature's own identifier.
    #[default]
    Id,
    /// A named property of the feature.
    Property(String),
}

/// A map feature with opaque geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature<G> {
    pub id: Option<RawValue>,
    pub properties: BTreeMap<String, RawValue>,
    pub geometry: G,
}

impl<G> GeoFeature<G> {
    #[must_use]
    pub fn new(geometry: G) -> Self {
        Self {
            id: None,
            properties: BTreeMap::new(),
            geometry,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<RawValue>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// The normalized join key of the feature.
    #[must_use]
    pub fn key(&self, source: &FeatureKeySource) -> Option<String> {
        match source {
            FeatureKeySource::Id => self.id.as_ref()?.as_key(),
            FeatureKeySource::Property(name) => self.properties.get(name)?.as_key(),
        }
    }
}

/// How [`JoinIndex::build`] treats a key that appears in several rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// The last row wins; duplicated keys are recorded and logged.
    #[default]
    KeepLast,
    /// Building the index fails on the first duplicated key.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum JoinError {
    #[display("join key '{key}' appears in rows {first_row} and {second_row}")]
    DuplicateKey {
        key: String,
        first_row: usize,
        second_row: usize,
    },
}

/// A feature paired with the value of its matching row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedFeature {
    /// Position of the feature in the slice passed to [`JoinIndex::join`].
    pub feature_index: usize,
    pub key: Option<String>,
    /// Index of the matching row in the dataset.
    pub row: Option<usize>,
    /// The joined attribute value; `None` for unmatched features.
    pub value: Option<RawValue>,
    pub display_name: Option<String>,
}

impl JoinedFeature {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.row.is_some()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub matched: usize,
    pub unmatched: usize,
    /// Keys of indexed rows that matched no feature, in row order.
    pub unmatched_row_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinResult {
    /// One entry per input feature, in input order.
    pub features: Vec<JoinedFeature>,
    pub summary: JoinSummary,
}

impl JoinResult {
    /// Range of the numeric values among matched features.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.features
            .iter()
            .filter_map(|f| f.value.as_ref()?.as_number())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Pairs each joined feature with its source feature.
    ///
    /// `features` must be the slice this result was joined from; entries
    /// whose index is out of range are skipped.
    pub fn paired<'r, 'g, G>(
        &'r self,
        features: &'g [GeoFeature<G>],
    ) -> impl Iterator<Item = (&'r JoinedFeature, &'g GeoFeature<G>)> {
        self.features
            .iter()
            .filter_map(|joined| Some((joined, features.get(joined.feature_index)?)))
    }
}

/// Rows of a dataset indexed by their normalized join key.
#[derive(Debug, Clone)]
pub struct JoinIndex<'a> {
    dataset: &'a Dataset,
    key_field: String,
    rows: HashMap<String, usize>,
    duplicate_keys: BTreeSet<String>,
    unkeyed_rows: usize,
}

impl<'a> JoinIndex<'a> {
    /// Indexes `dataset` by `key_field`.
    ///
    /// Rows whose key is missing or blank are not indexed.
    pub fn build(
        dataset: &'a Dataset,
        key_field: &str,
        policy: DuplicateKeyPolicy,
    ) -> Result<Self, JoinError> {
        let mut rows = HashMap::with_capacity(dataset.len());
        let mut duplicate_keys = BTreeSet::new();
        let mut unkeyed_rows = 0;

        for (row, record) in dataset.records().iter().enumerate() {
            let Some(key) = record.get(key_field).as_key() else {
                unkeyed_rows += 1;
                continue;
            };
            match rows.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(row);
                }
                Entry::Occupied(mut entry) => match policy {
                    DuplicateKeyPolicy::KeepLast => {
                        log::warn!(
                            "{}: duplicate {key_field} '{}' in rows {} and {row}; keeping the last",
                            dataset.name(),
                            entry.key(),
                            entry.get(),
                        );
                        duplicate_keys.insert(entry.key().clone());
                        entry.insert(row);
                    }
                    DuplicateKeyPolicy::Reject => {
                        return Err(JoinError::DuplicateKey {
                            key: entry.key().clone(),
                            first_row: *entry.get(),
                            second_row: row,
                        });
                    }
                },
            }
        }

        if unkeyed_rows > 0 {
            log::debug!(
                "{}: {unkeyed_rows} rows without {key_field} left out of the join",
                dataset.name()
            );
        }

        Ok(Self {
            dataset,
            key_field: key_field.to_owned(),
            rows,
            duplicate_keys,
            unkeyed_rows,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys that appeared in more than one row.
    pub fn duplicate_keys(&self) -> impl Iterator<Item = &str> {
        self.duplicate_keys.iter().map(String::as_str)
    }

    #[must_use]
    pub fn unkeyed_rows(&self) -> usize {
        self.unkeyed_rows
    }

    /// Looks up the row for a normalized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Record> {
        let row = *self.rows.get(key)?;
        self.dataset.records().get(row)
    }

    /// Joins every feature to its row, reading `value_field` and optionally
    /// `name_field` from the matching row.
    #[must_use]
    pub fn join<G>(
        &self,
        features: &[GeoFeature<G>],
        key_source: &FeatureKeySource,
        value_field: &str,
        name_field: Option<&str>,
    ) -> JoinResult {
        let mut summary = JoinSummary::default();
        let mut used_rows = BTreeSet::new();

        let features = features
            .iter()
            .enumerate()
            .map(|(feature_index, feature)| {
                let key = feature.key(key_source);
                let row = key.as_deref().and_then(|key| self.rows.get(key)).copied();
                let record = row.and_then(|row| self.dataset.records().get(row));
                if let Some(row) = row {
                    summary.matched += 1;
                    used_rows.insert(row);
                } else {
                    summary.unmatched += 1;
                }
                JoinedFeature {
                    feature_index,
                    key,
                    row,
                    value: record.map(|record| record.get(value_field).clone()),
                    display_name: record
                        .zip(name_field)
                        .and_then(|(record, field)| record.get(field).as_key()),
                }
            })
            .collect();

        let mut unmatched_rows = self
            .rows
            .iter()
            .filter(|(_, row)| !used_rows.contains(*row))
            .map(|(key, row)| (*row, key.clone()))
            .collect::<Vec<_>>();
        unmatched_rows.sort_unstable();
        summary.unmatched_row_keys = unmatched_rows.into_iter().map(|(_, key)| key).collect();

        log::debug!(
            "joined {} on {}: {} matched, {} unmatched features, {} unmatched rows",
            self.dataset.name(),
            self.key_field,
            summary.matched,
            summary.unmatched,
            summary.unmatched_row_keys.len(),
        );

        JoinResult { features, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[(&str, &str)]) -> Dataset {
        let records = rows
            .iter()
            .map(|(fips, confirmed)| {
                Record::from_iter([
                    ("FIPS", RawValue::from(*fips)),
                    ("Confirmed", RawValue::from(*confirmed)),
                ])
            })
            .collect();
        Dataset::from_records("covid", records)
    }

    fn features(ids: &[&str]) -> Vec<GeoFeature<()>> {
        ids.iter().map(|id| GeoFeature::new(()).with_id(*id)).collect()
    }

    #[test]
    fn test_unmatched_features_are_kept() {
        let data = dataset(&[("01", "5"), ("02", "7")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let joined = index.join(&features(&["01", "99", "02"]), &FeatureKeySource::Id, "Confirmed", None);

        assert_eq!(joined.features.len(), 3);
        assert_eq!(
            joined.features.iter().map(|f| f.feature_index).collect::<Vec<_>>(),
            [0, 1, 2]
        );
        assert!(joined.features[0].is_matched());
        assert!(!joined.features[1].is_matched());
        assert_eq!(joined.features[1].value, None);
        assert_eq!(joined.summary.matched, 2);
        assert_eq!(joined.summary.unmatched, 1);
        assert!(joined.summary.unmatched_row_keys.is_empty());
    }

    #[test]
    fn test_keys_compare_as_strings() {
        let data = dataset(&[("01", "5")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let joined = index.join(&features(&["1"]), &FeatureKeySource::Id, "Confirmed", None);
        assert_eq!(joined.summary.matched, 0);
        assert_eq!(joined.summary.unmatched_row_keys, ["01"]);
    }

    #[test]
    fn test_numeric_id_matches_text_key() {
        let data = dataset(&[("1001", "5")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let feature = GeoFeature::new(()).with_id(1001.0);
        let joined = index.join(&[feature], &FeatureKeySource::Id, "Confirmed", None);
        assert_eq!(joined.summary.matched, 1);
    }

    #[test]
    fn test_duplicate_keep_last() {
        let data = dataset(&[("01", "5"), ("02", "6"), ("01", "9")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.duplicate_keys().collect::<Vec<_>>(), ["01"]);
        assert_eq!(index.get("01").unwrap().get("Confirmed").as_number(), Some(9.0));
        assert_eq!(index.get("02").unwrap().get("Confirmed").as_number(), Some(6.0));
    }

    #[test]
    fn test_duplicate_reject() {
        let data = dataset(&[("01", "5"), ("02", "6"), ("01", "9")]);
        let error = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::Reject).unwrap_err();
        assert_eq!(
            error,
            JoinError::DuplicateKey {
                key: "01".to_owned(),
                first_row: 0,
                second_row: 2,
            }
        );
        assert_eq!(error.to_string(), "join key '01' appears in rows 0 and 2");
    }

    #[test]
    fn test_rows_without_key_are_not_indexed() {
        let data = dataset(&[("", "5"), ("  ", "6"), ("03", "7")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::Reject).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.unkeyed_rows(), 2);
    }

    #[test]
    fn test_property_key_and_display_name() {
        let records = vec![Record::from_iter([
            ("FIPS", "48"),
            ("Province_State", "Texas"),
        ])];
        let data = Dataset::from_records("covid", records);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let feature = GeoFeature::new(()).with_property("STATE", "48");
        let joined = index.join(
            &[feature],
            &FeatureKeySource::Property("STATE".to_owned()),
            "Province_State",
            Some("Province_State"),
        );
        assert_eq!(joined.features[0].value, Some(RawValue::from("Texas")));
        assert_eq!(joined.features[0].display_name.as_deref(), Some("Texas"));
    }

    #[test]
    fn test_unmatched_rows_in_row_order() {
        let data = dataset(&[("05", "1"), ("03", "2"), ("04", "3")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let joined = index.join(&features(&["03"]), &FeatureKeySource::Id, "Confirmed", None);
        assert_eq!(joined.summary.unmatched_row_keys, ["05", "04"]);
    }

    #[test]
    fn test_value_range() {
        let data = dataset(&[("01", "5"), ("02", "x"), ("03", "-2")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let joined = index.join(&features(&["01", "02", "03", "04"]), &FeatureKeySource::Id, "Confirmed", None);
        assert_eq!(joined.value_range(), Some((-2.0, 5.0)));
    }

    #[test]
    fn test_paired_keeps_geometry_with_its_value() {
        let data = dataset(&[("01", "5"), ("03", "7")]);
        let index = JoinIndex::build(&data, "FIPS", DuplicateKeyPolicy::KeepLast).unwrap();
        let shapes = ["a", "b", "c"]
            .into_iter()
            .zip(["01", "02", "03"])
            .map(|(shape, id)| GeoFeature::new(shape).with_id(id))
            .collect::<Vec<_>>();
        let joined = index.join(&shapes, &FeatureKeySource::Id, "Confirmed", None);

        let pairs = joined
            .paired(&shapes)
            .map(|(feature, source)| {
                let value = feature.value.as_ref().and_then(RawValue::as_number);
                (source.geometry, value)
            })
            .collect::<Vec<_>>();
        assert_eq!(pairs, [("a", Some(5.0)), ("b", None), ("c", Some(7.0))]);

        // a shorter slice drops the features it does not cover
        assert_eq!(joined.paired(&shapes[..1]).count(), 1);
    }

    #[test]
    fn test_feature_key_source_config() {
        let source: FeatureKeySource = serde_json::from_str(r#""id""#).unwrap();
        assert_eq!(source, FeatureKeySource::Id);
        let source: FeatureKeySource = serde_json::from_str(r#"{"property": "GEOID"}"#).unwrap();
        assert_eq!(source, FeatureKeySource::Property("GEOID".to_owned()));
    }
}
