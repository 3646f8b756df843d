use serde::{Deserialize, Serialize};

use crate::{
    dataset::Dataset,
    geo_join::{DuplicateKeyPolicy, FeatureKeySource},
};

/// How an attribute is analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Summarized with statistics or a boxplot.
    Numeric,
    /// Rendered as a map through the geo join.
    SpecialCategorical,
    /// Rendered as an "unavailable" panel.
    Unanalyzable,
}

/// An attribute rendered as a map instead of statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAttribute {
    pub name: String,
    pub title: String,
    /// Row field colored on the map; the attribute itself when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
    /// Row field shown as the region's name in tooltips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,
}

impl SpecialAttribute {
    #[must_use]
    pub fn value_field(&self) -> &str {
        self.value_field.as_deref().unwrap_or(&self.name)
    }
}

/// Static lookup deciding the kind of every attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeCatalog {
    /// Row field joined against the map features.
    pub join_key_field: String,
    pub feature_key: FeatureKeySource,
    /// Policy for join keys shared by several rows.
    pub duplicate_keys: DuplicateKeyPolicy,
    pub special_attributes: Vec<SpecialAttribute>,
    pub unanalyzable_attributes: Vec<String>,
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self {
            join_key_field: "FIPS".to_owned(),
            feature_key: FeatureKeySource::Id,
            duplicate_keys: DuplicateKeyPolicy::KeepLast,
            special_attributes: vec![
                SpecialAttribute {
                    name: "FIPS".to_owned(),
                    title: "Map by FIPS code".to_owned(),
                    value_field: None,
                    name_field: None,
                },
                SpecialAttribute {
                    name: "Province_State".to_owned(),
                    title: "Map by state".to_owned(),
                    value_field: None,
                    name_field: Some("Province_State".to_owned()),
                },
            ],
            unanalyzable_attributes: vec![],
        }
    }
}

impl AttributeCatalog {
    #[must_use]
    pub fn special(&self, name: &str) -> Option<&SpecialAttribute> {
        self.special_attributes.iter().find(|s| s.name == name)
    }

    /// Classifies `name` as found in `dataset`.
    ///
    /// Special attributes and explicitly unanalyzable names are decided by
    /// configuration alone; any other attribute is numeric when at least one
    /// of its cells reads as a number.
    #[must_use]
    pub fn classify(&self, name: &str, dataset: &Dataset) -> AttributeKind {
        if self.special(name).is_some() {
            AttributeKind::SpecialCategorical
        } else if self.unanalyzable_attributes.iter().any(|n| n == name) {
            AttributeKind::Unanalyzable
        } else if dataset.has_numeric_values(name) {
            AttributeKind::Numeric
        } else {
            AttributeKind::Unanalyzable
        }
    }
}

/// An attribute offered for analysis and the dataset that provides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSource {
    pub name: String,
    /// Index into the dataset list passed to [`merge_attributes`].
    pub dataset: usize,
}

/// Merges the columns of several datasets into one attribute list.
///
/// Attributes keep the order in which they are first seen; an attribute
/// present in several datasets is read from the first one that has it.
///
/// # Examples
///
/// ```
/// use aed_data::{
///     attribute::merge_attributes,
///     dataset::{Dataset, Record},
/// };
///
/// let a = Dataset::from_records("a", vec![Record::from_iter([("FIPS", "1"), ("Deaths", "2")])]);
/// let b = Dataset::from_records("b", vec![Record::from_iter([("FIPS", "1"), ("Active", "3")])]);
///
/// let merged = merge_attributes(&[a, b]);
/// let names = merged.iter().map(|s| (s.name.as_str(), s.dataset)).collect::<Vec<_>>();
/// assert_eq!(names, [("Deaths", 0), ("FIPS", 0), ("Active", 1)]);
/// ```
#[must_use]
pub fn merge_attributes(datasets: &[Dataset]) -> Vec<AttributeSource> {
    let mut merged: Vec<AttributeSource> = vec![];
    for (index, dataset) in datasets.iter().enumerate() {
        for column in dataset.columns() {
            if !merged.iter().any(|s| &s.name == column) {
                merged.push(AttributeSource {
                    name: column.clone(),
                    dataset: index,
                });
            }
        }
    }
    merged
}
