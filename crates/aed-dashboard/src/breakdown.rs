//! Weighted breakdown charts with drill-down.
//!
//! A [`BreakdownChart`] aggregates a set of category columns over a dataset,
//! weighted by a population column. Selecting a category drills down into
//! that column; selecting a region shows the region's own values.

use aed_data::{dataset::Dataset, value::RawValue};
use aed_stats::{summary::NumericSummary, weighted::BreakdownScale};
use serde::{Deserialize, Serialize};

use crate::interaction::{HoverEvent, InteractionState, SelectionChanged};

/// Number of region rows listed in a drill-down.
pub const DRILL_DOWN_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownCategory {
    /// Column holding the category's per-row value.
    pub field: String,
    pub label: String,
}

impl BreakdownCategory {
    #[must_use]
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
        }
    }
}

/// Configuration of one breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownPreset {
    pub id: String,
    pub title: String,
    pub weight_field: String,
    #[serde(default)]
    pub scale: BreakdownScale,
    /// Column identifying regions in drill-downs and region profiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_field: Option<String>,
    pub categories: Vec<BreakdownCategory>,
}

impl BreakdownPreset {
    #[must_use]
    pub fn category(&self, field: &str) -> Option<&BreakdownCategory> {
        self.categories.iter().find(|c| c.field == field)
    }

    fn category_fields(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.field.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub category: String,
    pub label: String,
    pub value: f64,
}

/// Render instructions for a breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownView {
    pub id: String,
    pub title: String,
    pub scale: BreakdownScale,
    /// In the preset's category order.
    pub categories: Vec<CategoryValue>,
    pub total_weight: f64,
    pub rows: usize,
    pub skipped_rows: usize,
}

impl BreakdownView {
    #[must_use]
    pub fn compute(preset: &BreakdownPreset, dataset: &Dataset) -> Self {
        let breakdown =
            dataset.weighted_breakdown(&preset.weight_field, &preset.category_fields(), preset.scale);
        let categories = preset
            .categories
            .iter()
            .zip(breakdown.shares)
            .map(|(category, share)| CategoryValue {
                category: category.field.clone(),
                label: category.label.clone(),
                value: share.percentage,
            })
            .collect();
        Self {
            id: preset.id.clone(),
            title: preset.title.clone(),
            scale: preset.scale,
            categories,
            total_weight: breakdown.total_weight,
            rows: breakdown.rows,
            skipped_rows: breakdown.skipped_rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionValue {
    pub region: String,
    pub value: RawValue,
}

/// Detailed view of one category column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillDown {
    pub category: String,
    pub label: String,
    pub summary: NumericSummary,
    /// Weighted by the preset's weight column, skipping missing values.
    pub weighted_mean: f64,
    pub present: usize,
    pub missing: usize,
    /// The first [`DRILL_DOWN_PREVIEW_ROWS`] rows as `region -> value`.
    pub preview: Vec<RegionValue>,
    /// Rows not included in the preview.
    pub remaining: usize,
}

impl DrillDown {
    #[must_use]
    pub fn compute(preset: &BreakdownPreset, category: &BreakdownCategory, dataset: &Dataset) -> Self {
        let summary = dataset.summarize(&category.field);
        let weighted_mean = dataset.weighted_mean(&category.field, &preset.weight_field);

        let region_field = preset.region_field.as_deref();
        let preview = dataset
            .records()
            .iter()
            .enumerate()
            .take(DRILL_DOWN_PREVIEW_ROWS)
            .map(|(row, record)| RegionValue {
                region: region_field
                    .and_then(|field| record.get(field).as_key())
                    .unwrap_or_else(|| format!("#{row}")),
                value: record.get(&category.field).clone(),
            })
            .collect::<Vec<_>>();

        Self {
            category: category.field.clone(),
            label: category.label.clone(),
            present: summary.count,
            missing: summary.missing,
            summary,
            weighted_mean,
            remaining: dataset.len() - preview.len(),
            preview,
        }
    }
}

/// Raw per-category values of a single region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionProfile {
    pub region: String,
    pub values: Vec<RegionCategoryValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCategoryValue {
    pub category: String,
    pub label: String,
    pub value: Option<f64>,
}

/// A breakdown chart with its interaction state.
#[derive(Debug, Clone)]
pub struct BreakdownChart {
    preset: BreakdownPreset,
    view: BreakdownView,
    categories: InteractionState<String>,
    region: Option<String>,
}

impl BreakdownChart {
    #[must_use]
    pub fn new(preset: BreakdownPreset, dataset: &Dataset) -> Self {
        let view = BreakdownView::compute(&preset, dataset);
        log::debug!(
            "breakdown {}: {} rows, {} skipped, total weight {}",
            preset.id,
            view.rows,
            view.skipped_rows,
            view.total_weight
        );
        Self {
            preset,
            view,
            categories: InteractionState::new(),
            region: None,
        }
    }

    #[must_use]
    pub fn preset(&self) -> &BreakdownPreset {
        &self.preset
    }

    #[must_use]
    pub fn view(&self) -> &BreakdownView {
        &self.view
    }

    #[must_use]
    pub fn interaction(&self) -> &InteractionState<String> {
        &self.categories
    }

    pub fn hover(&mut self, category: &str) -> HoverEvent<String> {
        self.categories.hover(category.to_owned())
    }

    pub fn hover_exit(&mut self) -> HoverEvent<String> {
        self.categories.hover_exit()
    }

    /// Selects or deselects a category.
    ///
    /// Unknown categories are ignored and reported as an unchanged selection.
    pub fn click(&mut self, category: &str) -> SelectionChanged<String> {
        if self.preset.category(category).is_none() {
            let selected = self.categories.selected().cloned();
            return SelectionChanged {
                previous: selected.clone(),
                current: selected,
            };
        }
        self.categories.click(category.to_owned())
    }

    pub fn clear(&mut self) -> SelectionChanged<String> {
        self.categories.clear()
    }

    /// Drill-down for the selected category, if any.
    #[must_use]
    pub fn drill_down(&self, dataset: &Dataset) -> Option<DrillDown> {
        let category = self.preset.category(self.categories.selected()?)?;
        Some(DrillDown::compute(&self.preset, category, dataset))
    }

    /// Region keys available for [`select_region`](Self::select_region), in
    /// row order without duplicates.
    #[must_use]
    pub fn regions(&self, dataset: &Dataset) -> Vec<String> {
        let Some(field) = self.preset.region_field.as_deref() else {
            return vec![];
        };
        let mut regions: Vec<String> = vec![];
        for key in dataset.column(field).filter_map(RawValue::as_key) {
            if !regions.contains(&key) {
                regions.push(key);
            }
        }
        regions
    }

    pub fn select_region(&mut self, region: Option<String>) {
        self.region = region;
    }

    #[must_use]
    pub fn selected_region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Values of the selected region.
    #[must_use]
    pub fn region_profile(&self, dataset: &Dataset) -> Option<RegionProfile> {
        let region = self.region.as_deref()?;
        let field = self.preset.region_field.as_deref()?;
        let record = dataset
            .records()
            .iter()
            .find(|record| record.get(field).as_key().as_deref() == Some(region))?;
        let values = self
            .preset
            .categories
            .iter()
            .map(|category| RegionCategoryValue {
                category: category.field.clone(),
                label: category.label.clone(),
                value: record.get(&category.field).as_number(),
            })
            .collect();
        Some(RegionProfile {
            region: region.to_owned(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use aed_data::dataset::Record;

    use super::*;

    fn preset() -> BreakdownPreset {
        BreakdownPreset {
            id: "race".to_owned(),
            title: "Racial composition".to_owned(),
            weight_field: "total_population".to_owned(),
            scale: BreakdownScale::Fraction,
            region_field: Some("GEOID".to_owned()),
            categories: vec![
                BreakdownCategory::new("white", "White"),
                BreakdownCategory::new("black", "Black"),
            ],
        }
    }

    fn dataset(rows: usize) -> Dataset {
        let records = (0..rows)
            .map(|i| {
                let i = u32::try_from(i).unwrap();
                Record::from_iter([
                    ("GEOID", RawValue::from(format!("0600{i:02}"))),
                    ("total_population", RawValue::from(f64::from(100 + i))),
                    ("white", RawValue::from(0.5)),
                    (
                        "black",
                        if i % 4 == 3 {
                            RawValue::Missing
                        } else {
                            RawValue::from(0.25)
                        },
                    ),
                ])
            })
            .collect();
        Dataset::from_records("census", records)
    }

    #[test]
    fn test_view_keeps_preset_order_and_labels() {
        let chart = BreakdownChart::new(preset(), &dataset(3));
        let labels = chart
            .view()
            .categories
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["White", "Black"]);
        assert!((chart.view().categories[0].value - 50.0).abs() < 1e-9);
        assert!((chart.view().categories[1].value - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_drives_drill_down() {
        let data = dataset(13);
        let mut chart = BreakdownChart::new(preset(), &data);
        assert!(chart.drill_down(&data).is_none());

        chart.click("black");
        let drill = chart.drill_down(&data).unwrap();
        assert_eq!(drill.category, "black");
        assert_eq!(drill.label, "Black");
        assert_eq!(drill.present, 10);
        assert_eq!(drill.missing, 3);
        assert_eq!(drill.preview.len(), DRILL_DOWN_PREVIEW_ROWS);
        assert_eq!(drill.remaining, 3);
        assert_eq!(drill.preview[0].region, "060000");
        assert!((drill.weighted_mean - 0.25).abs() < 1e-12);

        chart.click("white");
        assert_eq!(chart.drill_down(&data).unwrap().category, "white");

        let change = chart.click("white");
        assert!(change.is_cleared());
        assert!(chart.drill_down(&data).is_none());
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let data = dataset(2);
        let mut chart = BreakdownChart::new(preset(), &data);
        chart.click("white");
        let change = chart.click("asian");
        assert!(!change.changed());
        assert_eq!(chart.interaction().selected().map(String::as_str), Some("white"));
    }

    #[test]
    fn test_short_dataset_preview() {
        let data = dataset(4);
        let mut chart = BreakdownChart::new(preset(), &data);
        chart.click("white");
        let drill = chart.drill_down(&data).unwrap();
        assert_eq!(drill.preview.len(), 4);
        assert_eq!(drill.remaining, 0);
    }

    #[test]
    fn test_region_profile() {
        let data = dataset(5);
        let mut chart = BreakdownChart::new(preset(), &data);
        assert_eq!(chart.regions(&data).len(), 5);
        assert!(chart.region_profile(&data).is_none());

        chart.select_region(Some("060003".to_owned()));
        let profile = chart.region_profile(&data).unwrap();
        assert_eq!(profile.region, "060003");
        assert_eq!(profile.values[0].value, Some(0.5));
        assert_eq!(profile.values[1].value, None);

        chart.select_region(Some("999999".to_owned()));
        assert!(chart.region_profile(&data).is_none());
    }

    #[test]
    fn test_preset_from_config() {
        let preset: BreakdownPreset = serde_json::from_str(
            r#"{
                "id": "activity",
                "title": "Activity visits",
                "weight_field": "total_population",
                "categories": [{ "field": "Food", "label": "Food" }]
            }"#,
        )
        .unwrap();
        assert_eq!(preset.scale, BreakdownScale::Identity);
        assert_eq!(preset.region_field, None);
    }
}
