use aed_data::attribute::AttributeCatalog;
use aed_stats::weighted::BreakdownScale;
use serde::{Deserialize, Serialize};

use crate::breakdown::{BreakdownCategory, BreakdownPreset};

/// Dashboard configuration, usually read from a JSON file.
///
/// Every key is optional; missing keys take the built-in defaults, which
/// describe the COVID-19 county dataset (`FIPS` / `Province_State` maps) and
/// the census breakdown charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    #[serde(flatten)]
    pub catalog: AttributeCatalog,
    pub breakdowns: Vec<BreakdownPreset>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            catalog: AttributeCatalog::default(),
            breakdowns: default_breakdowns(),
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn breakdown(&self, id: &str) -> Option<&BreakdownPreset> {
        self.breakdowns.iter().find(|preset| preset.id == id)
    }
}

const WEIGHT_FIELD: &str = "total_population";
const REGION_FIELD: &str = "GEOID";

const RACE_CATEGORIES: [(&str, &str); 4] = [
    ("white", "White"),
    ("black", "Black"),
    ("asian", "Asian"),
    ("hispanic", "Hispanic"),
];

const INCOME_BRACKETS: [&str; 4] = ["Under $50K", "$50K - $100K", "$100K - $200K", "Over $200K"];

const ACTIVITY_CATEGORIES: [&str; 12] = [
    "Food",
    "Shopping",
    "Work",
    "Health",
    "Religious",
    "Service",
    "Entertainment",
    "Grocery",
    "Education",
    "Arts/Museum",
    "Transportation",
    "Sports",
];

fn preset<I>(id: &str, title: &str, scale: BreakdownScale, categories: I) -> BreakdownPreset
where
    I: IntoIterator<Item = BreakdownCategory>,
{
    BreakdownPreset {
        id: id.to_owned(),
        title: title.to_owned(),
        weight_field: WEIGHT_FIELD.to_owned(),
        scale,
        region_field: Some(REGION_FIELD.to_owned()),
        categories: categories.into_iter().collect(),
    }
}

fn default_breakdowns() -> Vec<BreakdownPreset> {
    vec![
        preset(
            "race",
            "Racial composition",
            BreakdownScale::Fraction,
            RACE_CATEGORIES.map(|(field, label)| BreakdownCategory::new(field, label)),
        ),
        preset(
            "income",
            "Household income",
            BreakdownScale::Fraction,
            INCOME_BRACKETS.map(|bracket| BreakdownCategory::new(bracket, bracket)),
        ),
        preset(
            "income_inflow",
            "Household income of visitors",
            BreakdownScale::Fraction,
            INCOME_BRACKETS.map(|bracket| {
                BreakdownCategory::new(format!("{bracket}_inflow"), format!("{bracket} Inflow"))
            }),
        ),
        preset(
            "activity",
            "Activity visits",
            BreakdownScale::Identity,
            ACTIVITY_CATEGORIES.map(|category| BreakdownCategory::new(category, category)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use aed_data::geo_join::FeatureKeySource;

    use super::*;

    #[test]
    fn test_default_presets() {
        let config = DashboardConfig::default();
        let ids = config
            .breakdowns
            .iter()
            .map(|p| p.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["race", "income", "income_inflow", "activity"]);

        let inflow = config.breakdown("income_inflow").unwrap();
        assert_eq!(inflow.categories[0].field, "Under $50K_inflow");
        assert_eq!(inflow.categories[0].label, "Under $50K Inflow");

        let activity = config.breakdown("activity").unwrap();
        assert_eq!(activity.scale, BreakdownScale::Identity);
        assert_eq!(activity.categories.len(), 12);
        assert!(config.breakdown("missing").is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{
                "join_key_field": "GEOID",
                "feature_key": { "property": "GEOID" },
                "unanalyzable_attributes": ["Last_Update"],
                "breakdowns": [{
                    "id": "age",
                    "title": "Age",
                    "weight_field": "population",
                    "scale": "fraction",
                    "categories": [{ "field": "under_18", "label": "Under 18" }]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.catalog.join_key_field, "GEOID");
        assert_eq!(
            config.catalog.feature_key,
            FeatureKeySource::Property("GEOID".to_owned())
        );
        assert_eq!(config.catalog.special_attributes.len(), 2);
        assert_eq!(config.breakdowns.len(), 1);
        assert_eq!(config.breakdowns[0].scale, BreakdownScale::Fraction);
    }

    #[test]
    fn test_round_trip() {
        let config = DashboardConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DashboardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
