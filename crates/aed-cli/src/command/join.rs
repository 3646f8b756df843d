use std::path::PathBuf;

use aed_dashboard::{config::DashboardConfig, render::PanelView, session::DashboardSession};
use aed_data::{
    dataset::Dataset,
    geo_join::{DuplicateKeyPolicy, GeoFeature},
    load::LoadState,
};
use anyhow::{Context, bail};
use geojson::{FeatureCollection, JsonObject};
use serde_json::json;

use crate::{
    geometry,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct JoinArg {
    /// CSV file with a header row
    csv: PathBuf,
    /// GeoJSON file with the features to join
    geojson: PathBuf,
    /// Map attribute to render; defaults to the first configured one
    #[arg(long)]
    attribute: Option<String>,
    /// Fail when a join key appears in more than one row
    #[arg(long)]
    reject_duplicates: bool,
    /// Dashboard configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub fn run(arg: &JoinArg) -> anyhow::Result<()> {
    let mut config = util::load_config(arg.config.as_deref())?;
    if arg.reject_duplicates {
        config.catalog.duplicate_keys = DuplicateKeyPolicy::Reject;
    }

    let attribute = match &arg.attribute {
        Some(attribute) => attribute.clone(),
        None => config
            .catalog
            .special_attributes
            .first()
            .map(|special| special.name.clone())
            .context("no map attributes are configured")?,
    };

    let dataset = util::read_csv_dataset(&arg.csv)?;
    if !dataset.has_column(&attribute) {
        bail!("{} has no column named {attribute:?}", arg.csv.display());
    }
    let features = geometry::read_source_features(&arg.geojson)?;

    let collection = join_collection(config, dataset, features, &attribute)?;
    Output::save_json(&collection, arg.output.as_deref())?;
    Ok(())
}

/// Joins `dataset` to `features` and returns them as a drawable collection.
///
/// Each output feature keeps its source geometry and properties; the join
/// fields (`key`, `row`, `value`, `display_name`, `matched`) are added to the
/// properties. The map title, value field, value range and join summary are
/// written as members of the collection.
fn join_collection(
    config: DashboardConfig,
    dataset: Dataset,
    features: Vec<GeoFeature<geojson::Feature>>,
    attribute: &str,
) -> anyhow::Result<FeatureCollection> {
    if config.catalog.special(attribute).is_none() {
        bail!("{attribute:?} is not a map attribute");
    }

    let mut session = DashboardSession::new(config, vec![dataset]);
    session.set_geometry(LoadState::Loaded(features));
    let handle = session.open_panel(attribute);
    let rendered = session
        .registry()
        .panel(handle)
        .and_then(|panel| panel.rendered())
        .with_context(|| format!("{attribute:?} was not rendered"))?;
    let view = match &rendered.view {
        PanelView::Map(view) => view,
        PanelView::Unavailable { reason } => bail!("cannot join {attribute:?}: {reason}"),
        view => bail!("unexpected view for {attribute:?}: {view:?}"),
    };
    let sources = session
        .geometry()
        .loaded()
        .map(Vec::as_slice)
        .context("geometry is not loaded")?;

    log::info!(
        "{}: {} features matched, {} unmatched, {} rows without a feature",
        view.title,
        view.join.summary.matched,
        view.join.summary.unmatched,
        view.join.summary.unmatched_row_keys.len()
    );

    let features = view
        .join
        .paired(sources)
        .map(|(joined, source)| {
            let mut feature = source.geometry.clone();
            let properties = feature.properties.get_or_insert_with(JsonObject::new);
            properties.insert("key".to_owned(), json!(joined.key));
            properties.insert("row".to_owned(), json!(joined.row));
            properties.insert("value".to_owned(), json!(joined.value));
            properties.insert("display_name".to_owned(), json!(joined.display_name));
            properties.insert("matched".to_owned(), json!(joined.is_matched()));
            feature
        })
        .collect();

    let mut members = JsonObject::new();
    members.insert("title".to_owned(), json!(view.title));
    members.insert("value_field".to_owned(), json!(view.value_field));
    members.insert("value_range".to_owned(), json!(view.value_range));
    members.insert("summary".to_owned(), serde_json::to_value(&view.join.summary)?);

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(members),
    })
}

#[cfg(test)]
mod tests {
    use std::convert;

    use aed_data::{dataset::Record, value::RawValue};

    use super::*;

    const STATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "06",
                "properties": { "NAME": "California" },
                "geometry": { "type": "Point", "coordinates": [-119.4, 36.8] }
            },
            {
                "type": "Feature",
                "id": "48",
                "properties": { "NAME": "Texas" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-106.6, 31.8], [-93.5, 31.8], [-93.5, 36.5], [-106.6, 31.8]]]
                }
            }
        ]
    }"#;

    fn covid() -> Dataset {
        Dataset::from_records(
            "covid",
            vec![
                Record::from_iter([("FIPS", "06"), ("Confirmed", "120")]),
                Record::from_iter([("FIPS", "36"), ("Confirmed", "80")]),
            ],
        )
    }

    #[test]
    fn test_joined_features_keep_their_geometry() {
        let features = geometry::parse_features_with(STATES, convert::identity).unwrap();
        let collection =
            join_collection(DashboardConfig::default(), covid(), features, "FIPS").unwrap();

        assert_eq!(collection.features.len(), 2);
        let california = &collection.features[0];
        assert!(matches!(
            california.geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::Point(_))
        ));
        let properties = california.properties.as_ref().unwrap();
        assert_eq!(properties["NAME"], "California");
        assert_eq!(properties["key"], "06");
        assert_eq!(properties["value"], "06");
        assert_eq!(properties["matched"], true);

        let texas = &collection.features[1];
        assert!(matches!(
            texas.geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::Polygon(_))
        ));
        let properties = texas.properties.as_ref().unwrap();
        assert_eq!(properties["value"], serde_json::Value::Null);
        assert_eq!(properties["matched"], false);

        let members = collection.foreign_members.as_ref().unwrap();
        assert_eq!(members["summary"]["matched"], 1);
        assert_eq!(members["summary"]["unmatched_row_keys"], json!(["36"]));
        assert_eq!(members["value_field"], "FIPS");
    }

    #[test]
    fn test_rejects_non_map_attribute() {
        let features = geometry::parse_features_with(STATES, convert::identity).unwrap();
        let result = join_collection(DashboardConfig::default(), covid(), features, "Confirmed");
        assert!(result.is_err());
    }

    #[test]
    fn test_output_is_valid_geojson() {
        let features = geometry::parse_features_with(STATES, convert::identity).unwrap();
        let collection =
            join_collection(DashboardConfig::default(), covid(), features, "FIPS").unwrap();
        let text = serde_json::to_string(&collection).unwrap();
        let reparsed = geometry::parse_features_with(&text, convert::identity).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(
            reparsed[0].properties["matched"],
            RawValue::Text("true".to_owned())
        );
    }
}
