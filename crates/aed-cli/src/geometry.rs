//! GeoJSON loading and the planar shapes drawn by map panels.

use std::{convert, fs, path::Path};

use aed_data::{geo_join::GeoFeature, value::RawValue};
use anyhow::Context;
use geojson::{GeoJson, feature::Id};

/// Axis-aligned bounding box in longitude/latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Outline of one feature as a list of polylines.
///
/// Polygon rings, line strings and points all become paths; a point is a
/// path of length one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapShape {
    pub paths: Vec<Vec<(f64, f64)>>,
}

impl MapShape {
    #[must_use]
    pub fn from_geometry(value: &geojson::Value) -> Self {
        let mut shape = Self::default();
        shape.push_value(value);
        shape
    }

    fn push_value(&mut self, value: &geojson::Value) {
        match value {
            geojson::Value::Point(position) => self.push_path([position]),
            geojson::Value::MultiPoint(points) => {
                for position in points {
                    self.push_path([position]);
                }
            }
            geojson::Value::LineString(line) => self.push_path(line),
            geojson::Value::MultiLineString(lines) => {
                for line in lines {
                    self.push_path(line);
                }
            }
            geojson::Value::Polygon(rings) => {
                for ring in rings {
                    self.push_path(ring);
                }
            }
            geojson::Value::MultiPolygon(polygons) => {
                for ring in polygons.iter().flatten() {
                    self.push_path(ring);
                }
            }
            geojson::Value::GeometryCollection(geometries) => {
                for geometry in geometries {
                    self.push_value(&geometry.value);
                }
            }
        }
    }

    fn push_path<'a, I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = &'a Vec<f64>>,
    {
        let path = positions
            .into_iter()
            .filter_map(|position| match position.as_slice() {
                [x, y, ..] if x.is_finite() && y.is_finite() => Some((*x, *y)),
                _ => None,
            })
            .collect::<Vec<_>>();
        if !path.is_empty() {
            self.paths.push(path);
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.paths
            .iter()
            .flatten()
            .map(|&(x, y)| Bounds::point(x, y))
            .reduce(Bounds::union)
    }
}

/// Bounding box of every shape, or `None` if none has coordinates.
pub fn bounds_of<'a, I>(features: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a GeoFeature<MapShape>>,
{
    features
        .into_iter()
        .filter_map(|feature| feature.geometry.bounds())
        .reduce(Bounds::union)
}

/// Reads features with their outlines for drawing.
pub fn read_features<P>(path: P) -> anyhow::Result<Vec<GeoFeature<MapShape>>>
where
    P: AsRef<Path>,
{
    read_features_with(path, map_shape)
}

/// Reads features, keeping each source feature whole as the geometry.
pub fn read_source_features<P>(path: P) -> anyhow::Result<Vec<GeoFeature<geojson::Feature>>>
where
    P: AsRef<Path>,
{
    read_features_with(path, convert::identity)
}

fn read_features_with<P, G>(
    path: P,
    geometry: fn(geojson::Feature) -> G,
) -> anyhow::Result<Vec<GeoFeature<G>>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;
    let features = parse_features_with(&text, geometry)
        .with_context(|| format!("Failed to parse GeoJSON file: {}", path.display()))?;
    log::info!("loaded {} features from {}", features.len(), path.display());
    Ok(features)
}

#[cfg(test)]
fn parse_features(text: &str) -> anyhow::Result<Vec<GeoFeature<MapShape>>> {
    parse_features_with(text, map_shape)
}

pub(crate) fn parse_features_with<G>(
    text: &str,
    geometry: fn(geojson::Feature) -> G,
) -> anyhow::Result<Vec<GeoFeature<G>>> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(bare) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(bare),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };
    Ok(features
        .into_iter()
        .map(|feature| convert_feature(feature, geometry))
        .collect())
}

fn map_shape(feature: geojson::Feature) -> MapShape {
    feature
        .geometry
        .map(|geometry| MapShape::from_geometry(&geometry.value))
        .unwrap_or_default()
}

fn convert_feature<G>(
    feature: geojson::Feature,
    geometry: fn(geojson::Feature) -> G,
) -> GeoFeature<G> {
    let id = feature.id.as_ref().map(|id| match id {
        Id::String(s) => RawValue::Text(s.clone()),
        Id::Number(n) => json_number(n),
    });
    let properties = feature
        .properties
        .iter()
        .flatten()
        .map(|(name, value)| (name.clone(), json_value(value)))
        .collect();
    GeoFeature {
        id,
        properties,
        geometry: geometry(feature),
    }
}

fn json_number(number: &serde_json::Number) -> RawValue {
    number
        .as_f64()
        .map_or_else(|| RawValue::Text(number.to_string()), RawValue::Number)
}

fn json_value(value: &serde_json::Value) -> RawValue {
    match value {
        serde_json::Value::Null => RawValue::Missing,
        serde_json::Value::Number(n) => json_number(n),
        serde_json::Value::String(s) => RawValue::Text(s.clone()),
        other => RawValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use aed_data::geo_join::FeatureKeySource;

    use super::*;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "01001",
                "properties": { "name": "Autauga", "GEOID": 1001 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-86.9, 32.3], [-86.4, 32.3], [-86.4, 32.7], [-86.9, 32.3]]]
                }
            },
            {
                "type": "Feature",
                "id": 2013,
                "properties": { "name": null },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-162.0, 54.0], [-161.0, 55.0], [-162.0, 54.0]]],
                        [[[-165.0, 53.0], [-164.0, 53.5], [-165.0, 53.0]]]
                    ]
                }
            },
            { "type": "Feature", "properties": {}, "geometry": null }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let features = parse_features(COUNTIES).unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].key(&FeatureKeySource::Id).as_deref(), Some("01001"));
        assert_eq!(
            features[0]
                .key(&FeatureKeySource::Property("GEOID".to_owned()))
                .as_deref(),
            Some("1001")
        );
        assert_eq!(features[1].key(&FeatureKeySource::Id).as_deref(), Some("2013"));
        assert_eq!(features[1].properties["name"], RawValue::Missing);

        assert_eq!(features[0].geometry.paths.len(), 1);
        assert_eq!(features[1].geometry.paths.len(), 2);
        assert!(features[2].geometry.paths.is_empty());
    }

    #[test]
    fn test_bounds() {
        let features = parse_features(COUNTIES).unwrap();
        assert_eq!(features[2].geometry.bounds(), None);

        let bounds = bounds_of(&features).unwrap();
        assert_eq!(bounds.min_x, -165.0);
        assert_eq!(bounds.max_x, -86.4);
        assert_eq!(bounds.min_y, 32.3);
        assert_eq!(bounds.max_y, 55.0);
    }

    #[test]
    fn test_source_features_keep_geometry() {
        let features = parse_features_with(COUNTIES, convert::identity).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].key(&FeatureKeySource::Id).as_deref(), Some("01001"));
        assert!(matches!(
            features[0].geometry.geometry.as_ref().map(|g| &g.value),
            Some(geojson::Value::Polygon(_))
        ));
        assert!(features[2].geometry.geometry.is_none());
    }

    #[test]
    fn test_bare_geometry_is_one_feature() {
        let text = r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#;
        let features = parse_features(text).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, None);
        assert_eq!(features[0].geometry.paths, [vec![(1.0, 2.0)]]);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(parse_features("{").is_err());
    }
}
