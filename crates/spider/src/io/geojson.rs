use std::{collections::BTreeMap, path::Path};

use geojson::{FeatureCollection, GeoJson, JsonObject};
use tracing::debug;

use crate::{
    error::{Result, SpiderError},
    traits::VectorSource,
    types::{Feature, FeatureGeometry},
};

/// Vector source backed by a GeoJSON document.
///
/// Features are parsed lazily by index; geometry validation happens when a
/// feature is read, so a bad feature fails the run at its position.
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    collection: FeatureCollection,
}

impl GeoJsonSource {
    /// Load a GeoJSON file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let source = Self::from_geojson_str(&content)?;
        debug!(path = %path.display(), features = source.feature_count(), "opened vector source");
        Ok(source)
    }

    /// Parse a GeoJSON string.
    ///
    /// A bare Feature or Geometry is treated as a one-feature collection.
    pub fn from_geojson_str(content: &str) -> Result<Self> {
        let geojson: GeoJson = content.parse()?;
        let collection = match geojson {
            GeoJson::FeatureCollection(collection) => collection,
            GeoJson::Feature(feature) => FeatureCollection {
                bbox: None,
                features: vec![feature],
                foreign_members: None,
            },
            GeoJson::Geometry(geometry) => FeatureCollection {
                bbox: None,
                features: vec![geojson::Feature {
                    bbox: None,
                    geometry: Some(geometry),
                    id: None,
                    properties: None,
                    foreign_members: None,
                }],
                foreign_members: None,
            },
        };
        Ok(Self { collection })
    }
}

impl VectorSource for GeoJsonSource {
    fn feature_count(&self) -> usize {
        self.collection.features.len()
    }

    fn feature_at(&self, index: usize) -> Result<Feature> {
        let feature = self.collection.features.get(index).ok_or_else(|| {
            SpiderError::Configuration(format!(
                "feature index {} out of range (source has {})",
                index,
                self.feature_count()
            ))
        })?;

        let geometry = feature.geometry.as_ref().ok_or_else(|| {
            SpiderError::MalformedGeometry(format!("feature {} has no geometry", index))
        })?;
        let geometry = geo_types::Geometry::<f64>::try_from(geometry.value.clone())?;
        let geometry = FeatureGeometry::try_from(geometry)?;

        let attributes = feature
            .properties
            .as_ref()
            .map(attribute_table)
            .unwrap_or_default();

        Ok(Feature {
            index,
            geometry,
            attributes,
        })
    }
}

/// Render every property as a string the way a field-as-string read would
fn attribute_table(properties: &JsonObject) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "lake", "code": 42, "note": null },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [121.5, 31.2] }
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                        [[[2, 2], [3, 2], [3, 3], [2, 2]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_reads_supported_geometries() {
        let source = GeoJsonSource::from_geojson_str(COLLECTION).unwrap();
        assert_eq!(source.feature_count(), 5);

        let lake = source.feature_at(0).unwrap();
        assert_eq!(lake.index, 0);
        assert_eq!(lake.geometry.kind(), "Polygon");
        assert_eq!(lake.attribute("name"), Some("lake"));
        assert_eq!(lake.attribute("code"), Some("42"));
        assert_eq!(lake.attribute("note"), Some(""));

        assert_eq!(source.feature_at(1).unwrap().geometry.kind(), "Point");

        let multi = source.feature_at(2).unwrap();
        assert_eq!(multi.geometry.kind(), "MultiPolygon");
        assert!(multi.attributes.is_empty());
    }

    #[test]
    fn test_rejects_other_geometries() {
        let source = GeoJsonSource::from_geojson_str(COLLECTION).unwrap();
        assert!(matches!(
            source.feature_at(3),
            Err(SpiderError::UnsupportedGeometry(_))
        ));
        assert!(matches!(
            source.feature_at(4),
            Err(SpiderError::MalformedGeometry(_))
        ));
        assert!(matches!(
            source.feature_at(5),
            Err(SpiderError::Configuration(_))
        ));
    }

    #[test]
    fn test_bare_geometry_is_one_feature() {
        let source =
            GeoJsonSource::from_geojson_str(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#)
                .unwrap();
        assert_eq!(source.feature_count(), 1);
        assert_eq!(source.feature_at(0).unwrap().geometry.kind(), "Point");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            GeoJsonSource::from_geojson_str("not json"),
            Err(SpiderError::GeoJson(_))
        ));
    }
}
