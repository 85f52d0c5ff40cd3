//! Geographic dataset loading
//!
//! Reads a GeoJSON `FeatureCollection` (the Natural Earth admin-0 export)
//! into records carrying a name, continent tag, polygon rings and a
//! bounding box.

use atlas_core::{AtlasError, BoundingBox, Result};
use serde_json::Value;
use std::path::Path;

/// One closed ring of `[lon, lat]` positions
pub type Ring = Vec<[f64; 2]>;

/// An outer ring followed by any holes
pub type Polygon = Vec<Ring>;

/// A single country feature
#[derive(Debug, Clone)]
pub struct GeoRecord {
    pub name: String,
    pub continent: String,
    pub polygons: Vec<Polygon>,
    /// `None` when the feature has no usable geometry
    pub bbox: Option<BoundingBox>,
}

impl GeoRecord {
    pub fn new(name: &str, continent: &str, polygons: Vec<Polygon>) -> Self {
        let bbox = BoundingBox::from_points(polygons.iter().flatten().flatten());
        Self {
            name: name.to_string(),
            continent: continent.to_string(),
            polygons,
            bbox,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeoDataset {
    records: Vec<GeoRecord>,
}

impl GeoDataset {
    pub fn new(records: Vec<GeoRecord>) -> Self {
        Self { records }
    }

    /// Load a GeoJSON file. A missing file is fatal for the run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AtlasError::DatasetMissing(path.to_path_buf()));
        }
        let is_shapefile = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("shp"));
        if is_shapefile {
            return Err(AtlasError::Dataset(format!(
                "{}: shapefiles are not read directly; export to GeoJSON first \
                 (e.g. `ogr2ogr -f GeoJSON countries.geojson {}`)",
                path.display(),
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&content)
            .map_err(|e| AtlasError::Dataset(format!("{}: {}", path.display(), e)))
    }

    /// Parse a GeoJSON `FeatureCollection`
    pub fn from_geojson_str(s: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(s)?;
        let features = root
            .get("features")
            .and_then(|f| f.as_array())
            .ok_or_else(|| AtlasError::Dataset("missing 'features' array".to_string()))?;

        let mut records = Vec::with_capacity(features.len());
        for feature in features {
            let props = feature.get("properties");
            let name = property(props, "NAME");
            let Some(name) = name else {
                continue;
            };
            let continent = property(props, "CONTINENT").unwrap_or_default();
            let polygons = match feature.get("geometry") {
                Some(geometry) if !geometry.is_null() => match parse_geometry(geometry) {
                    Ok(polygons) => polygons,
                    Err(e) => {
                        tracing::warn!(feature = %name, error = %e, "skipping malformed feature");
                        continue;
                    }
                },
                _ => Vec::new(),
            };
            records.push(GeoRecord::new(&name, &continent, polygons));
        }

        Ok(Self { records })
    }

    /// Records whose continent tag equals `continent`
    pub fn filter_continent(&self, continent: &str) -> GeoDataset {
        GeoDataset {
            records: self
                .records
                .iter()
                .filter(|r| r.continent == continent)
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&GeoRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn records(&self) -> &[GeoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read a string property, accepting the upper-case Natural Earth key or
/// its lower-case form.
fn property(props: Option<&Value>, key: &str) -> Option<String> {
    let props = props?;
    props
        .get(key)
        .or_else(|| props.get(key.to_lowercase()))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn parse_geometry(geometry: &Value) -> Result<Vec<Polygon>> {
    let kind = geometry.get("type").and_then(|t| t.as_str()).unwrap_or("");
    let coords = geometry.get("coordinates");
    match (kind, coords) {
        ("Polygon", Some(c)) => Ok(vec![parse_polygon(c)?]),
        ("MultiPolygon", Some(c)) => c
            .as_array()
            .ok_or_else(|| AtlasError::Dataset("MultiPolygon coordinates not an array".to_string()))?
            .iter()
            .map(parse_polygon)
            .collect(),
        ("GeometryCollection", _) => {
            let mut out = Vec::new();
            if let Some(parts) = geometry.get("geometries").and_then(|g| g.as_array()) {
                for part in parts {
                    out.extend(parse_geometry(part)?);
                }
            }
            Ok(out)
        }
        // Points and lines carry no area to highlight
        _ => Ok(Vec::new()),
    }
}

fn parse_polygon(value: &Value) -> Result<Polygon> {
    let rings = value
        .as_array()
        .ok_or_else(|| AtlasError::Dataset("Polygon coordinates not an array".to_string()))?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Result<Ring> {
    let positions = value
        .as_array()
        .ok_or_else(|| AtlasError::Dataset("Ring is not an array".to_string()))?;
    positions
        .iter()
        .map(|pos| {
            let x = pos.get(0).and_then(|v| v.as_f64());
            let y = pos.get(1).and_then(|v| v.as_f64());
            match (x, y) {
                (Some(x), Some(y)) => Ok([x, y]),
                _ => Err(AtlasError::Dataset(format!("Invalid position: {}", pos))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "NAME": "Belgium", "CONTINENT": "Europe" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.5, 49.5], [6.4, 49.5], [6.4, 51.5], [2.5, 51.5], [2.5, 49.5]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Greece", "CONTINENT": "Europe" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20.0, 38.0], [26.0, 38.0], [26.0, 41.7], [20.0, 38.0]]],
                        [[[23.5, 34.9], [26.3, 34.9], [26.3, 35.6, 0.0], [23.5, 34.9]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Egypt", "CONTINENT": "Africa" },
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": { "CONTINENT": "Europe" },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let dataset = GeoDataset::from_geojson_str(SAMPLE).unwrap();
        // Nameless feature is skipped
        assert_eq!(dataset.len(), 3);

        let greece = dataset.get("Greece").unwrap();
        assert_eq!(greece.polygons.len(), 2);
        let bbox = greece.bbox.unwrap();
        assert_eq!(bbox.min_y, 34.9);
        assert_eq!(bbox.max_x, 26.3);

        assert!(dataset.get("Egypt").unwrap().bbox.is_none());
    }

    #[test]
    fn test_filter_continent() {
        let dataset = GeoDataset::from_geojson_str(SAMPLE).unwrap();
        let europe = dataset.filter_continent("Europe");
        assert_eq!(europe.len(), 2);
        assert!(europe.contains("Belgium"));
        assert!(!europe.contains("Egypt"));
    }

    #[test]
    fn test_missing_file_is_dataset_missing() {
        let path = std::env::temp_dir().join(format!("atlas_missing_{}.geojson", uuid::Uuid::new_v4()));
        let err = GeoDataset::load(&path).unwrap_err();
        assert!(matches!(err, AtlasError::DatasetMissing(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_feature_is_skipped() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "NAME": "Brokenland", "CONTINENT": "Europe" },
                    "geometry": { "type": "Polygon", "coordinates": [[["a", 1.0]]] }
                },
                {
                    "type": "Feature",
                    "properties": { "NAME": "Belgium", "CONTINENT": "Europe" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[2.5, 49.5], [6.4, 49.5], [6.4, 51.5], [2.5, 49.5]]]
                    }
                }
            ]
        }"#;
        let dataset = GeoDataset::from_geojson_str(json).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.contains("Belgium"));
        assert!(!dataset.contains("Brokenland"));
    }

    #[test]
    fn test_shapefile_input_names_the_export() {
        let dir = std::env::temp_dir().join(format!("atlas_dataset_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ne_110m_admin_0_countries.shp");
        std::fs::write(&path, b"\x00\x00\x27\x0a").unwrap();

        let err = GeoDataset::load(&path).unwrap_err();
        assert!(matches!(err, AtlasError::Dataset(_)));
        assert!(err.to_string().contains("GeoJSON"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_dataset() {
        assert!(GeoDataset::from_geojson_str("{\"type\": \"FeatureCollection\"}").is_err());
        assert!(GeoDataset::from_geojson_str("not json").is_err());
    }
}
