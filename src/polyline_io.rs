use std::fs;
use std::path::Path;

use clap::ValueEnum;
use error_stack::{bail, ensure, Report, Result, ResultExt};
use geojson::GeoJson;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;
use crate::geometry::Point;

/// Container formats a polyline can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum InputFormat {
    /// Esri JSON feature set, `features[].geometry.paths[]`
    #[serde(rename = "esri")]
    #[value(name = "esri")]
    EsriJson,
    /// GeoJSON LineString or MultiLineString
    #[serde(rename = "geojson")]
    #[value(name = "geojson")]
    GeoJson,
}

/// Which feature, and which path (or MultiLineString part) of it, to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSelector {
    pub feature: usize,
    pub path: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLine {
    pub points: Vec<Point>,
    pub format: InputFormat,
    /// Esri `spatialReference`, echoed back when writing Esri JSON.
    pub spatial_reference: Option<Value>,
}

/// Guess the container format of a parsed JSON document.
pub fn detect_format(doc: &Value) -> Option<InputFormat> {
    let has_paths = |geometry: &Value| geometry.get("paths").is_some();

    if has_paths(doc) {
        return Some(InputFormat::EsriJson);
    }
    if let Some(features) = doc.get("features").and_then(Value::as_array) {
        if features
            .iter()
            .filter_map(|f| f.get("geometry"))
            .any(has_paths)
        {
            return Some(InputFormat::EsriJson);
        }
    }
    if GeoJson::from_json_value(doc.clone()).is_ok() {
        return Some(InputFormat::GeoJson);
    }
    None
}

fn position_to_point(position: &Value, field: &str) -> Result<Point, LoadError> {
    let coords = position
        .as_array()
        .ok_or_else(|| Report::new(LoadError::MissingField(field.to_string())))?;
    match (
        coords.first().and_then(Value::as_f64),
        coords.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)),
        _ => bail!(LoadError::MissingField(field.to_string())),
    }
}

fn esri_polyline(doc: &Value, selector: LineSelector) -> Result<Vec<Point>, LoadError> {
    let (geometry, prefix) = if doc.get("paths").is_some() {
        (doc, String::new())
    } else {
        let field = format!("features[{}].geometry", selector.feature);
        let geometry = doc
            .get("features")
            .and_then(|f| f.get(selector.feature))
            .and_then(|f| f.get("geometry"))
            .ok_or_else(|| Report::new(LoadError::MissingField(field.clone())))?;
        (geometry, format!("{}.", field))
    };

    let field = format!("{}paths[{}]", prefix, selector.path);
    let path = geometry
        .get("paths")
        .and_then(|p| p.get(selector.path))
        .and_then(Value::as_array)
        .ok_or_else(|| Report::new(LoadError::MissingField(field.clone())))?;

    path.iter()
        .enumerate()
        .map(|(i, position)| position_to_point(position, &format!("{}[{}]", field, i)))
        .collect()
}

fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn geojson_polyline(doc: Value, selector: LineSelector) -> Result<Vec<Point>, LoadError> {
    let geojson = GeoJson::from_json_value(doc).change_context(LoadError::UnknownFormat)?;

    let geometry = match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .nth(selector.feature)
            .and_then(|f| f.geometry)
            .ok_or_else(|| {
                Report::new(LoadError::MissingField(format!(
                    "features[{}].geometry",
                    selector.feature
                )))
            })?,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| Report::new(LoadError::MissingField("geometry".to_string())))?,
        GeoJson::Geometry(geometry) => geometry,
    };

    let positions = match geometry.value {
        geojson::Value::LineString(positions) => {
            ensure!(
                selector.path == 0,
                LoadError::MissingField(format!("coordinates part {}", selector.path))
            );
            positions
        }
        geojson::Value::MultiLineString(parts) => {
            parts.into_iter().nth(selector.path).ok_or_else(|| {
                Report::new(LoadError::MissingField(format!("coordinates[{}]", selector.path)))
            })?
        }
        other => bail!(LoadError::UnsupportedGeometry(geometry_kind(&other).to_string())),
    };

    positions
        .iter()
        .enumerate()
        .map(|(i, position)| match position.as_slice() {
            [x, y, ..] => Ok(Point::new(*x, *y)),
            _ => bail!(LoadError::MissingField(format!("coordinates[{}]", i))),
        })
        .collect()
}

/// Parse a polyline from JSON text.
///
/// `format` overrides detection. Reading also checks that the line is usable
/// by the simplifier: at least two points with finite coordinates.
pub fn parse_polyline(
    text: &str,
    format: Option<InputFormat>,
    selector: LineSelector,
) -> Result<LoadedLine, LoadError> {
    let doc: Value = serde_json::from_str(text).change_context(LoadError::Json)?;

    let format = match format {
        Some(format) => format,
        None => detect_format(&doc).ok_or_else(|| Report::new(LoadError::UnknownFormat))?,
    };
    debug!("reading {:?} polyline {:?}", format, selector);

    let (points, spatial_reference) = match format {
        InputFormat::EsriJson => {
            let spatial_reference = doc
                .get("spatialReference")
                .or_else(|| {
                    doc.get("features")
                        .and_then(|f| f.get(selector.feature))
                        .and_then(|f| f.get("geometry"))
                        .and_then(|g| g.get("spatialReference"))
                })
                .cloned();
            (esri_polyline(&doc, selector)?, spatial_reference)
        }
        InputFormat::GeoJson => (geojson_polyline(doc, selector)?, None),
    };

    ensure!(points.len() >= 2, LoadError::InvalidPolyline);
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(Report::new(LoadError::InvalidPolyline)
            .attach_printable(format!("point {} has a non-finite coordinate", i)));
    }

    Ok(LoadedLine {
        points,
        format,
        spatial_reference,
    })
}

/// Read a polyline from a JSON file.
pub fn read_polyline<P: AsRef<Path>>(
    path: P,
    format: Option<InputFormat>,
    selector: LineSelector,
) -> Result<LoadedLine, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .change_context(LoadError::Io)
        .attach_printable_lazy(|| format!("file: {}", path.display()))?;

    let line = parse_polyline(&text, format, selector)
        .attach_printable_lazy(|| format!("file: {}", path.display()))?;

    info!("read {} points from {}", line.points.len(), path.display());
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESRI_SAMPLE: &str = r#"{
        "displayFieldName": "",
        "geometryType": "esriGeometryPolyline",
        "spatialReference": {"wkid": 32611, "latestWkid": 32611},
        "fields": [],
        "features": [
            {
                "attributes": {"OBJECTID": 1},
                "geometry": {
                    "paths": [
                        [[500000.0, 4100000.0], [500100.0, 4100050.0, 12.5], [500200.0, 4100000.0]],
                        [[0.0, 0.0], [1.0, 1.0]]
                    ]
                }
            }
        ]
    }"#;

    const GEOJSON_SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1], [2, 0]]}
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[5, 5], [6, 6]], [[7, 7], [8, 8], [9, 7]]]
                }
            }
        ]
    }"#;

    #[test]
    fn test_detect_format() {
        let esri: Value = serde_json::from_str(ESRI_SAMPLE).unwrap();
        assert_eq!(detect_format(&esri), Some(InputFormat::EsriJson));

        let geo: Value = serde_json::from_str(GEOJSON_SAMPLE).unwrap();
        assert_eq!(detect_format(&geo), Some(InputFormat::GeoJson));

        let other: Value = serde_json::from_str(r#"{"rows": []}"#).unwrap();
        assert_eq!(detect_format(&other), None);
    }

    #[test]
    fn test_parse_esri_first_path() {
        let line = parse_polyline(ESRI_SAMPLE, None, LineSelector::default()).unwrap();
        assert_eq!(line.format, InputFormat::EsriJson);
        assert_eq!(
            line.points,
            vec![
                Point::new(500000.0, 4100000.0),
                Point::new(500100.0, 4100050.0),
                Point::new(500200.0, 4100000.0),
            ]
        );
        assert_eq!(line.spatial_reference.unwrap()["wkid"], 32611);
    }

    #[test]
    fn test_parse_esri_second_path() {
        let selector = LineSelector { feature: 0, path: 1 };
        let line = parse_polyline(ESRI_SAMPLE, None, selector).unwrap();
        assert_eq!(line.points, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_parse_esri_bare_geometry() {
        let text = r#"{"paths": [[[1, 2], [3, 4]]], "spatialReference": {"wkid": 4326}}"#;
        let line = parse_polyline(text, None, LineSelector::default()).unwrap();
        assert_eq!(line.points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        assert!(line.spatial_reference.is_some());
    }

    #[test]
    fn test_parse_esri_missing_feature() {
        let selector = LineSelector { feature: 3, path: 0 };
        let err = parse_polyline(ESRI_SAMPLE, None, selector).unwrap_err();
        match err.current_context() {
            LoadError::MissingField(field) => assert_eq!(field, "features[3].geometry"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_esri_bad_coordinate() {
        let text = r#"{"features": [{"geometry": {"paths": [[[0, 0], ["a", 1]]]}}]}"#;
        let err = parse_polyline(text, None, LineSelector::default()).unwrap_err();
        match err.current_context() {
            LoadError::MissingField(field) => {
                assert_eq!(field, "features[0].geometry.paths[0][1]")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_geojson_linestring() {
        let line = parse_polyline(GEOJSON_SAMPLE, None, LineSelector::default()).unwrap();
        assert_eq!(line.format, InputFormat::GeoJson);
        assert_eq!(line.points.len(), 3);
        assert_eq!(line.points[1], Point::new(1.0, 1.0));
        assert!(line.spatial_reference.is_none());
    }

    #[test]
    fn test_parse_geojson_multilinestring_part() {
        let selector = LineSelector { feature: 1, path: 1 };
        let line = parse_polyline(GEOJSON_SAMPLE, None, selector).unwrap();
        assert_eq!(
            line.points,
            vec![Point::new(7.0, 7.0), Point::new(8.0, 8.0), Point::new(9.0, 7.0)]
        );
    }

    #[test]
    fn test_parse_geojson_rejects_polygon() {
        let text = r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}"#;
        let err = parse_polyline(text, None, LineSelector::default()).unwrap_err();
        assert!(matches!(
            err.current_context(),
            LoadError::UnsupportedGeometry(_)
        ));
    }

    #[test]
    fn test_parse_rejects_single_point() {
        let text = r#"{"type": "LineString", "coordinates": [[0, 0]]}"#;
        let err = parse_polyline(text, None, LineSelector::default()).unwrap_err();
        assert!(matches!(err.current_context(), LoadError::InvalidPolyline));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_polyline("{not json", None, LineSelector::default()).unwrap_err();
        assert!(matches!(err.current_context(), LoadError::Json));
    }

    #[test]
    fn test_read_polyline_missing_file() {
        let path = std::env::temp_dir().join("linesimp_does_not_exist.json");
        let err = read_polyline(&path, None, LineSelector::default()).unwrap_err();
        assert!(matches!(err.current_context(), LoadError::Io));
    }

    #[test]
    fn test_read_polyline_from_file() {
        let path = std::env::temp_dir().join("linesimp_read_sample_line.json");
        fs::write(&path, ESRI_SAMPLE).unwrap();
        let line = read_polyline(&path, Some(InputFormat::EsriJson), LineSelector::default())
            .unwrap();
        assert_eq!(line.points.len(), 3);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_sample_line_simplifies() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample_line.json");
        let line = read_polyline(&path, None, LineSelector::default()).unwrap();
        assert_eq!(line.format, InputFormat::EsriJson);
        assert_eq!(line.points.len(), 40);

        let simplified =
            crate::simplify(&line.points, crate::config::DEFAULT_EPSILON).unwrap();
        assert!(simplified.len() > 2 && simplified.len() < line.points.len());
        assert_eq!(simplified[0], line.points[0]);
        assert_eq!(simplified[simplified.len() - 1], line.points[39]);
    }
}
