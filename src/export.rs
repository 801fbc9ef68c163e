use std::fs::File;
use std::io::Write;
use std::path::Path;

use error_stack::{Result, ResultExt};
use geojson::{Feature, FeatureCollection, Geometry};
use geojson::Value::LineString;
use log::info;
use serde_json::{json, to_string_pretty, Value};

use crate::error::ExportError;
use crate::geometry::Point;

/// What a simplification run did, written alongside the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplifySummary {
    pub epsilon: f64,
    pub input_points: usize,
    pub output_points: usize,
}

impl SimplifySummary {
    pub fn new(epsilon: f64, input: &[Point], output: &[Point]) -> Self {
        SimplifySummary {
            epsilon,
            input_points: input.len(),
            output_points: output.len(),
        }
    }

    /// Fraction of input points removed.
    pub fn reduction(&self) -> f64 {
        if self.input_points == 0 {
            return 0.0;
        }
        1.0 - self.output_points as f64 / self.input_points as f64
    }
}

pub fn to_geojson_feature(points: &[Point], summary: &SimplifySummary) -> Feature {
    let coords = points.iter().map(Point::to_position).collect();
    let line_string = Geometry::new(LineString(coords));

    let mut properties = serde_json::Map::new();
    if let Some(number) = serde_json::Number::from_f64(summary.epsilon) {
        properties.insert(String::from("epsilon"), Value::Number(number));
    }
    properties.insert(
        String::from("input_points"),
        Value::Number(serde_json::Number::from(summary.input_points)),
    );
    properties.insert(
        String::from("output_points"),
        Value::Number(serde_json::Number::from(summary.output_points)),
    );

    Feature {
        bbox: None,
        geometry: Some(line_string),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn to_geojson(points: &[Point], summary: &SimplifySummary) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![to_geojson_feature(points, summary)],
        foreign_members: None,
    }
}

/// Esri JSON feature set holding one polyline feature.
pub fn to_esri_json(points: &[Point], spatial_reference: Option<&Value>) -> Value {
    let path: Vec<Vec<f64>> = points.iter().map(Point::to_position).collect();
    let mut doc = json!({
        "geometryType": "esriGeometryPolyline",
        "features": [
            {
                "attributes": {},
                "geometry": { "paths": [path] }
            }
        ]
    });
    if let Some(sr) = spatial_reference {
        doc["spatialReference"] = sr.clone();
    }
    doc
}

fn write_string(path: &Path, contents: &str) -> Result<(), ExportError> {
    let mut file = File::create(path)
        .change_context(ExportError)
        .attach_printable_lazy(|| format!("file: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .change_context(ExportError)
        .attach_printable_lazy(|| format!("file: {}", path.display()))?;
    Ok(())
}

pub fn write_geojson<P: AsRef<Path>>(
    path: P,
    points: &[Point],
    summary: &SimplifySummary,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let geojson_string = to_string_pretty(&to_geojson(points, summary)).change_context(ExportError)?;
    write_string(path, &geojson_string)?;
    info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

pub fn write_esri_json<P: AsRef<Path>>(
    path: P,
    points: &[Point],
    spatial_reference: Option<&Value>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let esri_string =
        to_string_pretty(&to_esri_json(points, spatial_reference)).change_context(ExportError)?;
    write_string(path, &esri_string)?;
    info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

/// Write the before/after vertices as a `series,index,x,y` table for plotting.
pub fn write_vertex_csv<P: AsRef<Path>>(
    path: P,
    input: &[Point],
    output: &[Point],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .change_context(ExportError)
        .attach_printable_lazy(|| format!("file: {}", path.display()))?;

    writer
        .write_record(["series", "index", "x", "y"])
        .change_context(ExportError)?;

    for (series, points) in [("input", input), ("output", output)] {
        for (i, p) in points.iter().enumerate() {
            writer
                .write_record([
                    series.to_string(),
                    i.to_string(),
                    p.x.to_string(),
                    p.y.to_string(),
                ])
                .change_context(ExportError)?;
        }
    }

    writer.flush().change_context(ExportError)?;
    Ok(())
}
