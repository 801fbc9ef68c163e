use serde::{Deserialize, Serialize};

/// A planar coordinate pair. Equality is exact coordinate equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Position as written by GeoJSON and Esri JSON, `[x, y]`.
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.x, self.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

/// Euclidean distance between two points.
pub fn distance(p1: &Point, p2: &Point) -> f64 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

/// Area of the triangle `p1 p2 p3` by Heron's formula.
///
/// Near-collinear triples can round the radicand slightly below zero, so it is
/// clamped before the square root.
pub fn triangle_area(p1: &Point, p2: &Point, p3: &Point) -> f64 {
    let a = distance(p1, p2);
    let b = distance(p2, p3);
    let c = distance(p1, p3);

    let s = (a + b + c) / 2.0;
    let radicand = s * (s - a) * (s - b) * (s - c);
    radicand.max(0.0).sqrt()
}

/// Height of a triangle over `base` with the given `area`, i.e. the
/// perpendicular distance from the apex to the line through the base.
///
/// `base` must be non-zero; coincident chord endpoints are handled by the caller.
pub fn perpendicular_height(base: f64, area: f64) -> f64 {
    ((2.0 * area) / base).abs()
}
