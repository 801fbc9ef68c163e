use std::collections::HashSet;

use error_stack::{bail, ensure, Result};
use log::debug;

use crate::error::SimplifyError;
use crate::geometry::{distance, perpendicular_height, triangle_area, Point};
use crate::utils::{argmax, coordinate_key};

/// Deviation of every interior point of `points` from the chord joining its
/// first and last point.
///
/// When the chord has zero length the height over it is undefined, and the
/// plain distance to the start point is used instead.
fn interior_deviations(points: &[Point]) -> Vec<f64> {
    let start = &points[0];
    let end = &points[points.len() - 1];
    let base = distance(start, end);
    let interior = &points[1..points.len() - 1];

    if base == 0.0 {
        interior.iter().map(|p| distance(p, start)).collect()
    } else {
        interior
            .iter()
            .map(|p| perpendicular_height(base, triangle_area(start, p, end)))
            .collect()
    }
}

/// The point furthest from the chord of `points`, as `(index, deviation)`.
///
/// `None` when the segment has no interior points. The lowest index wins ties.
pub fn find_pivot(points: &[Point]) -> Option<(usize, f64)> {
    if points.len() < 3 {
        return None;
    }
    argmax(&interior_deviations(points)).map(|(i, d)| (i + 1, d))
}

/// Output of the simplifier, assembled one kept segment at a time.
///
/// The first segment is taken verbatim. Points of every later segment are
/// appended only when no equal point has been emitted yet.
struct MergedLine {
    points: Vec<Point>,
    seen: HashSet<(u64, u64)>,
}

impl MergedLine {
    fn with_capacity(n: usize) -> Self {
        MergedLine {
            points: Vec::with_capacity(n),
            seen: HashSet::with_capacity(n),
        }
    }

    fn push_segment(&mut self, start: Point, end: Point) {
        if self.points.is_empty() {
            self.points.push(start);
            self.points.push(end);
            self.seen.insert(coordinate_key(start.x, start.y));
            self.seen.insert(coordinate_key(end.x, end.y));
            return;
        }
        for p in [start, end] {
            if self.seen.insert(coordinate_key(p.x, p.y)) {
                self.points.push(p);
            }
        }
    }
}

fn validate(points: &[Point], epsilon: f64) -> Result<(), SimplifyError> {
    ensure!(points.len() >= 2, SimplifyError::TooFewPoints(points.len()));
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        bail!(SimplifyError::NonFiniteCoordinate(i));
    }
    ensure!(
        epsilon.is_finite() && epsilon >= 0.0,
        SimplifyError::InvalidEpsilon(epsilon)
    );
    Ok(())
}

/// Simplify a polyline with the Douglas-Peucker algorithm.
///
/// Segments whose furthest interior point lies more than `epsilon` from their
/// chord are split at that point; all others collapse to their two endpoints.
/// The first and last point are always kept and the input order is preserved.
///
/// The split is driven by an explicit stack of index ranges, left half first,
/// so arbitrarily long inputs do not deepen the call stack.
pub fn simplify(points: &[Point], epsilon: f64) -> Result<Vec<Point>, SimplifyError> {
    validate(points, epsilon)?;

    let mut merged = MergedLine::with_capacity(points.len());
    let mut stack: Vec<(usize, usize)> = vec![(0, points.len() - 1)];

    while let Some((start, end)) = stack.pop() {
        match find_pivot(&points[start..=end]) {
            Some((offset, max_deviation)) if max_deviation > epsilon => {
                let pivot = start + offset;
                stack.push((pivot, end));
                stack.push((start, pivot));
            }
            _ => merged.push_segment(points[start], points[end]),
        }
    }

    debug!(
        "douglas-peucker kept {} of {} points (epsilon {})",
        merged.points.len(),
        points.len(),
        epsilon
    );

    Ok(merged.points)
}
