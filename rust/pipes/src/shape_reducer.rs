// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reduce a simplified path to at most two axis-aligned segments
//!
//! A pipe run inside a wall is either straight or bends once. Anything more
//! complicated coming out of path simplification is noise, so the vertices
//! are forced into one of those two shapes.

use crate::config::ReconstructionConfig;
use crate::error::{ReconstructError, Result};
use crate::segment_fitter::cap_vertices;
use crate::types::{mean, range, Segment};
use inwall_core::Point2D;

/// Shape the reducer settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// One segment
    Straight,
    /// Two segments meeting at a right angle
    SingleBend,
    /// The elbow path bent more than once and was collapsed to a single bend
    ZigZag,
    /// All vertices coincide; nothing to emit
    Point,
}

#[derive(Debug, Clone)]
pub struct ReducedShape {
    pub kind: ShapeKind,
    pub segments: Vec<Segment>,
}

/// Signed step direction along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Left,
    Right,
    Down,
    Up,
}

fn step(a: &Point2D, b: &Point2D) -> Option<Step> {
    if a.y == b.y && b.x > a.x {
        Some(Step::Right)
    } else if a.y == b.y && b.x < a.x {
        Some(Step::Left)
    } else if a.x == b.x && b.y > a.y {
        Some(Step::Up)
    } else if a.x == b.x && b.y < a.y {
        Some(Step::Down)
    } else {
        None
    }
}

/// Right-angle path through the vertices, X first at every step
fn l_path(points: &[Point2D]) -> Vec<Point2D> {
    let mut path = vec![points[0]];
    for next in &points[1..] {
        let prev = path[path.len() - 1];
        if next.x != prev.x {
            path.push(Point2D::new(next.x, prev.y));
        }
        if next.y != prev.y {
            path.push(*next);
        }
    }
    path
}

/// Drop interior vertices where the path keeps stepping the same way
fn drop_collinear(path: Vec<Point2D>) -> Vec<Point2D> {
    let mut out: Vec<Point2D> = Vec::with_capacity(path.len());
    for p in path {
        if out.len() >= 2 {
            let n = out.len();
            if step(&out[n - 2], &out[n - 1]) == step(&out[n - 1], &p) {
                out[n - 1] = p;
                continue;
            }
        }
        out.push(p);
    }
    out
}

fn segments_along(path: &[Point2D], z: f64) -> Vec<Segment> {
    path.windows(2)
        .filter_map(|w| Segment::between(w[0], w[1], z))
        .collect()
}

/// Collapse A..C to one bend, taking the corner nearer the middle vertex
fn collapse_to_bend(first: Point2D, middle: Point2D, last: Point2D) -> Vec<Point2D> {
    let x_first = Point2D::new(last.x, first.y);
    let y_first = Point2D::new(first.x, last.y);
    let corner = if x_first.distance_to(&middle) <= y_first.distance_to(&middle) {
        x_first
    } else {
        y_first
    };

    let mut path = vec![first];
    if corner != first && corner != last {
        path.push(corner);
    }
    if last != first {
        path.push(last);
    }
    path
}

/// Reduce up to three path vertices to a straight run or a single bend at
/// depth `z`. More than three vertices are capped to start, middle and end.
pub fn reduce_shape(
    points: &[Point2D],
    z: f64,
    config: &ReconstructionConfig,
) -> Result<ReducedShape> {
    if points.len() < 2 {
        return Err(ReconstructError::InsufficientData {
            needed: 2,
            got: points.len(),
        });
    }
    let points = cap_vertices(points);

    let x_range = range(points.iter().map(|p| p.x));
    let y_range = range(points.iter().map(|p| p.y));

    // Flat in one axis and long in the other
    if y_range < config.straight_spread_max && x_range > config.straight_span_min {
        let y = mean(points.iter().map(|p| p.y));
        let (x1, x2) = extent(points.iter().map(|p| p.x));
        return Ok(ReducedShape {
            kind: ShapeKind::Straight,
            segments: vec![Segment::horizontal(x1, x2, y, z)],
        });
    }
    if x_range < config.straight_spread_max && y_range > config.straight_span_min {
        let x = mean(points.iter().map(|p| p.x));
        let (y1, y2) = extent(points.iter().map(|p| p.y));
        return Ok(ReducedShape {
            kind: ShapeKind::Straight,
            segments: vec![Segment::vertical(x, y1, y2, z)],
        });
    }

    let path = drop_collinear(l_path(&points));
    let (kind, path) = match path.len() {
        0 | 1 => (ShapeKind::Point, path),
        2 => (ShapeKind::Straight, path),
        3 => (ShapeKind::SingleBend, path),
        _ => {
            let first = points[0];
            let last = points[points.len() - 1];
            let middle = if points.len() == 3 { points[1] } else { first };
            (ShapeKind::ZigZag, collapse_to_bend(first, middle, last))
        }
    };

    let segments = segments_along(&path, z);
    tracing::trace!(?kind, segments = segments.len(), "Reduced path shape");

    Ok(ReducedShape { kind, segments })
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    fn config() -> ReconstructionConfig {
        ReconstructionConfig::default()
    }

    #[test]
    fn test_too_few_points() {
        let err = reduce_shape(&[p(0.0, 0.0)], 1.0, &config()).unwrap_err();
        assert!(matches!(
            err,
            ReconstructError::InsufficientData { needed: 2, got: 1 }
        ));
        assert!(reduce_shape(&[], 1.0, &config()).is_err());
    }

    #[test]
    fn test_flat_horizontal() {
        let shape = reduce_shape(&[p(0.0, 50.2), p(50.0, 49.8), p(100.0, 50.0)], 6.0, &config())
            .unwrap();
        assert_eq!(shape.kind, ShapeKind::Straight);
        assert_eq!(shape.segments.len(), 1);

        let seg = shape.segments[0];
        assert!(!seg.is_vertical);
        assert_relative_eq!(seg.start.x, 0.0);
        assert_relative_eq!(seg.end.x, 100.0);
        assert_relative_eq!(seg.start.y, 50.0, epsilon = 1e-9);
        assert_relative_eq!(seg.start.z, 6.0);
    }

    #[test]
    fn test_flat_vertical() {
        let shape = reduce_shape(&[p(20.0, 0.0), p(20.5, 40.0)], 3.0, &config()).unwrap();
        assert_eq!(shape.kind, ShapeKind::Straight);
        assert!(shape.segments[0].is_vertical);
        assert_relative_eq!(shape.segments[0].start.x, 20.25);
    }

    #[test]
    fn test_single_bend() {
        let shape =
            reduce_shape(&[p(0.0, 50.0), p(60.0, 50.0), p(60.0, 100.0)], 6.0, &config()).unwrap();
        assert_eq!(shape.kind, ShapeKind::SingleBend);
        assert_eq!(shape.segments.len(), 2);

        let (h, v) = (shape.segments[0], shape.segments[1]);
        assert!(!h.is_vertical);
        assert!(v.is_vertical);
        assert_eq!(h.end, v.start);
        assert_relative_eq!(h.end.x, 60.0);
        assert_relative_eq!(h.end.y, 50.0);
    }

    #[test]
    fn test_slanted_pair_bends_once() {
        let shape = reduce_shape(&[p(0.0, 0.0), p(30.0, 20.0)], 1.0, &config()).unwrap();
        assert_eq!(shape.kind, ShapeKind::SingleBend);
        assert_eq!(shape.segments.len(), 2);
    }

    #[test]
    fn test_zigzag_collapses_to_two_segments() {
        // Staircase A -> B -> C bends three times on the L path
        let shape =
            reduce_shape(&[p(0.0, 0.0), p(20.0, 20.0), p(40.0, 40.0)], 1.0, &config()).unwrap();
        assert_eq!(shape.kind, ShapeKind::ZigZag);
        assert!(shape.segments.len() <= 2);
        assert!(shape.segments.iter().all(|s| s.is_well_formed()));

        let first = shape.segments[0];
        let last = shape.segments[shape.segments.len() - 1];
        assert_eq!(first.start.xy(), p(0.0, 0.0));
        assert_eq!(last.end.xy(), p(40.0, 40.0));
    }

    #[test]
    fn test_reversal_is_not_merged_away() {
        let shape =
            reduce_shape(&[p(0.0, 0.0), p(40.0, 10.0), p(10.0, 20.0)], 1.0, &config()).unwrap();
        assert!(shape.segments.len() <= 2);
        assert!(shape.segments.iter().all(|s| s.is_well_formed()));
    }

    #[test]
    fn test_coincident_points() {
        let shape = reduce_shape(&[p(5.0, 5.0), p(5.0, 5.0)], 1.0, &config()).unwrap();
        assert_eq!(shape.kind, ShapeKind::Point);
        assert!(shape.segments.is_empty());
    }
}
