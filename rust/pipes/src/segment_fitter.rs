// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Candidate segment fitting
//!
//! Two strategies turn a cluster into axis-aligned geometry:
//!
//! - **Axis binning** groups points sharing an approximate X (vertical
//!   candidates spanning the bin's Y range) and, independently, an
//!   approximate Y (horizontal candidates spanning the bin's X range).
//! - **Path simplification** orders the cluster along its dominant axis,
//!   converts each step into a right-angle elbow, merges runs that keep
//!   going the same way and caps the result at three vertices. The shape
//!   reducer turns those vertices into segments.

use crate::config::ReconstructionConfig;
use crate::types::{mean, Cluster, Segment};
use inwall_core::{Point2D, ScanPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, p: &ScanPoint) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// Sort points along `axis` and cut a new bin whenever a point is more than
/// `tolerance` past the first point of the current bin.
fn bin_along(points: &[ScanPoint], axis: Axis, tolerance: f64) -> Vec<Vec<ScanPoint>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| axis.of(a).total_cmp(&axis.of(b)));

    let mut bins: Vec<Vec<ScanPoint>> = Vec::new();
    let mut current: Vec<ScanPoint> = Vec::new();
    let mut bin_start = f64::NAN;

    for point in sorted {
        let value = axis.of(&point);
        if !current.is_empty() && (value - bin_start).abs() > tolerance {
            bins.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            bin_start = value;
        }
        current.push(point);
    }
    if !current.is_empty() {
        bins.push(current);
    }

    bins
}

/// Turn one bin into a segment running along the other axis, if long enough
fn bin_to_segment(bin: &[ScanPoint], binned_on: Axis, min_length: f64) -> Option<Segment> {
    if bin.len() < 2 {
        return None;
    }

    let run_axis = match binned_on {
        Axis::X => Axis::Y,
        Axis::Y => Axis::X,
    };
    let (lo, hi) = bin.iter().map(|p| run_axis.of(p)).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), v| (lo.min(v), hi.max(v)),
    );
    let span = hi - lo;
    if span <= 0.0 || span < min_length {
        return None;
    }

    let fixed = mean(bin.iter().map(|p| binned_on.of(p)));
    let z = mean(bin.iter().map(|p| p.z));

    Some(match binned_on {
        Axis::X => Segment::vertical(fixed, lo, hi, z),
        Axis::Y => Segment::horizontal(lo, hi, fixed, z),
    })
}

/// Axis-binning fit: vertical candidates first, then horizontal ones
pub fn fit_axis_bins(cluster: &Cluster, config: &ReconstructionConfig) -> Vec<Segment> {
    let verticals = bin_along(&cluster.points, Axis::X, config.x_tolerance)
        .into_iter()
        .filter_map(|bin| bin_to_segment(&bin, Axis::X, config.min_segment_length));
    let horizontals = bin_along(&cluster.points, Axis::Y, config.y_tolerance)
        .into_iter()
        .filter_map(|bin| bin_to_segment(&bin, Axis::Y, config.min_segment_length));

    verticals.chain(horizontals).collect()
}

// ─── Path Simplification ────────────────────────────────────────────────────

/// Signed axis direction of one path step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Heading {
    Horizontal,
    Vertical,
}

/// Dominant direction from `a` to `b`; `None` when neither axis dominates
pub(crate) fn heading(a: &Point2D, b: &Point2D) -> Option<Heading> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    if dx > dy {
        Some(Heading::Horizontal)
    } else if dy > dx {
        Some(Heading::Vertical)
    } else {
        None
    }
}

/// Order cluster points along the dominant axis: left to right when wider
/// than tall, otherwise top to bottom.
pub fn order_path(cluster: &Cluster) -> Vec<Point2D> {
    let mut points: Vec<Point2D> = cluster.points.iter().map(|p| p.xy()).collect();
    if cluster.x_range() > cluster.y_range() {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
    } else {
        points.sort_by(|a, b| b.y.total_cmp(&a.y));
    }
    points
}

/// Replace every step with a right-angle elbow: first along X, then along Y
pub fn elbow_path(points: &[Point2D]) -> Vec<Point2D> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut path = vec![first];
    for curr in &points[1..] {
        let prev = path[path.len() - 1];
        if curr.x != prev.x {
            path.push(Point2D::new(curr.x, prev.y));
        }
        if curr.y != prev.y {
            path.push(*curr);
        }
    }
    path
}

/// Collapse consecutive steps heading the same way into one
pub fn merge_runs(path: &[Point2D]) -> Vec<Point2D> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut merged = vec![path[0]];
    let mut prev_heading = heading(&path[0], &path[1]);
    for i in 1..path.len() - 1 {
        let curr_heading = heading(&path[i], &path[i + 1]);
        if curr_heading != prev_heading {
            merged.push(path[i]);
            prev_heading = curr_heading;
        }
    }
    merged.push(path[path.len() - 1]);
    merged
}

/// Keep at most start, middle and end
pub fn cap_vertices(path: &[Point2D]) -> Vec<Point2D> {
    if path.len() <= 3 {
        return path.to_vec();
    }
    vec![path[0], path[path.len() / 2], path[path.len() - 1]]
}

/// Full path-simplification fit: at most three representative vertices
pub fn simplify_path(cluster: &Cluster) -> Vec<Point2D> {
    let ordered = order_path(cluster);
    let elbows = elbow_path(&ordered);
    let merged = merge_runs(&elbows);
    cap_vertices(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hit(x: f64, y: f64) -> ScanPoint {
        ScanPoint::hit(x, y, 6.0, 1.0)
    }

    #[test]
    fn test_bins_anchor_on_first_value() {
        let points = vec![hit(0.0, 0.0), hit(3.0, 0.0), hit(4.5, 0.0), hit(7.0, 0.0)];
        let bins = bin_along(&points, Axis::X, 4.0);
        // 4.5 is more than 4 past the bin start at 0, even though it is
        // close to 3.0
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].len(), 2);
        assert_eq!(bins[1].len(), 2);
    }

    #[test]
    fn test_horizontal_line_fit() {
        let points: Vec<ScanPoint> = (0..=50)
            .map(|i| hit(i as f64 * 2.0, if i % 2 == 0 { 49.5 } else { 50.5 }))
            .collect();
        let cluster = Cluster::new(points);

        let segments = fit_axis_bins(&cluster, &ReconstructionConfig::default());
        assert_eq!(segments.len(), 1);

        let seg = segments[0];
        assert!(!seg.is_vertical);
        assert_relative_eq!(seg.start.x, 0.0);
        assert_relative_eq!(seg.end.x, 100.0);
        assert_relative_eq!(seg.start.y, 50.0, epsilon = 0.05);
        assert_relative_eq!(seg.start.z, 6.0);
    }

    #[test]
    fn test_short_and_single_bins_dropped() {
        let cluster = Cluster::new(vec![hit(0.0, 0.0)]);
        assert!(fit_axis_bins(&cluster, &ReconstructionConfig::default()).is_empty());

        let cluster = Cluster::new(vec![hit(0.0, 0.0), hit(3.0, 0.0)]);
        assert!(fit_axis_bins(&cluster, &ReconstructionConfig::default()).is_empty());
    }

    #[test]
    fn test_vertical_z_is_bin_mean() {
        let cluster = Cluster::new(vec![
            ScanPoint::hit(10.0, 0.0, 5.0, 1.0),
            ScanPoint::hit(10.5, 10.0, 7.0, 1.0),
            ScanPoint::hit(9.5, 20.0, 6.0, 1.0),
        ]);
        let segments = fit_axis_bins(&cluster, &ReconstructionConfig::default());
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_vertical);
        assert_relative_eq!(segments[0].start.x, 10.0);
        assert_relative_eq!(segments[0].start.z, 6.0);
        assert_relative_eq!(segments[0].end.y, 20.0);
    }

    #[test]
    fn test_elbow_path() {
        let path = elbow_path(&[Point2D::new(0.0, 0.0), Point2D::new(2.0, 1.0)]);
        assert_eq!(
            path,
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(2.0, 0.0),
                Point2D::new(2.0, 1.0)
            ]
        );
        assert!(elbow_path(&[]).is_empty());
    }

    #[test]
    fn test_simplify_l_shape() {
        let mut points: Vec<ScanPoint> = (0..=30).map(|i| hit(i as f64 * 2.0, 50.0)).collect();
        points.extend((1..=25).map(|i| hit(60.0, 50.0 + i as f64 * 2.0)));
        let cluster = Cluster::new(points);

        let path = simplify_path(&cluster);
        assert_eq!(
            path,
            vec![
                Point2D::new(0.0, 50.0),
                Point2D::new(60.0, 50.0),
                Point2D::new(60.0, 100.0)
            ]
        );
    }

    #[test]
    fn test_cap_vertices() {
        let path: Vec<Point2D> = (0..7).map(|i| Point2D::new(i as f64, 0.0)).collect();
        let capped = cap_vertices(&path);
        assert_eq!(capped.len(), 3);
        assert_eq!(capped[1], Point2D::new(3.0, 0.0));
    }

    #[test]
    fn test_tall_cluster_orders_top_down() {
        let cluster = Cluster::new(vec![hit(0.0, 0.0), hit(0.5, 30.0), hit(0.2, 10.0)]);
        let ordered = order_path(&cluster);
        assert_eq!(ordered[0].y, 30.0);
        assert_eq!(ordered[2].y, 0.0);
    }
}
