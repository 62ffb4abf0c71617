// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for scan points and point clouds

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// A 2D point in the wall plane (centimetres)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        nalgebra::distance(&self.to_nalgebra(), &other.to_nalgebra())
    }
}

/// A 3D position: X/Y span the wall surface, Z is depth into the wall
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_nalgebra(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Projection onto the wall plane
    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// One scan sample.
///
/// `hit == false` marks an empty scan cell: it is excluded from fitting
/// but still counts towards the wall extent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScanPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub hit: bool,
    /// Reflection amplitude reported with a hit (carried, never interpreted)
    pub amplitude: Option<f64>,
}

impl ScanPoint {
    pub fn hit(x: f64, y: f64, z: f64, amplitude: f64) -> Self {
        Self {
            x,
            y,
            z,
            hit: true,
            amplitude: Some(amplitude),
        }
    }

    pub fn miss(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            hit: false,
            amplitude: None,
        }
    }

    pub fn position(&self) -> Point3D {
        Point3D::new(self.x, self.y, self.z)
    }

    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Ordered collection of scan samples (insertion order = scan order)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<ScanPoint>,
    /// Offset added to every Y once normalisation has run
    y_offset: Option<f64>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<ScanPoint>) -> Self {
        Self {
            points,
            y_offset: None,
        }
    }

    pub fn push(&mut self, point: ScanPoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ScanPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanPoint> {
        self.points.iter()
    }

    pub fn hits(&self) -> impl Iterator<Item = &ScanPoint> {
        self.points.iter().filter(|p| p.hit)
    }

    pub fn misses(&self) -> impl Iterator<Item = &ScanPoint> {
        self.points.iter().filter(|p| !p.hit)
    }

    pub fn hit_count(&self) -> usize {
        self.hits().count()
    }

    pub fn miss_count(&self) -> usize {
        self.misses().count()
    }

    /// Offset applied by [`PointCloud::normalize_y`], if it has run
    pub fn y_offset(&self) -> Option<f64> {
        self.y_offset
    }

    /// Shift every Y so that no coordinate is negative.
    ///
    /// The minimum is taken over hits AND misses. When it is negative the
    /// whole cloud moves up so the minimum lands exactly on zero; otherwise
    /// nothing moves. Runs at most once per cloud: later calls return the
    /// offset recorded by the first one.
    pub fn normalize_y(&mut self) -> f64 {
        if let Some(offset) = self.y_offset {
            return offset;
        }

        let min_y = self
            .points
            .iter()
            .map(|p| p.y)
            .fold(f64::INFINITY, f64::min);

        let offset = if min_y.is_finite() && min_y < 0.0 {
            -min_y
        } else {
            0.0
        };

        if offset != 0.0 {
            for point in &mut self.points {
                point.y += offset;
            }
            tracing::debug!(offset, "Normalized Y coordinates");
        }

        self.y_offset = Some(offset);
        offset
    }
}

impl FromIterator<ScanPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = ScanPoint>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point2d_nalgebra_conversion() {
        let p = Point2D::new(3.0, -4.0);
        let back = Point2D::from_nalgebra(&p.to_nalgebra());
        assert_eq!(back, p);
        assert_relative_eq!(p.distance_to(&Point2D::new(0.0, 0.0)), 5.0);
    }

    #[test]
    fn test_normalize_uses_misses() {
        let mut cloud = PointCloud::from_points(vec![
            ScanPoint::hit(1.0, -2.0, 5.0, 0.3),
            ScanPoint::miss(2.0, -6.0, 0.0),
            ScanPoint::hit(3.0, 4.0, 5.0, 0.3),
        ]);

        let offset = cloud.normalize_y();
        assert_relative_eq!(offset, 6.0);

        let ys: Vec<f64> = cloud.iter().map(|p| p.y).collect();
        assert_relative_eq!(ys[0], 4.0);
        assert_relative_eq!(ys[1], 0.0);
        assert_relative_eq!(ys[2], 10.0);
    }

    #[test]
    fn test_normalize_runs_once() {
        let mut cloud = PointCloud::from_points(vec![ScanPoint::hit(0.0, -3.0, 5.0, 1.0)]);

        assert_relative_eq!(cloud.normalize_y(), 3.0);
        assert_relative_eq!(cloud.normalize_y(), 3.0);
        assert_relative_eq!(cloud.points()[0].y, 0.0);
    }

    #[test]
    fn test_normalize_leaves_positive_cloud() {
        let mut cloud = PointCloud::from_points(vec![
            ScanPoint::hit(0.0, 10.0, 5.0, 1.0),
            ScanPoint::miss(0.0, 12.0, 0.0),
        ]);

        assert_eq!(cloud.normalize_y(), 0.0);
        assert_relative_eq!(cloud.points()[0].y, 10.0);
    }

    #[test]
    fn test_hit_miss_partition() {
        let cloud: PointCloud = vec![
            ScanPoint::hit(0.0, 0.0, 5.0, 1.0),
            ScanPoint::miss(1.0, 0.0, 0.0),
            ScanPoint::miss(2.0, 0.0, 0.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(cloud.hit_count(), 1);
        assert_eq!(cloud.miss_count(), 2);
        assert_eq!(cloud.len(), 3);
    }

    #[test]
    fn test_point_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }
}
