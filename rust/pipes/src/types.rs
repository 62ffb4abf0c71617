// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for pipe reconstruction

use inwall_core::{Point2D, Point3D, ScanPoint, WallBoundingBox};
use serde::{Deserialize, Serialize};

/// Which end of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    pub const BOTH: [Endpoint; 2] = [Endpoint::Start, Endpoint::End];
}

/// One straight, axis-aligned pipe run.
///
/// A vertical segment keeps X constant and runs along Y; a horizontal one
/// keeps Y constant and runs along X. Both ends share the run's depth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: Point3D,
    pub end: Point3D,
    pub is_vertical: bool,
}

impl Segment {
    pub fn horizontal(x1: f64, x2: f64, y: f64, z: f64) -> Self {
        Self {
            start: Point3D::new(x1, y, z),
            end: Point3D::new(x2, y, z),
            is_vertical: false,
        }
    }

    pub fn vertical(x: f64, y1: f64, y2: f64, z: f64) -> Self {
        Self {
            start: Point3D::new(x, y1, z),
            end: Point3D::new(x, y2, z),
            is_vertical: true,
        }
    }

    /// Build a segment between two wall-plane points at depth `z`.
    ///
    /// Returns `None` when the points coincide or do not share an axis.
    pub fn between(a: Point2D, b: Point2D, z: f64) -> Option<Self> {
        if a.x == b.x && a.y != b.y {
            Some(Self::vertical(a.x, a.y, b.y, z))
        } else if a.y == b.y && a.x != b.x {
            Some(Self::horizontal(a.x, b.x, a.y, z))
        } else {
            None
        }
    }

    pub fn point(&self, which: Endpoint) -> Point3D {
        match which {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn point_mut(&mut self, which: Endpoint) -> &mut Point3D {
        match which {
            Endpoint::Start => &mut self.start,
            Endpoint::End => &mut self.end,
        }
    }

    /// Length in the wall plane
    pub fn length(&self) -> f64 {
        self.start.xy().distance_to(&self.end.xy())
    }

    /// Both ends at the same position
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Axis-aligned along its declared orientation with non-zero extent
    pub fn is_well_formed(&self) -> bool {
        if self.is_vertical {
            self.start.x == self.end.x && self.start.y != self.end.y
        } else {
            self.start.y == self.end.y && self.start.x != self.end.x
        }
    }

    /// Force the constant axis to the anchor: X for vertical runs, Y for
    /// horizontal ones.
    pub fn straighten_to(&mut self, anchor: Point2D) {
        if self.is_vertical {
            self.start.x = anchor.x;
            self.end.x = anchor.x;
        } else {
            self.start.y = anchor.y;
            self.end.y = anchor.y;
        }
    }
}

/// Hit points believed to belong to one pipe
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    pub points: Vec<ScanPoint>,
}

impl Cluster {
    pub fn new(points: Vec<ScanPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean depth; zero for an empty cluster
    pub fn mean_z(&self) -> f64 {
        mean(self.points.iter().map(|p| p.z))
    }

    pub fn x_range(&self) -> f64 {
        range(self.points.iter().map(|p| p.x))
    }

    pub fn y_range(&self) -> f64 {
        range(self.points.iter().map(|p| p.y))
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub(crate) fn range(values: impl Iterator<Item = f64>) -> f64 {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        0.0
    } else {
        max - min
    }
}

/// Final hand-off to the model exporter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconstructionOutput {
    pub bounds: WallBoundingBox,
    pub segments: Vec<Segment>,
}

/// Statistics from the reconstruction pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconstructionStats {
    pub hit_count: usize,
    pub miss_count: usize,
    /// Unrecognised input lines (only known when reading from a log)
    pub skipped_lines: usize,
    pub cluster_count: usize,
    pub noise_points: usize,
    pub candidate_segments: usize,
    pub snapped_endpoints: usize,
    pub aligned_corners: usize,
    /// Segments absorbed into an overlapping collinear run
    pub merged_segments: usize,
    pub removed_degenerate: usize,
    pub skipped_clusters: usize,
    pub final_count: usize,
}
