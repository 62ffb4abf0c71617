// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scan extent and wall bounding box
//!
//! The wall extent is taken from every sample, hits and misses alike: a miss
//! still proves the sensor covered that part of the wall.

use crate::types::PointCloud;
use serde::{Deserialize, Serialize};

/// Running min/max accumulator over scan positions
#[derive(Debug, Clone)]
pub struct ScanBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
    /// Number of points sampled
    pub sample_count: usize,
}

impl ScanBounds {
    /// Create new bounds initialized to invalid state
    pub fn new() -> Self {
        Self {
            min_x: f64::MAX,
            min_y: f64::MAX,
            min_z: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
            max_z: f64::MIN,
            sample_count: 0,
        }
    }

    /// Compute bounds over every point of a cloud
    pub fn from_cloud(cloud: &PointCloud) -> Self {
        let mut bounds = Self::new();
        for p in cloud.iter() {
            bounds.expand(p.x, p.y, p.z);
        }
        bounds
    }

    /// Check if bounds are valid (at least one point added)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sample_count > 0
    }

    #[inline]
    pub fn expand(&mut self, x: f64, y: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.max_z = self.max_z.max(z);
        self.sample_count += 1;
    }
}

impl Default for ScanBounds {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical extent of the scanned wall, handed to the model exporter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WallBoundingBox {
    pub max_x: f64,
    pub max_y: f64,
    /// Wall thickness estimate
    pub depth: f64,
}

impl WallBoundingBox {
    pub fn new(max_x: f64, max_y: f64, depth: f64) -> Self {
        Self { max_x, max_y, depth }
    }

    /// Derive the wall box from a (normalised) cloud.
    ///
    /// The sensor arena always reaches the same maximum Z, so the wall
    /// thickness is recovered as `max_z - depth_offset`, floored at zero.
    /// An empty cloud yields the all-zero box.
    pub fn from_cloud(cloud: &PointCloud, depth_offset: f64) -> Self {
        let bounds = ScanBounds::from_cloud(cloud);
        if !bounds.is_valid() {
            return Self::default();
        }
        Self {
            max_x: bounds.max_x,
            max_y: bounds.max_y,
            depth: (bounds.max_z - depth_offset).max(0.0),
        }
    }

    /// True if the wall-plane position lies inside `[0, max_x] x [0, max_y]`
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        (0.0..=self.max_x).contains(&x) && (0.0..=self.max_y).contains(&y)
    }
}
