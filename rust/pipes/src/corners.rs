// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared-corner alignment
//!
//! Endpoints whose coordinates agree after rounding to a fixed number of
//! decimals are treated as one physical corner. Every segment touching a
//! corner is pulled onto it exactly, so downstream consumers can join
//! segments by plain equality.

use crate::types::{Endpoint, Segment};
use inwall_core::Point2D;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A wall-plane position rounded to `precision` decimal places.
///
/// Stored as scaled integers so it can be hashed and compared exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CornerKey {
    x: i64,
    y: i64,
    precision: u8,
}

impl CornerKey {
    pub fn new(p: Point2D, precision: u8) -> Self {
        let scale = Self::scale(precision);
        Self {
            x: (p.x * scale).round() as i64,
            y: (p.y * scale).round() as i64,
            precision,
        }
    }

    fn scale(precision: u8) -> f64 {
        10f64.powi(i32::from(precision))
    }

    /// The rounded position this key stands for
    pub fn position(&self) -> Point2D {
        let scale = Self::scale(self.precision);
        Point2D::new(self.x as f64 / scale, self.y as f64 / scale)
    }
}

/// Pull every multi-segment corner onto its rounded position.
///
/// Horizontal segments touching a corner take its Y on both ends, vertical
/// ones take its X, and the touching endpoint lands exactly on the corner.
/// Returns the number of corners aligned. Running it twice changes nothing.
pub fn align_corners(segments: &mut [Segment], precision: u8) -> usize {
    let mut corners: FxHashMap<CornerKey, Vec<(usize, Endpoint)>> = FxHashMap::default();
    for (i, seg) in segments.iter().enumerate() {
        for which in Endpoint::BOTH {
            let key = CornerKey::new(seg.point(which).xy(), precision);
            corners.entry(key).or_default().push((i, which));
        }
    }

    // Fixed order keeps the result independent of hash iteration
    let mut groups: Vec<_> = corners.into_iter().collect();
    groups.sort_unstable_by_key(|(key, _)| *key);

    let mut aligned = 0;
    for (key, touching) in groups {
        let mut owners: Vec<usize> = touching.iter().map(|&(i, _)| i).collect();
        owners.dedup();
        if owners.len() < 2 {
            continue;
        }

        let corner = key.position();
        for &(i, which) in &touching {
            let seg = &mut segments[i];
            seg.straighten_to(corner);
            let end = seg.point_mut(which);
            end.x = corner.x;
            end.y = corner.y;
        }
        aligned += 1;
    }

    if aligned > 0 {
        tracing::debug!(corners = aligned, "Aligned shared corners");
    }
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use inwall_core::Point3D;

    #[test]
    fn test_key_rounding() {
        let a = CornerKey::new(Point2D::new(60.0004, 49.9996), 3);
        let b = CornerKey::new(Point2D::new(59.9996, 50.0004), 3);
        assert_eq!(a, b);
        assert_eq!(a.position(), Point2D::new(60.0, 50.0));

        let c = CornerKey::new(Point2D::new(60.002, 50.0), 3);
        assert_ne!(a, c);
    }

    #[test]
    fn test_corner_becomes_exact() {
        let mut segments = vec![
            Segment {
                start: Point3D::new(0.0, 50.0002, 6.0),
                end: Point3D::new(60.0003, 50.0002, 6.0),
                is_vertical: false,
            },
            Segment {
                start: Point3D::new(59.9998, 49.9999, 6.0),
                end: Point3D::new(59.9998, 100.0, 6.0),
                is_vertical: true,
            },
        ];

        let aligned = align_corners(&mut segments, 3);
        assert_eq!(aligned, 1);

        let (h, v) = (segments[0], segments[1]);
        assert_eq!(h.end.xy(), v.start.xy());
        assert_eq!(h.end.xy(), Point2D::new(60.0, 50.0));
        assert_eq!(h.start.y, 50.0);
        assert_eq!(v.end.x, 60.0);
        assert!(h.is_well_formed());
        assert!(v.is_well_formed());
    }

    #[test]
    fn test_single_segment_corner_untouched() {
        let mut segments = vec![Segment::horizontal(0.00012, 10.0, 5.0, 1.0)];
        let before = segments.clone();
        assert_eq!(align_corners(&mut segments, 3), 0);
        assert_eq!(segments, before);
    }

    #[test]
    fn test_idempotent() {
        let mut segments = vec![
            Segment::horizontal(0.0, 30.00041, 20.00018, 2.0),
            Segment::vertical(30.00037, 20.0, 70.0, 2.0),
            Segment::horizontal(30.0, 80.0, 70.00022, 2.0),
        ];
        align_corners(&mut segments, 3);
        let once = segments.clone();
        assert_eq!(align_corners(&mut segments, 3), 2);
        assert_eq!(segments, once);
    }
}
