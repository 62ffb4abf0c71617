// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endpoint snapping across segments
//!
//! Segments fitted from neighbouring clusters (or neighbouring bins) rarely
//! meet exactly. Any two endpoints of different segments that lie within
//! the X and Y tolerances are moved onto one shared position. A snapped
//! segment is then straightened back onto its axis using the position its
//! snapped end landed on.

use crate::corners::CornerKey;
use crate::types::{Endpoint, Segment};
use inwall_core::Point2D;
use rustc_hash::FxHashMap;

/// Where each snapped endpoint ended up, keyed by rounded position
#[derive(Debug, Clone, Default)]
pub struct SnapMap {
    entries: FxHashMap<CornerKey, Point2D>,
    precision: u8,
}

impl SnapMap {
    pub fn new(precision: u8) -> Self {
        Self {
            entries: FxHashMap::default(),
            precision,
        }
    }

    /// Record that an endpoint at `from` was moved to `to`
    pub fn record(&mut self, from: Point2D, to: Point2D) {
        self.entries.insert(CornerKey::new(from, self.precision), to);
        self.entries.insert(CornerKey::new(to, self.precision), to);
    }

    /// Snapped position for an endpoint last seen at `at`
    pub fn anchor(&self, at: Point2D) -> Option<Point2D> {
        self.entries
            .get(&CornerKey::new(at, self.precision))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of a snapping pass
#[derive(Debug, Clone)]
pub struct SnapOutcome {
    pub map: SnapMap,
    /// Endpoint moves that changed a position
    pub moved: usize,
}

/// Combine two nearby endpoints.
///
/// On each axis the coordinate of whichever point is closer along the
/// *other* axis wins: when the pair is closer in X than in Y, `a` supplies
/// X and `b` supplies Y, and the other way round otherwise.
pub fn snap_pair(a: Point2D, b: Point2D) -> Point2D {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    Point2D::new(
        if dx < dy { a.x } else { b.x },
        if dy <= dx { a.y } else { b.y },
    )
}

/// Snap near-coincident endpoints of different segments, then straighten
/// every segment along its axis.
pub fn snap_endpoints(
    segments: &mut [Segment],
    x_tolerance: f64,
    y_tolerance: f64,
    precision: u8,
) -> SnapOutcome {
    let mut map = SnapMap::new(precision);
    let mut moved = 0;

    let n = segments.len();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            for ei in Endpoint::BOTH {
                for ej in Endpoint::BOTH {
                    let a = segments[i].point(ei).xy();
                    let b = segments[j].point(ej).xy();
                    if (a.x - b.x).abs() > x_tolerance || (a.y - b.y).abs() > y_tolerance {
                        continue;
                    }

                    let snapped = snap_pair(a, b);
                    for (idx, which, before) in [(i, ei, a), (j, ej, b)] {
                        if before != snapped {
                            moved += 1;
                        }
                        map.record(before, snapped);
                        let end = segments[idx].point_mut(which);
                        end.x = snapped.x;
                        end.y = snapped.y;
                    }
                }
            }
        }
    }

    for seg in segments.iter_mut() {
        let anchor = map
            .anchor(seg.start.xy())
            .or_else(|| map.anchor(seg.end.xy()))
            .unwrap_or_else(|| seg.start.xy());
        seg.straighten_to(anchor);
    }

    tracing::debug!(moved, snapped_positions = map.len(), "Snapped segment endpoints");

    SnapOutcome { map, moved }
}
