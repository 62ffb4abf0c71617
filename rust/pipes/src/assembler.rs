// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Final output assembly
//!
//! Snapping can pull two candidates from neighbouring bins onto the same
//! corner, leaving one run nested inside another. Those are merged before
//! the output is handed on.

use crate::types::{ReconstructionOutput, Segment};
use inwall_core::WallBoundingBox;

/// Coordinate held fixed along the run: X for vertical, Y for horizontal
fn fixed_coord(seg: &Segment) -> f64 {
    if seg.is_vertical {
        seg.start.x
    } else {
        seg.start.y
    }
}

/// Extent along the run axis as `(low, high)`
fn span(seg: &Segment) -> (f64, f64) {
    let (a, b) = if seg.is_vertical {
        (seg.start.y, seg.end.y)
    } else {
        (seg.start.x, seg.end.x)
    };
    (a.min(b), a.max(b))
}

/// Merge same-orientation segments on the same line whose spans overlap or
/// touch.
///
/// Candidates are grown against the group's aggregate extent, so a chain
/// A-B-C merges even when A and C do not meet. The merged run keeps the
/// first member's position in the list, its direction and its depth. Only
/// well-formed segments take part. Returns the merged list and the number
/// of segments absorbed.
pub fn merge_overlapping(segments: &[Segment]) -> (Vec<Segment>, usize) {
    let mut merged = Vec::with_capacity(segments.len());
    let mut used = vec![false; segments.len()];
    let mut absorbed = 0;

    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        used[i] = true;

        let base = segments[i];
        if !base.is_well_formed() {
            merged.push(base);
            continue;
        }

        let line = fixed_coord(&base);
        let (mut lo, mut hi) = span(&base);

        let mut changed = true;
        while changed {
            changed = false;
            for j in 0..segments.len() {
                let other = &segments[j];
                if used[j]
                    || other.is_vertical != base.is_vertical
                    || !other.is_well_formed()
                    || fixed_coord(other) != line
                {
                    continue;
                }
                let (other_lo, other_hi) = span(other);
                if other_lo <= hi && other_hi >= lo {
                    lo = lo.min(other_lo);
                    hi = hi.max(other_hi);
                    used[j] = true;
                    absorbed += 1;
                    changed = true;
                }
            }
        }

        let mut run = base;
        let ascending = if base.is_vertical {
            base.start.y <= base.end.y
        } else {
            base.start.x <= base.end.x
        };
        let (from, to) = if ascending { (lo, hi) } else { (hi, lo) };
        if run.is_vertical {
            run.start.y = from;
            run.end.y = to;
        } else {
            run.start.x = from;
            run.end.x = to;
        }
        merged.push(run);
    }

    if absorbed > 0 {
        tracing::debug!(absorbed, "Merged overlapping collinear segments");
    }
    (merged, absorbed)
}

/// Combine per-cluster segments into one ordered list under the wall box.
///
/// Segments that are not axis-aligned along their declared orientation, or
/// that collapsed to a point, are dropped. Returns the output and the
/// number of segments removed.
pub fn assemble(
    bounds: WallBoundingBox,
    segments: impl IntoIterator<Item = Segment>,
) -> (ReconstructionOutput, usize) {
    let mut removed = 0;
    let segments: Vec<Segment> = segments
        .into_iter()
        .filter(|seg| {
            let keep = seg.is_well_formed() && !seg.is_degenerate();
            if !keep {
                tracing::trace!(?seg, "Dropping malformed segment");
                removed += 1;
            }
            keep
        })
        .collect();

    (ReconstructionOutput { bounds, segments }, removed)
}
