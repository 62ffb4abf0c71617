// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text formats exchanged with the model exporter
//!
//! - Segment CSV: `x1, y1, z1, x2, y2, z2` per line, optionally preceded by
//!   a `WALL, maxX, maxY, depth` header.
//! - Model coordinate file: `WALL` header plus one `PIPE, ...` line per
//!   segment.
//! - Clean points: hit-only `x, y, z` lines.
//!
//! All numbers are written with four decimal places.

use crate::error::{ReconstructError, Result};
use crate::types::{ReconstructionOutput, Segment};
use inwall_core::{Point3D, PointCloud, WallBoundingBox};
use std::fmt::Write as _;
use std::path::Path;

fn wall_line(bounds: &WallBoundingBox) -> String {
    format!(
        "WALL, {:.4}, {:.4}, {:.4}",
        bounds.max_x, bounds.max_y, bounds.depth
    )
}

fn segment_fields(seg: &Segment) -> String {
    format!(
        "{:.4}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
        seg.start.x, seg.start.y, seg.start.z, seg.end.x, seg.end.y, seg.end.z
    )
}

/// Render the segment CSV, with the `WALL` header when `with_header` is set
pub fn format_segments(output: &ReconstructionOutput, with_header: bool) -> String {
    let mut text = String::new();
    if with_header {
        let _ = writeln!(text, "{}", wall_line(&output.bounds));
    }
    for seg in &output.segments {
        let _ = writeln!(text, "{}", segment_fields(seg));
    }
    text
}

/// Render the `WALL`/`PIPE` coordinate file
pub fn format_model_coordinates(output: &ReconstructionOutput) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{}", wall_line(&output.bounds));
    for seg in &output.segments {
        let _ = writeln!(text, "PIPE, {}", segment_fields(seg));
    }
    text
}

/// Render hit points as `x, y, z` lines
pub fn format_clean_points(cloud: &PointCloud) -> String {
    let mut text = String::new();
    for p in cloud.hits() {
        let _ = writeln!(text, "{:.4}, {:.4}, {:.4}", p.x, p.y, p.z);
    }
    text
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| ReconstructError::io(path, e))
}

pub fn write_segments(
    path: impl AsRef<Path>,
    output: &ReconstructionOutput,
    with_header: bool,
) -> Result<()> {
    write_text(path.as_ref(), &format_segments(output, with_header))
}

pub fn write_model_coordinates(path: impl AsRef<Path>, output: &ReconstructionOutput) -> Result<()> {
    write_text(path.as_ref(), &format_model_coordinates(output))
}

pub fn write_clean_points(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    write_text(path.as_ref(), &format_clean_points(cloud))
}

fn parse_floats(fields: &str) -> Option<Vec<f64>> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

fn parse_segment_line(fields: &str) -> Option<Segment> {
    let values = parse_floats(fields)?;
    let [x1, y1, z1, x2, y2, z2] = values.as_slice() else {
        return None;
    };
    let is_vertical = if x1 == x2 && y1 != y2 {
        true
    } else if y1 == y2 && x1 != x2 {
        false
    } else {
        return None;
    };
    Some(Segment {
        start: Point3D::new(*x1, *y1, *z1),
        end: Point3D::new(*x2, *y2, *z2),
        is_vertical,
    })
}

/// Read a segment CSV or model coordinate file back into an output.
///
/// Accepts an optional `WALL` header and optional `PIPE` prefixes. Lines
/// that do not describe an axis-aligned segment are skipped.
pub fn parse_segments(text: &str) -> ReconstructionOutput {
    let mut output = ReconstructionOutput::default();
    let mut skipped = 0usize;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = line.strip_prefix("WALL") {
            match parse_floats(rest.trim_start_matches(',')).as_deref() {
                Some([max_x, max_y, depth]) => {
                    output.bounds = WallBoundingBox::new(*max_x, *max_y, *depth);
                }
                _ => skipped += 1,
            }
            continue;
        }

        let fields = line
            .strip_prefix("PIPE")
            .map_or(line, |rest| rest.trim_start_matches(','));
        match parse_segment_line(fields) {
            Some(seg) => output.segments.push(seg),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Skipped unreadable segment lines");
    }
    output
}

pub fn read_segments(path: impl AsRef<Path>) -> Result<ReconstructionOutput> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ReconstructError::io(path, e))?;
    Ok(parse_segments(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inwall_core::ScanPoint;

    fn sample() -> ReconstructionOutput {
        ReconstructionOutput {
            bounds: WallBoundingBox::new(100.0, 80.5, 2.25),
            segments: vec![
                Segment::horizontal(0.0, 60.0, 50.0, 6.0),
                Segment::vertical(60.0, 50.0, 100.0, 6.0),
            ],
        }
    }

    #[test]
    fn test_segment_csv_layout() {
        let text = format_segments(&sample(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "WALL, 100.0000, 80.5000, 2.2500");
        assert_eq!(
            lines[1],
            "0.0000, 50.0000, 6.0000, 60.0000, 50.0000, 6.0000"
        );

        let bare = format_segments(&sample(), false);
        assert!(!bare.starts_with("WALL"));
        assert_eq!(bare.lines().count(), 2);
    }

    #[test]
    fn test_model_file_layout() {
        let text = format_model_coordinates(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("WALL, "));
        assert_eq!(
            lines[2],
            "PIPE, 60.0000, 50.0000, 6.0000, 60.0000, 100.0000, 6.0000"
        );
    }

    #[test]
    fn test_clean_points_only_hits() {
        let cloud = PointCloud::from_points(vec![
            ScanPoint::hit(1.0, 2.0, 3.0, 0.1),
            ScanPoint::miss(4.0, 5.0, 0.0),
        ]);
        assert_eq!(format_clean_points(&cloud), "1.0000, 2.0000, 3.0000\n");
    }

    #[test]
    fn test_read_back_both_formats() {
        let original = sample();
        assert_eq!(parse_segments(&format_segments(&original, true)), original);
        assert_eq!(parse_segments(&format_model_coordinates(&original)), original);
    }

    #[test]
    fn test_read_skips_bad_lines() {
        let text = "WALL 50, 40, 3,\n\
                    1, 2, 3, 1, 9, 3\n\
                    not a segment\n\
                    0, 0, 0, 5, 5, 0\n";
        let output = parse_segments(text);
        assert_eq!(output.bounds, WallBoundingBox::new(50.0, 40.0, 3.0));
        assert_eq!(output.segments.len(), 1);
        assert!(output.segments[0].is_vertical);
    }
}
