// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor log parser using nom
//!
//! The acquisition tool writes one line per sample:
//!
//! ```text
//! x: 12.5 cm, y: -3.0 cm, z: 6.5 cm, a: 0.0041 cm
//! No Target Detected at x: 13.0 cm, y: -3.0 cm, z: 0.0 cm
//! ```
//!
//! Parsing is best-effort: a line matching neither form yields `None` and
//! the caller moves on.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, one_of, space0, space1},
    combinator::{all_consuming, map, map_res, opt, recognize, verify},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{PointCloud, ScanPoint};

/// One parsed sensor line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanRecord {
    /// The sensor reported a target at this position
    Hit { x: f64, y: f64, z: f64, amplitude: f64 },
    /// Nothing detected at this scan position
    Miss { x: f64, y: f64, z: f64 },
}

impl ScanRecord {
    pub fn into_point(self) -> ScanPoint {
        match self {
            ScanRecord::Hit { x, y, z, amplitude } => ScanPoint::hit(x, y, z, amplitude),
            ScanRecord::Miss { x, y, z } => ScanPoint::miss(x, y, z),
        }
    }
}

/// Result of parsing a whole log
#[derive(Debug, Clone, Default)]
pub struct ParsedScan {
    pub cloud: PointCloud,
    /// Non-blank lines that matched no record form
    pub skipped_lines: usize,
}

/// Parse float: 3.14, -3.14, 1.5E-10, 0., .5
///
/// Literals that overflow to infinity are rejected.
fn number(input: &str) -> IResult<&str, f64> {
    verify(
        map_res(
            recognize(tuple((
                opt(one_of("+-")),
                alt((
                    recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                    recognize(pair(char('.'), digit1)),
                )),
                opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
            ))),
            |s: &str| fast_float::parse::<f64, _>(s),
        ),
        |v: &f64| v.is_finite(),
    )(input)
}

/// Parse a labelled measurement: `x: 12.5 cm` (unit optional)
fn field<'a>(label: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, f64> {
    delimited(
        tuple((tag(label), char(':'), space0)),
        number,
        opt(preceded(space0, tag("cm"))),
    )
}

/// Field separator: `, ` with optional surrounding blanks
fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0)(input)
}

fn hit_record(input: &str) -> IResult<&str, ScanRecord> {
    map(
        tuple((
            terminated(field("x"), comma),
            terminated(field("y"), comma),
            terminated(field("z"), comma),
            field("a"),
        )),
        |(x, y, z, amplitude)| ScanRecord::Hit { x, y, z, amplitude },
    )(input)
}

fn miss_record(input: &str) -> IResult<&str, ScanRecord> {
    map(
        preceded(
            pair(tag("No Target Detected at"), space1),
            tuple((
                terminated(field("x"), comma),
                terminated(field("y"), comma),
                field("z"),
            )),
        ),
        |(x, y, z)| ScanRecord::Miss { x, y, z },
    )(input)
}

/// Plain `x, y, z` line as written by the clean-point export
fn xyz_record(input: &str) -> IResult<&str, ScanRecord> {
    map(
        tuple((terminated(number, comma), terminated(number, comma), number)),
        |(x, y, z)| ScanRecord::Hit {
            x,
            y,
            z,
            amplitude: 0.0,
        },
    )(input)
}

/// Parse one sensor log line. Returns `None` for anything unrecognised.
pub fn parse_record(line: &str) -> Option<ScanRecord> {
    all_consuming(delimited(space0, alt((hit_record, miss_record)), space0))(line.trim())
        .ok()
        .map(|(_, record)| record)
}

/// Parse one `x, y, z` line (clean hit export). Returns `None` if malformed.
pub fn parse_xyz_record(line: &str) -> Option<ScanRecord> {
    all_consuming(xyz_record)(line.trim())
        .ok()
        .map(|(_, record)| record)
}

fn parse_lines(text: &str, parse_line: fn(&str) -> Option<ScanRecord>) -> ParsedScan {
    let mut parsed = ParsedScan::default();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(record) => parsed.cloud.push(record.into_point()),
            None => parsed.skipped_lines += 1,
        }
    }

    if parsed.skipped_lines > 0 {
        tracing::warn!(skipped = parsed.skipped_lines, "Ignored unrecognised scan lines");
    }
    tracing::debug!(
        points = parsed.cloud.len(),
        hits = parsed.cloud.hit_count(),
        "Parsed scan records"
    );

    parsed
}

/// Parse a complete sensor log
pub fn parse_scan(text: &str) -> ParsedScan {
    parse_lines(text, parse_record)
}

/// Parse a clean `x, y, z` hit file
pub fn parse_xyz(text: &str) -> ParsedScan {
    parse_lines(text, parse_xyz_record)
}

/// Read and parse a sensor log from disk.
///
/// An unreadable file is the only fatal condition.
pub fn read_scan_file(path: impl AsRef<Path>) -> Result<ParsedScan> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_scan(&text))
}

/// Read and parse a clean `x, y, z` file from disk
pub fn read_xyz_file(path: impl AsRef<Path>) -> Result<ParsedScan> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_xyz(&text))
}
