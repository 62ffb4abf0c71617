// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # InWall Core
//!
//! Scan ingestion for in-wall pipe detection. Turns the sensor log produced
//! while sweeping a wall into a [`PointCloud`] of hit/miss samples in one
//! shared coordinate frame.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use inwall_core::{parse_scan, WallBoundingBox};
//!
//! let text = "x: 3.0 cm, y: -2.0 cm, z: 6.5 cm, a: 0.004 cm\n\
//!             No Target Detected at x: 3.5 cm, y: -2.0 cm, z: 0.0 cm\n";
//! let mut scan = parse_scan(text);
//! scan.cloud.normalize_y();
//! let wall = WallBoundingBox::from_cloud(&scan.cloud, 6.0);
//! ```
//!
//! Parsing never fails on bad lines; they are counted in
//! [`ParsedScan::skipped_lines`]. Only an unreadable input file is an error.

pub mod bounds;
pub mod error;
pub mod parser;
pub mod types;

pub use bounds::{ScanBounds, WallBoundingBox};
pub use error::{Error, Result};
pub use parser::{
    parse_record, parse_scan, parse_xyz, parse_xyz_record, read_scan_file, read_xyz_file,
    ParsedScan, ScanRecord,
};
pub use types::{Point2D, Point3D, PointCloud, ScanPoint};
