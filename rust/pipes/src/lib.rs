// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-wall pipe centerline reconstruction
//!
//! This crate turns a scanned wall point cloud into axis-aligned pipe
//! segments:
//! 1. Normalising the scan frame and measuring the wall box
//! 2. Clustering hit points into individual pipes (DBSCAN)
//! 3. Fitting candidate segments per cluster (axis binning or path
//!    simplification followed by shape reduction)
//! 4. Snapping nearby endpoints and aligning shared corners exactly
//! 5. Assembling the result for the model exporter
//!
//! # Usage
//!
//! ```rust,ignore
//! use inwall_core::read_scan_file;
//! use inwall_pipes::{reconstruct, format_segments, ReconstructionConfig};
//!
//! let mut cloud = read_scan_file("scan.txt")?.cloud;
//! let result = reconstruct(&mut cloud, &ReconstructionConfig::default())?;
//! print!("{}", format_segments(&result.output, true));
//! ```

pub mod assembler;
pub mod clustering;
pub mod config;
pub mod corners;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod segment_fitter;
pub mod shape_reducer;
pub mod snapper;
pub mod types;

// Re-export commonly used types and functions
pub use assembler::{assemble, merge_overlapping};
pub use clustering::{cluster_hits, cluster_points, Clustering};
pub use config::{FitStrategy, ReconstructionConfig, RunContext};
pub use corners::{align_corners, CornerKey};
pub use error::{ReconstructError, Result};
pub use export::{
    format_clean_points, format_model_coordinates, format_segments, parse_segments,
    read_segments, write_clean_points, write_model_coordinates, write_segments,
};
pub use pipeline::{reconstruct, run, Reconstruction};
pub use segment_fitter::{fit_axis_bins, simplify_path};
pub use shape_reducer::{reduce_shape, ReducedShape, ShapeKind};
pub use snapper::{snap_endpoints, SnapMap, SnapOutcome};
pub use types::{Cluster, Endpoint, ReconstructionOutput, ReconstructionStats, Segment};
