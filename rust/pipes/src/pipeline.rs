// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end reconstruction
//!
//! Stages run strictly in order, each consuming the previous stage's
//! output: Y normalisation, wall bounds, clustering, per-cluster fitting,
//! endpoint snapping, corner alignment, overlap merging and assembly.

use crate::assembler::{assemble, merge_overlapping};
use crate::clustering::cluster_hits;
use crate::config::{FitStrategy, ReconstructionConfig, RunContext};
use crate::corners::align_corners;
use crate::error::Result;
use crate::export::{write_clean_points, write_model_coordinates, write_segments};
use crate::segment_fitter::{fit_axis_bins, simplify_path};
use crate::shape_reducer::reduce_shape;
use crate::snapper::snap_endpoints;
use crate::types::{Cluster, ReconstructionOutput, ReconstructionStats, Segment};
use inwall_core::{read_scan_file, PointCloud, WallBoundingBox};

/// Output of one pipeline run
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub output: ReconstructionOutput,
    pub stats: ReconstructionStats,
}

fn fit_cluster(cluster: &Cluster, config: &ReconstructionConfig) -> Result<Vec<Segment>> {
    match config.strategy {
        FitStrategy::AxisBinning => Ok(fit_axis_bins(cluster, config)),
        FitStrategy::PathSimplification => {
            let path = simplify_path(cluster);
            let shape = reduce_shape(&path, cluster.mean_z(), config)?;
            Ok(shape.segments)
        }
    }
}

/// Reconstruct pipe centerlines from a scan.
///
/// Normalises the cloud's Y in place (once) so written clean points and
/// segments share one frame. Fails only on an invalid configuration; a
/// cluster that cannot be fitted is logged and skipped.
pub fn reconstruct(cloud: &mut PointCloud, config: &ReconstructionConfig) -> Result<Reconstruction> {
    config.validate()?;

    let mut stats = ReconstructionStats {
        hit_count: cloud.hit_count(),
        miss_count: cloud.miss_count(),
        ..Default::default()
    };

    // ─── Step 1: Frame ───
    cloud.normalize_y();
    let bounds = WallBoundingBox::from_cloud(cloud, config.wall_depth_offset);

    // ─── Step 2: Clustering ───
    let clustering = cluster_hits(cloud, config.cluster_eps, config.cluster_min_pts);
    stats.cluster_count = clustering.clusters.len();
    stats.noise_points = clustering.noise_points;

    // ─── Step 3: Fitting ───
    let mut segments: Vec<Segment> = Vec::new();
    for (index, cluster) in clustering.clusters.iter().enumerate() {
        match fit_cluster(cluster, config) {
            Ok(fitted) => {
                tracing::trace!(cluster = index, segments = fitted.len(), "Fitted cluster");
                segments.extend(fitted);
            }
            Err(err) => {
                tracing::warn!(cluster = index, points = cluster.len(), %err, "Skipping cluster");
                stats.skipped_clusters += 1;
            }
        }
    }
    stats.candidate_segments = segments.len();

    // ─── Step 4: Snapping ───
    if config.snap_endpoints {
        let outcome = snap_endpoints(
            &mut segments,
            config.x_tolerance,
            config.y_tolerance,
            config.corner_precision,
        );
        stats.snapped_endpoints = outcome.moved;
    }

    // ─── Step 5: Corner alignment ───
    if config.align_corners {
        stats.aligned_corners = align_corners(&mut segments, config.corner_precision);
    }

    // ─── Step 6: Overlap merge ───
    let (segments, merged) = merge_overlapping(&segments);
    stats.merged_segments = merged;

    // ─── Step 7: Assembly ───
    let (output, removed) = assemble(bounds, segments);
    stats.removed_degenerate = removed;
    stats.final_count = output.segments.len();

    tracing::info!(
        hits = stats.hit_count,
        clusters = stats.cluster_count,
        segments = stats.final_count,
        "Reconstruction complete"
    );

    Ok(Reconstruction { output, stats })
}

/// Read, reconstruct and write every requested output for one run
pub fn run(ctx: &RunContext) -> Result<Reconstruction> {
    let parsed = read_scan_file(&ctx.input)?;
    let mut cloud = parsed.cloud;
    let mut reconstruction = reconstruct(&mut cloud, &ctx.config)?;
    reconstruction.stats.skipped_lines = parsed.skipped_lines;

    write_segments(&ctx.segments_output, &reconstruction.output, true)?;
    if let Some(path) = &ctx.model_output {
        write_model_coordinates(path, &reconstruction.output)?;
    }
    if let Some(path) = &ctx.clean_output {
        write_clean_points(path, &cloud)?;
    }

    Ok(reconstruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconstructError;
    use inwall_core::ScanPoint;

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReconstructionConfig {
            cluster_eps: 0.0,
            ..Default::default()
        };
        let result = reconstruct(&mut PointCloud::new(), &config);
        assert!(matches!(result, Err(ReconstructError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_cloud() {
        let result = reconstruct(&mut PointCloud::new(), &ReconstructionConfig::default()).unwrap();
        assert!(result.output.segments.is_empty());
        assert_eq!(result.output.bounds, WallBoundingBox::default());
    }

    #[test]
    fn test_path_strategy_skips_unfittable_cluster() {
        let mut cloud = PointCloud::from_points(vec![ScanPoint::hit(10.0, 10.0, 6.0, 1.0)]);
        let config = ReconstructionConfig {
            strategy: FitStrategy::PathSimplification,
            ..Default::default()
        };
        let result = reconstruct(&mut cloud, &config).unwrap();
        assert_eq!(result.stats.skipped_clusters, 1);
        assert!(result.output.segments.is_empty());
    }

    #[test]
    fn test_stats_counts() {
        let mut points: Vec<ScanPoint> = (0..=20)
            .map(|i| ScanPoint::hit(i as f64 * 2.0, 20.0, 6.0, 1.0))
            .collect();
        points.push(ScanPoint::miss(0.0, 0.0, 0.0));
        let mut cloud = PointCloud::from_points(points);

        let result = reconstruct(&mut cloud, &ReconstructionConfig::default()).unwrap();
        assert_eq!(result.stats.hit_count, 21);
        assert_eq!(result.stats.miss_count, 1);
        assert_eq!(result.stats.cluster_count, 1);
        assert_eq!(result.stats.final_count, 1);
    }
}
