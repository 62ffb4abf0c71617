// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconstruction parameters and the per-run context

use crate::error::{ReconstructError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How candidate segments are fitted to a cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FitStrategy {
    /// Bin points along X and along Y; every long-enough bin is a segment.
    #[default]
    AxisBinning,
    /// Walk the cluster as an ordered path, simplify it to at most three
    /// vertices and reduce that to a straight run or a single bend.
    ///
    /// The path is ordered along the dominant axis, so scattered hits of a
    /// short perpendicular leg interleave with the main run. The capped end
    /// vertex can then land partway up that leg and shorten it: a jittered
    /// L with its vertical leg reaching y = 100 may come out ending near
    /// y = 54. Prefer `AxisBinning` for scans with noisy corners.
    PathSimplification,
}

/// Configuration for the reconstruction pipeline (all lengths in cm)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Segment fitting strategy. Default: axis binning
    pub strategy: FitStrategy,

    /// Density neighbourhood radius for clustering. Default: 4.0
    pub cluster_eps: f64,

    /// Minimum neighbours (self included) for a core point. Default: 3
    pub cluster_min_pts: usize,

    /// Maximum X distance for binning and endpoint snapping. Default: 4.0
    pub x_tolerance: f64,

    /// Maximum Y distance for binning and endpoint snapping. Default: 4.0
    pub y_tolerance: f64,

    /// Binned candidates shorter than this are discarded. Default: 5.0
    pub min_segment_length: f64,

    /// Decimal places used to key shared corners. Default: 3
    pub corner_precision: u8,

    /// Spread below which the shape reducer treats an axis as flat. Default: 1.0
    pub straight_spread_max: f64,

    /// Span above which the shape reducer treats an axis as a run. Default: 2.0
    pub straight_span_min: f64,

    /// Subtracted from the maximum Z to estimate wall depth. Default: 6.0
    pub wall_depth_offset: f64,

    /// Merge near-coincident endpoints across segments. Default: true
    pub snap_endpoints: bool,

    /// Force exact agreement at shared corners. Default: true
    pub align_corners: bool,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            strategy: FitStrategy::AxisBinning,
            cluster_eps: 4.0,
            cluster_min_pts: 3,
            x_tolerance: 4.0,
            y_tolerance: 4.0,
            min_segment_length: 5.0,
            corner_precision: 3,
            straight_spread_max: 1.0,
            straight_span_min: 2.0,
            wall_depth_offset: 6.0,
            snap_endpoints: true,
            align_corners: true,
        }
    }
}

impl ReconstructionConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ReconstructError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("cluster_eps", self.cluster_eps),
            ("x_tolerance", self.x_tolerance),
            ("y_tolerance", self.y_tolerance),
            ("min_segment_length", self.min_segment_length),
            ("straight_spread_max", self.straight_spread_max),
            ("straight_span_min", self.straight_span_min),
            ("wall_depth_offset", self.wall_depth_offset),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconstructError::InvalidConfig(format!(
                    "{name} must be a finite non-negative length, got {value}"
                )));
            }
        }
        if self.cluster_eps == 0.0 {
            return Err(ReconstructError::InvalidConfig(
                "cluster_eps must be positive".into(),
            ));
        }
        if self.cluster_min_pts == 0 {
            return Err(ReconstructError::InvalidConfig(
                "cluster_min_pts must be at least 1".into(),
            ));
        }
        if self.corner_precision > 9 {
            return Err(ReconstructError::InvalidConfig(format!(
                "corner_precision must be at most 9 decimal places, got {}",
                self.corner_precision
            )));
        }
        Ok(())
    }
}

/// Everything one invocation needs, built fresh per run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: ReconstructionConfig,
    /// Raw sensor log
    pub input: PathBuf,
    /// Segment CSV with `WALL` header
    pub segments_output: PathBuf,
    /// Optional `PIPE` coordinate file for the model exporter
    pub model_output: Option<PathBuf>,
    /// Optional hit-only `x, y, z` dump
    pub clean_output: Option<PathBuf>,
}

impl RunContext {
    pub fn new(config: ReconstructionConfig, input: impl Into<PathBuf>) -> Self {
        Self {
            config,
            input: input.into(),
            segments_output: PathBuf::from("segments.txt"),
            model_output: None,
            clean_output: None,
        }
    }

    pub fn with_segments_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.segments_output = path.into();
        self
    }

    pub fn with_model_output(mut self, path: Option<PathBuf>) -> Self {
        self.model_output = path;
        self
    }

    pub fn with_clean_output(mut self, path: Option<PathBuf>) -> Self {
        self.clean_output = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ReconstructionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ReconstructionConfig {
            x_tolerance: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReconstructError::InvalidConfig(_))
        ));

        let config = ReconstructionConfig {
            cluster_min_pts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ReconstructionConfig {
            cluster_eps: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReconstructionConfig =
            serde_json::from_str(r#"{ "strategy": "path-simplification", "cluster_eps": 3.0 }"#)
                .unwrap();
        assert_eq!(config.strategy, FitStrategy::PathSimplification);
        assert_eq!(config.cluster_eps, 3.0);
        assert_eq!(config.cluster_min_pts, 3);
        assert!(config.snap_endpoints);
    }

    #[test]
    fn test_run_context_defaults() {
        let ctx = RunContext::new(ReconstructionConfig::default(), "scan.txt")
            .with_model_output(Some(PathBuf::from("pipes.txt")));
        assert_eq!(ctx.segments_output, PathBuf::from("segments.txt"));
        assert_eq!(ctx.model_output, Some(PathBuf::from("pipes.txt")));
        assert!(ctx.clean_output.is_none());
    }
}
