// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Density-based clustering of hit points
//!
//! Pipes show up as elongated, possibly bent streaks of hits and their count
//! is unknown up front, so hits are grouped with DBSCAN in the wall plane.
//! Neighbourhood queries go through a uniform grid with `eps`-sized cells,
//! which keeps each query to the 3x3 block around the point.

use crate::types::Cluster;
use inwall_core::{PointCloud, ScanPoint};
use nalgebra::Point2;
use rustc_hash::FxHashMap;

/// Output of the clustering stage
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    /// Hits not reachable from any dense region (dropped)
    pub noise_points: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Unvisited,
    Noise,
    Member(usize),
}

/// Uniform grid over wall-plane positions
struct NeighborGrid<'a> {
    points: &'a [Point2<f64>],
    cells: FxHashMap<(i64, i64), Vec<usize>>,
    eps: f64,
}

impl<'a> NeighborGrid<'a> {
    fn build(points: &'a [Point2<f64>], eps: f64) -> Self {
        let mut cells: FxHashMap<(i64, i64), Vec<usize>> = FxHashMap::default();
        for (i, p) in points.iter().enumerate() {
            cells.entry(Self::cell_of(p, eps)).or_default().push(i);
        }
        Self { points, cells, eps }
    }

    fn cell_of(p: &Point2<f64>, eps: f64) -> (i64, i64) {
        ((p.x / eps).floor() as i64, (p.y / eps).floor() as i64)
    }

    /// Indices within `eps` of point `idx`, the point itself included
    fn neighbors(&self, idx: usize) -> Vec<usize> {
        let p = &self.points[idx];
        let (cx, cy) = Self::cell_of(p, self.eps);
        let eps_sq = self.eps * self.eps;

        let mut found = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                // Cells at the i64 edge have no neighbour on the far side
                let (Some(nx), Some(ny)) = (cx.checked_add(dx), cy.checked_add(dy)) else {
                    continue;
                };
                if let Some(bucket) = self.cells.get(&(nx, ny)) {
                    found.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|&j| nalgebra::distance_squared(p, &self.points[j]) <= eps_sq),
                    );
                }
            }
        }
        found
    }
}

/// Label every position with its DBSCAN cluster, `None` for noise
fn dbscan(points: &[Point2<f64>], eps: f64, min_pts: usize) -> Vec<Option<usize>> {
    let grid = NeighborGrid::build(points, eps);
    let mut labels = vec![Label::Unvisited; points.len()];
    let mut next_cluster = 0;

    for i in 0..points.len() {
        if labels[i] != Label::Unvisited {
            continue;
        }

        let neighbors = grid.neighbors(i);
        if neighbors.len() < min_pts {
            labels[i] = Label::Noise;
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[i] = Label::Member(cluster);

        let mut seeds = neighbors;
        let mut head = 0;
        while head < seeds.len() {
            let j = seeds[head];
            head += 1;

            match labels[j] {
                // Border point: reachable but not dense itself
                Label::Noise => labels[j] = Label::Member(cluster),
                Label::Unvisited => {
                    labels[j] = Label::Member(cluster);
                    let expansion = grid.neighbors(j);
                    if expansion.len() >= min_pts {
                        seeds.extend(expansion);
                    }
                }
                Label::Member(_) => {}
            }
        }
    }

    labels
        .into_iter()
        .map(|label| match label {
            Label::Member(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// Partition hit points into pipe clusters.
///
/// Misses never take part. With fewer hits than `min_pts` the whole hit set
/// is returned as one cluster instead of being written off as noise.
pub fn cluster_hits(cloud: &PointCloud, eps: f64, min_pts: usize) -> Clustering {
    let hits: Vec<ScanPoint> = cloud.hits().copied().collect();
    cluster_points(hits, eps, min_pts)
}

/// Cluster an explicit list of hit points
pub fn cluster_points(hits: Vec<ScanPoint>, eps: f64, min_pts: usize) -> Clustering {
    if hits.is_empty() {
        return Clustering::default();
    }

    if hits.len() < min_pts {
        tracing::debug!(
            points = hits.len(),
            min_pts,
            "Too few hits to cluster, using a single cluster"
        );
        return Clustering {
            clusters: vec![Cluster::new(hits)],
            noise_points: 0,
        };
    }

    let positions: Vec<Point2<f64>> = hits.iter().map(|p| Point2::new(p.x, p.y)).collect();
    let labels = dbscan(&positions, eps, min_pts);

    let cluster_count = labels.iter().flatten().max().map_or(0, |&max| max + 1);
    let mut clusters = vec![Cluster::default(); cluster_count];
    let mut noise_points = 0;

    for (point, label) in hits.into_iter().zip(labels) {
        match label {
            Some(c) => clusters[c].points.push(point),
            None => noise_points += 1,
        }
    }

    tracing::debug!(clusters = clusters.len(), noise_points, "Clustered hit points");

    Clustering {
        clusters,
        noise_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(x: f64, y: f64) -> ScanPoint {
        ScanPoint::hit(x, y, 6.0, 1.0)
    }

    fn run(x0: f64, y0: f64, dx: f64, dy: f64, n: usize) -> Vec<ScanPoint> {
        (0..n)
            .map(|i| hit(x0 + dx * i as f64, y0 + dy * i as f64))
            .collect()
    }

    #[test]
    fn test_two_separated_runs() {
        let mut points = run(0.0, 20.0, 2.0, 0.0, 21);
        points.extend(run(80.0, 40.0, 0.0, 2.0, 31));

        let result = cluster_points(points, 4.0, 3);
        assert_eq!(result.clusters.len(), 2);
        assert_eq!(result.noise_points, 0);
        assert_eq!(result.clusters[0].len(), 21);
        assert_eq!(result.clusters[1].len(), 31);
    }

    #[test]
    fn test_isolated_point_is_noise() {
        let mut points = run(0.0, 0.0, 2.0, 0.0, 10);
        points.push(hit(50.0, 50.0));

        let result = cluster_points(points, 4.0, 3);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.noise_points, 1);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // The last point has only one neighbour but sits next to a core point
        let points = vec![hit(0.0, 0.0), hit(1.0, 0.0), hit(2.0, 0.0), hit(5.5, 0.0)];

        let result = cluster_points(points, 4.0, 3);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].len(), 4);
    }

    #[test]
    fn test_sparse_input_single_cluster() {
        let points = vec![hit(0.0, 0.0), hit(40.0, 40.0)];
        let result = cluster_points(points, 4.0, 3);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].len(), 2);
    }

    #[test]
    fn test_misses_ignored() {
        let mut cloud = PointCloud::from_points(run(0.0, 0.0, 1.0, 0.0, 5));
        cloud.push(ScanPoint::miss(2.0, 0.5, 0.0));

        let result = cluster_hits(&cloud, 4.0, 3);
        assert_eq!(result.clusters.len(), 1);
        assert!(result.clusters[0].points.iter().all(|p| p.hit));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow_grid() {
        let mut points = run(0.0, 0.0, 2.0, 0.0, 10);
        points.push(hit(f64::MAX, 0.0));
        points.push(hit(-f64::MAX, f64::MAX));

        let result = cluster_points(points, 4.0, 3);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].len(), 10);
        assert_eq!(result.noise_points, 2);
    }

    #[test]
    fn test_empty() {
        let result = cluster_hits(&PointCloud::new(), 4.0, 3);
        assert!(result.clusters.is_empty());
    }
}
