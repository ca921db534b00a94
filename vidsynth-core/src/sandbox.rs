//! Cluster sandbox: synthetic embedding points for the clustering demo.
//!
//! No clustering happens here. Points are scattered around four fixed
//! corners and "Run" simply regenerates them.

use rand::Rng;

use crate::types::ClusterPoint;

/// Smallest selectable cluster count
pub const K_MIN: usize = 2;
/// Largest selectable cluster count
pub const K_MAX: usize = 10;

/// Number of synthetic clusters
pub const CLUSTER_COUNT: usize = 4;

/// Base corner of each synthetic cluster on the 0-100 plane
pub const CLUSTER_BASES: [(f64, f64); CLUSTER_COUNT] =
    [(10.0, 10.0), (70.0, 80.0), (80.0, 20.0), (20.0, 70.0)];

/// Per-axis spread added to the base corner
pub const JITTER: f64 = 15.0;

/// Generate `count` synthetic points.
pub fn generate_cluster_points<R: Rng>(count: usize, rng: &mut R) -> Vec<ClusterPoint> {
    (0..count)
        .map(|i| {
            let cluster_id = rng.gen_range(0..CLUSTER_COUNT);
            let (x_base, y_base) = CLUSTER_BASES[cluster_id];
            ClusterPoint {
                id: format!("c-{}", i),
                x: x_base + rng.gen_range(0.0..JITTER),
                y: y_base + rng.gen_range(0.0..JITTER),
                cluster_id,
                thumbnail: format!("https://picsum.photos/100/100?random={}", i + 500),
            }
        })
        .collect()
}

/// Clamp a cluster count into the selectable range.
pub fn clamp_k(k: usize) -> usize {
    k.clamp(K_MIN, K_MAX)
}

/// Placeholder topic labels for `k` clusters, 1-based.
pub fn topic_labels(k: usize) -> Vec<String> {
    (1..=clamp_k(k))
        .map(|i| format!("Latent Label: \"Topic {}\"", i))
        .collect()
}

/// Sandbox view state.
#[derive(Debug, Clone)]
pub struct Sandbox {
    points: Vec<ClusterPoint>,
    point_count: usize,
    k: usize,
}

impl Sandbox {
    pub fn new<R: Rng>(point_count: usize, k: usize, rng: &mut R) -> Self {
        Self {
            points: generate_cluster_points(point_count, rng),
            point_count,
            k: clamp_k(k),
        }
    }

    pub fn points(&self) -> &[ClusterPoint] {
        &self.points
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Change k by `delta`, staying within range.
    pub fn adjust_k(&mut self, delta: isize) {
        let next = self.k as isize + delta;
        self.k = clamp_k(next.max(0) as usize);
    }

    /// Regenerate the point cloud.
    pub fn run<R: Rng>(&mut self, rng: &mut R) {
        self.points = generate_cluster_points(self.point_count, rng);
        tracing::debug!(points = self.points.len(), k = self.k, "Sandbox regenerated");
    }
}
