//! 2D k-d tree over elevation samples
//!
//! Nearest-neighbor search for matching catchment interior samples to the
//! closest flowline sample. Distances are planar in coordinate units, so
//! the tree ranks candidates but does not measure them.
//!
//! Reference:
//! Bentley, J.L. (1975). Multidimensional binary search trees used
//! for associative searching. CACM, 18(9).

use hydrodiv_core::ElevationSample;

/// A 2D k-d tree for nearest-sample queries.
#[derive(Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    /// Samples in input order; nodes refer to them by index
    points: Vec<ElevationSample>,
}

#[derive(Debug)]
struct KdNode {
    /// Index into `points`
    point_idx: usize,
    /// Split dimension: 0 = x, 1 = y
    split_dim: u8,
    left: Option<usize>,
    right: Option<usize>,
}

/// Result of a nearest-neighbor query
#[derive(Debug, Clone, Copy)]
pub struct NearestResult {
    pub point: ElevationSample,
    pub distance_sq: f64,
    /// Position of the sample in the input slice
    pub index: usize,
}

impl KdTree {
    /// Build a k-d tree from samples.
    ///
    /// Construction is O(n log n) using median-of-coordinate splitting.
    pub fn build(points: &[ElevationSample]) -> Self {
        if points.is_empty() {
            return Self {
                nodes: Vec::new(),
                points: Vec::new(),
            };
        }

        let mut indices: Vec<usize> = (0..points.len()).collect();
        let stored_points = points.to_vec();
        let mut nodes = Vec::with_capacity(points.len());

        build_recursive(&stored_points, &mut indices, 0, &mut nodes);

        Self {
            nodes,
            points: stored_points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Find the single nearest sample to (qx, qy).
    ///
    /// Equidistant samples resolve to the one earliest in the input.
    /// Returns `None` if the tree is empty.
    pub fn nearest(&self, qx: f64, qy: f64) -> Option<NearestResult> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best_dist_sq = f64::MAX;
        let mut best_idx = usize::MAX;

        self.nearest_recursive(0, qx, qy, &mut best_dist_sq, &mut best_idx);

        Some(NearestResult {
            point: self.points[best_idx],
            distance_sq: best_dist_sq,
            index: best_idx,
        })
    }

    fn nearest_recursive(
        &self,
        node_idx: usize,
        qx: f64,
        qy: f64,
        best_dist_sq: &mut f64,
        best_idx: &mut usize,
    ) {
        let node = &self.nodes[node_idx];
        let p = &self.points[node.point_idx];

        let dx = qx - p.x;
        let dy = qy - p.y;
        let dist_sq = dx * dx + dy * dy;

        if dist_sq < *best_dist_sq || (dist_sq == *best_dist_sq && node.point_idx < *best_idx) {
            *best_dist_sq = dist_sq;
            *best_idx = node.point_idx;
        }

        let diff = if node.split_dim == 0 { dx } else { dy };
        let (first, second) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(child) = first {
            self.nearest_recursive(child, qx, qy, best_dist_sq, best_idx);
        }

        // <= so equidistant samples across the split are still visited
        if diff * diff <= *best_dist_sq {
            if let Some(child) = second {
                self.nearest_recursive(child, qx, qy, best_dist_sq, best_idx);
            }
        }
    }
}

fn build_recursive(
    points: &[ElevationSample],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> usize {
    let n = indices.len();
    let split_dim = (depth % 2) as u8;

    let key = |i: usize| if split_dim == 0 { points[i].x } else { points[i].y };
    indices.sort_by(|&a, &b| key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal));

    let median = n / 2;
    let point_idx = indices[median];

    let node_idx = nodes.len();
    nodes.push(KdNode {
        point_idx,
        split_dim,
        left: None,
        right: None,
    });

    if median > 0 {
        let left_idx = build_recursive(points, &mut indices[..median], depth + 1, nodes);
        nodes[node_idx].left = Some(left_idx);
    }

    if median + 1 < n {
        let right_idx = build_recursive(points, &mut indices[median + 1..], depth + 1, nodes);
        nodes[node_idx].right = Some(right_idx);
    }

    node_idx
}
