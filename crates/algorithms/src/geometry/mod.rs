//! Distance and geometry kernel
//!
//! - Geodesic distance approximation for short separations
//! - Shoelace centroids for rings, polygons and polygon sets
//! - Nearest-flowline matching for point features
//! - k-d tree for nearest elevation sample lookups
//! - Ordered polygon merge strategies

mod centroid;
mod distance;
mod kdtree;
mod matching;
mod merge;

pub use centroid::{multipolygon_centroid, polygon_centroid, ring_area, ring_centroid};
pub use distance::{geodesic_distance_km, planar_distance_sq};
pub use kdtree::{KdTree, NearestResult};
pub use matching::{BoundingBox, FlowlineIndex};
pub use merge::{
    default_strategies, merge_polygons, BooleanUnion, CleanedUnion, HullMerge, MergeStrategy,
};
