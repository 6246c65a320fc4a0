//! # hydrodiv algorithms
//!
//! Watershed subdivision and overland flow-plane estimation over a
//! flowline [`Network`](hydrodiv_core::Network).
//!
//! ## Modules
//!
//! - **geometry**: geodesic distance, centroids, nearest-flowline matching, polygon merge
//! - **delineation**: outlet selection, connectivity, subdivision, subbasin linkage
//! - **overland**: catchment and subbasin overland flow length and slope

pub mod delineation;
pub mod geometry;
pub mod overland;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::delineation::{
        delineate, extract_watershed, estimate_outlet_flow, outlet_records, summarize,
        Delineation, DelineationParams, GagedFlowlines, Linkage, OutletKind, OutletRecord,
        OutletSet, OutletSources, Subbasin, SubbasinClass, SubbasinSummary, Watershed,
    };
    pub use crate::geometry::{geodesic_distance_km, FlowlineIndex, MergeStrategy};
    pub use crate::overland::{
        aggregate_flow_plane, Catchment, CatchmentGeometry, FlowPlaneEstimator, OverlandParams,
        SubbasinFlowPlane,
    };
    pub use hydrodiv_core::prelude::*;
}
