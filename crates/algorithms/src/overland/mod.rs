//! Overland flow planes
//!
//! Each catchment gets an overland flow length and slope from the nearest
//! flowline sample to each of its interior elevation samples. Subbasin
//! values are area-weighted means over member catchments, computed in
//! parallel and cached by subbasin outlet.

mod cache;
mod catchment;
mod flow_plane;

pub use cache::{FlowPlaneCache, DEFAULT_CACHE_CAPACITY};
pub use catchment::{
    catchment_plane, overland_segment, Catchment, CatchmentGeometry, CatchmentPlane, OverlandParams,
};
pub use flow_plane::{aggregate_flow_plane, flow_planes_from_samples, FlowPlaneEstimator, SubbasinFlowPlane};
