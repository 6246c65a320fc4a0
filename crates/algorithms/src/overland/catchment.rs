//! Catchment sampling and per-catchment overland flow

use crate::geometry::{geodesic_distance_km, KdTree};
use geo_types::{LineString, Polygon};
use hydrodiv_core::{Comid, ElevationSample, ElevationSampler, Error, Result};
use serde::{Deserialize, Serialize};

/// Clamp applied to near-coincident sample pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlandParams {
    /// Separations below this (km) are clamped
    pub tolerance_km: f64,
    /// Slope assigned to clamped pairs
    pub min_slope: f64,
}

impl Default for OverlandParams {
    fn default() -> Self {
        Self {
            tolerance_km: 0.1,
            min_slope: 1e-5,
        }
    }
}

/// A catchment polygon draining to one flowline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catchment {
    /// Flowline the catchment drains to
    pub comid: Comid,
    pub polygon: Polygon<f64>,
    pub area_km2: f64,
}

/// A catchment with its elevation samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentGeometry {
    pub comid: Comid,
    pub polygon: Polygon<f64>,
    pub area_km2: f64,
    /// Samples inside the polygon
    pub interior: Vec<ElevationSample>,
    /// Samples along the catchment's flowline
    pub flowline: Vec<ElevationSample>,
}

impl CatchmentGeometry {
    /// Sample a catchment and its flowline
    pub fn sample<S: ElevationSampler + ?Sized>(
        catchment: &Catchment,
        flowline: &LineString<f64>,
        sampler: &S,
    ) -> Result<Self> {
        Ok(Self {
            comid: catchment.comid,
            polygon: catchment.polygon.clone(),
            area_km2: catchment.area_km2,
            interior: sampler.sample_in_polygon(&catchment.polygon)?,
            flowline: sampler.sample_along(flowline)?,
        })
    }
}

/// Overland flow of one catchment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatchmentPlane {
    pub comid: Comid,
    pub area_km2: f64,
    /// Mean overland length (km)
    pub length_km: f64,
    /// Mean overland slope
    pub slope: f64,
    /// Mean interior elevation (m)
    pub elevation_m: f64,
    pub samples: usize,
}

/// Overland length (km) and slope between an interior sample and its
/// nearest channel sample.
///
/// The length is half the separation, the average distance to the channel
/// across the plane. Pairs closer than the tolerance get the tolerance as
/// length and the minimum slope.
pub fn overland_segment(
    interior: &ElevationSample,
    channel: &ElevationSample,
    params: &OverlandParams,
) -> (f64, f64) {
    let distance_km = geodesic_distance_km(interior.coord(), channel.coord());
    if distance_km < params.tolerance_km {
        return (params.tolerance_km, params.min_slope);
    }
    let slope = (interior.z - channel.z) / (distance_km * 1000.0);
    (distance_km / 2.0, slope)
}

/// Mean overland length and slope of a sampled catchment.
///
/// Each interior sample is paired with the planar-nearest flowline
/// sample. Fails with [`Error::DegenerateGeometry`] when the catchment has
/// no usable area or samples.
pub fn catchment_plane(geometry: &CatchmentGeometry, params: &OverlandParams) -> Result<CatchmentPlane> {
    let comid = geometry.comid;
    if !geometry.area_km2.is_finite() || geometry.area_km2 <= 0.0 {
        return Err(Error::DegenerateGeometry(format!("catchment {comid} has no area")));
    }
    if geometry.interior.is_empty() {
        return Err(Error::DegenerateGeometry(format!("catchment {comid} has no interior samples")));
    }
    let tree = KdTree::build(&geometry.flowline);
    if tree.is_empty() {
        return Err(Error::DegenerateGeometry(format!("catchment {comid} has no flowline samples")));
    }

    let (mut length_sum, mut slope_sum, mut z_sum) = (0.0, 0.0, 0.0);
    for point in &geometry.interior {
        if let Some(nearest) = tree.nearest(point.x, point.y) {
            let (length, slope) = overland_segment(point, &nearest.point, params);
            length_sum += length;
            slope_sum += slope;
        }
        z_sum += point.z;
    }

    let n = geometry.interior.len() as f64;
    Ok(CatchmentPlane {
        comid,
        area_km2: geometry.area_km2,
        length_km: length_sum / n,
        slope: slope_sum / n,
        elevation_m: z_sum / n,
        samples: geometry.interior.len(),
    })
}
