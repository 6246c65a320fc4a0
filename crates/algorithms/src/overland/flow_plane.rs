//! Subbasin flow planes
//!
//! Catchment overland parameters are combined per subbasin by area-weighted
//! mean. The centroid comes from the merged outline of the catchments.

use super::cache::FlowPlaneCache;
use super::catchment::{catchment_plane, Catchment, CatchmentGeometry, CatchmentPlane, OverlandParams};
use crate::delineation::Watershed;
use crate::geometry::{default_strategies, merge_polygons, multipolygon_centroid, polygon_centroid, FlowlineIndex, MergeStrategy};
use crate::maybe_rayon::*;
use geo_types::{Coord, Polygon};
use hydrodiv_core::{Comid, ElevationSampler, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Overland flow plane of one subbasin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubbasinFlowPlane {
    pub outlet: Comid,
    /// Area-weighted overland flow length (m)
    pub length_m: f64,
    /// Area-weighted overland slope
    pub slope: f64,
    pub centroid: Coord<f64>,
    /// Area-weighted mean elevation (m)
    pub elevation_m: f64,
    /// Total catchment area (km²)
    pub area_km2: f64,
    /// Catchments contributing to the averages
    pub catchments: usize,
}

/// Centroid of polygons weighted by area, for when no outline can be merged
fn weighted_centroid(parts: &[(&Polygon<f64>, f64)]) -> Option<Coord<f64>> {
    let (mut x, mut y, mut w) = (0.0, 0.0, 0.0);
    for (polygon, area) in parts {
        if let Some(c) = polygon_centroid(polygon) {
            x += c.x * area;
            y += c.y * area;
            w += area;
        }
    }
    (w > 0.0).then(|| Coord { x: x / w, y: y / w })
}

/// Combine sampled catchments into one subbasin flow plane.
///
/// Degenerate catchments are logged and left out of the averages. Fails
/// with [`Error::DegenerateGeometry`] only when no catchment is usable.
pub fn aggregate_flow_plane(
    outlet: Comid,
    geometries: &[CatchmentGeometry],
    params: &OverlandParams,
    strategies: &[Box<dyn MergeStrategy>],
) -> Result<SubbasinFlowPlane> {
    let mut planes: Vec<(&CatchmentGeometry, CatchmentPlane)> = Vec::with_capacity(geometries.len());
    for geometry in geometries {
        match catchment_plane(geometry, params) {
            Ok(plane) => planes.push((geometry, plane)),
            Err(e) if e.is_recoverable() => {
                warn!(%outlet, catchment = %geometry.comid, error = %e, "excluding catchment");
            }
            Err(e) => return Err(e),
        }
    }
    if planes.is_empty() {
        return Err(Error::DegenerateGeometry(format!(
            "subbasin {outlet} has no usable catchments"
        )));
    }

    let weight: f64 = planes.iter().map(|(_, p)| p.area_km2).sum();
    let mean = |f: fn(&CatchmentPlane) -> f64| planes.iter().map(|(_, p)| p.area_km2 * f(p)).sum::<f64>() / weight;

    let polygons: Vec<Polygon<f64>> = planes.iter().map(|(g, _)| g.polygon.clone()).collect();
    let centroid = match merge_polygons(&polygons, strategies) {
        Ok(outline) => multipolygon_centroid(&outline),
        Err(e) => {
            warn!(%outlet, error = %e, "no merged outline, using area-weighted centroid");
            None
        }
    };
    let centroid = match centroid {
        Some(c) => c,
        None => {
            let parts: Vec<(&Polygon<f64>, f64)> = planes.iter().map(|(g, p)| (&g.polygon, p.area_km2)).collect();
            weighted_centroid(&parts).ok_or_else(|| {
                Error::DegenerateGeometry(format!("subbasin {outlet} has no centroid"))
            })?
        }
    };

    let area_km2 = geometries
        .iter()
        .map(|g| g.area_km2)
        .filter(|a| a.is_finite() && *a > 0.0)
        .sum();

    Ok(SubbasinFlowPlane {
        outlet,
        length_m: 1000.0 * mean(|p| p.length_km),
        slope: mean(|p| p.slope),
        centroid,
        elevation_m: mean(|p| p.elevation_m),
        area_km2,
        catchments: planes.len(),
    })
}

/// Flow planes for every subbasin of a membership map from pre-sampled
/// catchments. Subbasins without usable catchments are logged and skipped.
pub fn flow_planes_from_samples(
    membership: &BTreeMap<Comid, Vec<Comid>>,
    geometries: &[CatchmentGeometry],
    params: &OverlandParams,
    strategies: &[Box<dyn MergeStrategy>],
) -> Result<Vec<SubbasinFlowPlane>> {
    let by_comid: HashMap<Comid, &CatchmentGeometry> = geometries.iter().map(|g| (g.comid, g)).collect();

    let results: Vec<Result<SubbasinFlowPlane>> = membership
        .iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(outlet, members)| {
            let group: Vec<CatchmentGeometry> = members
                .iter()
                .filter_map(|c| by_comid.get(c).map(|g| (*g).clone()))
                .collect();
            aggregate_flow_plane(*outlet, &group, params, strategies)
        })
        .collect();

    collect_planes(results)
}

fn collect_planes(results: Vec<Result<SubbasinFlowPlane>>) -> Result<Vec<SubbasinFlowPlane>> {
    let mut planes = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(plane) => planes.push(plane),
            Err(e) if e.is_recoverable() => warn!(error = %e, "skipping subbasin flow plane"),
            Err(e) => return Err(e),
        }
    }
    Ok(planes)
}

/// Samples catchments and estimates subbasin flow planes, caching results
/// by subbasin outlet.
pub struct FlowPlaneEstimator<'a, S: ElevationSampler> {
    sampler: &'a S,
    params: OverlandParams,
    strategies: Vec<Box<dyn MergeStrategy>>,
    cache: FlowPlaneCache,
}

impl<'a, S: ElevationSampler> FlowPlaneEstimator<'a, S> {
    pub fn new(sampler: &'a S) -> Self {
        Self {
            sampler,
            params: OverlandParams::default(),
            strategies: default_strategies(),
            cache: FlowPlaneCache::default(),
        }
    }

    pub fn with_params(mut self, params: OverlandParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<Box<dyn MergeStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = FlowPlaneCache::new(capacity);
        self
    }

    pub fn cache(&self) -> &FlowPlaneCache {
        &self.cache
    }

    /// Sample catchments, excluding any whose flowline geometry is missing
    fn sample(&self, outlet: Comid, catchments: &[&Catchment], flowlines: &FlowlineIndex) -> Result<Vec<CatchmentGeometry>> {
        let mut sampled = Vec::with_capacity(catchments.len());
        for catchment in catchments {
            let Some(shape) = flowlines.get(catchment.comid) else {
                warn!(%outlet, catchment = %catchment.comid, "no flowline geometry, excluding catchment");
                continue;
            };
            sampled.push(CatchmentGeometry::sample(catchment, &shape.line, self.sampler)?);
        }
        Ok(sampled)
    }

    /// Flow plane of the subbasin at `outlet` from its catchments.
    pub fn estimate(
        &self,
        outlet: Comid,
        catchments: &[&Catchment],
        flowlines: &FlowlineIndex,
    ) -> Result<SubbasinFlowPlane> {
        if let Some(plane) = self.cache.get(outlet) {
            debug!(%outlet, "flow plane cache hit");
            return Ok(plane);
        }
        let sampled = self.sample(outlet, catchments, flowlines)?;
        let plane = aggregate_flow_plane(outlet, &sampled, &self.params, &self.strategies)?;
        self.cache.insert(plane.clone());
        Ok(plane)
    }

    /// Flow planes for every subbasin of a watershed, in subbasin order.
    ///
    /// Subbasins run in parallel. Those without usable catchments are
    /// logged and skipped.
    pub fn estimate_all(
        &self,
        watershed: &Watershed,
        catchments: &[Catchment],
        flowlines: &FlowlineIndex,
    ) -> Result<Vec<SubbasinFlowPlane>> {
        let by_comid: HashMap<Comid, &Catchment> = catchments.iter().map(|c| (c.comid, c)).collect();

        let results: Vec<Result<SubbasinFlowPlane>> = watershed
            .subbasins
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|subbasin| {
                let group: Vec<&Catchment> = subbasin
                    .members
                    .iter()
                    .filter_map(|c| by_comid.get(c).copied())
                    .collect();
                self.estimate(subbasin.outlet, &group, flowlines)
            })
            .collect();

        collect_planes(results)
    }
}
