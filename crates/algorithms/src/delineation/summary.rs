//! Per-subbasin hand-off for model assembly

use super::reach::{combine_reach, SubbasinReach};
use super::watershed::{Linkage, SubbasinClass, Watershed};
use crate::overland::SubbasinFlowPlane;
use hydrodiv_core::{Comid, Network, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Everything the model builder needs about one subbasin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubbasinSummary {
    pub outlet: Comid,
    pub class: SubbasinClass,
    pub downstream: Linkage,
    pub upstream: Vec<Comid>,
    pub flowlines: usize,
    /// Sum of member incremental areas (km²)
    pub local_area_km2: f64,
    pub reach: SubbasinReach,
    pub flow_plane: Option<SubbasinFlowPlane>,
}

/// Join linkage, reach and flow plane for every subbasin, in outlet order.
pub fn summarize(
    network: &Network,
    watershed: &Watershed,
    planes: &[SubbasinFlowPlane],
) -> Result<Vec<SubbasinSummary>> {
    let planes: HashMap<Comid, &SubbasinFlowPlane> = planes.iter().map(|p| (p.outlet, p)).collect();

    watershed
        .subbasins
        .iter()
        .map(|s| {
            let local_area_km2 = s
                .members
                .iter()
                .map(|&c| network.node(c).map(|n| n.incremental_area))
                .sum::<Result<f64>>()?;
            Ok(SubbasinSummary {
                outlet: s.outlet,
                class: s.class,
                downstream: s.downstream,
                upstream: s.upstream.clone(),
                flowlines: s.members.len(),
                local_area_km2,
                reach: combine_reach(network, watershed, s.outlet)?,
                flow_plane: planes.get(&s.outlet).map(|p| (*p).clone()),
            })
        })
        .collect()
}
