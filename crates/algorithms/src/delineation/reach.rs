//! Subbasin reach combination
//!
//! The flowlines on a subbasin's primary channel are summarised as one
//! reach for the hydrologic model.

use super::linkage::uppermost_member;
use super::watershed::Watershed;
use crate::geometry::FlowlineIndex;
use geo_types::{Coord, LineString};
use hydrodiv_core::{Comid, Error, Network, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Slope floor for combined reaches
pub const MIN_REACH_SLOPE: f64 = 1e-5;

/// Primary channel of a subbasin as a single reach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubbasinReach {
    pub outlet: Comid,
    /// Top flowline of the primary channel
    pub inlet: Comid,
    pub name: Option<String>,
    /// First eight characters of the outlet's reach code
    pub reach_code: Option<String>,
    /// Maximum elevation at the top (m)
    pub max_elev: f64,
    /// Minimum elevation at the outlet (m)
    pub min_elev: f64,
    pub length_km: f64,
    pub slope: f64,
    pub inflow: f64,
    pub outflow: f64,
    pub velocity: f64,
    /// Sum of flowline travel times (h)
    pub travel_time: f64,
    /// Flowlines from the top down to the outlet
    pub path: Vec<Comid>,
}

/// Reach slope from the elevation drop over the length, floored
pub fn reach_slope(top_m: f64, bottom_m: f64, length_km: f64) -> f64 {
    if length_km <= 0.0 {
        return MIN_REACH_SLOPE;
    }
    let slope = (top_m - bottom_m) / (length_km * 1000.0);
    if slope < MIN_REACH_SLOPE || !slope.is_finite() {
        MIN_REACH_SLOPE
    } else {
        slope
    }
}

/// Combine the primary channel of the subbasin at `outlet`.
pub fn combine_reach(network: &Network, watershed: &Watershed, outlet: Comid) -> Result<SubbasinReach> {
    let subbasin = watershed.subbasin(outlet).ok_or(Error::UnknownComid(outlet))?;
    let members: HashSet<Comid> = subbasin.members.iter().copied().collect();
    let top = uppermost_member(network, &members, outlet)?;
    let bottom = network.node(outlet)?;

    let mut path = vec![top];
    if top.comid != outlet {
        for node in network.walk_downstream(top.comid)? {
            path.push(node);
            if node.comid == outlet {
                break;
            }
        }
    }

    let length_km: f64 = path.iter().map(|n| n.length).sum();
    Ok(SubbasinReach {
        outlet,
        inlet: top.comid,
        name: bottom.name.clone(),
        reach_code: bottom.reach_code.as_ref().map(|r| r.chars().take(8).collect()),
        max_elev: top.max_elev,
        min_elev: bottom.min_elev,
        length_km,
        slope: reach_slope(top.max_elev, bottom.min_elev, length_km),
        inflow: top.inflow,
        outflow: bottom.outflow,
        velocity: bottom.velocity,
        travel_time: path.iter().map(|n| n.travel_time).sum(),
        path: path.iter().map(|n| n.comid).collect(),
    })
}

/// Geometry of a combined reach, skipping vertices already seen
pub fn reach_line(flowlines: &FlowlineIndex, reach: &SubbasinReach) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for comid in &reach.path {
        let shape = flowlines.get(*comid)?;
        for c in shape.line.coords() {
            if !coords.contains(c) {
                coords.push(*c);
            }
        }
    }
    (coords.len() >= 2).then(|| LineString::new(coords))
}
