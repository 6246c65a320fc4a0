//! Flowline attribute records

use super::{Comid, Seq};
use serde::{Deserialize, Serialize};

/// One flowline of the drainage network with its hydrologic attributes.
///
/// Units follow the NHDPlus value-added attributes after conversion:
/// areas in km², length in km, elevations in m, flows in cfs,
/// velocity in ft/s and travel time in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowlineNode {
    pub comid: Comid,
    pub seq: Seq,
    /// Major upstream neighbor
    #[serde(default)]
    pub up: Option<Seq>,
    #[serde(default)]
    pub down: Option<Seq>,
    /// Local drainage contribution (km²)
    #[serde(default)]
    pub incremental_area: f64,
    /// Total drainage area through this flowline (km²)
    pub cumulative_area: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub max_elev: f64,
    #[serde(default)]
    pub min_elev: f64,
    #[serde(default)]
    pub inflow: f64,
    #[serde(default)]
    pub outflow: f64,
    #[serde(default)]
    pub velocity: f64,
    #[serde(default)]
    pub travel_time: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reach_code: Option<String>,
}

impl FlowlineNode {
    /// Create a node with topology and areas only; other attributes zeroed.
    pub fn new(
        comid: u64,
        seq: u64,
        up: Option<u64>,
        down: Option<u64>,
        cumulative_area: f64,
    ) -> Self {
        Self {
            comid: Comid(comid),
            seq: Seq(seq),
            up: up.map(Seq),
            down: down.map(Seq),
            incremental_area: 0.0,
            cumulative_area,
            length: 0.0,
            max_elev: 0.0,
            min_elev: 0.0,
            inflow: 0.0,
            outflow: 0.0,
            velocity: 0.0,
            travel_time: 0.0,
            name: None,
            reach_code: None,
        }
    }

    /// Mean of the modeled inflow and outflow
    pub fn mean_flow(&self) -> f64 {
        (self.inflow + self.outflow) / 2.0
    }

    /// True when nothing flows into this flowline at all
    pub fn is_headwater(&self) -> bool {
        self.up.is_none()
    }

    pub(crate) fn normalize(&mut self) {
        if self.up == Some(Seq::NONE) {
            self.up = None;
        }
        if self.down == Some(Seq::NONE) {
            self.down = None;
        }
    }
}
