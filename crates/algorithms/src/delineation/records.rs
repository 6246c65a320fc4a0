//! Outlet attribute records for model assembly

use super::flow_estimate::{estimate_outlet_flow, GagedFlowlines};
use super::outlet_set::{OutletKind, OutletSet};
use super::outlets::OutletSources;
use geo_types::Coord;
use hydrodiv_core::{Comid, Network, Result};
use serde::Serialize;

/// Attributes of one outlet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutletRecord {
    pub comid: Comid,
    #[serde(flatten)]
    pub kind: OutletKind,
    /// Downstream end of the outlet flowline, when its geometry is known
    pub location: Option<Coord<f64>>,
    pub name: Option<String>,
    pub reach_code: Option<String>,
    pub nid: Option<String>,
    pub site_no: Option<String>,
    pub web: Option<String>,
    pub drainage_area_km2: f64,
    /// Recorded or estimated average flow (cfs)
    pub average_flow: f64,
}

/// One record per outlet, in outlet order.
pub fn outlet_records(
    network: &Network,
    outlets: &OutletSet,
    sources: &OutletSources,
    gaged: &GagedFlowlines,
) -> Result<Vec<OutletRecord>> {
    outlets
        .entries()
        .map(|(comid, kind)| {
            let node = network.node(comid)?;
            let (nid, site_no) = match kind {
                OutletKind::Dam { nid } => (Some(nid.clone()), None),
                OutletKind::Gage { site_no } => (None, Some(site_no.clone())),
                _ => (None, gaged.get(comid).map(|g| g.site_no.clone())),
            };
            let web = site_no.as_ref().and_then(|site| {
                sources
                    .gages
                    .iter()
                    .find(|g| &g.site_no == site)
                    .and_then(|g| g.web.clone())
            });

            Ok(OutletRecord {
                comid,
                kind: kind.clone(),
                location: sources.flowlines.get(comid).and_then(|s| s.outlet_point()),
                name: node.name.clone(),
                reach_code: node.reach_code.clone(),
                nid,
                site_no,
                web,
                drainage_area_km2: node.cumulative_area,
                average_flow: estimate_outlet_flow(network, gaged, comid)?,
            })
        })
        .collect()
}
