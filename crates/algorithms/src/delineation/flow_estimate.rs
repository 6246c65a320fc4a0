//! Average flow at outlets
//!
//! Gaged outlets take the gage's recorded average flow. Elsewhere the flow
//! is interpolated by drainage area between the nearest gaged flowlines
//! below and above the outlet.

use super::outlets::OutletSources;
use hydrodiv_core::{Comid, FlowlineNode, GageRecord, Network, Result};
use std::collections::HashMap;
use tracing::debug;

/// Gages placed on network flowlines; the first gage listed wins a flowline
#[derive(Debug, Clone, Default)]
pub struct GagedFlowlines {
    by_comid: HashMap<Comid, GageRecord>,
}

impl GagedFlowlines {
    /// Match every gage in `sources` to a flowline of the network.
    ///
    /// Gages that cannot be placed are skipped.
    pub fn match_gages(network: &Network, sources: &OutletSources) -> Self {
        let mut by_comid = HashMap::new();
        for gage in &sources.gages {
            match sources.flowlines.closest_flowline(gage.location) {
                Ok(comid) if network.contains(comid) => {
                    by_comid.entry(comid).or_insert_with(|| gage.clone());
                }
                Ok(_) => {}
                Err(e) => debug!(site_no = %gage.site_no, error = %e, "gage not placed"),
            }
        }
        Self { by_comid }
    }

    pub fn len(&self) -> usize {
        self.by_comid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_comid.is_empty()
    }

    pub fn get(&self, comid: Comid) -> Option<&GageRecord> {
        self.by_comid.get(&comid)
    }

    /// Flow (cfs) and drainage area (km²) recorded at a flowline.
    ///
    /// Gages without an average flow do not count. A gage without a
    /// published drainage area uses the flowline's cumulative area.
    fn observation(&self, node: &FlowlineNode) -> Option<(f64, f64)> {
        let gage = self.by_comid.get(&node.comid)?;
        let flow = gage.average_flow?;
        let area = gage.drainage_area_km2().unwrap_or(node.cumulative_area);
        Some((flow, area))
    }
}

/// Linear interpolation of flow by drainage area
pub fn interpolate_flow(area: f64, (q_up, a_up): (f64, f64), (q_down, a_down): (f64, f64)) -> f64 {
    if q_up == q_down {
        return q_up;
    }
    if a_down == a_up {
        return q_down;
    }
    q_up + (q_down - q_up) * (area - a_up) / (a_down - a_up)
}

/// Average flow (cfs) at an outlet.
///
/// Without a gage below, the flow at the lowest flowline (mean of inflow
/// and outflow) bounds the interpolation. Without a gage above, the upper
/// bound is zero flow at zero area.
pub fn estimate_outlet_flow(network: &Network, gaged: &GagedFlowlines, outlet: Comid) -> Result<f64> {
    let node = network.node(outlet)?;
    if let Some((flow, _)) = gaged.observation(node) {
        return Ok(flow);
    }

    let mut lowest = node;
    let mut below = None;
    for down in network.walk_downstream(outlet)? {
        lowest = down;
        if let Some(obs) = gaged.observation(down) {
            below = Some(obs);
            break;
        }
    }
    let below = below.unwrap_or((lowest.mean_flow(), lowest.cumulative_area));

    let mut above = (0.0, 0.0);
    let mut current = network.major_tributary(outlet)?;
    while let Some(up) = current {
        if let Some(obs) = gaged.observation(up) {
            above = obs;
            break;
        }
        current = network.major_tributary(up.comid)?;
    }

    Ok(interpolate_flow(node.cumulative_area, above, below))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FlowlineIndex;
    use approx::assert_relative_eq;
    use hydrodiv_core::FlowlineShape;

    /// Chain 1 → 2 → 3 → 4 along the x axis, one degree per flowline
    fn network() -> Network {
        let mut nodes = vec![
            FlowlineNode::new(1, 1, None, Some(2), 10.0),
            FlowlineNode::new(2, 2, Some(1), Some(3), 30.0),
            FlowlineNode::new(3, 3, Some(2), Some(4), 50.0),
            FlowlineNode::new(4, 4, Some(3), None, 70.0),
        ];
        nodes[3].inflow = 90.0;
        nodes[3].outflow = 110.0;
        Network::from_records(nodes).unwrap()
    }

    fn sources(gages: Vec<GageRecord>) -> OutletSources {
        OutletSources {
            flowlines: FlowlineIndex::new(
                (1..=4)
                    .map(|i| {
                        let x = i as f64;
                        FlowlineShape::new(i, vec![(x - 1.0, 0.0), (x, 0.5)])
                    })
                    .collect(),
            ),
            gages,
            ..Default::default()
        }
    }

    fn gage(site: &str, x: f64, flow: f64, area_sqmi: Option<f64>) -> GageRecord {
        let mut g = GageRecord::new(site, x, 0.25);
        g.average_flow = Some(flow);
        g.drainage_area_sqmi = area_sqmi;
        g
    }

    #[test]
    fn test_interpolation_formula() {
        assert_relative_eq!(interpolate_flow(30.0, (10.0, 10.0), (50.0, 50.0)), 30.0);
        assert_relative_eq!(interpolate_flow(30.0, (5.0, 20.0), (5.0, 40.0)), 5.0);
        assert_relative_eq!(interpolate_flow(30.0, (5.0, 20.0), (9.0, 20.0)), 9.0);
    }

    #[test]
    fn test_gaged_outlet_uses_record() {
        let net = network();
        let gaged = GagedFlowlines::match_gages(&net, &sources(vec![gage("G2", 1.5, 42.0, None)]));
        assert_eq!(gaged.len(), 1);
        assert_relative_eq!(estimate_outlet_flow(&net, &gaged, Comid(2)).unwrap(), 42.0);
    }

    #[test]
    fn test_interpolate_between_gages() {
        let net = network();
        // 10 cfs over 10 km² above, 70 cfs over 70 km² (published in mi²) below
        let gaged = GagedFlowlines::match_gages(
            &net,
            &sources(vec![
                gage("UP", 0.5, 10.0, None),
                gage("DOWN", 3.5, 70.0, Some(70.0 / 2.59)),
            ]),
        );
        assert_relative_eq!(estimate_outlet_flow(&net, &gaged, Comid(3)).unwrap(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_gages_uses_lowest_flowline() {
        let net = network();
        let gaged = GagedFlowlines::default();
        // zero at zero area up to 100 cfs at 70 km²
        assert_relative_eq!(
            estimate_outlet_flow(&net, &gaged, Comid(2)).unwrap(),
            100.0 * 30.0 / 70.0,
            epsilon = 1e-9
        );
    }
}
