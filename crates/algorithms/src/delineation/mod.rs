//! Watershed subdivision
//!
//! Partitions a flowline network into subbasins bounded by outlets:
//!
//! 1. Outlet selection: terminal, parallel delta, dams, gages, extra points
//! 2. Connectivity: outlets are joined to the main channel
//! 3. Subdivision: outlets are added until drainage-area spans fit `drainmax`
//! 4. Assembly: each outlet owns its upstream closure
//! 5. Mass linkage: subbasins are linked downstream and classified
//!
//! Supporting operations extract gage watersheds, combine subbasin reaches,
//! estimate outlet flows and build outlet records.

mod connectivity;
mod extract;
mod flow_estimate;
mod linkage;
mod outlet_set;
mod outlets;
mod reach;
mod records;
mod subbasins;
mod subdivide;
mod summary;
mod watershed;

pub use connectivity::{main_channel, resolve_connectivity, ConnectivityParams};
pub use extract::{extract_watershed, upstream_updown};
pub use flow_estimate::{estimate_outlet_flow, interpolate_flow, GagedFlowlines};
pub use linkage::{build_watershed, classify, downstream_link, uppermost_member};
pub use outlet_set::{OutletKind, OutletSet};
pub use outlets::{add_terminal_outlets, select_outlets, OutletParams, OutletSources};
pub use reach::{combine_reach, reach_line, reach_slope, SubbasinReach, MIN_REACH_SLOPE};
pub use records::{outlet_records, OutletRecord};
pub use subbasins::{assemble_subbasins, Membership};
pub use subdivide::{subdivide, SubdivideParams};
pub use summary::{summarize, SubbasinSummary};
pub use watershed::{Linkage, Subbasin, SubbasinClass, Watershed};

use hydrodiv_core::{Algorithm, Error, Network, Result};
use tracing::info;

/// Parameters for the full delineation pipeline
#[derive(Debug, Clone, Default)]
pub struct DelineationParams {
    pub outlets: OutletParams,
    pub connectivity: ConnectivityParams,
    pub subdivide: SubdivideParams,
}

/// Network plus the point features that force outlets
#[derive(Debug, Clone)]
pub struct DelineationInput {
    pub network: Network,
    pub sources: OutletSources,
}

/// Watershed delineation algorithm
#[derive(Debug, Clone, Default)]
pub struct Delineation;

impl Algorithm for Delineation {
    type Input = DelineationInput;
    type Output = Watershed;
    type Params = DelineationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Delineation"
    }

    fn description(&self) -> &'static str {
        "Subdivide a flowline network into linked subbasins"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        delineate(&input.network, &input.sources, &params)
    }
}

/// Run the full pipeline: select, connect, subdivide, assemble, link.
pub fn delineate(
    network: &Network,
    sources: &OutletSources,
    params: &DelineationParams,
) -> Result<Watershed> {
    let mut outlets = select_outlets(network, sources, &params.outlets)?;
    resolve_connectivity(network, &mut outlets, &params.connectivity)?;
    subdivide(network, &mut outlets, &params.subdivide)?;

    let membership = assemble_subbasins(network, &outlets)?;
    let watershed = build_watershed(network, outlets, membership)?;
    info!(
        flowlines = network.len(),
        subbasins = watershed.len(),
        "delineated watershed"
    );
    Ok(watershed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrodiv_core::{Comid, FlowlineNode};

    fn network() -> Network {
        Network::from_records(vec![
            FlowlineNode::new(1, 1, None, Some(3), 30.0),
            FlowlineNode::new(2, 2, None, Some(3), 25.0),
            FlowlineNode::new(3, 3, Some(1), None, 60.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_algorithm_default_params() {
        let input = DelineationInput {
            network: network(),
            sources: OutletSources::default(),
        };
        let ws = Delineation.execute_default(input).unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.subbasins[0].members.len(), 3);
        assert_eq!(ws.exits(), vec![Comid(3)]);
    }

    #[test]
    fn test_inverted_years_rejected() {
        let params = DelineationParams {
            outlets: OutletParams {
                huc: None,
                years: Some((2000, 1990)),
            },
            ..Default::default()
        };
        let err = delineate(&network(), &OutletSources::default(), &params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "years", .. }));
    }
}
