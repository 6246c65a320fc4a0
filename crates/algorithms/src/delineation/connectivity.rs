//! Main channel tracing and connectivity outlets
//!
//! The main channel runs from every inlet down to the network root. When
//! the extent has no inlets it is traced upstream from the terminal outlet
//! along the major tributary. Every outlet off the main channel is walked
//! downstream until it joins the channel.

use super::outlet_set::{OutletKind, OutletSet};
use hydrodiv_core::{Comid, FlowlineNode, Network, Result};
use std::collections::HashSet;
use tracing::{debug, info};

/// Connectivity options
#[derive(Debug, Clone, Default)]
pub struct ConnectivityParams {
    /// Bound every joining tributary at its junction, not only those whose
    /// walk never reaches the main channel
    pub force_junction_outlets: bool,
}

/// Flowlines on the main channel
pub fn main_channel(network: &Network) -> Result<HashSet<Comid>> {
    let mut main = HashSet::new();
    let inlets = network.inlets();

    if inlets.is_empty() {
        let mut current = Some(network.terminal());
        while let Some(node) = current {
            main.insert(node.comid);
            current = network.major_tributary(node.comid)?;
        }
        return Ok(main);
    }

    for inlet in inlets {
        if !main.insert(inlet.comid) {
            continue;
        }
        for node in network.walk_downstream(inlet.comid)? {
            // the rest of the path is already traced
            if !main.insert(node.comid) {
                break;
            }
        }
    }
    Ok(main)
}

/// Result of walking an outlet down toward the main channel
struct Junction<'a> {
    /// Last flowline walked before the channel or the network root
    last: &'a FlowlineNode,
    reached_channel: bool,
}

fn walk_to_channel<'a>(
    network: &'a Network,
    main: &mut HashSet<Comid>,
    start: &'a FlowlineNode,
) -> Result<Junction<'a>> {
    let mut node = start;
    loop {
        match network.downstream(node.comid)? {
            Some(down) if main.contains(&down.comid) => {
                return Ok(Junction { last: node, reached_channel: true });
            }
            Some(down) => {
                main.insert(node.comid);
                node = down;
            }
            None => return Ok(Junction { last: node, reached_channel: false }),
        }
    }
}

/// Insert the outlets needed to connect every outlet to the main channel.
///
/// Outlets added here are themselves checked, so a sibling pulled in at one
/// junction is connected in turn. Returns the number of outlets added.
pub fn resolve_connectivity(
    network: &Network,
    outlets: &mut OutletSet,
    params: &ConnectivityParams,
) -> Result<usize> {
    let mut main = main_channel(network)?;
    let before = outlets.len();

    let mut i = 0;
    while i < outlets.len() {
        let comid = outlets.as_slice()[i];
        i += 1;

        let node = network.node(comid)?;
        if network.downstream(comid)?.is_none() || main.contains(&comid) {
            continue;
        }

        debug!(%comid, "outlet is not connected to the main channel");
        let junction = walk_to_channel(network, &mut main, node)?;
        if junction.reached_channel && !params.force_junction_outlets {
            continue;
        }

        let last = junction.last;
        main.insert(last.comid);
        if outlets.insert(last.comid, OutletKind::Connectivity) {
            debug!(comid = %last.comid, "connectivity outlet");
        }
        for other in network.siblings(last.comid)? {
            if outlets.insert(other.comid, OutletKind::Connectivity) {
                debug!(comid = %other.comid, "connectivity outlet at junction");
            }
        }
    }

    let added = outlets.len() - before;
    info!(added, outlets = outlets.len(), "resolved connectivity");
    Ok(added)
}
