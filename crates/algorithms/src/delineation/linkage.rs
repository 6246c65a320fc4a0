//! Mass linkage and subbasin classification

use super::outlet_set::OutletSet;
use super::subbasins::Membership;
use super::watershed::{Linkage, Subbasin, SubbasinClass, Watershed};
use hydrodiv_core::{Comid, FlowlineNode, Network, Result};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// First subbasin below `outlet`, walking down its flowlines.
pub fn downstream_link(
    network: &Network,
    owner: &HashMap<Comid, Comid>,
    outlet: Comid,
) -> Result<Linkage> {
    for node in network.walk_downstream(outlet)? {
        match owner.get(&node.comid) {
            Some(&other) if other != outlet => return Ok(Linkage::Downstream(other)),
            _ => {}
        }
    }
    Ok(Linkage::Exit)
}

/// Top of the primary channel: the major tributary chain from the outlet,
/// restricted to subbasin members.
pub fn uppermost_member<'a>(
    network: &'a Network,
    members: &HashSet<Comid>,
    outlet: Comid,
) -> Result<&'a FlowlineNode> {
    let mut node = network.node(outlet)?;
    loop {
        let mut best: Option<&FlowlineNode> = None;
        for trib in network.tributaries(node.comid)? {
            if !members.contains(&trib.comid) {
                continue;
            }
            best = match best {
                None => Some(trib),
                Some(b) if trib.cumulative_area > b.cumulative_area => Some(trib),
                Some(b)
                    if trib.cumulative_area == b.cumulative_area
                        && node.up == Some(trib.seq) =>
                {
                    Some(trib)
                }
                keep => keep,
            };
        }
        match best {
            Some(next) => node = next,
            None => return Ok(node),
        }
    }
}

/// Classify a subbasin by the `up` neighbor of its uppermost member
pub fn classify(network: &Network, uppermost: &FlowlineNode) -> SubbasinClass {
    match uppermost.up {
        None => SubbasinClass::Headwater,
        Some(up) if !network.contains_seq(up) => SubbasinClass::Inlet,
        Some(_) => SubbasinClass::Interior,
    }
}

/// Link subbasins into the drainage graph and classify them.
pub fn build_watershed(
    network: &Network,
    outlets: OutletSet,
    membership: Membership,
) -> Result<Watershed> {
    let Membership { subbasins, owner } = membership;

    let mut built = Vec::with_capacity(subbasins.len());
    for (outlet, members) in subbasins {
        let member_set: HashSet<Comid> = members.iter().copied().collect();
        let top = uppermost_member(network, &member_set, outlet)?;
        built.push(Subbasin {
            outlet,
            uppermost: top.comid,
            class: classify(network, top),
            downstream: downstream_link(network, &owner, outlet)?,
            upstream: Vec::new(),
            members,
        });
    }

    let position: HashMap<Comid, usize> = built.iter().enumerate().map(|(i, s)| (s.outlet, i)).collect();
    for i in 0..built.len() {
        if let Linkage::Downstream(down) = built[i].downstream {
            if let Some(&j) = position.get(&down) {
                let outlet = built[i].outlet;
                built[j].upstream.push(outlet);
            }
        }
    }

    let watershed = Watershed::new(outlets, built, owner);
    info!(
        subbasins = watershed.len(),
        inlets = watershed.inlets().len(),
        headwaters = watershed.headwaters().len(),
        exits = watershed.exits().len(),
        "built mass linkage"
    );
    Ok(watershed)
}
