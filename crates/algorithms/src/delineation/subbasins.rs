//! Subbasin assembly
//!
//! Each outlet owns its upstream closure, stopping at other outlets.
//! Parallel-delta outlets do not form subbasins of their own: their
//! closures are folded into the terminal subbasin.

use super::outlet_set::{OutletKind, OutletSet};
use crate::maybe_rayon::*;
use hydrodiv_core::{Comid, Network, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Subbasin membership before linkage
#[derive(Debug, Clone, Default)]
pub struct Membership {
    /// Subbasin outlet and members (outlet first), in outlet order
    pub subbasins: Vec<(Comid, Vec<Comid>)>,
    /// Member comid → owning subbasin outlet
    pub owner: HashMap<Comid, Comid>,
}

impl Membership {
    pub fn members(&self, outlet: Comid) -> Option<&[Comid]> {
        self.subbasins
            .iter()
            .find(|(o, _)| *o == outlet)
            .map(|(_, m)| m.as_slice())
    }
}

/// Partition the network by outlet.
pub fn assemble_subbasins(network: &Network, outlets: &OutletSet) -> Result<Membership> {
    let terminal = outlets
        .entries()
        .find(|(_, kind)| **kind == OutletKind::Terminal)
        .map(|(comid, _)| comid);
    let deltas: Vec<Comid> = outlets
        .entries()
        .filter(|(_, kind)| **kind == OutletKind::ParallelDelta)
        .map(|(comid, _)| comid)
        .collect();

    let heads: Vec<Comid> = match terminal {
        Some(_) => outlets
            .entries()
            .filter(|(_, kind)| **kind != OutletKind::ParallelDelta)
            .map(|(comid, _)| comid)
            .collect(),
        None => outlets.iter().collect(),
    };

    let closure = |comid: Comid| network.upstream_closure(comid, |n| outlets.contains(n.comid));

    let subbasins: Vec<(Comid, Vec<Comid>)> = heads
        .into_par_iter()
        .map(|outlet| {
            let mut members = closure(outlet)?;
            if Some(outlet) == terminal {
                for &delta in &deltas {
                    members.extend(closure(delta)?);
                }
            }
            Ok((outlet, members))
        })
        .collect::<Result<_>>()?;

    let mut owner = HashMap::with_capacity(network.len());
    for (outlet, members) in &subbasins {
        for &member in members {
            if let Some(previous) = owner.insert(member, *outlet) {
                warn!(%member, %previous, %outlet, "flowline claimed by two subbasins");
            }
        }
    }

    let unassigned = network.iter().filter(|n| !owner.contains_key(&n.comid)).count();
    if unassigned > 0 {
        warn!(unassigned, "flowlines drain to no outlet");
    }
    debug!(subbasins = subbasins.len(), "assembled subbasins");

    Ok(Membership { subbasins, owner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrodiv_core::FlowlineNode;

    /// 1 → 2 → 3 → exit 99, with 4 → 2 and delta 5 → exit 99
    fn network() -> Network {
        Network::from_records(vec![
            FlowlineNode::new(1, 1, None, Some(2), 10.0),
            FlowlineNode::new(2, 2, Some(1), Some(3), 25.0),
            FlowlineNode::new(3, 3, Some(2), Some(99), 30.0),
            FlowlineNode::new(4, 4, None, Some(2), 12.0),
            FlowlineNode::new(5, 5, None, Some(99), 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_partition_with_delta_merge() {
        let net = network();
        let mut outlets = OutletSet::new();
        outlets.insert(Comid(3), OutletKind::Terminal);
        outlets.insert(Comid(5), OutletKind::ParallelDelta);
        outlets.insert(Comid(2), OutletKind::Extra);

        let m = assemble_subbasins(&net, &outlets).unwrap();
        assert_eq!(m.subbasins.len(), 2);
        assert_eq!(m.members(Comid(3)).unwrap(), &[Comid(3), Comid(5)]);
        assert_eq!(m.members(Comid(2)).unwrap(), &[Comid(2), Comid(1), Comid(4)]);
        assert!(m.members(Comid(5)).is_none());
        assert_eq!(m.owner.len(), net.len());
        assert_eq!(m.owner[&Comid(5)], Comid(3));
    }

    #[test]
    fn test_outlets_bound_closures() {
        let net = network();
        let mut outlets = OutletSet::new();
        outlets.insert(Comid(3), OutletKind::Terminal);
        outlets.insert(Comid(4), OutletKind::MajorTributary);
        outlets.insert(Comid(1), OutletKind::MajorTributary);

        let m = assemble_subbasins(&net, &outlets).unwrap();
        assert_eq!(m.members(Comid(3)).unwrap(), &[Comid(3), Comid(2)]);
        assert_eq!(m.members(Comid(4)).unwrap(), &[Comid(4)]);
        // 5 drains to no outlet
        assert!(!m.owner.contains_key(&Comid(5)));
    }
}
