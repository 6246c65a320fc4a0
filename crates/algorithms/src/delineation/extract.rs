//! Gage watershed extraction

use hydrodiv_core::{Comid, Network, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Every flowline upstream of `outlet` (inclusive), mapped to the flowline
/// it drains to. The outlet maps to `None`.
pub fn upstream_updown(network: &Network, outlet: Comid) -> Result<BTreeMap<Comid, Option<Comid>>> {
    let members = network.upstream_closure(outlet, |_| false)?;
    debug!(%outlet, flowlines = members.len(), "extracted upstream flowlines");

    let mut updown = BTreeMap::new();
    for comid in members {
        let down = if comid == outlet {
            None
        } else {
            network.downstream(comid)?.map(|d| d.comid)
        };
        updown.insert(comid, down);
    }
    Ok(updown)
}

/// The network draining to `outlet`, as a standalone network
pub fn extract_watershed(network: &Network, outlet: Comid) -> Result<Network> {
    let comids: HashSet<Comid> = network.upstream_closure(outlet, |_| false)?.into_iter().collect();
    network.subset(&comids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrodiv_core::FlowlineNode;

    fn network() -> Network {
        Network::from_records(vec![
            FlowlineNode::new(1, 1, None, Some(3), 10.0),
            FlowlineNode::new(2, 2, None, Some(3), 12.0),
            FlowlineNode::new(3, 3, Some(2), Some(4), 25.0),
            FlowlineNode::new(4, 4, Some(3), None, 30.0),
            FlowlineNode::new(5, 5, None, Some(4), 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_updown_map() {
        let updown = upstream_updown(&network(), Comid(3)).unwrap();
        assert_eq!(updown.len(), 3);
        assert_eq!(updown[&Comid(3)], None);
        assert_eq!(updown[&Comid(1)], Some(Comid(3)));
        assert_eq!(updown[&Comid(2)], Some(Comid(3)));
        assert!(!updown.contains_key(&Comid(4)));
    }

    #[test]
    fn test_extract_keeps_external_links() {
        let sub = extract_watershed(&network(), Comid(3)).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.terminal().comid, Comid(3));
        // 3 still points at seq 4, now outside the extract
        assert!(sub.downstream(Comid(3)).unwrap().is_none());
    }

    #[test]
    fn test_unknown_outlet() {
        assert!(upstream_updown(&network(), Comid(77)).is_err());
    }
}
