//! Flowline network model
//!
//! An immutable, read-only drainage network built once from flowline
//! attribute records. Every flowline drains to at most one `down`
//! neighbor, so the network is a forest whose roots drain out of the
//! loaded extent.
//!
//! Two bijective indexes (by comid, by sequence) and a reverse-adjacency
//! index (`down → [up...]`) are built at load time, so tributary and
//! sibling lookups never scan the full table.

mod ids;
mod node;

pub use ids::{Comid, Seq};
pub use node::FlowlineNode;

use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// Read-only flowline network with precomputed navigation indexes.
#[derive(Debug, Clone)]
pub struct Network {
    /// Flowlines in input order (the order used for all tie-breaks)
    nodes: Vec<FlowlineNode>,
    by_comid: HashMap<Comid, usize>,
    by_seq: HashMap<Seq, usize>,
    /// Raw `down` value → flowlines draining to it, in input order.
    /// Keys outside the network (or `None`) group flowlines that leave
    /// the extent through the same exit.
    receivers: HashMap<Option<Seq>, Vec<usize>>,
}

impl Network {
    /// Build the network from flowline records.
    ///
    /// Fails with [`Error::MalformedInput`] on an empty record set,
    /// duplicate comids or sequences, invalid drainage areas, or a cycle
    /// in the downstream chain.
    pub fn from_records(records: impl IntoIterator<Item = FlowlineNode>) -> Result<Self> {
        let mut nodes: Vec<FlowlineNode> = records.into_iter().collect();
        if nodes.is_empty() {
            return Err(Error::MalformedInput("network has no flowlines".into()));
        }

        let mut by_comid = HashMap::with_capacity(nodes.len());
        let mut by_seq = HashMap::with_capacity(nodes.len());

        for (idx, node) in nodes.iter_mut().enumerate() {
            node.normalize();

            if node.seq == Seq::NONE {
                return Err(Error::MalformedInput(format!(
                    "flowline {} uses the reserved sequence 0",
                    node.comid
                )));
            }
            let areas_ok = node.cumulative_area.is_finite()
                && node.cumulative_area >= 0.0
                && node.incremental_area.is_finite()
                && node.incremental_area >= 0.0;
            if !areas_ok {
                return Err(Error::MalformedInput(format!(
                    "flowline {} has an invalid drainage area",
                    node.comid
                )));
            }
            if by_comid.insert(node.comid, idx).is_some() {
                return Err(Error::MalformedInput(format!(
                    "duplicate comid {}",
                    node.comid
                )));
            }
            if by_seq.insert(node.seq, idx).is_some() {
                return Err(Error::MalformedInput(format!(
                    "duplicate sequence {} (comid {})",
                    node.seq, node.comid
                )));
            }
        }

        let mut receivers: HashMap<Option<Seq>, Vec<usize>> = HashMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            receivers.entry(node.down).or_default().push(idx);
        }

        let network = Self {
            nodes,
            by_comid,
            by_seq,
            receivers,
        };
        network.check_acyclic()?;
        network.check_monotonic_area();
        Ok(network)
    }

    fn check_acyclic(&self) -> Result<()> {
        // 0 = unvisited, 1 = on the current path, 2 = known to reach a root
        let mut state = vec![0_u8; self.nodes.len()];
        let mut path = Vec::new();

        for start in 0..self.nodes.len() {
            path.clear();
            let mut current = Some(start);
            while let Some(idx) = current {
                match state[idx] {
                    0 => {
                        state[idx] = 1;
                        path.push(idx);
                        current = self.down_index(idx);
                    }
                    1 => {
                        return Err(Error::MalformedInput(format!(
                            "downstream cycle through flowline {}",
                            self.nodes[idx].comid
                        )));
                    }
                    _ => break,
                }
            }
            for &idx in &path {
                state[idx] = 2;
            }
        }
        Ok(())
    }

    fn check_monotonic_area(&self) {
        let mut violations = 0_usize;
        let mut first = None;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some(down) = self.down_index(idx) {
                // allow for rounding in the source attributes
                if self.nodes[down].cumulative_area + 1e-6 < node.cumulative_area {
                    violations += 1;
                    first.get_or_insert(node.comid);
                }
            }
        }
        if let Some(comid) = first {
            warn!(
                violations,
                first = %comid,
                "cumulative drainage area decreases downstream"
            );
        }
    }

    fn down_index(&self, idx: usize) -> Option<usize> {
        self.nodes[idx]
            .down
            .and_then(|seq| self.by_seq.get(&seq).copied())
    }

    fn index(&self, comid: Comid) -> Result<usize> {
        self.by_comid
            .get(&comid)
            .copied()
            .ok_or(Error::UnknownComid(comid))
    }

    fn receiver_indices(&self, down: Option<Seq>) -> &[usize] {
        self.receivers
            .get(&down)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    // Lookup

    /// Number of flowlines
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a successfully built network
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flowlines in input order
    pub fn iter(&self) -> impl Iterator<Item = &FlowlineNode> {
        self.nodes.iter()
    }

    pub fn contains(&self, comid: Comid) -> bool {
        self.by_comid.contains_key(&comid)
    }

    pub fn contains_seq(&self, seq: Seq) -> bool {
        self.by_seq.contains_key(&seq)
    }

    pub fn get(&self, comid: Comid) -> Option<&FlowlineNode> {
        self.by_comid.get(&comid).map(|&idx| &self.nodes[idx])
    }

    pub fn get_by_seq(&self, seq: Seq) -> Option<&FlowlineNode> {
        self.by_seq.get(&seq).map(|&idx| &self.nodes[idx])
    }

    /// Flowline by comid, or [`Error::UnknownComid`]
    pub fn node(&self, comid: Comid) -> Result<&FlowlineNode> {
        self.index(comid).map(|idx| &self.nodes[idx])
    }

    /// Flowline by sequence, or [`Error::UnknownSeq`]
    pub fn node_by_seq(&self, seq: Seq) -> Result<&FlowlineNode> {
        self.get_by_seq(seq).ok_or(Error::UnknownSeq(seq))
    }

    /// Position of a flowline in the input listing
    pub fn position(&self, comid: Comid) -> Option<usize> {
        self.by_comid.get(&comid).copied()
    }

    // Topology

    /// The flowline immediately downstream, if it is in the network
    pub fn downstream(&self, comid: Comid) -> Result<Option<&FlowlineNode>> {
        let idx = self.index(comid)?;
        Ok(self.down_index(idx).map(|d| &self.nodes[d]))
    }

    /// Direct upstream tributaries in input order
    pub fn tributaries(&self, comid: Comid) -> Result<impl Iterator<Item = &FlowlineNode> + '_> {
        let node = self.node(comid)?;
        Ok(self
            .receiver_indices(Some(node.seq))
            .iter()
            .map(move |&idx| &self.nodes[idx]))
    }

    /// Number of direct upstream tributaries
    pub fn tributary_count(&self, comid: Comid) -> Result<usize> {
        let node = self.node(comid)?;
        Ok(self.receiver_indices(Some(node.seq)).len())
    }

    /// The tributary with the largest cumulative drainage area.
    ///
    /// Ties go to the tributary recorded as the flowline's `up`
    /// neighbor, then to the first one in input order.
    pub fn major_tributary(&self, comid: Comid) -> Result<Option<&FlowlineNode>> {
        let node = self.node(comid)?;
        let mut best: Option<&FlowlineNode> = None;
        for trib in self.tributaries(comid)? {
            best = match best {
                None => Some(trib),
                Some(b) if trib.cumulative_area > b.cumulative_area => Some(trib),
                Some(b)
                    if trib.cumulative_area == b.cumulative_area
                        && node.up == Some(trib.seq)
                        && node.up != Some(b.seq) =>
                {
                    Some(trib)
                }
                keep => keep,
            };
        }
        Ok(best)
    }

    /// Other flowlines draining to the same `down` target.
    ///
    /// Flowlines that leave the network through the same external
    /// sequence (or with no `down` at all) count as siblings.
    pub fn siblings(&self, comid: Comid) -> Result<Vec<&FlowlineNode>> {
        let node = self.node(comid)?;
        Ok(self
            .receiver_indices(node.down)
            .iter()
            .map(|&idx| &self.nodes[idx])
            .filter(|other| other.comid != comid)
            .collect())
    }

    /// Whether water enters this flowline from outside the loaded extent
    pub fn is_inlet(&self, node: &FlowlineNode) -> bool {
        matches!(node.up, Some(up) if !self.contains_seq(up))
    }

    /// Flowlines fed from outside the loaded extent, in input order
    pub fn inlets(&self) -> Vec<&FlowlineNode> {
        self.nodes.iter().filter(|n| self.is_inlet(n)).collect()
    }

    /// Flowlines whose `down` neighbor is not in the network
    pub fn roots(&self) -> Vec<&FlowlineNode> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.down_index(*idx).is_none())
            .map(|(_, n)| n)
            .collect()
    }

    /// The flowline with the largest cumulative drainage area.
    ///
    /// Ties are broken by first appearance in the input listing.
    pub fn terminal(&self) -> &FlowlineNode {
        let mut best = &self.nodes[0];
        for node in &self.nodes[1..] {
            if node.cumulative_area > best.cumulative_area {
                best = node;
            }
        }
        best
    }

    // Traversal

    /// Iterate the flowlines below `comid` (exclusive) down to the root.
    pub fn walk_downstream(&self, comid: Comid) -> Result<DownstreamWalk<'_>> {
        let idx = self.index(comid)?;
        Ok(DownstreamWalk {
            network: self,
            current: idx,
        })
    }

    /// Upstream closure of `comid` (inclusive).
    ///
    /// Worklist flood fill over the reverse-adjacency index. A tributary
    /// for which `stop` returns true is not entered, and neither is
    /// anything above it. The start flowline is always included.
    pub fn upstream_closure<F>(&self, comid: Comid, mut stop: F) -> Result<Vec<Comid>>
    where
        F: FnMut(&FlowlineNode) -> bool,
    {
        let start = self.index(comid)?;
        let mut members = vec![self.nodes[start].comid];
        let mut queue = VecDeque::from([start]);

        while let Some(idx) = queue.pop_front() {
            for &up in self.receiver_indices(Some(self.nodes[idx].seq)) {
                let trib = &self.nodes[up];
                if stop(trib) {
                    continue;
                }
                members.push(trib.comid);
                queue.push_back(up);
            }
        }
        Ok(members)
    }

    /// A new network restricted to `comids`.
    ///
    /// Neighbors outside the subset remain as external references, so
    /// a flowline cut off from its upstream becomes an inlet.
    pub fn subset(&self, comids: &HashSet<Comid>) -> Result<Network> {
        for &comid in comids {
            self.index(comid)?;
        }
        Network::from_records(
            self.nodes
                .iter()
                .filter(|n| comids.contains(&n.comid))
                .cloned(),
        )
    }
}

/// Iterator over the flowlines downstream of a start flowline.
///
/// Terminates because the network is verified acyclic at load time.
pub struct DownstreamWalk<'a> {
    network: &'a Network,
    current: usize,
}

impl<'a> Iterator for DownstreamWalk<'a> {
    type Item = &'a FlowlineNode;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.network.down_index(self.current)?;
        self.current = next;
        Some(&self.network.nodes[next])
    }
}
