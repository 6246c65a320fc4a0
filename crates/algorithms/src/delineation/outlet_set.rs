//! The growing set of subbasin outlets

use hydrodiv_core::Comid;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a flowline was made an outlet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutletKind {
    /// Flowline with the largest cumulative drainage area
    Terminal,
    /// Another channel leaving through the terminal's exit
    ParallelDelta,
    /// Root of a component not draining through the terminal's exit
    IsolatedRoot,
    Dam { nid: String },
    Gage { site_no: String },
    /// Caller-supplied point
    Extra,
    /// Added to keep an outlet connected to the main channel
    Connectivity,
    /// Tributary at a junction bounded by the major-tributary rule
    MajorTributary,
    /// Added by the drainage-area threshold
    DrainageArea,
}

impl OutletKind {
    /// Terminal-tier outlets bound the watershed exit
    pub fn is_terminal_tier(&self) -> bool {
        matches!(self, OutletKind::Terminal | OutletKind::ParallelDelta)
    }
}

/// Outlets in insertion order with their provenance.
///
/// The set only grows. `version` counts successful insertions, so two
/// snapshots with equal versions hold the same outlets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutletSet {
    order: Vec<Comid>,
    kinds: HashMap<Comid, OutletKind>,
    version: u64,
}

impl OutletSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an outlet. Returns false, keeping the first kind, if present.
    pub fn insert(&mut self, comid: Comid, kind: OutletKind) -> bool {
        if self.kinds.contains_key(&comid) {
            return false;
        }
        self.kinds.insert(comid, kind);
        self.order.push(comid);
        self.version += 1;
        true
    }

    /// Merge outlets found during a pass, in the order given.
    ///
    /// Returns the number of outlets actually added.
    pub fn commit(&mut self, pending: impl IntoIterator<Item = (Comid, OutletKind)>) -> usize {
        pending
            .into_iter()
            .filter(|(comid, kind)| self.insert(*comid, kind.clone()))
            .count()
    }

    pub fn contains(&self, comid: Comid) -> bool {
        self.kinds.contains_key(&comid)
    }

    pub fn kind(&self, comid: Comid) -> Option<&OutletKind> {
        self.kinds.get(&comid)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Outlets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = Comid> + '_ {
        self.order.iter().copied()
    }

    /// Outlets with their kinds, in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (Comid, &OutletKind)> + '_ {
        self.order.iter().map(move |c| (*c, &self.kinds[c]))
    }

    pub fn as_slice(&self) -> &[Comid] {
        &self.order
    }
}
