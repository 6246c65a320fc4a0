//! The delineated watershed

use super::outlet_set::OutletSet;
use hydrodiv_core::Comid;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Where a subbasin drains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Into the subbasin with this outlet
    Downstream(Comid),
    /// Out of the watershed
    Exit,
}

/// Position of a subbasin in the drainage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubbasinClass {
    /// Nothing flows into the top of the subbasin
    Headwater,
    /// Flow enters the top of the subbasin from outside the loaded extent
    Inlet,
    /// Fed by other subbasins
    Interior,
}

/// One subbasin of the watershed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subbasin {
    pub outlet: Comid,
    /// Member flowlines, outlet first
    pub members: Vec<Comid>,
    /// Top of the subbasin's primary channel
    pub uppermost: Comid,
    pub class: SubbasinClass,
    pub downstream: Linkage,
    /// Subbasins draining directly into this one, in outlet order
    pub upstream: Vec<Comid>,
}

/// Outlets, subbasins and the mass linkage between them.
#[derive(Debug, Clone, Serialize)]
pub struct Watershed {
    pub outlets: OutletSet,
    pub subbasins: Vec<Subbasin>,
    #[serde(skip)]
    index: HashMap<Comid, usize>,
    #[serde(skip)]
    owner: HashMap<Comid, Comid>,
}

impl Watershed {
    pub(crate) fn new(outlets: OutletSet, subbasins: Vec<Subbasin>, owner: HashMap<Comid, Comid>) -> Self {
        let index = subbasins
            .iter()
            .enumerate()
            .map(|(i, s)| (s.outlet, i))
            .collect();
        Self {
            outlets,
            subbasins,
            index,
            owner,
        }
    }

    pub fn len(&self) -> usize {
        self.subbasins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subbasins.is_empty()
    }

    pub fn subbasin(&self, outlet: Comid) -> Option<&Subbasin> {
        self.index.get(&outlet).map(|&i| &self.subbasins[i])
    }

    /// Outlet of the subbasin containing a flowline
    pub fn owner(&self, comid: Comid) -> Option<Comid> {
        self.owner.get(&comid).copied()
    }

    /// Subbasin outlet → member comids
    pub fn membership(&self) -> BTreeMap<Comid, Vec<Comid>> {
        self.subbasins
            .iter()
            .map(|s| (s.outlet, s.members.clone()))
            .collect()
    }

    /// Subbasin outlet → downstream subbasin or exit
    pub fn linkage(&self) -> BTreeMap<Comid, Linkage> {
        self.subbasins.iter().map(|s| (s.outlet, s.downstream)).collect()
    }

    fn with_class(&self, class: SubbasinClass) -> Vec<Comid> {
        self.subbasins
            .iter()
            .filter(|s| s.class == class)
            .map(|s| s.outlet)
            .collect()
    }

    pub fn inlets(&self) -> Vec<Comid> {
        self.with_class(SubbasinClass::Inlet)
    }

    pub fn headwaters(&self) -> Vec<Comid> {
        self.with_class(SubbasinClass::Headwater)
    }

    /// Subbasins draining out of the watershed
    pub fn exits(&self) -> Vec<Comid> {
        self.subbasins
            .iter()
            .filter(|s| s.downstream == Linkage::Exit)
            .map(|s| s.outlet)
            .collect()
    }
}
