//! Flowline identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// External flowline/catchment identifier (NHDPlus COMID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comid(pub u64);

/// Topological sequence number used for up/down navigation (hydroseq).
///
/// Source datasets encode "no neighbor" as sequence 0; the network model
/// normalizes that to `None` at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seq(pub u64);

impl Seq {
    /// Sequence value reserved for "no neighbor"
    pub const NONE: Seq = Seq(0);
}

impl fmt::Display for Comid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Comid {
    fn from(v: u64) -> Self {
        Comid(v)
    }
}

impl From<u64> for Seq {
    fn from(v: u64) -> Self {
        Seq(v)
    }
}
