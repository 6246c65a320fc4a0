//! Drainage-area subdivision
//!
//! Repeats passes over the outlet set until a pass adds nothing. Each pass
//! walks upstream from every outlet along the major tributary:
//!
//! - At a junction, if a tributary is already an outlet or the area left
//!   behind by following the major tributary exceeds `drainmax`, every
//!   tributary becomes an outlet and the walk stops.
//! - Otherwise, once the area dropped since the outlet exceeds `drainmax`,
//!   the last flowline before the drop becomes an outlet and the walk stops.
//!
//! Walks within a pass only read the outlet set, so they run in parallel.
//! Their findings are merged at the end of the pass in outlet order.

use super::outlet_set::{OutletKind, OutletSet};
use crate::maybe_rayon::*;
use hydrodiv_core::{Comid, Error, Network, Result};
use tracing::{debug, info};

/// Subdivision threshold
#[derive(Debug, Clone, Default)]
pub struct SubdivideParams {
    /// Largest drainage-area span (km²) allowed within one subbasin.
    /// `None` uses the terminal outlet's cumulative area.
    pub drainmax: Option<f64>,
}

impl SubdivideParams {
    /// Effective threshold for a network
    pub fn drainmax_for(&self, network: &Network) -> Result<f64> {
        match self.drainmax {
            None => Ok(network.terminal().cumulative_area),
            Some(d) if d.is_finite() && d > 0.0 => Ok(d),
            Some(d) => Err(Error::InvalidParameter {
                name: "drainmax",
                value: d.to_string(),
                reason: "must be a positive area".into(),
            }),
        }
    }
}

/// Walk upstream from one outlet, returning the outlets it would add.
fn walk_outlet(
    network: &Network,
    outlets: &OutletSet,
    outlet: Comid,
    drainmax: f64,
) -> Result<Vec<(Comid, OutletKind)>> {
    let start = network.node(outlet)?;
    let mut node = start;

    loop {
        let Some(major) = network.major_tributary(node.comid)? else {
            return Ok(Vec::new());
        };

        if network.tributary_count(node.comid)? > 1 {
            let tributaries: Vec<Comid> = network.tributaries(node.comid)?.map(|t| t.comid).collect();
            let bounded = tributaries.iter().any(|&t| outlets.contains(t));
            if bounded || node.cumulative_area - major.cumulative_area > drainmax {
                return Ok(tributaries
                    .into_iter()
                    .filter(|&t| !outlets.contains(t))
                    .map(|t| (t, OutletKind::MajorTributary))
                    .collect());
            }
        }

        if outlets.contains(major.comid) {
            return Ok(Vec::new());
        }

        if start.cumulative_area - major.cumulative_area > drainmax {
            let mark = if node.comid == outlet { major.comid } else { node.comid };
            return Ok(vec![(mark, OutletKind::DrainageArea)]);
        }

        node = major;
    }
}

/// Insert outlets until no subbasin spans more than `drainmax`.
///
/// Returns the number of passes run, including the final one that added
/// nothing.
pub fn subdivide(
    network: &Network,
    outlets: &mut OutletSet,
    params: &SubdivideParams,
) -> Result<usize> {
    let drainmax = params.drainmax_for(network)?;
    let mut passes = 0;

    loop {
        passes += 1;
        let snapshot: &OutletSet = outlets;
        let found: Vec<Vec<(Comid, OutletKind)>> = snapshot
            .as_slice()
            .to_vec()
            .into_par_iter()
            .map(|outlet| walk_outlet(network, snapshot, outlet, drainmax))
            .collect::<Result<_>>()?;

        let pending: Vec<(Comid, OutletKind)> = found.into_iter().flatten().collect();
        for (comid, kind) in &pending {
            debug!(%comid, ?kind, pass = passes, "subdivision outlet");
        }

        let added = outlets.commit(pending);
        debug!(pass = passes, added, "subdivision pass");
        if added == 0 {
            break;
        }
    }

    info!(passes, drainmax, outlets = outlets.len(), "subdivided watershed");
    Ok(passes)
}
