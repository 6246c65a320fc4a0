//! Initial outlet selection
//!
//! The forced outlets come from the watershed exit, dams, qualifying stream
//! gages and caller-supplied points, in that order.

use super::outlet_set::{OutletKind, OutletSet};
use crate::geometry::FlowlineIndex;
use geo_types::Coord;
use hydrodiv_core::{Comid, DamRecord, Error, GageRecord, Network, Result};
use tracing::{debug, info, warn};

/// Gage acceptance criteria
#[derive(Debug, Clone, Default)]
pub struct OutletParams {
    /// Region code the gage must carry; `None` accepts any
    pub huc: Option<String>,
    /// Inclusive year range the gage record must overlap
    pub years: Option<(i32, i32)>,
}

impl OutletParams {
    pub fn validate(&self) -> Result<()> {
        if let Some((first, last)) = self.years {
            if first > last {
                return Err(Error::InvalidParameter {
                    name: "years",
                    value: format!("{first}-{last}"),
                    reason: "first year is after last year".into(),
                });
            }
        }
        Ok(())
    }
}

/// Point features that can force outlets
#[derive(Debug, Clone, Default)]
pub struct OutletSources {
    pub flowlines: FlowlineIndex,
    pub gages: Vec<GageRecord>,
    pub dams: Vec<DamRecord>,
    pub extras: Vec<Coord<f64>>,
}

/// Match a point to a flowline of the network.
///
/// Unresolved matches and matches outside the network are logged and
/// yield `None`; other errors propagate.
fn match_point(
    network: &Network,
    flowlines: &FlowlineIndex,
    point: Coord<f64>,
    what: &str,
    id: &str,
) -> Result<Option<Comid>> {
    match flowlines.closest_flowline(point) {
        Ok(comid) if network.contains(comid) => Ok(Some(comid)),
        Ok(comid) => {
            debug!(%comid, what, id, "matched flowline is outside the network");
            Ok(None)
        }
        Err(e) if e.is_recoverable() => {
            warn!(what, id, error = %e, "skipping point");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Add the terminal outlet, parallel-delta outlets and isolated roots.
pub fn add_terminal_outlets(network: &Network, outlets: &mut OutletSet) {
    let terminal = network.terminal();
    outlets.insert(terminal.comid, OutletKind::Terminal);
    debug!(comid = %terminal.comid, area = terminal.cumulative_area, "terminal outlet");

    for sibling in network.siblings(terminal.comid).unwrap_or_default() {
        if outlets.insert(sibling.comid, OutletKind::ParallelDelta) {
            debug!(comid = %sibling.comid, "parallel delta outlet");
        }
    }

    for root in network.roots() {
        if outlets.insert(root.comid, OutletKind::IsolatedRoot) {
            warn!(comid = %root.comid, "network root does not drain through the terminal exit");
        }
    }
}

/// Whether a gage on `comid` may become an outlet
fn gage_qualifies(
    network: &Network,
    outlets: &OutletSet,
    gage: &GageRecord,
    comid: Comid,
    params: &OutletParams,
) -> Result<bool> {
    let node = network.node(comid)?;

    if let Some(huc) = &params.huc {
        if gage.huc.as_deref() != Some(huc.as_str()) {
            return Ok(false);
        }
    }
    let fed_from_network = matches!(node.up, Some(up) if network.contains_seq(up));
    if !fed_from_network {
        return Ok(false);
    }
    if let Some(years) = params.years {
        if !gage.overlaps_years(years) {
            return Ok(false);
        }
    }
    Ok(!outlets.contains(comid))
}

/// Build the initial forced-outlet set.
pub fn select_outlets(
    network: &Network,
    sources: &OutletSources,
    params: &OutletParams,
) -> Result<OutletSet> {
    params.validate()?;

    let mut outlets = OutletSet::new();
    add_terminal_outlets(network, &mut outlets);

    for dam in &sources.dams {
        if let Some(comid) = match_point(network, &sources.flowlines, dam.location, "dam", &dam.nid)? {
            if outlets.insert(comid, OutletKind::Dam { nid: dam.nid.clone() }) {
                debug!(%comid, nid = %dam.nid, "dam outlet");
            }
        }
    }

    for gage in &sources.gages {
        let Some(comid) =
            match_point(network, &sources.flowlines, gage.location, "gage", &gage.site_no)?
        else {
            continue;
        };
        if gage_qualifies(network, &outlets, gage, comid, params)? {
            outlets.insert(comid, OutletKind::Gage { site_no: gage.site_no.clone() });
            debug!(%comid, site_no = %gage.site_no, "gage outlet");
        }
    }

    for (i, point) in sources.extras.iter().enumerate() {
        let id = i.to_string();
        if let Some(comid) = match_point(network, &sources.flowlines, *point, "extra outlet", &id)? {
            if outlets.insert(comid, OutletKind::Extra) {
                debug!(%comid, "extra outlet");
            }
        }
    }

    info!(outlets = outlets.len(), "selected initial outlets");
    Ok(outlets)
}
