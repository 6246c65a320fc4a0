//! Point and line features consumed by outlet selection
//!
//! Coordinates are geographic: `x` is longitude and `y` latitude, both in
//! decimal degrees.

use crate::network::Comid;
use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

/// Square miles to square kilometers, as used for gage drainage areas
pub const SQMI_TO_KM2: f64 = 2.59;

/// A stream gage station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GageRecord {
    /// Station identifier (e.g. USGS NWIS site number)
    pub site_no: String,
    pub location: Coord<f64>,
    /// Region code of the watershed boundary containing the gage
    #[serde(default)]
    pub huc: Option<String>,
    /// First year with recorded data
    #[serde(default)]
    pub first_year: Option<i32>,
    /// Last year with recorded data
    #[serde(default)]
    pub last_year: Option<i32>,
    /// Average flow over the record (cfs)
    #[serde(default)]
    pub average_flow: Option<f64>,
    /// Drainage area as published by the agency (mi²)
    #[serde(default)]
    pub drainage_area_sqmi: Option<f64>,
    #[serde(default)]
    pub web: Option<String>,
}

impl GageRecord {
    pub fn new(site_no: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            site_no: site_no.into(),
            location: Coord { x, y },
            huc: None,
            first_year: None,
            last_year: None,
            average_flow: None,
            drainage_area_sqmi: None,
            web: None,
        }
    }

    /// Published drainage area converted to km²
    pub fn drainage_area_km2(&self) -> Option<f64> {
        self.drainage_area_sqmi.map(|a| a * SQMI_TO_KM2)
    }

    /// Whether the gage record overlaps the inclusive year range.
    ///
    /// A gage without a recorded period never overlaps.
    pub fn overlaps_years(&self, (first, last): (i32, i32)) -> bool {
        match (self.first_year, self.last_year) {
            (Some(start), Some(end)) => start <= last && end >= first,
            _ => false,
        }
    }
}

/// A dam from the national inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamRecord {
    /// Inventory identifier (NIDID)
    pub nid: String,
    pub location: Coord<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl DamRecord {
    pub fn new(nid: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            nid: nid.into(),
            location: Coord { x, y },
            name: None,
        }
    }
}

/// Flowline geometry keyed by comid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowlineShape {
    pub comid: Comid,
    pub line: LineString<f64>,
}

impl FlowlineShape {
    pub fn new(comid: u64, coords: Vec<(f64, f64)>) -> Self {
        Self {
            comid: Comid(comid),
            line: LineString::from(coords),
        }
    }

    /// Last vertex, where the flowline drains
    pub fn outlet_point(&self) -> Option<Coord<f64>> {
        self.line.0.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_overlap() {
        let mut gage = GageRecord::new("03439000", -82.9, 35.1);
        assert!(!gage.overlaps_years((1990, 2000)));

        gage.first_year = Some(1985);
        gage.last_year = Some(1992);
        assert!(gage.overlaps_years((1990, 2000)));
        assert!(gage.overlaps_years((1970, 1985)));
        assert!(!gage.overlaps_years((1993, 2000)));
        assert!(!gage.overlaps_years((1960, 1984)));
    }

    #[test]
    fn test_drainage_area_conversion() {
        let mut gage = GageRecord::new("1", 0.0, 0.0);
        assert!(gage.drainage_area_km2().is_none());
        gage.drainage_area_sqmi = Some(100.0);
        assert!((gage.drainage_area_km2().unwrap() - 259.0).abs() < 1e-9);
    }

    #[test]
    fn test_flowline_outlet_point() {
        let shape = FlowlineShape::new(5, vec![(0.0, 1.0), (0.5, 0.5), (1.0, 0.0)]);
        assert_eq!(shape.outlet_point(), Some(Coord { x: 1.0, y: 0.0 }));
    }

    #[test]
    fn test_gage_from_json() {
        let gage: GageRecord = serde_json::from_str(
            r#"{"site_no": "02040000", "location": {"x": -77.5, "y": 37.3}, "huc": "02080205"}"#,
        )
        .unwrap();
        assert_eq!(gage.huc.as_deref(), Some("02080205"));
        assert!(gage.average_flow.is_none());
    }
}
