//! Polygon merging for subbasin outlines
//!
//! Catchment polygons are merged into one subbasin outline by trying an
//! ordered list of strategies. Each strategy either returns a non-empty
//! outline or a [`Error::DegenerateGeometry`], and [`merge_polygons`]
//! moves on to the next one.

use geo::orient::{Direction, Orient};
use geo::{Area, BooleanOps, ConvexHull, RemoveRepeatedPoints};
use geo_types::{Coord, MultiPoint, MultiPolygon, Point, Polygon};
use hydrodiv_core::{Error, Result};
use tracing::{debug, warn};

/// One way of merging polygons into a single outline.
pub trait MergeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn merge(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>>;
}

fn is_finite(polygon: &Polygon<f64>) -> bool {
    polygon
        .exterior()
        .coords()
        .chain(polygon.interiors().iter().flat_map(|r| r.coords()))
        .all(|c| c.x.is_finite() && c.y.is_finite())
}

fn check_outline(merged: MultiPolygon<f64>, strategy: &str) -> Result<MultiPolygon<f64>> {
    let area = merged.unsigned_area();
    if merged.0.is_empty() || !area.is_finite() || area <= 0.0 {
        return Err(Error::DegenerateGeometry(format!(
            "{strategy} produced an empty outline"
        )));
    }
    Ok(merged)
}

fn fold_union(polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
    let mut iter = polygons.iter();
    let Some(first) = iter.next() else {
        return MultiPolygon(Vec::new());
    };
    iter.fold(MultiPolygon(vec![first.clone()]), |acc, p| {
        acc.union(&MultiPolygon(vec![p.clone()]))
    })
}

/// Boolean union of the polygons as given.
///
/// Refuses input containing non-finite coordinates, rings with fewer
/// than four vertices or zero-area polygons.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanUnion;

impl MergeStrategy for BooleanUnion {
    fn name(&self) -> &'static str {
        "boolean union"
    }

    fn merge(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>> {
        for (i, p) in polygons.iter().enumerate() {
            if !is_finite(p) || p.exterior().0.len() < 4 || p.unsigned_area() <= 0.0 {
                return Err(Error::DegenerateGeometry(format!("polygon {i} is not a valid ring")));
            }
        }
        check_outline(fold_union(polygons), self.name())
    }
}

/// Boolean union after cleaning each polygon.
///
/// Repeated vertices are removed, rings are re-oriented (exterior
/// counter-clockwise) and polygons that end up non-finite or without area
/// are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanedUnion;

impl MergeStrategy for CleanedUnion {
    fn name(&self) -> &'static str {
        "cleaned union"
    }

    fn merge(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>> {
        let cleaned: Vec<Polygon<f64>> = polygons
            .iter()
            .filter(|p| is_finite(p))
            .map(|p| p.remove_repeated_points().orient(Direction::Default))
            .filter(|p| p.exterior().0.len() >= 4 && p.unsigned_area() > 0.0)
            .collect();

        let dropped = polygons.len() - cleaned.len();
        if dropped > 0 {
            debug!(dropped, "cleaned union dropped degenerate polygons");
        }
        check_outline(fold_union(&cleaned), self.name())
    }
}

/// Convex hull of every finite vertex.
///
/// Always succeeds on input spanning a non-zero area, at the cost of
/// filling concavities between catchments.
#[derive(Debug, Clone, Copy, Default)]
pub struct HullMerge;

impl MergeStrategy for HullMerge {
    fn name(&self) -> &'static str {
        "convex hull"
    }

    fn merge(&self, polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>> {
        let points: Vec<Point<f64>> = polygons
            .iter()
            .flat_map(|p| p.exterior().coords().copied())
            .filter(|c: &Coord<f64>| c.x.is_finite() && c.y.is_finite())
            .map(Point::from)
            .collect();
        let hull = MultiPoint::from(points).convex_hull();
        check_outline(MultiPolygon(vec![hull]), self.name())
    }
}

/// The default strategy order: boolean union, cleaned union, convex hull
pub fn default_strategies() -> Vec<Box<dyn MergeStrategy>> {
    vec![
        Box::new(BooleanUnion),
        Box::new(CleanedUnion),
        Box::new(HullMerge),
    ]
}

/// Merge polygons with the first strategy that succeeds.
///
/// Returns the last strategy's error when all of them fail.
pub fn merge_polygons(
    polygons: &[Polygon<f64>],
    strategies: &[Box<dyn MergeStrategy>],
) -> Result<MultiPolygon<f64>> {
    let mut last = Error::DegenerateGeometry("no merge strategy configured".into());
    for (i, strategy) in strategies.iter().enumerate() {
        match strategy.merge(polygons) {
            Ok(merged) => {
                if i > 0 {
                    warn!(strategy = strategy.name(), "polygon merge fell back");
                }
                return Ok(merged);
            }
            Err(e) => {
                debug!(strategy = strategy.name(), error = %e, "merge strategy failed");
                last = e;
            }
        }
    }
    Err(last)
}
