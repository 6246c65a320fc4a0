//! Nearest-flowline matching for point features
//!
//! Gages, dams and user outlets are placed on the flowline whose bounding
//! box contains them. When no box contains the point, every box is grown by
//! its own width and height and the test repeats. Among several candidates
//! the flowline with the smallest score wins, where the score is the lesser
//! of the box's larger span and the geodesic distance from the point to the
//! nearest vertex.

use super::distance::geodesic_distance_km;
use geo::BoundingRect;
use geo_types::Coord;
use hydrodiv_core::{Comid, Error, FlowlineShape, Result};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Larger of width and height
    pub fn span(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Strict interior test; points on the boundary are outside
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x < x && x < self.max_x && self.min_y < y && y < self.max_y
    }

    /// Box grown on every side by its own width and height
    pub fn expanded(&self) -> Self {
        let (w, h) = (self.width(), self.height());
        Self::new(self.min_x - w, self.min_y - h, self.max_x + w, self.max_y + h)
    }
}

/// Flowline geometries with precomputed bounding boxes, in input order.
#[derive(Debug, Clone, Default)]
pub struct FlowlineIndex {
    shapes: Vec<FlowlineShape>,
    boxes: Vec<Option<BoundingBox>>,
}

impl FlowlineIndex {
    pub fn new(shapes: Vec<FlowlineShape>) -> Self {
        let boxes = shapes
            .iter()
            .map(|s| {
                s.line
                    .bounding_rect()
                    .map(|r| BoundingBox::new(r.min().x, r.min().y, r.max().x, r.max().y))
            })
            .collect();
        Self { shapes, boxes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[FlowlineShape] {
        &self.shapes
    }

    pub fn get(&self, comid: Comid) -> Option<&FlowlineShape> {
        self.shapes.iter().find(|s| s.comid == comid)
    }

    fn candidates(&self, point: Coord<f64>, grow: bool) -> Vec<usize> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, bbox)| {
                let bbox = bbox.as_ref()?;
                let bbox = if grow { bbox.expanded() } else { *bbox };
                bbox.contains_point(point.x, point.y).then_some(i)
            })
            .collect()
    }

    fn score(&self, idx: usize, point: Coord<f64>) -> f64 {
        let span = self.boxes[idx].map(|b| b.span()).unwrap_or(f64::INFINITY);
        self.shapes[idx]
            .line
            .coords()
            .map(|c| geodesic_distance_km(*c, point))
            .fold(span, f64::min)
    }

    /// Comid of the flowline closest to `point`.
    ///
    /// Equal scores resolve to the flowline listed first. Fails with
    /// [`Error::UnresolvedMatch`] when no bounding box holds the point,
    /// even after growing them.
    pub fn closest_flowline(&self, point: Coord<f64>) -> Result<Comid> {
        let mut matches = self.candidates(point, false);
        if matches.is_empty() {
            matches = self.candidates(point, true);
        }

        let mut best: Option<(usize, f64)> = None;
        for &idx in &matches {
            let score = self.score(idx, point);
            match best {
                Some((_, s)) if s <= score => {}
                _ => best = Some((idx, score)),
            }
        }

        best.map(|(idx, _)| self.shapes[idx].comid)
            .ok_or(Error::UnresolvedMatch {
                x: point.x,
                y: point.y,
                candidates: matches.len(),
            })
    }
}
