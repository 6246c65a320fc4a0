//! Elevation sampling on polygons and polylines
//!
//! [`ElevationSampler`] is the seam between the flow-plane estimator and
//! whatever holds the elevation data. [`DemSampler`] implements it for an
//! in-memory [`Raster`].

use crate::error::Result;
use crate::raster::{Raster, RasterElement};
use geo::{BoundingRect, Contains};
use geo_types::{Coord, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

/// A georeferenced elevation sample (x = longitude, y = latitude, z in meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ElevationSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord { x: self.x, y: self.y }
    }
}

/// Source of elevation samples for catchment polygons and flowlines.
pub trait ElevationSampler: Sync {
    /// Samples at points inside the polygon
    fn sample_in_polygon(&self, polygon: &Polygon<f64>) -> Result<Vec<ElevationSample>>;

    /// Samples at the vertices of the line; vertices without data are skipped
    fn sample_along(&self, line: &LineString<f64>) -> Result<Vec<ElevationSample>>;
}

/// Raster-backed sampler.
///
/// Interior samples are the centers of cells falling inside the polygon.
/// `z_scale` converts stored values to meters (0.01 for centimeter DEMs).
#[derive(Debug, Clone)]
pub struct DemSampler<T: RasterElement> {
    raster: Raster<T>,
    z_scale: f64,
}

impl<T: RasterElement> DemSampler<T> {
    pub fn new(raster: Raster<T>) -> Self {
        Self { raster, z_scale: 1.0 }
    }

    pub fn with_z_scale(mut self, z_scale: f64) -> Self {
        self.z_scale = z_scale;
        self
    }

    pub fn raster(&self) -> &Raster<T> {
        &self.raster
    }

    /// Inclusive cell window covering a geographic rectangle, clipped to the grid
    fn window(&self, min: Coord<f64>, max: Coord<f64>) -> Option<(usize, usize, usize, usize)> {
        let transform = self.raster.transform();
        let (c0, r0) = transform.geo_to_pixel(min.x, max.y);
        let (c1, r1) = transform.geo_to_pixel(max.x, min.y);
        if !(c0.is_finite() && r0.is_finite() && c1.is_finite() && r1.is_finite()) {
            return None;
        }

        let (rows, cols) = self.raster.shape();
        let col_lo = c0.min(c1).floor().max(0.0) as usize;
        let row_lo = r0.min(r1).floor().max(0.0) as usize;
        let col_hi = c0.max(c1).floor();
        let row_hi = r0.max(r1).floor();
        if col_hi < 0.0 || row_hi < 0.0 || col_lo >= cols || row_lo >= rows {
            return None;
        }
        let col_hi = (col_hi as usize).min(cols - 1);
        let row_hi = (row_hi as usize).min(rows - 1);
        Some((row_lo, row_hi, col_lo, col_hi))
    }
}

impl<T: RasterElement> ElevationSampler for DemSampler<T> {
    fn sample_in_polygon(&self, polygon: &Polygon<f64>) -> Result<Vec<ElevationSample>> {
        let Some(rect) = polygon.bounding_rect() else {
            return Ok(Vec::new());
        };
        let Some((row_lo, row_hi, col_lo, col_hi)) = self.window(rect.min(), rect.max()) else {
            return Ok(Vec::new());
        };

        let mut samples = Vec::new();
        for row in row_lo..=row_hi {
            for col in col_lo..=col_hi {
                let (x, y) = self.raster.pixel_to_geo(col, row);
                if !polygon.contains(&Point::new(x, y)) {
                    continue;
                }
                if let Some(z) = self.raster.valid_value(row, col) {
                    samples.push(ElevationSample::new(x, y, z * self.z_scale));
                }
            }
        }
        Ok(samples)
    }

    fn sample_along(&self, line: &LineString<f64>) -> Result<Vec<ElevationSample>> {
        Ok(line
            .coords()
            .filter_map(|c| {
                self.raster
                    .value_at(c.x, c.y)
                    .map(|z| ElevationSample::new(c.x, c.y, z * self.z_scale))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GeoTransform;
    use approx::assert_relative_eq;

    /// 4x4 grid over [0, 4] x [0, 4], value = 100 * row + col (centimeters)
    fn sampler() -> DemSampler<i32> {
        let data: Vec<i32> = (0..16).map(|i| (i / 4) * 100 + i % 4).collect();
        let mut dem = Raster::from_vec(data, 4, 4).unwrap();
        dem.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
        DemSampler::new(dem).with_z_scale(0.01)
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        )
    }

    #[test]
    fn test_sample_in_polygon_cell_centers() {
        let s = sampler();
        let samples = s.sample_in_polygon(&square(0.0, 2.0, 2.0, 4.0)).unwrap();
        // top-left 2x2 block: rows 0-1, cols 0-1
        assert_eq!(samples.len(), 4);
        let mut zs: Vec<f64> = samples.iter().map(|p| p.z).collect();
        zs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(zs[0], 0.0);
        assert_relative_eq!(zs[3], 1.01);
    }

    #[test]
    fn test_sample_in_polygon_outside_grid() {
        let s = sampler();
        assert!(s.sample_in_polygon(&square(10.0, 10.0, 12.0, 12.0)).unwrap().is_empty());
    }

    #[test]
    fn test_sample_along_skips_outside_vertices() {
        let s = sampler();
        let line = LineString::from(vec![(0.5, 3.5), (3.5, 0.5), (9.0, 9.0)]);
        let samples = s.sample_along(&line).unwrap();
        assert_eq!(samples.len(), 2);
        assert_relative_eq!(samples[0].z, 0.0);
        assert_relative_eq!(samples[1].z, 3.03);
    }
}
