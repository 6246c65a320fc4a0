//! Elevation rasters and sampling

mod element;
mod geotransform;
mod grid;
mod sampling;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use sampling::{DemSampler, ElevationSample, ElevationSampler};
