//! # HydroDiv Core
//!
//! Core types and traits for the HydroDiv watershed subdivision library.
//!
//! This crate provides:
//! - `Network`: flowline records with upstream/downstream topology
//! - Gage, dam and flowline geometry records
//! - `Raster<T>` elevation grids and the `ElevationSampler` seam
//! - Algorithm trait for a consistent API

pub mod error;
pub mod network;
pub mod raster;
pub mod vector;

pub use error::{Error, Result};
pub use network::{Comid, FlowlineNode, Network, Seq};
pub use raster::{DemSampler, ElevationSample, ElevationSampler, GeoTransform, Raster, RasterElement};
pub use vector::{DamRecord, FlowlineShape, GageRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::network::{Comid, FlowlineNode, Network, Seq};
    pub use crate::raster::{DemSampler, ElevationSample, ElevationSampler, GeoTransform, Raster, RasterElement};
    pub use crate::vector::{DamRecord, FlowlineShape, GageRecord};
    pub use crate::Algorithm;
}

/// Core trait for the processing stages in HydroDiv.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
