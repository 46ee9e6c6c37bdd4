//! Signal origin estimation from three reference satellites.
//!
//! Given an observer frame, three reference directions and three measured
//! ranges, [`estimator::estimate`] returns the estimated ground position of
//! the emitter or a classified failure.

pub mod catalog;
pub mod config;
pub mod estimator;
pub mod geo;
pub mod report;
pub mod server;
pub mod sidereal;

pub use estimator::{estimate, EstimationError, LongitudeAnchor, SolverConfig};
pub use geo::{AngularPosition, GeoPosition, RangeMeasurement};
pub use report::EstimateReport;
pub use sidereal::ObserverFrame;
