//! The geolocation solver.
//!
//! Linearized three-point multilateration in the (ra, dec) angle plane.
//! The circle equations `(x - aᵢ)² + (y - bᵢ)² = dᵢ²` are differenced
//! against reference 1 (the pivot), leaving a 2×2 linear system in the
//! planar fix (x, y). This treats angles as planar coordinates and is only
//! a small-separation approximation of true spherical multilateration.
//!
//! The planar fix is then read as a spherical offset: its radius becomes
//! the polar angle and its bearing is subtracted from the longitude anchor.

use crate::geo::{normalize_degrees, AngularPosition, GeoPosition, RangeMeasurement};
use crate::sidereal::ObserverFrame;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;

/// Which angle anchors the longitude back-conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LongitudeAnchor {
    /// Observer's local sidereal time. Invariant under reordering the references.
    #[default]
    Sidereal,
    /// Azimuthal angle of the pivot (first) reference. Depends on reference order.
    Pivot,
}

impl fmt::Display for LongitudeAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sidereal => write!(f, "sidereal"),
            Self::Pivot => write!(f, "pivot"),
        }
    }
}

impl std::str::FromStr for LongitudeAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sidereal" | "observer" | "lst" => Ok(Self::Sidereal),
            "pivot" | "reference" => Ok(Self::Pivot),
            _ => Err(format!("Unknown anchor '{}'. Use 'sidereal' or 'pivot'.", s)),
        }
    }
}

/// Solver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Geometry is degenerate when `|denominator| <= degeneracy_epsilon`.
    /// Zero means only an exactly vanishing denominator is rejected.
    #[serde(default)]
    pub degeneracy_epsilon: f64,
    #[serde(default)]
    pub anchor: LongitudeAnchor,
}

impl SolverConfig {
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.degeneracy_epsilon = epsilon;
        self
    }

    pub fn with_anchor(mut self, anchor: LongitudeAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Classified solver failure. No partial result accompanies any variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate geometry: reference directions are collinear (denominator {denominator:e})")]
    DegenerateGeometry { denominator: f64 },

    #[error("computation error: {0}")]
    ComputationError(String),
}

impl EstimationError {
    /// Stable identifier used in serialized reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::DegenerateGeometry { .. } => "degenerate_geometry",
            Self::ComputationError(_) => "computation_error",
        }
    }
}

/// Solution of the linear system before spherical conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarFix {
    pub x: f64,
    pub y: f64,
    pub denominator: f64,
}

impl PlanarFix {
    /// Distance of the fix from the plane origin.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Estimate the signal origin from exactly three reference/range pairs.
pub fn estimate(
    config: &SolverConfig,
    observer: &ObserverFrame,
    refs: &[AngularPosition; 3],
    ranges: &[RangeMeasurement; 3],
) -> Result<GeoPosition, EstimationError> {
    validate_observer(observer)?;
    let fix = solve_planar(config, refs, ranges)?;

    let anchor = match config.anchor {
        LongitudeAnchor::Sidereal => observer.sidereal_time(),
        LongitudeAnchor::Pivot => refs[0].ra,
    };

    to_geographic(&fix, anchor)
}

/// Slice-accepting variant for callers that collect pairs dynamically.
pub fn estimate_slices(
    config: &SolverConfig,
    observer: &ObserverFrame,
    refs: &[AngularPosition],
    ranges: &[RangeMeasurement],
) -> Result<GeoPosition, EstimationError> {
    let refs: &[AngularPosition; 3] = refs.try_into().map_err(|_| {
        EstimationError::InvalidInput(format!("expected 3 reference directions, got {}", refs.len()))
    })?;
    let ranges: &[RangeMeasurement; 3] = ranges.try_into().map_err(|_| {
        EstimationError::InvalidInput(format!("expected 3 range measurements, got {}", ranges.len()))
    })?;
    estimate(config, observer, refs, ranges)
}

/// Build and solve the pivot-differenced linear system.
pub fn solve_planar(
    config: &SolverConfig,
    refs: &[AngularPosition; 3],
    ranges: &[RangeMeasurement; 3],
) -> Result<PlanarFix, EstimationError> {
    validate_pairs(config, refs, ranges)?;

    let [p1, p2, p3] = *refs;
    let (a1, b1) = (p1.ra, p1.dec);
    let (a2, b2) = (p2.ra, p2.dec);
    let (a3, b3) = (p3.ra, p3.dec);
    let [d1, d2, d3] = (*ranges).map(RangeMeasurement::value);

    let a = 2.0 * (a2 - a1);
    let b = 2.0 * (b2 - b1);
    let c = 2.0 * (a3 - a1);
    let d = 2.0 * (b3 - b1);

    let e = (d2 * d2 - d1 * d1) - (a2 * a2 - a1 * a1) - (b2 * b2 - b1 * b1);
    let f = (d3 * d3 - d1 * d1) - (a3 * a3 - a1 * a1) - (b3 * b3 - b1 * b1);

    let denominator = b * c - a * d;
    if !denominator.is_finite() {
        return Err(EstimationError::ComputationError(format!(
            "non-finite denominator {}",
            denominator
        )));
    }
    if denominator.abs() <= config.degeneracy_epsilon {
        return Err(EstimationError::DegenerateGeometry { denominator });
    }

    let x = (e * d - b * f) / denominator;
    let y = (a * f - e * c) / denominator;

    if !x.is_finite() || !y.is_finite() {
        return Err(EstimationError::ComputationError(format!(
            "non-finite planar solution ({}, {})",
            x, y
        )));
    }

    Ok(PlanarFix { x, y, denominator })
}

/// Read a planar fix as a spherical offset around `anchor` (radians).
fn to_geographic(fix: &PlanarFix, anchor: f64) -> Result<GeoPosition, EstimationError> {
    let phi = fix.radius().atan2(1.0);
    let lambda = fix.y.atan2(fix.x);

    let latitude = phi.to_degrees();
    let longitude = normalize_degrees((anchor - lambda).rem_euclid(TAU).to_degrees());

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(EstimationError::ComputationError(format!(
            "non-finite position ({}, {})",
            latitude, longitude
        )));
    }

    Ok(GeoPosition::new(latitude, longitude))
}

fn validate_observer(observer: &ObserverFrame) -> Result<(), EstimationError> {
    if !observer.position().is_valid() {
        return Err(EstimationError::InvalidInput(format!(
            "observer position out of range: {:?}",
            observer.position()
        )));
    }
    if !observer.sidereal_time().is_finite() {
        return Err(EstimationError::InvalidInput("observer sidereal time is not finite".into()));
    }
    Ok(())
}

fn validate_pairs(
    config: &SolverConfig,
    refs: &[AngularPosition; 3],
    ranges: &[RangeMeasurement; 3],
) -> Result<(), EstimationError> {
    if !config.degeneracy_epsilon.is_finite() || config.degeneracy_epsilon < 0.0 {
        return Err(EstimationError::InvalidInput(format!(
            "degeneracy epsilon must be finite and nonnegative, got {}",
            config.degeneracy_epsilon
        )));
    }
    for (i, r) in refs.iter().enumerate() {
        if !r.is_finite() {
            return Err(EstimationError::InvalidInput(format!(
                "reference {} has a non-finite angular position ({}, {})",
                i + 1,
                r.ra,
                r.dec
            )));
        }
    }
    for (i, d) in ranges.iter().enumerate() {
        if !d.is_valid() {
            return Err(EstimationError::InvalidInput(format!(
                "range {} must be finite and nonnegative, got {}",
                i + 1,
                d.value()
            )));
        }
    }
    Ok(())
}
