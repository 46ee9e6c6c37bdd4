//! Value types shared by the solver and its collaborators.
//!
//! Degrees live on the geographic side (GeoPosition), radians on the
//! angular side (AngularPosition). Conversions happen only at the solver
//! boundaries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Degrees, -90..=90.
    pub latitude: f64,
    /// Degrees. Observer input uses -180..=180; solver output uses 0..360.
    pub longitude: f64,
    /// Meters above the reference surface, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, elevation: None }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// True when the coordinates are finite and inside the accepted ranges.
    /// Longitude may be given either as -180..=180 or 0..360.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..360.0).contains(&self.longitude)
            && self.elevation.map_or(true, f64::is_finite)
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_coords(self.latitude, self.longitude))?;
        if let Some(elev) = self.elevation {
            write!(f, ", {:.0} m", elev)?;
        }
        Ok(())
    }
}

/// Direction to a reference point as a pair of angles, radians.
///
/// `ra` is the azimuthal (right-ascension-like) angle, `dec` the
/// elevation-like (declination-like) angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularPosition {
    pub ra: f64,
    pub dec: f64,
}

impl AngularPosition {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    pub fn is_finite(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite()
    }
}

/// Measured distance from the observer to the emitter via one reference.
///
/// Units are caller-defined and must match across the three measurements.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeMeasurement(pub f64);

impl RangeMeasurement {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Finite and nonnegative.
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

impl From<f64> for RangeMeasurement {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

/// Wrap degrees into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}

/// Wrap radians into [0, 2π).
pub fn normalize_radians(rad: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let r = rad.rem_euclid(tau);
    if r >= tau { 0.0 } else { r }
}

/// "34.7304°N, 86.5861°W" style formatting. Longitudes above 180 are shown west.
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let lon = if lon > 180.0 { lon - 360.0 } else { lon };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert!(normalize_degrees(-1e-14) < 360.0);
    }

    #[test]
    fn test_normalize_radians() {
        let tau = std::f64::consts::TAU;
        assert!((normalize_radians(-0.5) - (tau - 0.5)).abs() < 1e-12);
        assert!(normalize_radians(-1e-18) < tau);
    }

    #[test]
    fn test_geo_position_validity() {
        assert!(GeoPosition::new(34.7304, -86.5861).is_valid());
        assert!(GeoPosition::new(-90.0, 359.9).is_valid());
        assert!(!GeoPosition::new(91.0, 0.0).is_valid());
        assert!(!GeoPosition::new(0.0, 360.0).is_valid());
        assert!(!GeoPosition::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPosition::new(0.0, 0.0).with_elevation(f64::INFINITY).is_valid());
    }

    #[test]
    fn test_range_validity() {
        assert!(RangeMeasurement(0.0).is_valid());
        assert!(RangeMeasurement(5000.0).is_valid());
        assert!(!RangeMeasurement(-1.0).is_valid());
        assert!(!RangeMeasurement(f64::NAN).is_valid());
    }

    #[test]
    fn test_format_coords() {
        assert_eq!(format_coords(34.7304, -86.5861), "34.7304°N, 86.5861°W");
        assert_eq!(format_coords(-10.0, 273.4139), "10.0000°S, 86.5861°W");
    }

    #[test]
    fn test_range_serializes_as_number() {
        let json = serde_json::to_string(&RangeMeasurement(6000.0)).unwrap();
        assert_eq!(json, "6000.0");
    }
}
