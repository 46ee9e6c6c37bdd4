//! Observer frame: position plus local sidereal time at the observation instant.
//!
//! GMST uses the IAU 1982 polynomial with UT1 taken as UTC.

use crate::geo::{normalize_radians, GeoPosition};
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

const J2000: f64 = 2451545.0;
const SECONDS_PER_DAY: f64 = 86400.0;

/// Convert a UTC instant to Julian Date.
pub fn julian_date(dt: &DateTime<Utc>) -> f64 {
    let y = dt.year() as f64;
    let m = dt.month() as f64;
    let d = dt.day() as f64;
    let h = dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + (dt.second() as f64 + dt.nanosecond() as f64 * 1e-9) / 3600.0;

    let (y2, m2) = if m <= 2.0 {
        (y - 1.0, m + 12.0)
    } else {
        (y, m)
    };

    let a = (y2 / 100.0_f64).floor();
    let b = 2.0 - a + (a / 4.0_f64).floor();

    (365.25_f64 * (y2 + 4716.0)).floor()
        + (30.6001_f64 * (m2 + 1.0)).floor()
        + d
        + h / 24.0
        + b
        - 1524.5
}

/// Greenwich mean sidereal time, radians in [0, 2π).
pub fn gmst(dt: &DateTime<Utc>) -> f64 {
    let t = (julian_date(dt) - J2000) / 36525.0;

    let gmst_sec = 67310.54841
        + (876600.0 * 3600.0 + 8640184.812866) * t
        + 0.093104 * t * t
        - 6.2e-6 * t * t * t;

    let mut s = gmst_sec % SECONDS_PER_DAY;
    if s < 0.0 {
        s += SECONDS_PER_DAY;
    }
    s * (TAU / SECONDS_PER_DAY)
}

/// Local sidereal time for an east longitude in degrees, radians in [0, 2π).
pub fn local_sidereal_time(dt: &DateTime<Utc>, lon_deg: f64) -> f64 {
    normalize_radians(gmst(dt) + lon_deg.to_radians())
}

/// Parse an observation time.
///
/// Accepts RFC 3339 (`2024-01-30T12:00:00Z`) or a naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`, which is read in the
/// IANA zone `tz` (UTC when absent).
pub fn parse_observation_time(s: &str, tz: Option<&str>) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("Invalid time '{}': {}", s, e))?;

    match tz {
        None => Ok(naive.and_utc()),
        Some(name) => {
            let zone: Tz = name
                .parse()
                .map_err(|_| format!("Unknown timezone '{}'. Use IANA format (e.g. America/Chicago).", name))?;
            zone.from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| format!("Time '{}' does not exist in {}", s, name))
        }
    }
}

/// An observer's position and orientation at one instant.
///
/// Built once per estimation run and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverFrame {
    position: GeoPosition,
    /// Local sidereal time, radians.
    sidereal_time: f64,
}

impl ObserverFrame {
    /// Frame for an observer at `position` observing at `at`.
    pub fn at(position: GeoPosition, at: &DateTime<Utc>) -> Self {
        Self {
            position,
            sidereal_time: local_sidereal_time(at, position.longitude),
        }
    }

    /// Frame with an explicitly supplied sidereal angle (radians).
    pub fn with_sidereal_time(position: GeoPosition, sidereal_time: f64) -> Self {
        Self { position, sidereal_time }
    }

    pub fn position(&self) -> &GeoPosition {
        &self.position
    }

    pub fn sidereal_time(&self) -> f64 {
        self.sidereal_time
    }
}
