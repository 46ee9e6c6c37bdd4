//! Serializable outcome of one estimation run, plus a terminal rendering.

use crate::estimator::EstimationError;
use crate::geo::{format_coords, GeoPosition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// `{status, latitude?, longitude?, error_kind?, message?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl EstimateReport {
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

impl From<&Result<GeoPosition, EstimationError>> for EstimateReport {
    fn from(result: &Result<GeoPosition, EstimationError>) -> Self {
        match result {
            Ok(pos) => Self {
                status: Status::Ok,
                latitude: Some(pos.latitude),
                longitude: Some(pos.longitude),
                error_kind: None,
                message: None,
            },
            Err(e) => Self {
                status: Status::Error,
                latitude: None,
                longitude: None,
                error_kind: Some(e.kind().to_string()),
                message: Some(e.to_string()),
            },
        }
    }
}

/// Multi-line summary for stderr.
pub fn render_text(report: &EstimateReport) -> String {
    match (report.status, report.latitude, report.longitude) {
        (Status::Ok, Some(lat), Some(lon)) => format!(
            "  Estimated Signal Origin\n    Latitude:  {:.6}\u{00B0}\n    Longitude: {:.6}\u{00B0}\n    ({})\n",
            lat,
            lon,
            format_coords(lat, lon),
        ),
        _ => format!(
            "  Estimation failed [{}]\n    {}\n",
            report.error_kind.as_deref().unwrap_or("unknown"),
            report.message.as_deref().unwrap_or(""),
        ),
    }
}
