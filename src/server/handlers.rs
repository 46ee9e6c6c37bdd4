use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::catalog::{CatalogError, SnapshotSource};
use crate::estimator::{self, LongitudeAnchor, SolverConfig};
use crate::geo::{AngularPosition, GeoPosition, RangeMeasurement};
use crate::report::EstimateReport;
use crate::sidereal::{self, ObserverFrame};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

// ─── POST /api/estimate ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ObserverBody {
    pub lat: f64,
    pub lon: f64,
    pub elev: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ReferenceBody {
    pub ra: f64,
    pub dec: f64,
    pub range: f64,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub observer: ObserverBody,
    /// Local sidereal time in radians. Takes precedence over `time`.
    pub lst: Option<f64>,
    /// RFC 3339 observation time. Defaults to now.
    pub time: Option<String>,
    pub references: Vec<ReferenceBody>,
    pub epsilon: Option<f64>,
    pub anchor: Option<LongitudeAnchor>,
}

pub async fn estimate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EstimateRequest>,
) -> Result<(StatusCode, Json<EstimateReport>), ApiError> {
    let start = Instant::now();
    let (status, report) = run_estimate(&state.config.solver(), &req)?;

    info!(
        status = status.as_u16(),
        error_kind = report.error_kind.as_deref().unwrap_or("-"),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "POST /api/estimate"
    );

    Ok((status, Json(report)))
}

/// Turn a request into a report. Estimation failures are reported in the
/// body with 422; malformed observer/time fields are rejected with 400.
fn run_estimate(
    defaults: &SolverConfig,
    req: &EstimateRequest,
) -> Result<(StatusCode, EstimateReport), ApiError> {
    let mut position = GeoPosition::new(req.observer.lat, req.observer.lon);
    if let Some(elev) = req.observer.elev {
        position = position.with_elevation(elev);
    }

    let observer = match (req.lst, &req.time) {
        (Some(lst), _) => ObserverFrame::with_sidereal_time(position, lst),
        (None, Some(t)) => {
            let at = sidereal::parse_observation_time(t, None)
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
            ObserverFrame::at(position, &at)
        }
        (None, None) => ObserverFrame::at(position, &Utc::now()),
    };

    let config = SolverConfig {
        degeneracy_epsilon: req.epsilon.unwrap_or(defaults.degeneracy_epsilon),
        anchor: req.anchor.unwrap_or(defaults.anchor),
    };

    let refs: Vec<AngularPosition> = req
        .references
        .iter()
        .map(|r| AngularPosition::new(r.ra, r.dec))
        .collect();
    let ranges: Vec<RangeMeasurement> = req.references.iter().map(|r| RangeMeasurement::from(r.range)).collect();

    let result = estimator::estimate_slices(&config, &observer, &refs, &ranges);
    let report = EstimateReport::from(&result);
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((status, report))
}

// ─── GET /api/catalog ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub offline: Option<bool>,
}

#[derive(Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub catalog_number: String,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub origin: String,
    pub fetched_at_ms: i64,
    pub satellites: Vec<CatalogEntry>,
}

pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let start = Instant::now();
    let offline = params.offline.unwrap_or(false);

    // The fetch is blocking I/O; keep it off the async workers.
    let worker_state = Arc::clone(&state);
    let snapshot = tokio::task::spawn_blocking(move || {
        let mut resolver = worker_state
            .catalog
            .lock()
            .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "catalog lock poisoned"))?;
        let was_offline = resolver.is_offline();
        resolver.set_offline(was_offline || offline);
        let result = resolver.current_snapshot();
        resolver.set_offline(was_offline);
        result.map_err(catalog_error)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;

    info!(
        origin = %snapshot.origin,
        records = snapshot.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/catalog"
    );

    Ok(Json(CatalogResponse {
        origin: snapshot.origin.to_string(),
        fetched_at_ms: snapshot.fetched_at_ms,
        satellites: snapshot
            .records
            .into_iter()
            .map(|r| CatalogEntry { name: r.name, catalog_number: r.catalog_number })
            .collect(),
    }))
}

fn catalog_error(e: CatalogError) -> ApiError {
    warn!(error = %e, "catalog request failed");
    match e {
        CatalogError::NoSnapshot | CatalogError::Network(_) => {
            api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
        CatalogError::NotFound(_) => api_error(StatusCode::NOT_FOUND, e.to_string()),
        _ => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, SnapshotCache, SnapshotOrigin, TleRecord};
    use crate::config::AppConfig;
    use tempfile::TempDir;

    fn request(json: &str) -> EstimateRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_run_estimate_ok() {
        let req = request(
            r#"{
                "observer": { "lat": 34.7304, "lon": -86.5861, "elev": 200 },
                "lst": 1.0,
                "references": [
                    { "ra": 0.10, "dec": 0.20, "range": 5000.0 },
                    { "ra": 0.15, "dec": 0.25, "range": 6000.0 },
                    { "ra": 0.05, "dec": 0.30, "range": 7000.0 }
                ]
            }"#,
        );
        let (status, report) = run_estimate(&SolverConfig::default(), &req).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!((report.longitude.unwrap() - 144.02529153780108).abs() < 1e-9);
    }

    #[test]
    fn test_run_estimate_degenerate_is_422() {
        let req = request(
            r#"{
                "observer": { "lat": 0.0, "lon": 0.0 },
                "lst": 0.0,
                "references": [
                    { "ra": 0.0, "dec": 0.0, "range": 1.0 },
                    { "ra": 1.0, "dec": 0.0, "range": 1.0 },
                    { "ra": 2.0, "dec": 0.0, "range": 1.0 }
                ]
            }"#,
        );
        let (status, report) = run_estimate(&SolverConfig::default(), &req).unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(report.error_kind.as_deref(), Some("degenerate_geometry"));
    }

    #[test]
    fn test_run_estimate_wrong_arity() {
        let req = request(
            r#"{
                "observer": { "lat": 0.0, "lon": 0.0 },
                "lst": 0.0,
                "references": [ { "ra": 0.0, "dec": 0.0, "range": 1.0 } ]
            }"#,
        );
        let (status, report) = run_estimate(&SolverConfig::default(), &req).unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(report.error_kind.as_deref(), Some("invalid_input"));
    }

    #[test]
    fn test_run_estimate_request_overrides() {
        let req = request(
            r#"{
                "observer": { "lat": 0.0, "lon": 0.0 },
                "lst": 1.0,
                "anchor": "pivot",
                "references": [
                    { "ra": 0.10, "dec": 0.20, "range": 5000.0 },
                    { "ra": 0.15, "dec": 0.25, "range": 6000.0 },
                    { "ra": 0.05, "dec": 0.30, "range": 7000.0 }
                ]
            }"#,
        );
        let (_, report) = run_estimate(&SolverConfig::default(), &req).unwrap();
        assert!((report.longitude.unwrap() - 92.459089976027).abs() < 1e-9);
    }

    #[test]
    fn test_run_estimate_bad_time() {
        let req = request(
            r#"{
                "observer": { "lat": 0.0, "lon": 0.0 },
                "time": "not-a-time",
                "references": []
            }"#,
        );
        let err = run_estimate(&SolverConfig::default(), &req).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    fn offline_state(dir: &TempDir) -> Arc<AppState> {
        let config = AppConfig {
            offline: true,
            cache_path: Some(dir.path().join("catalog.json")),
            ..AppConfig::default()
        };
        Arc::new(AppState::new(config))
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_catalog_without_snapshot_is_503() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);

        let err = catalog(State(state), Query(CatalogQuery { offline: None }))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_catalog_serves_cached_snapshot() {
        let dir = TempDir::new().unwrap();
        let state = offline_state(&dir);

        let err = catalog(State(Arc::clone(&state)), Query(CatalogQuery { offline: Some(true) }))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);

        let iss = TleRecord {
            name: "ISS (ZARYA)".into(),
            catalog_number: "25544U".into(),
            line1: "1 25544U 98067A   24030.52372685  .00016717  00000-0  30270-3 0  9991".into(),
            line2: "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.49815361436940".into(),
        };
        let snapshot = CatalogSnapshot::new(vec![iss], SnapshotOrigin::Remote);
        SnapshotCache::at(dir.path().join("catalog.json")).store(&snapshot).unwrap();

        let Json(body) = catalog(State(state), Query(CatalogQuery { offline: Some(true) }))
            .await
            .unwrap();
        assert_eq!(body.origin, "Cache");
        assert_eq!(body.fetched_at_ms, snapshot.fetched_at_ms);
        assert_eq!(body.satellites.len(), 1);
        assert_eq!(body.satellites[0].name, "ISS (ZARYA)");
        assert_eq!(body.satellites[0].catalog_number, "25544U");
    }

    #[test]
    fn test_catalog_error_status() {
        assert_eq!(catalog_error(CatalogError::NoSnapshot).0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            catalog_error(CatalogError::Network("timed out".into())).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(catalog_error(CatalogError::NotFound("99999U".into())).0, StatusCode::NOT_FOUND);
        assert_eq!(
            catalog_error(CatalogError::Parse { line: 3, message: "bad marker".into() }).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(catalog_error(CatalogError::Io(io)).0, StatusCode::INTERNAL_SERVER_ERROR);

        let err = catalog_error(CatalogError::NoSnapshot);
        assert!(err.1.contains("no catalog snapshot"));
    }
}
