//! HTTP API: query and health endpoints

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::ParadecastConfig;
use crate::engine;
use crate::error::ParadecastError;
use crate::models::{
    Condition, ConditionProbabilities, Confidence, Driver, Location,
};
use crate::sources::SourceSet;

/// Shared per-process state behind the router
pub struct AppState {
    pub config: Arc<ParadecastConfig>,
    pub sources: SourceSet,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub lat: f64,
    pub lon: f64,
    /// Calendar date, ISO 8601 (YYYY-MM-DD)
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub location: Location,
    pub when: NaiveDate,
    pub probabilities: ConditionProbabilities,
    pub top_risks: Vec<Condition>,
    pub drivers: Vec<Driver>,
    pub confidence: Confidence,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/health", get(health))
        .with_state(state)
}

#[instrument(skip(state), fields(lat = request.lat, lon = request.lon, date = %request.date))]
async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ApiError>)> {
    validate(&request).map_err(|e| bad_request(&e))?;

    let location = Location {
        latitude: request.lat,
        longitude: request.lon,
    };
    let bundle = state.sources.assemble(location, request.date).await;
    let result = engine::evaluate(&bundle, &state.config.engine);

    info!(
        sources = bundle.source_count(),
        confidence = ?result.confidence,
        "query evaluated"
    );

    Ok(Json(QueryResponse {
        location,
        when: request.date,
        probabilities: result.probabilities,
        top_risks: result.top_risks,
        drivers: result.drivers,
        confidence: result.confidence,
        suggestions: result.suggestions,
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn validate(request: &QueryRequest) -> Result<(), ParadecastError> {
    if !(-90.0..=90.0).contains(&request.lat) {
        return Err(ParadecastError::validation(format!(
            "Latitude must be between -90 and 90, got: {}",
            request.lat
        )));
    }
    if !(-180.0..=180.0).contains(&request.lon) {
        return Err(ParadecastError::validation(format!(
            "Longitude must be between -180 and 180, got: {}",
            request.lon
        )));
    }
    Ok(())
}

fn bad_request(error: &ParadecastError) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: error.user_message(),
        }),
    )
}
