use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::path::Path as FsPath;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tp_core::planning_service::{PlanningService, TradeRoute};
use tp_domain::{CommodityName, LocationPath, OptimizeRequest, OptimizeResponse, StockQuery, StockResponse, TradeDirection, MATCH_EVERYTHING};
use tracing::{event, Level};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PlanningService>,
}

impl AppState {
    pub fn new(service: PlanningService) -> Self {
        Self { service: Arc::new(service) }
    }
}

#[derive(Deserialize, Debug)]
pub struct FilterParams {
    #[serde(default = "match_everything")]
    pub filter: String,
}

fn match_everything() -> String {
    MATCH_EVERYTHING.to_string()
}

pub fn router(state: AppState, static_dir: Option<&FsPath>) -> Router {
    let api = Router::new()
        .route("/locations", get(list_locations))
        .route("/commodities", get(list_commodities))
        .route("/:ops/stocks", post(lookup_stocks))
        .route("/optimize", post(optimize))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };
    app.layer(TraceLayer::new_for_http())
}

async fn list_locations(State(state): State<AppState>, Query(params): Query<FilterParams>) -> Json<Vec<LocationPath>> {
    Json(state.service.catalog().matching_locations(&params.filter))
}

async fn list_commodities(State(state): State<AppState>, Query(params): Query<FilterParams>) -> Json<Vec<CommodityName>> {
    Json(state.service.catalog().matching_commodities(&params.filter))
}

async fn lookup_stocks(
    State(state): State<AppState>,
    Path(ops): Path<String>,
    payload: Result<Json<StockQuery>, JsonRejection>,
) -> Result<Json<StockResponse>, ApiError> {
    let direction = TradeDirection::from_str(&ops).map_err(|_| ApiError::BadRequest(format!("unknown trading direction '{ops}'")))?;
    let Json(query) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let report = state
        .service
        .catalog()
        .stock_report(direction, &query)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    Ok(Json(report))
}

async fn optimize(State(state): State<AppState>, payload: Result<Json<OptimizeRequest>, JsonRejection>) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    request.validate().map_err(ApiError::BadRequest)?;
    event!(
        Level::INFO,
        "Optimizing with range {}, cargo {}, {} stops, filter '{}'",
        request.max_range,
        request.max_cargo,
        request.stops,
        request.filter
    );

    let service = Arc::clone(&state.service);
    let route = match tokio::task::spawn_blocking(move || service.optimize(&request)).await {
        Ok(route) => route,
        Err(err) => {
            event!(Level::ERROR, "Optimization task failed: {}", err);
            TradeRoute::null()
        }
    };

    Ok(([(header::CACHE_CONTROL, "no-cache")], Json(OptimizeResponse::from(&route))))
}
