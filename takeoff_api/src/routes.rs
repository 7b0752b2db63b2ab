use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use takeoff_core::calculations::{
    estimate_block_volume, estimate_building, estimate_concrete, estimate_cost, estimate_rebar_weight,
    estimate_steel, BlockInput, BlockVolume, BuildingEstimate, BuildingInput, ConcreteInput,
    ConcreteVolumeBreakdown, CostBreakdown, CostInput, RebarInput, RebarWeight, SteelInput,
    SteelWeightBreakdown,
};
use takeoff_core::errors::{CalcError, CalcResult};
use takeoff_core::project::ProjectRef;
use takeoff_core::report::{self, CostReport, CreateReportRequest};
use takeoff_core::store::ReportStore;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

type Body = Result<Json<Value>, JsonRejection>;

fn body(payload: Body) -> ApiResult<Value> {
    let Json(raw) = payload?;
    Ok(raw)
}

/// Run a store operation on the blocking pool.
async fn blocking<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn ReportStore) -> CalcResult<T> + Send + 'static,
{
    let store = state.store();
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn calculate_concrete(payload: Body) -> ApiResult<Json<ConcreteVolumeBreakdown>> {
    let input = ConcreteInput::from_json(&body(payload)?)?;
    Ok(Json(estimate_concrete(&input)?))
}

pub async fn calculate_steel(payload: Body) -> ApiResult<Json<SteelWeightBreakdown>> {
    let input = SteelInput::from_json(&body(payload)?)?;
    Ok(Json(estimate_steel(&input)?))
}

pub async fn estimate_cost_handler(payload: Body) -> ApiResult<Json<CostBreakdown>> {
    let input = CostInput::from_json(&body(payload)?)?;
    Ok(Json(estimate_cost(&input)?))
}

pub async fn calculate_block(payload: Body) -> ApiResult<Json<BlockVolume>> {
    let input = BlockInput::from_json(&body(payload)?)?;
    Ok(Json(estimate_block_volume(&input)?))
}

pub async fn calculate_rebar(payload: Body) -> ApiResult<Json<RebarWeight>> {
    let input = RebarInput::from_json(&body(payload)?)?;
    Ok(Json(estimate_rebar_weight(&input)?))
}

pub async fn estimate_building_handler(payload: Body) -> ApiResult<Json<BuildingEstimate>> {
    let input = BuildingInput::from_json(&body(payload)?)?;
    Ok(Json(estimate_building(&input)?))
}

pub async fn create_cost_report(
    State(app_state): State<Arc<AppState>>,
    payload: Body,
) -> ApiResult<(StatusCode, Json<CostReport>)> {
    let request = CreateReportRequest::from_json(body(payload)?)?;
    let created = blocking(&app_state, move |store| report::create_report(store, request)).await?;

    info!(
        target: "audit",
        action = "cost_report.create",
        report_id = %created.id,
        engineer_id = %created.engineer_id,
        total_cost = created.total_cost,
        "cost report stored"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_project_reports(
    State(app_state): State<Arc<AppState>>,
    Path(project_ref): Path<String>,
) -> ApiResult<Json<Vec<CostReport>>> {
    let reference = ProjectRef::either(project_ref);
    let reports = blocking(&app_state, move |store| report::list_reports_for_project(store, &reference)).await?;
    Ok(Json(reports))
}

pub async fn list_engineer_reports(
    State(app_state): State<Arc<AppState>>,
    Path(engineer_id): Path<String>,
) -> ApiResult<Json<Vec<CostReport>>> {
    let reports = blocking(&app_state, move |store| report::list_reports_for_engineer(store, &engineer_id)).await?;
    Ok(Json(reports))
}

pub async fn list_owner_reports(
    State(app_state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<Vec<CostReport>>> {
    let reports = blocking(&app_state, move |store| report::list_reports_for_owner(store, &owner_id)).await?;
    Ok(Json(reports))
}

pub async fn get_cost_report(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CostReport>> {
    // A malformed id cannot name a stored report
    let id = Uuid::parse_str(id.trim()).map_err(|_| CalcError::report_not_found(id.clone()))?;
    let found = blocking(&app_state, move |store| report::get_report(store, &id)).await?;
    Ok(Json(found))
}
