//! HTTP handlers for the advance ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::advance::{
    AdvanceBalance, AdvanceService, AdvanceWithFarmer, RecordAdvanceInput,
};
use crate::AppState;
use shared::Advance;

#[derive(Debug, Default, Deserialize)]
pub struct AdvanceListFilter {
    pub farmer_code: Option<i64>,
}

/// Pay out an advance to a farmer
pub async fn record_advance(
    State(state): State<AppState>,
    Json(input): Json<RecordAdvanceInput>,
) -> AppResult<(StatusCode, Json<Advance>)> {
    let service = AdvanceService::new(state.db);
    let advance = service.record_advance(input).await?;
    Ok((StatusCode::CREATED, Json(advance)))
}

/// List advances, optionally for one farmer
pub async fn list_advances(
    State(state): State<AppState>,
    Query(filter): Query<AdvanceListFilter>,
) -> AppResult<Json<Vec<AdvanceWithFarmer>>> {
    let service = AdvanceService::new(state.db);
    let advances = service.list_advances(filter.farmer_code).await?;
    Ok(Json(advances))
}

/// Outstanding advance balance for a farmer
pub async fn get_advance_balance(
    State(state): State<AppState>,
    Path(farmer_code): Path<i64>,
) -> AppResult<Json<AdvanceBalance>> {
    let service = AdvanceService::new(state.db);
    let balance = service.balance(farmer_code).await?;
    Ok(Json(balance))
}
