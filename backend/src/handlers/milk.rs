//! HTTP handlers for milk intake endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::milk::{
    LateMilkInput, MilkListFilter, MilkRecordWithFarmer, MilkService, RecordMilkInput,
};
use crate::AppState;
use shared::{MilkRecord, Month};

/// Record an intake entry for the current (or given) shift
pub async fn record_milk(
    State(state): State<AppState>,
    Json(input): Json<RecordMilkInput>,
) -> AppResult<(StatusCode, Json<MilkRecord>)> {
    let service = MilkService::new(state.db);
    let record = service.record_milk(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Record or correct an entry for a past shift
pub async fn record_milk_late(
    State(state): State<AppState>,
    Json(input): Json<LateMilkInput>,
) -> AppResult<Json<MilkRecord>> {
    let service = MilkService::new(state.db);
    let record = service.record_milk_late(input).await?;
    Ok(Json(record))
}

/// A farmer's records for one settlement month
pub async fn list_farmer_month_milk(
    State(state): State<AppState>,
    Path((farmer_code, month)): Path<(i64, Month)>,
) -> AppResult<Json<Vec<MilkRecord>>> {
    let service = MilkService::new(state.db);
    let records = service.farmer_month_records(farmer_code, month).await?;
    Ok(Json(records))
}

/// List recent milk records, optionally filtered by date and shift
pub async fn list_milk(
    State(state): State<AppState>,
    Query(filter): Query<MilkListFilter>,
) -> AppResult<Json<Vec<MilkRecordWithFarmer>>> {
    let service = MilkService::new(state.db);
    let records = service.list_milk(filter).await?;
    Ok(Json(records))
}
