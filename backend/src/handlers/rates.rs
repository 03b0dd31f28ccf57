//! HTTP handlers for the rate table

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::rates::{AddRateSlabInput, RateService, RateSlabEntry};
use crate::AppState;
use shared::MilkCategory;

#[derive(Debug, Deserialize)]
pub struct RateLookupQuery {
    pub category: MilkCategory,
    pub fat: f64,
    pub snf: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RateLookupResponse {
    pub category: MilkCategory,
    pub fat: f64,
    pub snf: f64,
    pub rate: f64,
}

/// List the rate table, optionally for one category
#[derive(Debug, Default, Deserialize)]
pub struct RateListFilter {
    pub category: Option<MilkCategory>,
}

pub async fn list_rate_slabs(
    State(state): State<AppState>,
    Query(filter): Query<RateListFilter>,
) -> AppResult<Json<Vec<RateSlabEntry>>> {
    let service = RateService::new(state.db);
    let slabs = service.list_slabs(filter.category).await?;
    Ok(Json(slabs))
}

/// Add or replace the slab for a (category, fat, snf) point
pub async fn add_rate_slab(
    State(state): State<AppState>,
    Json(input): Json<AddRateSlabInput>,
) -> AppResult<(StatusCode, Json<RateSlabEntry>)> {
    let service = RateService::new(state.db);
    let slab = service.add_slab(input).await?;
    Ok((StatusCode::CREATED, Json(slab)))
}

/// Delete a slab by id
pub async fn delete_rate_slab(
    State(state): State<AppState>,
    Path(slab_id): Path<i64>,
) -> AppResult<StatusCode> {
    let service = RateService::new(state.db);
    service.delete_slab(slab_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve the per-litre rate for a quality reading
pub async fn lookup_rate(
    State(state): State<AppState>,
    Query(query): Query<RateLookupQuery>,
) -> AppResult<Json<RateLookupResponse>> {
    let service = RateService::new(state.db);
    let snf = query.snf.unwrap_or(shared::DEFAULT_SNF);
    let fat = shared::slab_fat(query.fat);
    let rate = service.find_rate(query.category, fat, snf).await?;
    Ok(Json(RateLookupResponse {
        category: query.category,
        fat,
        snf,
        rate,
    }))
}
