//! HTTP handlers for farmer registry endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::farmer::{CreateFarmerInput, FarmerService, UpdateFarmerInput};
use crate::AppState;
use shared::Farmer;

/// List all farmers ordered by code
pub async fn list_farmers(State(state): State<AppState>) -> AppResult<Json<Vec<Farmer>>> {
    let service = FarmerService::new(state.db);
    let farmers = service.list_farmers().await?;
    Ok(Json(farmers))
}

/// Get a farmer by code
pub async fn get_farmer(
    State(state): State<AppState>,
    Path(farmer_code): Path<i64>,
) -> AppResult<Json<Farmer>> {
    let service = FarmerService::new(state.db);
    let farmer = service.get_farmer(farmer_code).await?;
    Ok(Json(farmer))
}

/// Register a farmer; the lowest unused code is assigned unless one is given
pub async fn create_farmer(
    State(state): State<AppState>,
    Json(input): Json<CreateFarmerInput>,
) -> AppResult<(StatusCode, Json<Farmer>)> {
    let service = FarmerService::new(state.db);
    let farmer = service.create_farmer(input).await?;
    Ok((StatusCode::CREATED, Json(farmer)))
}

/// Update a farmer's details
pub async fn update_farmer(
    State(state): State<AppState>,
    Path(farmer_code): Path<i64>,
    Json(input): Json<UpdateFarmerInput>,
) -> AppResult<Json<Farmer>> {
    let service = FarmerService::new(state.db);
    let farmer = service.update_farmer(farmer_code, input).await?;
    Ok(Json(farmer))
}

/// Remove a farmer along with their milk, advance and deduction history
pub async fn delete_farmer(
    State(state): State<AppState>,
    Path(farmer_code): Path<i64>,
) -> AppResult<StatusCode> {
    let service = FarmerService::new(state.db);
    service.delete_farmer(farmer_code).await?;
    Ok(StatusCode::NO_CONTENT)
}
