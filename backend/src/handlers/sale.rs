//! HTTP handlers for wholesale sales

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::sale::{RecordSaleInput, SaleService};
use crate::AppState;
use shared::Sale;

#[derive(Debug, Default, Deserialize)]
pub struct SaleListFilter {
    pub limit: Option<i64>,
}

/// Record a wholesale dispatch to an external dairy
pub async fn record_sale(
    State(state): State<AppState>,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<(StatusCode, Json<Sale>)> {
    let service = SaleService::new(state.db);
    let sale = service.record_sale(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales, newest first
pub async fn list_sales(
    State(state): State<AppState>,
    Query(filter): Query<SaleListFilter>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db);
    let sales = service.list_sales(filter.limit).await?;
    Ok(Json(sales))
}
