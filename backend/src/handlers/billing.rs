//! HTTP handlers for monthly settlement

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::services::billing::{BillPreview, BillSettlement, SettleBillInput};
use crate::services::BillingService;
use crate::AppState;
use shared::Month;

fn billing_service(state: &AppState) -> BillingService {
    BillingService::new(
        state.db.clone(),
        state.config.reports.bills_dir.clone().into(),
    )
}

/// Preview a farmer's bill for a month
pub async fn preview_bill(
    State(state): State<AppState>,
    Path((farmer_code, month)): Path<(i64, Month)>,
) -> AppResult<Json<BillPreview>> {
    let service = billing_service(&state);
    let preview = service.preview(farmer_code, month).await?;
    Ok(Json(preview))
}

/// Confirm a settlement and write the bill PDF
pub async fn settle_bill(
    State(state): State<AppState>,
    Json(input): Json<SettleBillInput>,
) -> AppResult<Json<BillSettlement>> {
    let service = billing_service(&state);
    let settlement = service.settle(input).await?;
    Ok(Json(settlement))
}
