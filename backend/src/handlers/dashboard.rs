//! HTTP handler for the dashboard summary

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::dashboard::{DashboardFilter, DashboardSummary};
use crate::services::DashboardService;
use crate::AppState;

/// Today's collection and sales at a glance
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(filter): Query<DashboardFilter>,
) -> AppResult<Json<DashboardSummary>> {
    let service = DashboardService::new(state.db);
    let summary = service.summary(filter).await?;
    Ok(Json(summary))
}
