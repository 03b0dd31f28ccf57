//! HTTP handlers for monthly reports

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::services::reporting::{MonthlyReport, SalesReport};
use crate::services::ReportingService;
use crate::AppState;
use shared::Month;

#[derive(Serialize)]
pub struct ReportFileResponse {
    pub path: String,
}

fn reporting_service(state: &AppState) -> ReportingService {
    ReportingService::new(state.db.clone(), state.config.reports.dir.clone().into())
}

/// Sales report for a month as JSON
pub async fn get_sales_report(
    State(state): State<AppState>,
    Path(month): Path<Month>,
) -> AppResult<Json<SalesReport>> {
    let service = reporting_service(&state);
    let report = service.sales_report(month).await?;
    Ok(Json(report))
}

/// Sales report for a month as a CSV download
pub async fn get_sales_report_csv(
    State(state): State<AppState>,
    Path(month): Path<Month>,
) -> AppResult<impl IntoResponse> {
    let service = reporting_service(&state);
    let csv = service.sales_report_csv(month).await?;
    let disposition = format!("attachment; filename=\"Sales_Report_{}.csv\"", month);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// Sales report for a month written as a PDF; responds with the file path
pub async fn get_sales_report_pdf(
    State(state): State<AppState>,
    Path(month): Path<Month>,
) -> AppResult<Json<ReportFileResponse>> {
    let service = reporting_service(&state);
    let path = service.sales_report_pdf(month).await?;
    Ok(Json(ReportFileResponse { path }))
}

/// Consolidated farmer report for a month as JSON
pub async fn get_monthly_report(
    State(state): State<AppState>,
    Path(month): Path<Month>,
) -> AppResult<Json<MonthlyReport>> {
    let service = reporting_service(&state);
    let report = service.monthly_report(month).await?;
    Ok(Json(report))
}

/// Consolidated farmer report written as a PDF; responds with the file path
pub async fn get_monthly_report_pdf(
    State(state): State<AppState>,
    Path(month): Path<Month>,
) -> AppResult<Json<ReportFileResponse>> {
    let service = reporting_service(&state);
    let path = service.monthly_report_pdf(month).await?;
    Ok(Json(ReportFileResponse { path }))
}
