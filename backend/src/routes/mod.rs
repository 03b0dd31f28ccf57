//! Route definitions for the Dairy Management System

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Farmer registry
        .nest("/farmers", farmer_routes())
        // Milk intake
        .nest("/milk", milk_routes())
        // Advance ledger
        .nest("/advances", advance_routes())
        // Wholesale sales
        .nest("/sales", sale_routes())
        // Rate table
        .nest("/rates", rate_routes())
        // Dashboard
        .route("/dashboard", get(handlers::get_dashboard))
        // Monthly settlement
        .nest("/bills", billing_routes())
        // Monthly reports
        .nest("/reports", report_routes())
}

fn farmer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_farmers).post(handlers::create_farmer),
        )
        .route(
            "/:farmer_code",
            get(handlers::get_farmer)
                .put(handlers::update_farmer)
                .delete(handlers::delete_farmer),
        )
        .route(
            "/:farmer_code/advance-balance",
            get(handlers::get_advance_balance),
        )
}

fn milk_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_milk).post(handlers::record_milk))
        .route("/late", post(handlers::record_milk_late))
        .route(
            "/farmer/:farmer_code/:month",
            get(handlers::list_farmer_month_milk),
        )
}

fn advance_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_advances).post(handlers::record_advance),
    )
}

fn sale_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_sales).post(handlers::record_sale))
}

fn rate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_rate_slabs).post(handlers::add_rate_slab),
        )
        .route("/lookup", get(handlers::lookup_rate))
        .route("/:slab_id", axum::routing::delete(handlers::delete_rate_slab))
}

fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/:farmer_code/:month", get(handlers::preview_bill))
        .route("/settle", post(handlers::settle_bill))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/sales/:month", get(handlers::get_sales_report))
        .route("/sales/:month/csv", get(handlers::get_sales_report_csv))
        .route("/sales/:month/pdf", get(handlers::get_sales_report_pdf))
        .route("/monthly/:month", get(handlers::get_monthly_report))
        .route("/monthly/:month/pdf", get(handlers::get_monthly_report_pdf))
}
