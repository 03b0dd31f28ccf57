//! Business logic services

pub mod advance;
pub mod billing;
pub mod dashboard;
pub mod farmer;
pub mod milk;
pub mod pdf;
pub mod rates;
pub mod reporting;
pub mod sale;

pub use advance::AdvanceService;
pub use billing::BillingService;
pub use dashboard::DashboardService;
pub use farmer::FarmerService;
pub use milk::MilkService;
pub use rates::RateService;
pub use reporting::ReportingService;
pub use sale::SaleService;
