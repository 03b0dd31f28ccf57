//! HTTP handlers

pub mod advance;
pub mod billing;
pub mod dashboard;
pub mod farmer;
pub mod health;
pub mod milk;
pub mod rates;
pub mod reporting;
pub mod sale;

pub use advance::*;
pub use billing::*;
pub use dashboard::*;
pub use farmer::*;
pub use health::*;
pub use milk::*;
pub use rates::*;
pub use reporting::*;
pub use sale::*;
