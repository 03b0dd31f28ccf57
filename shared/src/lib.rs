//! Shared types and domain logic for the Dairy Management System
//!
//! This crate contains the domain models, the fat/SNF rate resolution
//! arithmetic and the settlement bookkeeping rules shared between the backend
//! server and its tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
