//! Domain models for the Dairy Management System

mod advance;
mod farmer;
mod milk;
mod rate;
mod sale;

pub use advance::*;
pub use farmer::*;
pub use milk::*;
pub use rate::*;
pub use sale::*;
