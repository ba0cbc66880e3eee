//! Type definitions for the loan approval service

pub mod application;
pub mod prediction;

pub use application::LoanApplication;
pub use prediction::{approval_percentage, DashboardResponse};
