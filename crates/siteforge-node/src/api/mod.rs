//! API endpoints.

pub mod build;
pub mod error;
pub mod health;
pub mod history;
