//! API endpoint handlers.

pub mod admin;
pub mod dashboards;
pub mod datapuur_ai;
pub mod health;
pub mod jobs;
