//! QuakeAware - earthquake monitoring and predictive risk dashboard.
//!
//! Polls the USGS summary feed, overlays static prediction and risk-zone
//! datasets, and serves the combined state as an interactive map dashboard
//! with list panels and toast notifications.

pub mod cli;
pub mod client;
pub mod dashboard;
pub mod errors;
pub mod models;
pub mod output;
pub mod scene;
pub mod server;
pub mod sources;
pub mod style;
pub mod timefmt;
