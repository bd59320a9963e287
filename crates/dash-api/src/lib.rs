//! Domain layer for the songdash TUI: wire types, API client, list
//! controller, chart aggregation, config, and CSV export. No UI code here.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod controller;
pub mod export;
pub mod model;
