// Library entry point for linkbio
// Exposes modules for integration tests

pub mod api;
pub mod app;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod settings_store;
pub mod store;
pub mod tracker;
pub mod utils;
pub mod ws;
