pub mod admin;
pub mod analytics;
pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod cors;
pub mod db;
pub mod envelope;
pub mod error;
pub mod inventory;
pub mod model;
pub mod routes;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod test_support;
