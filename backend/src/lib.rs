//! # AITW Insights
//!
//! Aggregation and shaping layer for pull-request statistics of autonomous
//! coding agents.
//!
//! Pre-computed insight tables are read from a store, grouped by filter and
//! bucket into per-agent values with optional confidence bounds, and turned
//! into chart-ready series for the dashboard.
//!
//! ## Architecture
//!
//! - [`api`]: Data Transfer Objects (DTOs) for API responses
//! - [`models`]: Agent identifiers and agent-keyed maps
//! - [`db`]: Query contract, repository pattern and store backends
//! - [`services`]: Shaping, chart series, selection state and page loading
//! - [`http`]: Axum-based HTTP server and request handlers
//! - [`routes`]: Shaped data types per endpoint

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
