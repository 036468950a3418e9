//! Sleep dashboard service: fetches per-user sleep records and aggregate
//! analytics from the sleep data microservice, reshapes them into typed
//! domain models with derived metrics, and serves HTML pages plus
//! chart-ready JSON series.

pub mod charts;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod pages;
pub mod routes;

pub use client::SleepApiClient;
pub use config::Config;
pub use routes::router;
