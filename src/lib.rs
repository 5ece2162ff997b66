//! Headless core for an LLM gateway web console.
//!
//! This crate implements everything the console's UI layer computes but does
//! not render: the usage-aggregation and chart-projection pipeline behind the
//! dashboard, the streaming chat playground session, a typed client for the
//! gateway's REST API, and the supporting services (pricing arithmetic, plan
//! capability probing, the client-local settings store).
//!
//! The crate performs no rendering and installs no global state; every
//! component takes its collaborators (HTTP client, local store) explicitly.

pub mod analytics;
pub mod api_types;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod plans;
pub mod playground;
pub mod pricing;
pub mod store;

pub use client::GatewayClient;
pub use config::{ChartConfig, ConsoleConfig};
pub use error::{ConsoleError, ConsoleResult};
