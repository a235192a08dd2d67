//! # tnwatch
//!
//! Fetch a time series from the TRUF stream network, summarise it and raise a
//! threshold alert.
//!
//! ## Architecture
//!
//! - **Credential**: signing key from `PRIVATE_KEY`
//! - **Client**: JSON-RPC gateway client behind the [`client::NetworkClient`] trait
//! - **Fetcher**: date-bounded record retrieval, conversion and scaling
//! - **Calculator**: mean of the fetched values, reported as `"VaR"`
//! - **Alerting**: strict threshold comparison and the alert message
//!
//! ## Quick Start
//!
//! ```bash
//! export PRIVATE_KEY=<hex key>
//! tnwatch risk --threshold 1000
//! tnwatch --format json index
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod alerting;
pub mod calculator;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod output;
pub mod pipeline;

pub use crate::config::Config;
pub use crate::error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{generate_alerts, AlertRule};
    pub use crate::calculator::calculate_metrics;
    pub use crate::client::{NetworkClient, StreamHandle, TnClient};
    pub use crate::config::Config;
    pub use crate::credential::{load_credential, Credential};
    pub use crate::error::{Error, Result};
    pub use crate::fetcher::{fetch_index, fetch_records, FetchPolicy};
    pub use crate::models::*;
    pub use crate::pipeline::{Pipeline, PipelineConfig, RunReport};
}
