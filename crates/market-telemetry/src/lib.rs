//! # Market Telemetry
//!
//! Structured logging for market nodes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `market-node` | Service name in logs |
//! | `MARKET_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `MARKET_JSON_LOGS` | `false` | JSON output, on by default in containers |
//! | `MARKET_CONSOLE_OUTPUT` | `true` | Disable to silence stdout |

#![warn(missing_docs)]

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{env_filter, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed or could not be built
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Invalid filter directive or configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    init_tracing(&config)
}
