//! Tracing setup for hosts embedding the coordinator
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=reparse::job=debug` - module-level filtering
//!
//! Hosts with their own subscriber (file appenders, OTLP exporters) should
//! install it themselves instead of calling this.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize a console tracing subscriber honoring RUST_LOG.
///
/// Safe to call more than once; later calls are no-ops if a global
/// subscriber is already installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
