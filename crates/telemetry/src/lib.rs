//! Tracing bootstrap for the bookshelf client.

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the tracing pipeline. Safe to call more than once; later
/// calls are no-ops.
pub fn init(settings: &TelemetrySettings) {
    let initialized = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().try_init().is_ok(),
        LogFormat::Json => tracing_subscriber::fmt().json().try_init().is_ok(),
    };
    if initialized {
        tracing::debug!(format = ?settings.log_format, "telemetry initialized");
    }
}
