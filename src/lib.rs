pub mod kernel;

// Re-export the two runtime-facing components for convenient access
pub use kernel::entry::ExecutionEntryPoint;
pub use kernel::telemetry::recorder::TelemetryCollector;
