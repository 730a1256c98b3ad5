pub mod collab;
pub mod config;
pub mod context;
pub mod deferred;
pub mod entry;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod telemetry;
pub mod time;
