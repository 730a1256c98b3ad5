use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TRACE_BUFFER_CAPACITY: usize = 10_000;

/// Runtime-wide knobs read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Collect GC pause and megablock statistics. Independent of tracing.
    pub gc_statistics: bool,
    /// Records retained by an in-memory trace sink before the oldest is evicted.
    pub trace_buffer_capacity: usize,
    pub symbols: WellKnownSymbols,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gc_statistics: false,
            trace_buffer_capacity: DEFAULT_TRACE_BUFFER_CAPACITY,
            symbols: WellKnownSymbols::default(),
        }
    }
}

/// Names the entry point resolves when composing the program's `main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellKnownSymbols {
    /// Closure wrapping `main` with top-level exception and exit handling.
    pub top_handler: String,
    /// The program's `main` closure.
    pub main: String,
    /// Entry function building an application closure from two closures.
    pub apply: String,
}

impl Default for WellKnownSymbols {
    fn default() -> Self {
        Self {
            top_handler: "TopHandler_runMainIO_closure".to_string(),
            main: "Main_main_closure".to_string(),
            apply: "rts_apply".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid runtime config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = RuntimeConfig::from_json_str(r#"{ "gc_statistics": true, "symbols": { "main": "App_main_closure" } }"#)
            .unwrap();
        assert!(cfg.gc_statistics);
        assert_eq!(cfg.trace_buffer_capacity, DEFAULT_TRACE_BUFFER_CAPACITY);
        assert_eq!(cfg.symbols.main, "App_main_closure");
        assert_eq!(cfg.symbols.apply, "rts_apply");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(RuntimeConfig::from_json_str("{ gc_statistics: yes").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RuntimeConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }
}
