use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::info;

use crate::kernel::config::DEFAULT_TRACE_BUFFER_CAPACITY;

/// Destination for structured trace records.
pub trait TraceSink: Send + Sync {
    fn log_info(&self, record: Value);
}

/// Forwards every record to `tracing` on the `rts::trace` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn log_info(&self, record: Value) {
        info!(target: "rts::trace", %record);
    }
}

/// Bounded in-memory sink. Oldest records are evicted once full.
#[derive(Debug)]
pub struct MemorySink {
    buffer: Mutex<VecDeque<Value>>,
    capacity: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TRACE_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn records(&self) -> Vec<Value> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSink for MemorySink {
    fn log_info(&self, record: Value) {
        if self.capacity == 0 {
            return;
        }
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evicts_oldest_when_full() {
        let sink = MemorySink::with_capacity(2);
        sink.log_info(json!(1));
        sink.log_info(json!(2));
        sink.log_info(json!(3));
        assert_eq!(sink.records(), vec![json!(2), json!(3)]);
    }

    #[test]
    fn poisoned_buffer_keeps_accepting_records() {
        let sink = std::sync::Arc::new(MemorySink::with_capacity(4));
        sink.log_info(json!("before"));

        let holder = sink.clone();
        let panicked = std::thread::spawn(move || {
            let _guard = holder.buffer.lock().unwrap();
            panic!("sink panicked mid-append");
        })
        .join();
        assert!(panicked.is_err());
        assert!(sink.buffer.is_poisoned());

        sink.log_info(json!("after"));
        assert_eq!(sink.records(), vec![json!("before"), json!("after")]);
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn zero_capacity_drops_everything() {
        let sink = MemorySink::with_capacity(0);
        sink.log_info(json!("x"));
        assert!(sink.is_empty());
    }
}
