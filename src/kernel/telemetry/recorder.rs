use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info};

use super::event::TraceEvent;
use super::metrics::{check_lockstep, compute_statistics, GcCounters, GcStatistics, MegablockSample};
use super::sink::TraceSink;
use super::symbols::SymbolLookupTable;
use crate::kernel::collab::Address;
use crate::kernel::config::RuntimeConfig;
use crate::kernel::deferred::Deferred;
use crate::kernel::error::TelemetryError;
use crate::kernel::time::{Clock, MonotonicClock, Timestamp};

/// Result of asking for GC statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatisticsReport {
    /// Collection was switched off at construction.
    Disabled,
    Collected(GcStatistics),
}

impl StatisticsReport {
    pub fn statistics(&self) -> Option<&GcStatistics> {
        match self {
            StatisticsReport::Disabled => None,
            StatisticsReport::Collected(stats) => Some(stats),
        }
    }
}

/// Records trace events and GC facts reported by the scheduler and the
/// memory manager.
///
/// Trace events always reach the sink. GC recorders are no-ops when
/// statistics are disabled: they neither read the clock nor run deferred
/// producers.
pub struct TelemetryCollector {
    sink: Arc<dyn TraceSink>,
    symbols: SymbolLookupTable,
    clock: Arc<dyn Clock>,
    stats: Option<Mutex<GcCounters>>,
}

impl TelemetryCollector {
    pub fn new(sink: Arc<dyn TraceSink>, symbols: &HashMap<String, Address>, gc_statistics: bool) -> Self {
        Self::with_clock(sink, symbols, gc_statistics, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        sink: Arc<dyn TraceSink>,
        symbols: &HashMap<String, Address>,
        gc_statistics: bool,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sink,
            symbols: SymbolLookupTable::invert(symbols),
            clock,
            stats: gc_statistics.then(|| Mutex::new(GcCounters::default())),
        }
    }

    pub fn from_config(sink: Arc<dyn TraceSink>, symbols: &HashMap<String, Address>, config: &RuntimeConfig) -> Self {
        Self::new(sink, symbols, config.gc_statistics)
    }

    pub fn gc_statistics_enabled(&self) -> bool {
        self.stats.is_some()
    }

    pub fn symbol_name(&self, addr: Address) -> Option<&str> {
        self.symbols.lookup(addr)
    }

    /// Current reading of the collector's clock, for callers timing a GC.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // --- Trace events ---

    pub fn record_call(&self, function: Address) {
        self.emit(TraceEvent::Call {
            function,
            name: self.name_of(function),
        });
    }

    pub fn record_branch(&self, function: Address, label: u32) {
        self.emit(TraceEvent::Branch {
            function,
            name: self.name_of(function),
            label,
        });
    }

    pub fn record_local_assignment(&self, function: Address, slot: u32, value: u64) {
        self.emit(TraceEvent::SetLocal {
            function,
            name: self.name_of(function),
            slot,
            value,
            value_name: self.name_of(value),
        });
    }

    fn name_of(&self, addr: Address) -> Option<String> {
        self.symbols.lookup(addr).map(str::to_owned)
    }

    fn emit(&self, event: TraceEvent) {
        self.sink.log_info(event.to_record());
    }

    // --- GC statistics ---

    pub fn record_init_done(&self) {
        let Some(stats) = &self.stats else { return };
        let now = self.clock.now();
        lock(stats).init_wall_time = Some(now);
    }

    pub fn record_minor_gc<'a>(&self, begin: impl Into<Deferred<'a, Timestamp>>) {
        self.record_gc_pause(begin.into(), |c| c.num_minor_gcs += 1);
    }

    pub fn record_major_gc<'a>(&self, begin: impl Into<Deferred<'a, Timestamp>>) {
        self.record_gc_pause(begin.into(), |c| c.num_major_gcs += 1);
    }

    fn record_gc_pause(&self, begin: Deferred<'_, Timestamp>, bump: impl FnOnce(&mut GcCounters)) {
        let Some(stats) = &self.stats else { return };
        let begin = begin.resolve();
        let pause = self.clock.now().since(begin);
        let mut counters = lock(stats);
        counters.gc_wall_time += pause;
        bump(&mut counters);
    }

    /// Census of the major GC that just finished. A census carrying a dead
    /// count also contributes an alive/dead ratio sample.
    pub fn record_live_megablocks<'a>(&self, sample: impl Into<Deferred<'a, MegablockSample>>) {
        let Some(stats) = &self.stats else { return };
        let sample = sample.into().resolve();
        let mut counters = lock(stats);
        counters.live_mblocks_samples.push(sample.live);
        if let Some(ratio) = sample.alive_vs_dead_ratio() {
            counters.alive_vs_dead_ratio_samples.push(ratio);
        }
        if sample.has_no_dead() {
            counters.zero_dead_censuses += 1;
        }
    }

    pub fn record_megablock_allocation<'a>(&self, count: impl Into<Deferred<'a, u64>>) {
        let Some(stats) = &self.stats else { return };
        let count = count.into().resolve();
        let mut counters = lock(stats);
        counters.allocated_mblocks_total = counters.allocated_mblocks_total.saturating_add(count);
    }

    /// Copy of the raw counters, `None` when statistics are disabled.
    pub fn counters(&self) -> Option<GcCounters> {
        self.stats.as_ref().map(|stats| lock(stats).clone())
    }

    /// Summarise the counters. Nothing is reset.
    pub fn build_report(&self) -> Result<StatisticsReport, TelemetryError> {
        let Some(stats) = &self.stats else {
            return Ok(StatisticsReport::Disabled);
        };
        let counters = lock(stats);
        // Fail before touching the clock.
        check_lockstep(&counters)?;
        let now = self.clock.now();
        compute_statistics(&counters, now).map(StatisticsReport::Collected)
    }

    /// Build the report and log it under "Garbage Collection Statistics".
    pub fn display_gc_statistics(&self) -> Result<StatisticsReport, TelemetryError> {
        match self.build_report() {
            Ok(StatisticsReport::Disabled) => {
                debug!("GC statistics disabled, nothing to display");
                Ok(StatisticsReport::Disabled)
            }
            Ok(report) => {
                let rendered = serde_json::to_string(&report).unwrap_or_default();
                info!(target: "rts::gc", statistics = %rendered, "Garbage Collection Statistics");
                Ok(report)
            }
            Err(e) => {
                error!(target: "rts::gc", "GC statistics rejected: {}", e);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for TelemetryCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryCollector")
            .field("symbols", &self.symbols.len())
            .field("gc_statistics", &self.gc_statistics_enabled())
            .finish_non_exhaustive()
    }
}

fn lock(stats: &Mutex<GcCounters>) -> MutexGuard<'_, GcCounters> {
    stats.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::telemetry::sink::MemorySink;
    use crate::kernel::time::ManualClock;
    use std::time::Duration;

    fn collector(enabled: bool) -> (TelemetryCollector, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let c = TelemetryCollector::with_clock(Arc::new(MemorySink::new()), &HashMap::new(), enabled, clock.clone());
        (c, clock)
    }

    #[test]
    fn pause_is_measured_from_begin_to_now() {
        let (c, clock) = collector(true);
        let begin = clock.now();
        clock.advance(Duration::from_millis(7));
        c.record_minor_gc(begin);
        assert_eq!(c.counters().unwrap().gc_wall_time, Duration::from_millis(7));
    }

    #[test]
    fn disabled_collector_skips_producers() {
        let (c, clock) = collector(false);
        c.record_major_gc(Deferred::<Timestamp>::lazy(|| panic!("producer must not run")));
        c.record_megablock_allocation(Deferred::<u64>::lazy(|| panic!("producer must not run")));
        c.record_init_done();
        assert_eq!(clock.reads(), 0);
        assert!(c.counters().is_none());
    }

    #[test]
    fn allocation_accumulates() {
        let (c, _) = collector(true);
        c.record_megablock_allocation(3u64);
        c.record_megablock_allocation(Deferred::lazy(|| 4u64));
        assert_eq!(c.counters().unwrap().allocated_mblocks_total, 7);
    }

    #[test]
    fn poisoned_counters_keep_recording() {
        let (c, clock) = collector(true);
        let c = Arc::new(c);
        c.record_minor_gc(clock.now());

        let holder = Arc::clone(&c);
        let panicked = std::thread::spawn(move || {
            let _guard = holder.stats.as_ref().unwrap().lock().unwrap();
            panic!("collector panicked mid-update");
        })
        .join();
        assert!(panicked.is_err());
        assert!(c.stats.as_ref().unwrap().is_poisoned());

        let begin = clock.now();
        clock.advance(Duration::from_millis(4));
        c.record_minor_gc(begin);

        let counters = c.counters().unwrap();
        assert_eq!(counters.num_minor_gcs, 2);
        assert_eq!(counters.gc_wall_time, Duration::from_millis(4));

        let report = c.build_report().unwrap();
        assert_eq!(report.statistics().unwrap().num_minor_gcs, 2);
    }
}
