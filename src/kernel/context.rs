use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::collab::{MemoryManager, ReentrancyGuard, StablePtrTable, SymbolTable};
use super::scheduler::Scheduler;
use super::telemetry::recorder::TelemetryCollector;

/// Handles to the subsystems a runtime instance is made of.
///
/// Built once and never reassigned. The handles are shared with whoever
/// assembled the runtime. The only mutable bit is the launch latch, which
/// flips once when the scheduler's run loop is started.
pub struct ExecutionContext {
    memory: Arc<dyn MemoryManager>,
    reentrancy_guard: Arc<dyn ReentrancyGuard>,
    symbol_table: Arc<dyn SymbolTable>,
    scheduler: Arc<dyn Scheduler>,
    telemetry: Arc<TelemetryCollector>,
    stable_ptrs: Arc<dyn StablePtrTable>,
    launched: AtomicBool,
}

impl ExecutionContext {
    pub fn new(
        memory: Arc<dyn MemoryManager>,
        reentrancy_guard: Arc<dyn ReentrancyGuard>,
        symbol_table: Arc<dyn SymbolTable>,
        scheduler: Arc<dyn Scheduler>,
        telemetry: Arc<TelemetryCollector>,
        stable_ptrs: Arc<dyn StablePtrTable>,
    ) -> Self {
        Self {
            memory,
            reentrancy_guard,
            symbol_table,
            scheduler,
            telemetry,
            stable_ptrs,
            launched: AtomicBool::new(false),
        }
    }

    pub fn memory(&self) -> &Arc<dyn MemoryManager> {
        &self.memory
    }

    pub fn reentrancy_guard(&self) -> &Arc<dyn ReentrancyGuard> {
        &self.reentrancy_guard
    }

    pub fn symbol_table(&self) -> &Arc<dyn SymbolTable> {
        &self.symbol_table
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    pub fn stable_ptrs(&self) -> &Arc<dyn StablePtrTable> {
        &self.stable_ptrs
    }

    pub fn is_launched(&self) -> bool {
        self.launched.load(Ordering::Acquire)
    }

    /// Claim the right to start the run loop. True for the first caller only.
    pub(crate) fn claim_launch(&self) -> bool {
        self.launched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("telemetry", &self.telemetry)
            .field("launched", &self.is_launched())
            .finish_non_exhaustive()
    }
}
