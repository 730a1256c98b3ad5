//! Runtime instrumentation: per-instruction trace events and GC statistics.
//!
//! # SIDE-EFFECT INVARIANT
//! Telemetry only records facts it is told about. It never decides when a
//! collection runs and is never read back by the scheduler or memory manager.
//!
//! # LOCKSTEP INVARIANT
//! Every major GC contributes exactly one live megablock sample and one
//! alive/dead ratio sample. Reports refuse to summarise counters that drifted.

pub mod event;
pub mod metrics;
pub mod recorder;
pub mod sink;
pub mod symbols;
