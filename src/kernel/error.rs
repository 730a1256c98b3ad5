use thiserror::Error;

/// Failures produced while summarising GC statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    /// The per-major-GC sample sequences drifted apart from the major GC
    /// counter. Always a bookkeeping bug in whoever drives the recorder.
    #[error(
        "GC statistics out of lockstep: {major_gcs} major GCs, \
         {live_samples} live megablock samples, {ratio_samples} alive/dead ratio samples"
    )]
    Inconsistent {
        major_gcs: u64,
        live_samples: usize,
        ratio_samples: usize,
    },
}

/// Failures raised by the execution entry point itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("runtime already launched: the scheduler run loop may only be started once per context")]
    AlreadyLaunched,

    #[error("missing symbol: {0}")]
    MissingSymbol(String),
}

/// Outcome of waiting on a thread submitted to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("thread failed: {0}")]
    ThreadFailed(String),

    #[error("scheduler dropped the thread before it completed")]
    SchedulerDropped,
}
