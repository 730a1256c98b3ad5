use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::kernel::error::TelemetryError;
use crate::kernel::time::Timestamp;

/// Raw GC bookkeeping. Only the recorder mutates this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GcCounters {
    pub gc_wall_time: Duration,
    pub num_minor_gcs: u64,
    pub num_major_gcs: u64,
    /// One entry per major GC.
    pub live_mblocks_samples: Vec<u64>,
    /// One entry per major GC.
    pub alive_vs_dead_ratio_samples: Vec<f64>,
    pub allocated_mblocks_total: u64,
    /// Censuses whose ratio was taken against a clamped divisor of one.
    pub zero_dead_censuses: u64,
    /// Unset until initialization completes; reported as zero.
    pub init_wall_time: Option<Timestamp>,
}

/// Megablock census taken at the end of a major GC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MegablockSample {
    pub live: u64,
    /// Megablocks found dead. Only censuses that count them yield a ratio.
    pub dead: Option<u64>,
}

impl MegablockSample {
    pub fn live(live: u64) -> Self {
        Self { live, dead: None }
    }

    pub fn with_dead(live: u64, dead: u64) -> Self {
        Self { live, dead: Some(dead) }
    }

    /// `live / dead`. A census with no dead megablocks divides by one, so its
    /// ratio equals the live count.
    pub fn alive_vs_dead_ratio(&self) -> Option<f64> {
        self.dead.map(|dead| self.live as f64 / dead.max(1) as f64)
    }

    pub fn has_no_dead(&self) -> bool {
        self.dead == Some(0)
    }
}

/// Point-in-time summary of the GC counters.
///
/// Averages are `None` when no major GC has happened yet and serialize as
/// `"n/a"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcStatistics {
    #[serde(rename = "num_major_GCs")]
    pub num_major_gcs: u64,
    #[serde(rename = "num_minor_GCs")]
    pub num_minor_gcs: u64,
    #[serde(serialize_with = "or_not_available")]
    pub average_live_mblocks: Option<f64>,
    /// Mean of per-census `live / dead`. Censuses with zero dead megablocks
    /// contribute their live count and pull this up; `zero_dead_censuses`
    /// says how many did.
    #[serde(rename = "alive_vs_dead_mblocks", serialize_with = "or_not_available")]
    pub average_alive_vs_dead: Option<f64>,
    #[serde(rename = "zero_dead_mblock_censuses")]
    pub zero_dead_censuses: u64,
    #[serde(rename = "allocated_mblocks")]
    pub allocated_mblocks: u64,
    pub init_wall_seconds: f64,
    pub mutator_wall_seconds: f64,
    #[serde(rename = "GC_wall_seconds")]
    pub gc_wall_seconds: f64,
}

fn or_not_available<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_str("n/a"),
    }
}

pub fn check_lockstep(counters: &GcCounters) -> Result<(), TelemetryError> {
    let live = counters.live_mblocks_samples.len();
    let ratio = counters.alive_vs_dead_ratio_samples.len();
    let major = counters.num_major_gcs;
    if live as u64 != major || ratio as u64 != major {
        return Err(TelemetryError::Inconsistent {
            major_gcs: major,
            live_samples: live,
            ratio_samples: ratio,
        });
    }
    Ok(())
}

/// Pure summary of `counters` as of `now`. Fails if the per-major-GC
/// samples are out of lockstep.
pub fn compute_statistics(counters: &GcCounters, now: Timestamp) -> Result<GcStatistics, TelemetryError> {
    check_lockstep(counters)?;

    let init = counters.init_wall_time.unwrap_or(Timestamp::ZERO);
    let mutator = now.since(init).saturating_sub(counters.gc_wall_time);

    Ok(GcStatistics {
        num_major_gcs: counters.num_major_gcs,
        num_minor_gcs: counters.num_minor_gcs,
        average_live_mblocks: mean(counters.live_mblocks_samples.iter().map(|&n| n as f64)),
        average_alive_vs_dead: mean(counters.alive_vs_dead_ratio_samples.iter().copied()),
        zero_dead_censuses: counters.zero_dead_censuses,
        allocated_mblocks: counters.allocated_mblocks_total,
        init_wall_seconds: init.as_secs_f64(),
        mutator_wall_seconds: mutator.as_secs_f64(),
        gc_wall_seconds: counters.gc_wall_time.as_secs_f64(),
    })
}

fn mean(samples: impl Iterator<Item = f64>) -> Option<f64> {
    let (count, sum) = samples.fold((0usize, 0.0), |(n, s), x| (n + 1, s + x));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
