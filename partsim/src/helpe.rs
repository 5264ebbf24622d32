pub use std::{
    sync::Arc,
    fmt,
    thread,
    time::Duration,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use indexmap::IndexMap;
pub use clap::ValueEnum;
pub use chrono::{DateTime, Utc};
pub use parking_lot::Mutex;
pub use tracing::{debug, info, warn};

pub use crate::{Partition, Program, Pool,
    store::Store,
    analyze::*,
    algo::{TickReport, Kill, placement::Unit},
    log::{EventLog, LogEntry, Manifest, Export},
    engine::{Engine, Snapshot, PartitionView, ProgramView, PoolView},
    clock::Clock,
    session::{Session, SessionConfig},
};

/// The unit for measuring memory. Sizes are entered by hand and may
/// well be fractional, hence the float.
pub type KiloBytes = f64;

pub type PartitionId = u32;
pub type ProgramId = u32;

/// Canonical tick period of the simulation clock.
pub const DEFAULT_PERIOD_MS: u64 = 2000;

/// Upper bound (inclusive) of randomly generated partition/program sizes.
pub const RANDOM_SIZE_MAX: u32 = 10;

/// Upper bound (inclusive) of randomly generated pool sizes.
pub const RANDOM_POOL_MAX: u32 = 20;

/// Narrated whenever a tick finds nothing left to try.
pub const IDLE_MESSAGE: &str = "No other programs can be allocated.";

/// Which of the two allocation schemes an [Engine] simulates.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Mode {
    /// Fixed, pre-declared partitions; one program per partition
    Static,
    /// A single pool, tracked as a running total of free space
    Dynamic,
}

impl Mode {
    /// Human readable name, as printed at the top of an export.
    pub fn method_name(self) -> &'static str {
        match self {
            Mode::Static    => "Static Partitioned Allocation",
            Mode::Dynamic   => "Dynamic Partitioned Allocation",
        }
    }

    pub fn log_filename(self) -> &'static str {
        match self {
            Mode::Static    => "simulation-log.txt",
            Mode::Dynamic   => "simulation-log-dynamic.txt",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Static    => write!(f, "static"),
            Mode::Dynamic   => write!(f, "dynamic"),
        }
    }
}

/// Placement strategies. See [Strategy::pick].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum Strategy {
    /// First unit, in declaration order, with enough room
    #[default]
    FirstFit,
    /// Smallest unit with enough room
    BestFit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::FirstFit  => write!(f, "first-fit"),
            Strategy::BestFit   => write!(f, "best-fit"),
        }
    }
}

/// Where a [Program] currently lives.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Host {
    Partition(PartitionId),
    Pool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Contract violations. Running out of memory is *not* one of them:
/// that is narrated and handled by locking.
pub enum SimError {
    #[error("cannot {action} while the simulation is running")]
    Running { action: &'static str },
    #[error("the simulation is not running")]
    NotRunning,
    #[error("the simulation is already running")]
    AlreadyRunning,
    #[error("add programs and {} to start the simulation", .0)]
    NotReady(&'static str),
    #[error("cannot {action} in {mode} mode")]
    WrongMode { action: &'static str, mode: Mode },
    #[error("the simulation log is empty")]
    EmptyLog,
}

/// Replaces a requested size that is not strictly positive (or not
/// finite) with a random integer in `1..=max`. Good sizes pass through.
pub fn coerce_size(requested: KiloBytes, max: u32) -> KiloBytes {
    use rand::{Rng, thread_rng};

    if requested > 0.0 && requested.is_finite() {
        requested
    } else {
        thread_rng().gen_range(1..=max) as KiloBytes
    }
}
