//! Welcome to `partsim`!
//!
//! A teaching simulator for memory partitioning. Programs of various
//! sizes compete for room either inside a set of fixed partitions
//! ([`Mode::Static`]) or inside one undivided pool ([`Mode::Dynamic`]).
//! The [`Engine`] is the whole simulation as plain data; the [`Session`]
//! puts it behind a lock and drives it with a periodic [`Clock`].

mod store;
mod analyze;

pub mod algo;
pub mod log;
pub mod engine;
pub mod clock;
pub mod session;
pub mod helpe;

pub use crate::helpe::*;

/// A fixed-size memory region, declared up front by the user.
///
/// Note the absence of a `used` field. How much of a partition is
/// occupied is always *derived* from the [`Program`] that references it
/// (see [`Store::used`]), so there is exactly one source of truth for
/// occupancy.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub id:     PartitionId,
    pub size:   KiloBytes,
}

/// The unit of demand. A [`Program`] never owns the memory it sits in:
/// [`allocated_in`](Program::allocated_in) is a plain id lookup into
/// the [`Store`], not a pointer.
///
/// > ***ATTENTION:*** A *locked* program has tried and failed to find
/// > room. It stays out of every subsequent tick until some kill frees
/// > enough capacity for it (or the simulation is stopped).
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id:             ProgramId,
    pub size:           KiloBytes,
    pub allocated_in:   Option<Host>,
    pub is_locked:      bool,
}

/// The single memory region of dynamic mode.
///
/// Residents are kept in order of arrival. Available space is never
/// stored; it is `total_size` minus the residents' sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pool {
    pub total_size:         KiloBytes,
    pub allocated_programs: Vec<ProgramId>,
}
