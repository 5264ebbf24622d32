pub mod placement;

use placement::free_units;

use crate::helpe::*;

/// What one tick did, besides narrating it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub placed: Vec<(ProgramId, Host)>,
    pub locked: Vec<ProgramId>,
}

impl TickReport {
    /// An idle tick found no eligible program at all.
    pub fn is_idle(&self) -> bool {
        self.placed.is_empty() && self.locked.is_empty()
    }
}

/// What killing a program freed, and whom it woke up.
#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub program:    ProgramId,
    pub freed:      KiloBytes,
    pub unlocked:   Vec<ProgramId>,
}

/// One allocation pass over every eligible program, in id order.
///
/// Each program sees the store as left by the ones before it: a
/// partition taken earlier in the tick is no longer on offer, and the
/// pool's available space shrinks as residents pile in. Programs that
/// find no room get locked.
pub fn allocate(
    store:      &mut Store,
    mode:       Mode,
    strategy:   Strategy,
    log:        &mut EventLog,
) -> TickReport {
    let mut report = TickReport::default();
    let to_allocate = store.eligible();

    if to_allocate.is_empty() {
        log.append(IDLE_MESSAGE);
        return report;
    }

    debug!(count = to_allocate.len(), %strategy, "Allocating...");
    for id in to_allocate {
        let Some(size) = store.program(id).map(|p| p.size) else { continue; };
        let units = free_units(store, mode);
        match strategy.pick(size, &units) {
            Some(unit)  => {
                store.place(id, unit.host);
                log.append(placed_text(store, id, size, unit));
                debug!(program = id, host = ?unit.host, "Placed");
                report.placed.push((id, unit.host));
            },
            None        => {
                store.lock(id);
                log.append(locked_text(store, mode, id, size));
                debug!(program = id, "No room, locked");
                report.locked.push(id);
            }
        }
    }

    report
}

/// Evicts program `id`, narrates the kill and unlocks whoever fits in
/// the freed capacity. Does nothing for a program that isn't placed.
///
/// The unlock threshold differs per mode. Static: the size of the
/// partition that was just vacated. Dynamic: the pool's available space
/// after the eviction.
pub fn kill(
    store:  &mut Store,
    id:     ProgramId,
    log:    &mut EventLog,
) -> Option<Kill> {
    let host = store.evict(id)?;
    let freed = store.program(id)?.size;
    log.append(format!("Killed program {id} which was allocated, freeing {freed}kb."));

    let limit = match host {
        Host::Partition(p)  => store.partition(p).map_or(0.0, |p| p.size),
        Host::Pool          => store.pool_available(),
    };
    let unlocked = store.unlock_fitting(limit, id);
    info!(program = id, freed, unlocked = unlocked.len(), "Killed program");

    Some(Kill {
        program: id,
        freed,
        unlocked,
    })
}

//---START NARRATION
fn placed_text(store: &Store, id: ProgramId, size: KiloBytes, unit: Unit) -> String {
    match unit.host {
        Host::Partition(p)  => {
            format!(
                "Program {id} (with size {size}kb) allocated in partition {p} ({}kb), occupying {:.2}% of it.",
                unit.size,
                percent(size, unit.size),
            )
        },
        Host::Pool          => {
            format!(
                "Program {id} allocated in memory occupying {size}kb of {}kb. Total size was {}kb, {}kb left.",
                unit.room,
                store.pool().total_size,
                store.pool_available(),
            )
        }
    }
}

fn locked_text(store: &Store, mode: Mode, id: ProgramId, size: KiloBytes) -> String {
    match mode {
        Mode::Static    => {
            let frag = Fragmentation::of(store);
            format!(
                "Program {id} (with size {size}kb) cannot be allocated in any partition. Fragmentation is {}kb ({:.2}%).",
                frag.free,
                frag.percent(),
            )
        },
        Mode::Dynamic   => {
            format!(
                "Program {id} (with size {size}kb) cannot be allocated in total memory. Available space is {}kb.",
                store.pool_available(),
            )
        }
    }
}
//---END NARRATION
