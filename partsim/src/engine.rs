use crate::{
    algo::{allocate, kill},
    helpe::*,
};

/// A whole simulation as plain, synchronous data: entities, strategy,
/// narration and the running flag. Nothing in here knows about time;
/// see [Session] for the periodic driver.
///
/// Lifecycle: `new` → configure → [`start`](Engine::start) → ticks (and
/// kills) → [`stop`](Engine::stop) → configure again, or drop.
#[derive(Debug, Clone)]
pub struct Engine {
    mode:       Mode,
    strategy:   Strategy,
    store:      Store,
    log:        EventLog,
    running:    bool,
    // Ticks since the last start.
    ticks:      u64,
    // Captured at every start, for the export.
    manifest:   Manifest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionView {
    pub id:     PartitionId,
    pub size:   KiloBytes,
    pub used:   KiloBytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramView {
    pub id:             ProgramId,
    pub size:           KiloBytes,
    /// A partition in static mode, the pool in dynamic mode.
    pub allocated_in:   Option<Host>,
    pub is_allocated:   bool,
    pub is_locked:      bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolView {
    pub total_size:         KiloBytes,
    pub allocated_programs: Vec<ProgramId>,
    pub available:          KiloBytes,
}

/// Everything a presentation layer needs to draw the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode:               Mode,
    pub strategy:           Strategy,
    pub running:            bool,
    pub ticks:              u64,
    pub can_start:          bool,
    pub logging_enabled:    bool,
    pub partitions:         Vec<PartitionView>,
    pub programs:           Vec<ProgramView>,
    pub pool:               PoolView,
    pub log:                Vec<LogEntry>,
}

impl Engine {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            strategy:   Strategy::default(),
            store:      Store::new(),
            log:        EventLog::new(),
            running:    false,
            ticks:      0,
            manifest:   Manifest::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Allocation passes run since the last start.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Programs exist, and so does somewhere to put them.
    pub fn can_start(&self) -> bool {
        self.store.num_programs() > 0 && match self.mode {
            Mode::Static    => self.store.num_partitions() > 0,
            Mode::Dynamic   => self.store.pool().total_size > 0.0,
        }
    }

    fn ensure_stopped(&self, action: &'static str) -> Result<(), SimError> {
        if self.running {
            warn!(action, "Rejected while running");
            Err(SimError::Running { action })
        } else { Ok(()) }
    }

    fn ensure_mode(&self, mode: Mode, action: &'static str) -> Result<(), SimError> {
        if self.mode != mode {
            warn!(action, mode = %self.mode, "Rejected in this mode");
            Err(SimError::WrongMode { action, mode: self.mode })
        } else { Ok(()) }
    }

    //---START COMMANDS
    /// Adds a partition. A size that isn't strictly positive is swapped
    /// for a random one in `1..=10`.
    pub fn add_partition(&mut self, size: KiloBytes) -> Result<PartitionId, SimError> {
        self.ensure_mode(Mode::Static, "add a partition")?;
        self.ensure_stopped("add a partition")?;

        Ok(self.store.add_partition(coerce_size(size, RANDOM_SIZE_MAX)))
    }

    /// Returns whether anything was removed; unknown ids are ignored.
    pub fn remove_partition(&mut self, id: PartitionId) -> Result<bool, SimError> {
        self.ensure_mode(Mode::Static, "remove a partition")?;
        self.ensure_stopped("remove a partition")?;

        Ok(self.store.remove_partition(id).is_some())
    }

    pub fn clear_partitions(&mut self) -> Result<(), SimError> {
        self.ensure_mode(Mode::Static, "clear partitions")?;
        self.ensure_stopped("clear partitions")?;
        self.store.clear_partitions();

        Ok(())
    }

    /// Adds a program. A size that isn't strictly positive is swapped
    /// for a random one in `1..=10`.
    pub fn add_program(&mut self, size: KiloBytes) -> Result<ProgramId, SimError> {
        self.ensure_stopped("add a program")?;

        Ok(self.store.add_program(coerce_size(size, RANDOM_SIZE_MAX)))
    }

    /// Removes a program. While running, only *placed* programs may be
    /// removed, and removal is a kill: the freed capacity is narrated
    /// and may unlock others.
    ///
    /// Returns whether anything was removed; unknown ids are ignored.
    pub fn remove_program(&mut self, id: ProgramId) -> Result<bool, SimError> {
        let Some(program) = self.store.program(id) else { return Ok(false); };
        if self.running {
            if !program.is_allocated() {
                return Err(SimError::Running { action: "remove an unallocated program" });
            }
            kill(&mut self.store, id, &mut self.log);
        }

        Ok(self.store.remove_program(id).is_some())
    }

    pub fn clear_programs(&mut self) -> Result<(), SimError> {
        self.ensure_stopped("clear programs")?;
        self.store.clear_programs();

        Ok(())
    }

    /// Sets the pool size. A size that isn't strictly positive is
    /// swapped for a random one in `1..=20`.
    pub fn set_pool_size(&mut self, size: KiloBytes) -> Result<KiloBytes, SimError> {
        self.ensure_mode(Mode::Dynamic, "set the pool size")?;
        self.ensure_stopped("set the pool size")?;
        let size = coerce_size(size, RANDOM_POOL_MAX);
        self.store.set_pool_size(size);

        Ok(size)
    }

    pub fn clear_pool_size(&mut self) -> Result<(), SimError> {
        self.ensure_mode(Mode::Dynamic, "clear the pool size")?;
        self.ensure_stopped("clear the pool size")?;
        self.store.set_pool_size(0.0);

        Ok(())
    }

    /// Takes effect from the next tick on, even mid-run.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    pub fn toggle_logging(&mut self) -> bool {
        self.log.toggle_enabled()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
    //---END COMMANDS

    //---START LIFECYCLE
    /// `Stopped → Running`. Captures the manifest and wipes the log.
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.running {
            return Err(SimError::AlreadyRunning);
        }
        if !self.can_start() {
            return Err(SimError::NotReady(match self.mode {
                Mode::Static    => "partitions",
                Mode::Dynamic   => "a total memory size",
            }));
        }
        self.manifest = Manifest::capture(&self.store);
        self.log.clear();
        self.ticks = 0;
        self.running = true;
        info!(mode = %self.mode, strategy = %self.strategy, "Simulation started");

        Ok(())
    }

    /// `Running → Stopped`. Every program goes back to unallocated and
    /// unlocked; entities and the log stay. Stopping a stopped engine
    /// changes nothing and returns `false`.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.store.reset_allocations();
        info!(mode = %self.mode, "Simulation stopped");

        true
    }

    /// One allocation pass. Allocation accumulates: each tick starts
    /// from where the previous one (and any kills since) left off.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        if !self.running {
            return Err(SimError::NotRunning);
        }
        self.ticks += 1;

        Ok(allocate(&mut self.store, self.mode, self.strategy, &mut self.log))
    }

    /// Ticks until one finds nothing to do, or `max_ticks` have run.
    /// Returns how many ticks ran, the idle one included.
    pub fn run_until_idle(&mut self, max_ticks: usize) -> Result<usize, SimError> {
        for done in 1..=max_ticks {
            if self.tick()?.is_idle() {
                return Ok(done);
            }
        }

        Ok(max_ticks)
    }
    //---END LIFECYCLE

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The log as a downloadable document. Needs at least one entry.
    pub fn export(&self) -> Result<Export, SimError> {
        if self.log.is_empty() {
            return Err(SimError::EmptyLog);
        }

        Ok(Export::build(self.mode, self.strategy, &self.manifest, &self.log))
    }

    pub fn stats(&self) -> RunStats {
        RunStats::of(&self.store, self.mode)
    }

    pub fn snapshot(&self) -> Snapshot {
        let store = &self.store;

        Snapshot {
            mode:               self.mode,
            strategy:           self.strategy,
            running:            self.running,
            ticks:              self.ticks,
            can_start:          self.can_start(),
            logging_enabled:    self.log.is_enabled(),
            partitions:         store.partitions()
                .map(|p| PartitionView {
                    id:     p.id,
                    size:   p.size,
                    used:   store.used(p.id),
                })
                .collect(),
            programs:           store.programs()
                .map(|p| ProgramView {
                    id:             p.id,
                    size:           p.size,
                    allocated_in:   p.allocated_in,
                    is_allocated:   p.is_allocated(),
                    is_locked:      p.is_locked,
                })
                .collect(),
            pool:               PoolView {
                total_size:         store.pool().total_size,
                allocated_programs: store.pool().allocated_programs.clone(),
                available:          store.pool_available(),
            },
            log:                self.log.entries().to_vec(),
        }
    }
}
