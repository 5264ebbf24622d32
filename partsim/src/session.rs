use crate::helpe::*;

/// Knobs of a [Session].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between two ticks.
    pub period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(DEFAULT_PERIOD_MS),
        }
    }
}

impl SessionConfig {
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

/// An [Engine] driven by a real-time [Clock].
///
/// The engine sits behind a single lock. Every tick and every command
/// takes it, so a kill issued mid-run lands entirely before or entirely
/// after a tick, never inside one.
pub struct Session {
    engine: Arc<Mutex<Engine>>,
    clock:  Clock,
    config: SessionConfig,
}

impl Session {
    pub fn new(mode: Mode, config: SessionConfig) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Engine::new(mode))),
            clock:  Clock::new(),
            config,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Starts the engine, then the clock. Ticks read the live engine,
    /// so allocation accumulates from one tick to the next.
    pub fn start(&mut self) -> Result<(), SimError> {
        self.engine.lock().start()?;
        let engine = self.engine.clone();
        self.clock.start(self.config.period, move || {
            // A tick that sneaks in after `stop` finds the engine
            // stopped, and does nothing.
            if let Err(e) = engine.lock().tick() {
                debug!(%e, "Tick skipped");
            }
        });

        Ok(())
    }

    /// Stops the engine, then the clock. Taking the lock first means an
    /// in-flight tick completes before allocations are reset. Safe to
    /// call repeatedly.
    pub fn stop(&mut self) -> bool {
        let was_running = self.engine.lock().stop();
        self.clock.cancel();

        was_running
    }

    /// Runs a tick right away, outside the clock's schedule.
    pub fn tick_now(&self) -> Result<TickReport, SimError> {
        self.engine.lock().tick()
    }

    pub fn ticks(&self) -> u64 {
        self.engine.lock().ticks()
    }

    /// Blocks until `n` ticks have run since start. Returns `false` if
    /// the session stops first.
    pub fn wait_for_ticks(&self, n: u64) -> bool {
        let poll = (self.config.period / 20).max(Duration::from_millis(1));
        loop {
            {
                let engine = self.engine.lock();
                if engine.ticks() >= n {
                    return true;
                }
                if !engine.is_running() {
                    return false;
                }
            }
            thread::sleep(poll);
        }
    }

    pub fn is_running(&self) -> bool {
        self.engine.lock().is_running()
    }

    //---START FORWARDED COMMANDS
    pub fn add_partition(&self, size: KiloBytes) -> Result<PartitionId, SimError> {
        self.engine.lock().add_partition(size)
    }

    pub fn remove_partition(&self, id: PartitionId) -> Result<bool, SimError> {
        self.engine.lock().remove_partition(id)
    }

    pub fn clear_partitions(&self) -> Result<(), SimError> {
        self.engine.lock().clear_partitions()
    }

    pub fn add_program(&self, size: KiloBytes) -> Result<ProgramId, SimError> {
        self.engine.lock().add_program(size)
    }

    pub fn remove_program(&self, id: ProgramId) -> Result<bool, SimError> {
        self.engine.lock().remove_program(id)
    }

    pub fn clear_programs(&self) -> Result<(), SimError> {
        self.engine.lock().clear_programs()
    }

    pub fn set_pool_size(&self, size: KiloBytes) -> Result<KiloBytes, SimError> {
        self.engine.lock().set_pool_size(size)
    }

    pub fn clear_pool_size(&self) -> Result<(), SimError> {
        self.engine.lock().clear_pool_size()
    }

    pub fn set_strategy(&self, strategy: Strategy) {
        self.engine.lock().set_strategy(strategy)
    }

    pub fn toggle_logging(&self) -> bool {
        self.engine.lock().toggle_logging()
    }

    pub fn clear_log(&self) {
        self.engine.lock().clear_log()
    }
    //---END FORWARDED COMMANDS

    pub fn snapshot(&self) -> Snapshot {
        self.engine.lock().snapshot()
    }

    pub fn export(&self) -> Result<Export, SimError> {
        self.engine.lock().export()
    }

    pub fn stats(&self) -> RunStats {
        self.engine.lock().stats()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
