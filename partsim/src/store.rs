use crate::helpe::*;

impl Program {
    pub fn new(id: ProgramId, size: KiloBytes) -> Self {
        Self {
            id,
            size,
            allocated_in:   None,
            is_locked:      false,
        }
    }

    #[inline(always)]
    pub fn is_allocated(&self) -> bool {
        self.allocated_in.is_some()
    }

    /// Returns the hosting partition, if any.
    #[inline(always)]
    pub fn partition(&self) -> Option<PartitionId> {
        match self.allocated_in {
            Some(Host::Partition(id))   => Some(id),
            _                           => None,
        }
    }

    /// A program is up for placement iff it is neither placed nor locked.
    #[inline(always)]
    pub fn is_eligible(&self) -> bool {
        !self.is_allocated() && !self.is_locked
    }
}

/// Holds every entity of a simulation: partitions, programs and the
/// pool. Collections keep insertion order, which doubles as id order
/// since ids are handed out by monotonic counters.
///
/// The store does no policing of its own. Whether a mutation is legal
/// right now (e.g. not while running) is the [Engine]'s call.
#[derive(Debug, Clone)]
pub struct Store {
    partitions:     IndexMap<PartitionId, Partition>,
    programs:       IndexMap<ProgramId, Program>,
    pool:           Pool,
    // Ids are never recycled within a run. They match `count + 1`
    // for as long as nothing has been removed.
    next_partition: PartitionId,
    next_program:   ProgramId,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            partitions:     IndexMap::new(),
            programs:       IndexMap::new(),
            pool:           Pool::default(),
            next_partition: 1,
            next_program:   1,
        }
    }

    //---START COLLECTIONS
    pub fn add_partition(&mut self, size: KiloBytes) -> PartitionId {
        let id = self.next_partition;
        self.next_partition += 1;
        self.partitions.insert(id, Partition { id, size });

        id
    }

    /// Removal preserves the order of the survivors.
    pub fn remove_partition(&mut self, id: PartitionId) -> Option<Partition> {
        self.partitions.shift_remove(&id)
    }

    pub fn clear_partitions(&mut self) {
        self.partitions.clear();
        self.next_partition = 1;
    }

    pub fn add_program(&mut self, size: KiloBytes) -> ProgramId {
        let id = self.next_program;
        self.next_program += 1;
        self.programs.insert(id, Program::new(id, size));

        id
    }

    /// Drops the program altogether, including its pool residency.
    pub fn remove_program(&mut self, id: ProgramId) -> Option<Program> {
        let gone = self.programs.shift_remove(&id)?;
        self.pool.allocated_programs.retain(|p| *p != id);

        Some(gone)
    }

    pub fn clear_programs(&mut self) {
        self.programs.clear();
        self.pool.allocated_programs.clear();
        self.next_program = 1;
    }

    pub fn set_pool_size(&mut self, size: KiloBytes) {
        self.pool.total_size = size;
    }
    //---END COLLECTIONS

    //---START LOOKUPS
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.values()
    }

    pub fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(&id)
    }

    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(&id)
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn num_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// The program occupying partition `id`, if any.
    pub fn occupant(&self, id: PartitionId) -> Option<&Program> {
        self.programs
            .values()
            .find(|p| p.partition() == Some(id))
    }

    /// How much of partition `id` is in use. Derived from its occupant.
    pub fn used(&self, id: PartitionId) -> KiloBytes {
        self.occupant(id)
            .map_or(0.0, |p| p.size)
    }

    pub fn pool_used(&self) -> KiloBytes {
        self.pool.allocated_programs
            .iter()
            .filter_map(|id| self.programs.get(id))
            .map(|p| p.size)
            .sum()
    }

    pub fn pool_available(&self) -> KiloBytes {
        self.pool.total_size - self.pool_used()
    }

    /// Ids of programs up for placement, in id order.
    pub fn eligible(&self) -> Vec<ProgramId> {
        self.programs
            .values()
            .filter(|p| p.is_eligible())
            .map(|p| p.id)
            .collect()
    }
    //---END LOOKUPS

    //---START ALLOCATION STATE
    /// Records `id` as living in `host`. Pool residents are appended to
    /// the pool's list as well.
    pub fn place(&mut self, id: ProgramId, host: Host) {
        if let Some(p) = self.programs.get_mut(&id) {
            debug_assert!(!p.is_allocated(), "Program {id} placed twice!");
            p.allocated_in = Some(host);
            if let Host::Pool = host {
                self.pool.allocated_programs.push(id);
            }
        }
    }

    /// Undoes [Store::place]. Returns where the program used to live.
    pub fn evict(&mut self, id: ProgramId) -> Option<Host> {
        let host = self.programs.get_mut(&id)?.allocated_in.take()?;
        if let Host::Pool = host {
            self.pool.allocated_programs.retain(|p| *p != id);
        }

        Some(host)
    }

    pub fn lock(&mut self, id: ProgramId) {
        if let Some(p) = self.programs.get_mut(&id) {
            p.is_locked = true;
        }
    }

    /// Unlocks every locked program other than `except` whose size is at
    /// most `limit`. Returns the ids that changed.
    pub fn unlock_fitting(&mut self, limit: KiloBytes, except: ProgramId) -> Vec<ProgramId> {
        self.programs
            .values_mut()
            .filter(|p| p.id != except && p.is_locked && p.size <= limit)
            .map(|p| {
                p.is_locked = false;
                p.id
            })
            .collect()
    }

    /// Brings every program back to unallocated and unlocked. Entity
    /// lists are untouched.
    pub fn reset_allocations(&mut self) {
        for p in self.programs.values_mut() {
            p.allocated_in = None;
            p.is_locked = false;
        }
        self.pool.allocated_programs.clear();
    }
    //---END ALLOCATION STATE
}
