use crate::helpe::*;

/// `part` as a percentage of `whole`. An empty whole yields 0%, never
/// NaN or infinity.
#[inline(always)]
pub fn percent(part: KiloBytes, whole: KiloBytes) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else { 0.0 }
}

/// Unused capacity summed over all partitions, absolute and relative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragmentation {
    pub free:       KiloBytes,
    pub capacity:   KiloBytes,
}

impl Fragmentation {
    /// Folds `(size, used)` pairs.
    pub fn over<I>(pairs: I) -> Self
    where I: IntoIterator<Item = (KiloBytes, KiloBytes)> {
        pairs.into_iter()
            .fold(Self { free: 0.0, capacity: 0.0 }, |acc, (size, used)| {
                Self {
                    free:       acc.free + (size - used),
                    capacity:   acc.capacity + size,
                }
            })
    }

    pub fn of(store: &Store) -> Self {
        Self::over(
            store.partitions()
                .map(|p| (p.size, store.used(p.id)))
        )
    }

    pub fn percent(&self) -> f64 {
        percent(self.free, self.capacity)
    }
}

/// End-of-run summary, used to compare strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub placed:     usize,
    pub locked:     usize,
    /// Static: fragmentation. Dynamic: free share of the pool.
    pub waste:      f64,
}

impl RunStats {
    pub fn of(store: &Store, mode: Mode) -> Self {
        let (placed, locked) = store.programs()
            .fold((0, 0), |(placed, locked), p| {
                (
                    placed + p.is_allocated() as usize,
                    locked + p.is_locked as usize,
                )
            });
        let waste = match mode {
            Mode::Static    => Fragmentation::of(store).percent(),
            Mode::Dynamic   => percent(store.pool_available(), store.pool().total_size),
        };

        Self { placed, locked, waste }
    }
}
