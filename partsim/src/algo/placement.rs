use crate::helpe::*;

/// A capacity unit as seen by a [Strategy]: somewhere a program may
/// go, how big it is, and how much of it is still free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub host:   Host,
    pub size:   KiloBytes,
    pub room:   KiloBytes,
}

/// Lists the capacity units currently on offer.
///
/// In static mode these are the *empty* partitions, in declaration
/// order. A partition holds one program at most, so a partially used
/// one offers nothing.
///
/// In dynamic mode there is a single unit: the whole pool, with room
/// equal to its available space. Consequently the strategy makes no
/// difference in dynamic mode.
pub fn free_units(store: &Store, mode: Mode) -> Vec<Unit> {
    match mode {
        Mode::Static    => {
            store.partitions()
                .filter(|p| store.occupant(p.id).is_none())
                .map(|p| Unit {
                    host:   Host::Partition(p.id),
                    size:   p.size,
                    room:   p.size,
                })
                .collect()
        },
        Mode::Dynamic   => {
            vec![Unit {
                host:   Host::Pool,
                size:   store.pool().total_size,
                room:   store.pool_available(),
            }]
        }
    }
}

impl Strategy {
    /// Chooses where a program of size `demand` should go, among
    /// `units` (assumed in declaration order). Pure; touches nothing.
    pub fn pick(self, demand: KiloBytes, units: &[Unit]) -> Option<Unit> {
        let mut fitting = units.iter()
            .filter(|u| u.room >= demand);

        match self {
            Strategy::FirstFit  => fitting.next().copied(),
            // `sorted_by` is stable: equal sizes keep declaration order.
            Strategy::BestFit   => {
                fitting.sorted_by(|a, b| a.size.total_cmp(&b.size))
                    .next()
                    .copied()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(sizes: &[KiloBytes]) -> Vec<Unit> {
        sizes.iter()
            .enumerate()
            .map(|(i, s)| Unit {
                host:   Host::Partition(i as PartitionId + 1),
                size:   *s,
                room:   *s,
            })
            .collect()
    }

    #[test]
    fn first_fit_takes_the_first_big_enough() {
        let units = parts(&[10.0, 4.0, 6.0]);
        let pick = Strategy::FirstFit.pick(5.0, &units);
        assert_eq!(pick.map(|u| u.host), Some(Host::Partition(1)));
    }

    #[test]
    fn best_fit_takes_the_smallest_big_enough() {
        let units = parts(&[10.0, 4.0, 6.0]);
        let pick = Strategy::BestFit.pick(5.0, &units);
        assert_eq!(pick.map(|u| u.host), Some(Host::Partition(3)));
    }

    #[test]
    fn best_fit_ties_go_to_declaration_order() {
        let units = parts(&[9.0, 6.0, 3.0, 6.0]);
        let pick = Strategy::BestFit.pick(5.0, &units);
        assert_eq!(pick.map(|u| u.host), Some(Host::Partition(2)));
    }

    #[test]
    fn exact_fit_is_a_fit() {
        let units = parts(&[4.0]);
        assert!(Strategy::FirstFit.pick(4.0, &units).is_some());
        assert!(Strategy::BestFit.pick(4.0, &units).is_some());
    }

    #[test]
    fn nothing_fits() {
        let units = parts(&[1.0, 2.0]);
        assert_eq!(Strategy::FirstFit.pick(3.0, &units), None);
        assert_eq!(Strategy::BestFit.pick(3.0, &units), None);
        assert_eq!(Strategy::BestFit.pick(3.0, &[]), None);
    }

    #[test]
    fn occupied_partitions_are_not_offered() {
        let mut store = Store::new();
        let big = store.add_partition(10.0);
        let small = store.add_partition(6.0);
        let prog = store.add_program(1.0);
        store.place(prog, Host::Partition(big));
        let units = free_units(&store, Mode::Static);
        assert_eq!(units.iter().map(|u| u.host).collect_vec(), vec![Host::Partition(small)]);
    }

    #[test]
    fn pool_is_one_unit_whatever_the_strategy() {
        let mut store = Store::new();
        store.set_pool_size(12.0);
        let prog = store.add_program(5.0);
        store.place(prog, Host::Pool);
        let units = free_units(&store, Mode::Dynamic);
        assert_eq!(units, vec![Unit { host: Host::Pool, size: 12.0, room: 7.0 }]);
        assert_eq!(
            Strategy::FirstFit.pick(7.0, &units),
            Strategy::BestFit.pick(7.0, &units),
        );
    }
}
