use partsim::*;

fn engine_with(partitions: &[KiloBytes], programs: &[KiloBytes]) -> Engine {
    let mut engine = Engine::new(Mode::Static);
    for s in partitions {
        engine.add_partition(*s).expect("stopped engine accepts partitions");
    }
    for s in programs {
        engine.add_program(*s).expect("stopped engine accepts programs");
    }
    engine
}

fn program(engine: &Engine, id: ProgramId) -> ProgramView {
    engine.snapshot()
        .programs
        .into_iter()
        .find(|p| p.id == id)
        .expect("program exists")
}

fn assert_invariants(engine: &Engine) {
    let snap = engine.snapshot();
    for part in &snap.partitions {
        assert!(part.used >= 0.0 && part.used <= part.size, "partition {} overfull", part.id);
    }
    for prog in &snap.programs {
        assert_eq!(prog.allocated_in.is_some(), prog.is_allocated);
        assert_ne!(prog.allocated_in, Some(Host::Pool));
        if let Some(Host::Partition(host)) = prog.allocated_in {
            let part = snap.partitions.iter().find(|p| p.id == host).expect("host exists");
            assert_eq!(part.used, prog.size);
        }
    }
    let hosts = snap.programs.iter().filter_map(|p| match p.allocated_in {
        Some(Host::Partition(id)) => Some(id),
        _ => None,
    }).collect::<Vec<_>>();
    let mut unique = hosts.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(hosts.len(), unique.len(), "two programs share a partition");
}

#[test]
fn first_fit_and_best_fit_pick_different_partitions() {
    for (strategy, expected) in [(Strategy::FirstFit, 1), (Strategy::BestFit, 3)] {
        let mut engine = engine_with(&[10.0, 4.0, 6.0], &[5.0]);
        engine.set_strategy(strategy);
        engine.start().expect("ready");
        let report = engine.tick().expect("running");
        assert_eq!(report.placed, vec![(1, Host::Partition(expected))]);
        assert_eq!(program(&engine, 1).allocated_in, Some(Host::Partition(expected)));
        assert_invariants(&engine);
    }
}

#[test]
fn kill_unlocks_everyone_that_fits_the_freed_partition() {
    // X and Y fill both partitions; A and B find nothing and lock.
    let mut engine = engine_with(&[10.0, 5.0], &[10.0, 5.0, 4.0, 8.0]);
    engine.start().expect("ready");
    let report = engine.tick().expect("running");
    assert_eq!(report.locked, vec![3, 4]);
    assert!(program(&engine, 3).is_locked && program(&engine, 4).is_locked);
    assert!(engine.tick().expect("running").is_idle());

    assert_eq!(engine.remove_program(1), Ok(true));
    assert_eq!(
        engine.log().entries().last().map(|e| e.text.as_str()),
        Some("Killed program 1 which was allocated, freeing 10kb.")
    );
    assert!(!program(&engine, 3).is_locked);
    assert!(!program(&engine, 4).is_locked);
    assert_eq!(engine.store().eligible(), vec![3, 4]);

    let report = engine.tick().expect("running");
    assert_eq!(report.placed, vec![(3, Host::Partition(1))]);
    assert_eq!(report.locked, vec![4]);
    assert_invariants(&engine);
}

#[test]
fn kill_leaves_bigger_programs_locked() {
    let mut engine = engine_with(&[4.0], &[3.0, 9.0]);
    engine.start().expect("ready");
    engine.tick().expect("running");
    engine.remove_program(1).expect("kill allowed while running");
    assert!(program(&engine, 2).is_locked);
}

#[test]
fn allocation_accumulates_across_ticks() {
    let mut engine = engine_with(&[3.0, 3.0], &[2.0]);
    engine.start().expect("ready");
    engine.tick().expect("running");
    assert!(engine.tick().expect("running").is_idle());
    assert_eq!(engine.log().entries().last().map(|e| e.text.as_str()), Some(IDLE_MESSAGE));
    assert_eq!(engine.log().len(), 2);
    assert_eq!(engine.log().entries()[1].id, 2);
    assert_invariants(&engine);
}

#[test]
fn failure_narration_reports_fragmentation() {
    let mut engine = engine_with(&[10.0, 5.0], &[2.0, 3.0, 20.0]);
    engine.start().expect("ready");
    engine.tick().expect("running");
    assert_eq!(
        engine.log().entries()[2].text,
        "Program 3 (with size 20kb) cannot be allocated in any partition. Fragmentation is 10kb (66.67%)."
    );
}

#[test]
fn stop_resets_allocations_and_is_idempotent() {
    let mut engine = engine_with(&[5.0], &[4.0, 4.0]);
    engine.start().expect("ready");
    engine.tick().expect("running");
    let log_len = engine.log().len();

    assert!(engine.stop());
    let once = engine.snapshot();
    assert!(!engine.stop());
    assert_eq!(engine.snapshot(), once);

    assert!(!once.running);
    assert_eq!(once.partitions.len(), 1);
    assert_eq!(once.partitions[0].used, 0.0);
    assert!(once.programs.iter().all(|p| !p.is_allocated && !p.is_locked && p.allocated_in.is_none()));
    assert_eq!(once.log.len(), log_len);
    assert_eq!(engine.tick(), Err(SimError::NotRunning));
}

#[test]
fn restart_clears_the_log_and_starts_over() {
    let mut engine = engine_with(&[5.0], &[4.0]);
    engine.start().expect("ready");
    engine.tick().expect("running");
    engine.stop();
    engine.start().expect("ready");
    assert!(engine.log().is_empty());
    assert_eq!(engine.tick().expect("running").placed.len(), 1);
    assert_eq!(engine.log().entries()[0].id, 1);
}

#[test]
fn export_lists_what_existed_at_start() {
    let mut engine = engine_with(&[10.0, 5.0], &[10.0, 1.0]);
    assert_eq!(engine.export(), Err(SimError::EmptyLog));
    engine.start().expect("ready");
    engine.tick().expect("running");
    engine.remove_program(1).expect("kill allowed while running");
    assert_eq!(engine.snapshot().programs.len(), 1);

    let export = engine.export().expect("log has entries");
    assert_eq!(export.filename, "simulation-log.txt");
    assert!(export.contents.starts_with(
        "Allocation method: Static Partitioned Allocation\nStrategy: first-fit\n\n\
         Partitions:\nPartition 1 - 10kb\nPartition 2 - 5kb\n\
         Programs:\nProgram 1 - 10kb\nProgram 2 - 1kb\nSimulation Log:\n"
    ));
    assert_eq!(export.contents.lines().filter(|l| l.ends_with("GMT - Killed program 1 which was allocated, freeing 10kb.")).count(), 1);
}

#[test]
fn structure_is_frozen_while_running() {
    let mut engine = engine_with(&[5.0], &[4.0, 9.0]);
    engine.start().expect("ready");
    assert_eq!(engine.start(), Err(SimError::AlreadyRunning));
    assert!(matches!(engine.add_partition(3.0), Err(SimError::Running { .. })));
    assert!(matches!(engine.remove_partition(1), Err(SimError::Running { .. })));
    assert!(matches!(engine.clear_partitions(), Err(SimError::Running { .. })));
    assert!(matches!(engine.add_program(3.0), Err(SimError::Running { .. })));
    assert!(matches!(engine.clear_programs(), Err(SimError::Running { .. })));
    // Not placed yet, so it can't be killed either.
    assert!(matches!(engine.remove_program(2), Err(SimError::Running { .. })));
    assert_eq!(engine.remove_program(42), Ok(false));
    assert_eq!(engine.snapshot().programs.len(), 2);
}

#[test]
fn pool_commands_belong_to_dynamic_mode() {
    let mut engine = Engine::new(Mode::Static);
    assert!(matches!(engine.set_pool_size(10.0), Err(SimError::WrongMode { .. })));
    assert!(matches!(engine.clear_pool_size(), Err(SimError::WrongMode { .. })));
}

#[test]
fn cannot_start_without_programs_and_partitions() {
    let mut engine = Engine::new(Mode::Static);
    assert!(!engine.can_start());
    engine.add_program(3.0).expect("stopped");
    assert_eq!(engine.start(), Err(SimError::NotReady("partitions")));
    engine.add_partition(3.0).expect("stopped");
    assert!(engine.can_start());
    assert!(engine.start().is_ok());
}

#[test]
fn stopped_removal_and_coercion() {
    let mut engine = Engine::new(Mode::Static);
    let id = engine.add_partition(-1.0).expect("stopped");
    let size = engine.snapshot().partitions[0].size;
    assert!((1.0..=10.0).contains(&size));
    assert_eq!(engine.remove_partition(id), Ok(true));
    assert_eq!(engine.remove_partition(id), Ok(false));
    assert_eq!(engine.add_partition(2.0), Ok(2));
}

#[test]
fn muted_log_still_allocates() {
    let mut engine = engine_with(&[5.0], &[4.0]);
    assert!(!engine.toggle_logging());
    engine.start().expect("ready");
    assert_eq!(engine.tick().expect("running").placed.len(), 1);
    assert!(engine.log().is_empty());
    assert!(!engine.snapshot().logging_enabled);
}

#[test]
fn strategy_switch_applies_to_the_next_tick() {
    let mut engine = engine_with(&[10.0, 4.0, 6.0], &[5.0, 3.0]);
    engine.start().expect("ready");
    engine.set_strategy(Strategy::BestFit);
    let report = engine.tick().expect("running");
    assert_eq!(report.placed, vec![(1, Host::Partition(3)), (2, Host::Partition(2))]);
    assert_invariants(&engine);
}

#[test]
fn clearing_the_log_mid_run_restarts_numbering() {
    let mut engine = engine_with(&[5.0], &[4.0, 9.0]);
    engine.start().expect("ready");
    engine.tick().expect("running");
    assert_eq!(engine.log().len(), 2);

    engine.clear_log();
    assert!(engine.log().is_empty());
    assert!(engine.is_running());
    assert_eq!(engine.export(), Err(SimError::EmptyLog));

    engine.tick().expect("running");
    assert_eq!(engine.log().entries()[0].id, 1);
    assert_eq!(engine.log().entries()[0].text, IDLE_MESSAGE);
    assert!(engine.export().is_ok());
}
