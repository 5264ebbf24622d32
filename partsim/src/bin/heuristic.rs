use clap::Parser;
use partsim::*;
use rand::{prelude::*, rngs::StdRng};
use rayon::prelude::*;

/// Pits first-fit against best-fit over random scenarios
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Allocation scheme
    #[arg(value_enum)]
    mode:       Mode,

    /// Number of random scenarios
    #[arg(short, long, default_value_t = 100)]
    lives:      usize,

    /// Partitions per scenario (static mode)
    #[arg(short, long, default_value_t = 5)]
    partitions: usize,

    /// Programs per scenario
    #[arg(short = 'g', long, default_value_t = 8)]
    programs:   usize,

    /// Seed, for reproducible scenarios
    #[arg(short, long)]
    seed:       Option<u64>,
}

/// A random workload, reused verbatim under each strategy.
struct Scenario {
    partitions: Vec<KiloBytes>,
    programs:   Vec<KiloBytes>,
    pool:       KiloBytes,
}

impl Scenario {
    fn random(rng: &mut StdRng, partitions: usize, programs: usize) -> Self {
        Self {
            partitions: (0..partitions).map(|_| rng.gen_range(1..=RANDOM_SIZE_MAX) as KiloBytes).collect(),
            programs:   (0..programs).map(|_| rng.gen_range(1..=RANDOM_SIZE_MAX) as KiloBytes).collect(),
            pool:       rng.gen_range(1..=RANDOM_POOL_MAX) as KiloBytes,
        }
    }

    /// Plays the scenario headlessly until a tick finds nothing to do.
    fn play(&self, mode: Mode, strategy: Strategy) -> Result<RunStats, SimError> {
        let mut engine = Engine::new(mode);
        engine.set_strategy(strategy);
        match mode {
            Mode::Static    => {
                for s in &self.partitions {
                    engine.add_partition(*s)?;
                }
            },
            Mode::Dynamic   => { engine.set_pool_size(self.pool)?; }
        }
        for s in &self.programs {
            engine.add_program(*s)?;
        }
        engine.start()?;
        // Every program is placed or locked after one pass.
        engine.run_until_idle(self.programs.len() + 1)?;

        Ok(engine.stats())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    assert!(cli.lives > 0, "At least one life is needed");
    assert!(cli.programs > 0, "At least one program is needed");
    assert!(cli.mode == Mode::Dynamic || cli.partitions > 0, "At least one partition is needed");
    let base_seed = cli.seed.unwrap_or_else(|| thread_rng().gen());

    let results = (0..cli.lives)
        .into_par_iter()
        .map(|life| -> Result<(RunStats, RunStats), SimError> {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(life as u64));
            let scenario = Scenario::random(&mut rng, cli.partitions, cli.programs);

            Ok((
                scenario.play(cli.mode, Strategy::FirstFit)?,
                scenario.play(cli.mode, Strategy::BestFit)?,
            ))
        })
        .collect::<Result<Vec<_>, SimError>>()?;

    println!("Seed:\t\t{base_seed}\nScenarios:\t{}\n", results.len());
    for (strategy, picked) in [
        (Strategy::FirstFit, results.iter().map(|r| r.0).collect_vec()),
        (Strategy::BestFit, results.iter().map(|r| r.1).collect_vec()),
    ] {
        let n = picked.len() as f64;
        println!(
            "{strategy}:\n\tavg. placed:\t{:.2}\n\tavg. locked:\t{:.2}\n\tavg. waste:\t{:.2}%",
            picked.iter().map(|s| s.placed as f64).sum::<f64>() / n,
            picked.iter().map(|s| s.locked as f64).sum::<f64>() / n,
            picked.iter().map(|s| s.waste).sum::<f64>() / n,
        );
    }
    let (ff_wins, bf_wins) = results.iter()
        .fold((0, 0), |(ff, bf), (a, b)| {
            (ff + (a.placed > b.placed) as usize, bf + (b.placed > a.placed) as usize)
        });
    println!("\nFirst-fit placed more in {ff_wins} scenarios, best-fit in {bf_wins}.");

    Ok(())
}
