use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context};
use clap::Parser;
use partsim::*;

/// Runs one memory partitioning simulation in real time
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Allocation scheme
    #[arg(value_enum)]
    mode:       Mode,

    /// Placement strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::FirstFit)]
    strategy:   Strategy,

    /// Partition sizes in KB, comma separated (static mode; 0 means random)
    #[arg(short, long, value_delimiter = ',')]
    partitions: Vec<KiloBytes>,

    /// Program sizes in KB, comma separated (0 means random)
    #[arg(short = 'g', long, value_delimiter = ',')]
    programs:   Vec<KiloBytes>,

    /// Total pool size in KB (dynamic mode; 0 means random)
    #[arg(short = 'm', long)]
    pool:       Option<KiloBytes>,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = DEFAULT_PERIOD_MS)]
    period_ms:  u64,

    /// Number of periods to let the simulation run for
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    ticks:      u32,

    /// Kill a program after some periods, as PROGRAM@PERIOD (repeatable)
    #[arg(short, long)]
    kill:       Vec<KillAt>,

    /// Directory to write the simulation log into
    #[arg(short, long, default_value = ".")]
    out:        PathBuf,
}

#[derive(Clone, Copy, Debug)]
struct KillAt {
    program:    ProgramId,
    period:     u32,
}

impl FromStr for KillAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (program, period) = s.split_once('@')
            .ok_or_else(|| format!("expected PROGRAM@PERIOD, got {s:?}"))?;

        Ok(Self {
            program:    program.parse().map_err(|e| format!("bad program id: {e}"))?,
            period:     period.parse().map_err(|e| format!("bad period: {e}"))?,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    assert!(cli.out.is_dir(), "Invalid output directory");
    let config = SessionConfig::default()
        .with_period(Duration::from_millis(cli.period_ms));
    let mut session = Session::new(cli.mode, config);

    session.set_strategy(cli.strategy);
    match cli.mode {
        Mode::Static    => {
            for size in &cli.partitions {
                session.add_partition(*size)?;
            }
        },
        Mode::Dynamic   => {
            if let Some(size) = cli.pool {
                session.set_pool_size(size)?;
            }
        }
    }
    for size in &cli.programs {
        session.add_program(*size)?;
    }
    if !session.snapshot().can_start {
        bail!("Add programs and {} to start the simulation.", match cli.mode {
            Mode::Static    => "partitions",
            Mode::Dynamic   => "a total memory size",
        });
    }

    session.start()?;
    for period in 1..=cli.ticks {
        if !session.wait_for_ticks(period.into()) {
            bail!("The simulation stopped before period {period}.");
        }
        for k in cli.kill.iter().filter(|k| k.period == period) {
            match session.remove_program(k.program) {
                Ok(true)    => {},
                Ok(false)   => println!("WARNING: no program {} to kill.", k.program),
                Err(e)      => println!("WARNING: could not kill program {}: {e}", k.program),
            }
        }
    }
    let stats = session.stats();
    session.stop();

    let export = session.export()?;
    print!("{}", export.contents);
    println!("\nPlaced:\t\t{}\nLocked:\t\t{}\nWaste:\t\t{:.2}%", stats.placed, stats.locked, stats.waste);

    let path = cli.out.join(export.filename);
    std::fs::write(&path, &export.contents)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Log written to {}", path.display());

    Ok(())
}
