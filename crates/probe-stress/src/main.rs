mod config;
mod telemetry;

use clap::Parser;
use config::{CliArgs, StressConfig};
use probe::{Pool, PoolConfig};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = StressConfig::try_from(args)?;
    let dispatch = init_telemetry()?;

    tracing::info!(?config, "starting stress run");

    let pool = Pool::new(
        PoolConfig::new()
            .size(config.pool_size)
            .buffer_size(config.buffer_size)
            .sink(dispatch),
    )?;

    let started = Instant::now();
    for cycle in 0..config.cycles {
        if cycle > 0 {
            pool.start()?;
        }
        run_cycle(&pool, &config, cycle);
        pool.stop(true);
    }
    let elapsed = started.elapsed();

    let stats = pool.stats();
    if config.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "{} units on {} probes in {:.3?} ({:.0} units/s), {} panicked",
            config.units,
            stats.size,
            elapsed,
            config.units as f64 / elapsed.as_secs_f64(),
            stats.panicked,
        );
    }
    Ok(())
}

fn run_cycle(pool: &Pool, config: &StressConfig, cycle: usize) {
    let units = config.units_in_cycle(cycle);
    let (done_tx, done_rx) = mpsc::channel();
    let cycle_start = Instant::now();

    for _ in 0..units {
        let done_tx = done_tx.clone();
        let work = config.work;
        pool.submit(move || {
            if !work.is_zero() {
                thread::sleep(work);
            }
            let _ = done_tx.send(());
        });
    }
    drop(done_tx);

    let completed = done_rx.iter().take(units).count();
    tracing::info!(
        cycle,
        completed,
        elapsed = ?cycle_start.elapsed(),
        stats = ?pool.stats(),
        "cycle complete"
    );
}
