use anyhow::bail;
use clap::Parser;
use core::time::Duration;

/// Runtime configuration for the `probe-stress` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "probe-stress",
    version,
    about = "Drives a probe pool through submit and stop/start cycles"
)]
pub struct CliArgs {
    /// Number of probes in the pool. Defaults to the number of logical CPUs.
    ///
    /// Environment variable: `POOL_SIZE`
    #[arg(long, env = "POOL_SIZE")]
    pub pool_size: Option<usize>,

    /// Capacity of the shared work queue. `0` makes every submission a
    /// rendezvous with an idle probe.
    ///
    /// Environment variable: `BUFFER_SIZE`
    #[arg(long, env = "BUFFER_SIZE", default_value_t = probe::DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,

    /// Total number of units of work to submit across all cycles.
    ///
    /// Environment variable: `UNITS`
    #[arg(long, env = "UNITS", default_value_t = 10_000)]
    pub units: usize,

    /// Simulated duration of each unit of work, in microseconds.
    ///
    /// Environment variable: `WORK_MICROS`
    #[arg(long, env = "WORK_MICROS", default_value_t = 50)]
    pub work_micros: u64,

    /// Number of stop/start cycles to run the load through.
    ///
    /// Environment variable: `RESTARTS`
    #[arg(long, env = "RESTARTS", default_value_t = 1)]
    pub restarts: usize,

    /// Print the final pool snapshot as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub pool_size: usize,
    pub buffer_size: usize,
    pub units: usize,
    pub work: Duration,
    pub cycles: usize,
    pub json: bool,
}

impl StressConfig {
    /// Units submitted in `cycle`; the remainder goes to the first cycles.
    pub fn units_in_cycle(&self, cycle: usize) -> usize {
        let base = self.units / self.cycles;
        base + usize::from(cycle < self.units % self.cycles)
    }
}

impl TryFrom<CliArgs> for StressConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let pool_size = args.pool_size.unwrap_or_else(num_cpus::get);
        if pool_size == 0 {
            bail!("POOL_SIZE must be greater than 0");
        }
        if args.units == 0 {
            bail!("UNITS must be greater than 0");
        }
        let cycles = args
            .restarts
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("Overflow in cycle count"))?;

        Ok(Self {
            pool_size,
            buffer_size: args.buffer_size,
            units: args.units,
            work: Duration::from_micros(args.work_micros),
            cycles,
            json: args.json,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["probe-stress"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn rejects_empty_pool() {
        assert!(StressConfig::try_from(args(&["--pool-size", "0"])).is_err());
        assert!(StressConfig::try_from(args(&["--units", "0"])).is_err());
    }

    #[test]
    fn splits_units_across_cycles() {
        let config =
            StressConfig::try_from(args(&["--pool-size", "2", "--units", "10", "--restarts", "2"]))
                .unwrap();
        assert_eq!(config.cycles, 3);
        let split: Vec<_> = (0..config.cycles).map(|c| config.units_in_cycle(c)).collect();
        assert_eq!(split, vec![4, 3, 3]);
    }
}
