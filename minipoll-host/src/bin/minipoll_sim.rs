//! Headless Minipoll runner.
//!
//! Builds a population from a TOML run file (or the defaults), ticks it for
//! the requested game time and prints one JSON summary per agent. Events can
//! be streamed to a JSON-lines file while the run progresses.
//!
//! ```text
//! minipoll-sim --agents 6 --seconds 900 --events-out events.jsonl
//! RUST_LOG=minipoll_host=debug minipoll-sim --config run.toml --realtime
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use minipoll_host::{Population, SimRecord, SimulationConfig};

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "minipoll-sim")]
#[command(about = "Run a population of Minipolls headlessly")]
struct Args {
    /// TOML run file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of agents
    #[arg(long)]
    agents: Option<usize>,

    /// Number of stock objects when the run file lists none
    #[arg(long)]
    objects: Option<usize>,

    /// Game seconds to simulate
    #[arg(long)]
    seconds: Option<f64>,

    /// Fixed tick length in game seconds
    #[arg(long)]
    tick: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Write every event as one JSON object per line
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn load_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimulationConfig::default(),
        };
        let run = &mut config.run;
        if let Some(agents) = self.agents {
            run.agents = agents;
        }
        if let Some(objects) = self.objects {
            run.objects = objects;
        }
        if let Some(seconds) = self.seconds {
            run.duration_secs = seconds;
        }
        if let Some(tick) = self.tick {
            run.tick_secs = tick;
        }
        if let Some(seed) = self.seed {
            run.seed = seed;
        }
        config.validate().context("invalid run configuration")?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
    }
}

fn attach_event_sink(population: &mut Population, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut failed = false;
    population.bus_mut().subscribe(move |record: &SimRecord| {
        if failed {
            return;
        }
        let written = serde_json::to_writer(&mut writer, record)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = written {
            warn!(error = %e, "event sink failed, dropping further events");
            failed = true;
        }
    });
    info!(path = %path.display(), "streaming events");
    Ok(())
}

async fn run_realtime(population: &mut Population, duration: f64, tick: f64) -> u64 {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(tick));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let end = population.now() + duration;
    let mut ticks = 0;
    while population.now() + tick <= end + 1e-9 {
        interval.tick().await;
        population.tick(tick);
        ticks += 1;
    }
    ticks
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);

    let config = args.load_config()?;
    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }
    let run = config.run.clone();
    info!(
        agents = run.agents,
        duration_secs = run.duration_secs,
        tick_secs = run.tick_secs,
        seed = run.seed,
        "minipoll-sim starting"
    );

    let mut population = Population::from_config(&config)?;
    if let Some(path) = &args.events_out {
        attach_event_sink(&mut population, path)?;
    }

    let ticks = if args.realtime {
        run_realtime(&mut population, run.duration_secs, run.tick_secs).await
    } else {
        population.run_for(run.duration_secs, run.tick_secs)
    };

    let time = population.clock().time_of_day();
    info!(
        ticks,
        game_secs = population.now(),
        day = time.day_number,
        phase = ?time.phase,
        "run finished"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for summary in population.summaries() {
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
    }
    Ok(())
}
