use clap::Parser;
use fire_ca_core::{CellState, Config, SimError, Simulation, TracingObserver};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fire spread cellular automaton
#[derive(Parser, Debug)]
#[command(name = "fire-ca")]
#[command(
    about = "Run a fire spread cellular automaton from a TOML configuration",
    long_about = None
)]
struct Args {
    /// Configuration file; defaults are used when it does not exist
    #[arg(short, long, default_value = "sim.toml")]
    config: PathBuf,

    /// Number of ticks, overriding `simulation.steps`
    #[arg(long)]
    steps: Option<usize>,

    /// Seed, overriding `simulation.seed`
    #[arg(long)]
    seed: Option<u64>,
}

/// Outcome of looking for the configuration file
enum Loaded {
    File(Config),
    Missing(Config),
}

fn load_config(path: &Path) -> Result<Loaded, SimError> {
    if path.exists() {
        Config::from_file(path).map(Loaded::File)
    } else {
        Ok(Loaded::Missing(Config::default()))
    }
}

fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(mut config: Config, args: &Args) -> Result<(), SimError> {
    if let Some(steps) = args.steps {
        config.simulation.steps = steps;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
    }

    info!(
        "Grid {}x{}, {} steps, preset '{}'",
        config.width(),
        config.height(),
        config.simulation.steps,
        config.preset.source
    );

    let mut sim = Simulation::from_config(&config, Arc::new(TracingObserver))?;
    info!(
        "Neighborhood {}, rules [{}], sinks [{}]",
        sim.neighborhood_name(),
        sim.rule_names().join(", "),
        sim.sink_names().join(", ")
    );

    sim.run(config.simulation.steps);

    let state = sim.state();
    info!("=== Final state after {} steps ===", sim.steps_taken());
    for cell_state in CellState::ALL {
        info!("  {:<14} {}", cell_state.label(), state.count(cell_state));
    }
    info!(
        "  mean heat {:.2}, fuel {:.2}, oxygen {:.2}",
        state.mean_heat(),
        state.mean_fuel(),
        state.mean_oxygen()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let loaded = load_config(&args.config);
    let directive = match &loaded {
        Ok(Loaded::File(config) | Loaded::Missing(config)) => config.debug.log_level.clone(),
        Err(_) => "info".to_owned(),
    };
    init_tracing(&directive);

    let config = match loaded {
        Ok(Loaded::File(config)) => {
            info!("Loaded configuration from {}", args.config.display());
            config
        }
        Ok(Loaded::Missing(config)) => {
            warn!(
                "Configuration {} not found, using defaults",
                args.config.display()
            );
            config
        }
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
