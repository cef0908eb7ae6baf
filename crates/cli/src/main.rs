//! Interactive command-line front end for the belief dynamics simulator.
//!
//! Runs preset scenarios by key, all of them in sequence, or an
//! interactive menu loop; echoes progress to the console and writes a
//! JSON report per completed run.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use belief_core::{run_with_observer, EngineError};
use scenarios::{Scenario, ScenarioError};

mod config;
mod render;
mod report;

use config::{CliConfig, ConfigError};
use report::RunReport;

/// Command line arguments for the simulator
#[derive(Parser, Debug)]
#[command(name = "belief-sim")]
#[command(about = "A synchronous opinion dynamics simulator over social graphs")]
struct Args {
    /// Scenario key to run (see the interactive menu for the list)
    #[arg(long)]
    scenario: Option<String>,

    /// Run every built-in scenario
    #[arg(long)]
    all: bool,

    /// Random seed for reproducibility (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Path to a TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let settings = match &args.config {
        Some(path) => {
            tracing::debug!("loading settings from {}", path.display());
            CliConfig::from_file(path)?
        }
        None => CliConfig::default(),
    };
    let seed = args.seed.unwrap_or(settings.general.seed);

    println!("Epistemic Propagation Engine");
    println!("============================");
    println!("Seed: {}", seed);
    println!("Reports: {}/", settings.general.out_dir);
    println!();
    println!("Each agent holds a belief in [0, 1] and updates from its");
    println!("neighbors, weighted by homophily and damped by resistance.");
    println!();

    if args.all {
        run_all(seed, &settings)?;
    } else if let Some(key) = &args.scenario {
        run_scenario(key, seed, &settings)?;
    } else {
        menu_loop(seed, &settings)?;
    }
    Ok(())
}

/// Interactive stdin loop: show the menu, dispatch, repeat until quit.
fn menu_loop(seed: u64, settings: &CliConfig) -> Result<(), CliError> {
    loop {
        print!("{}", render::menu(&scenarios::SCENARIOS));
        println!();
        print!("Select scenario [long_slide]: ");
        io::stdout().flush().map_err(CliError::Io)?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line).map_err(CliError::Io)? == 0 {
            break;
        }
        let choice = line.trim();
        let choice = if choice.is_empty() { "long_slide" } else { choice };

        match choice {
            "quit" | "q" => break,
            "all" => run_all(seed, settings)?,
            key => match run_scenario(key, seed, settings) {
                Err(CliError::Scenario(ScenarioError::UnknownScenario(unknown))) => {
                    eprintln!("Unknown scenario \"{}\". Try again.", unknown);
                }
                other => other?,
            },
        }
        println!();
    }

    println!("See {}/ for run reports.", settings.general.out_dir);
    Ok(())
}

/// Runs every registered scenario in menu order under the same seed.
fn run_all(seed: u64, settings: &CliConfig) -> Result<(), CliError> {
    println!("Running all scenarios");
    println!("---------------------");
    for info in &scenarios::SCENARIOS {
        run_scenario(info.key, seed, settings)?;
        println!();
    }
    println!("All scenarios complete.");
    Ok(())
}

/// Builds, runs, summarizes, and reports one scenario.
fn run_scenario(key: &str, seed: u64, settings: &CliConfig) -> Result<(), CliError> {
    let Scenario {
        info,
        mut network,
        config,
    } = scenarios::build(key, seed)?;

    println!();
    print!("{}", render::scenario_panel(&info));
    println!();
    println!(
        "{} agents, {} connections, homophily {}",
        network.agent_count(),
        network.edge_count(),
        network.homophily()
    );
    println!(
        "Running {} steps (noise {})...",
        config.steps, config.noise_scale
    );

    let mut rng = SmallRng::seed_from_u64(seed);
    let interval = settings.display.progress_interval.max(1);
    let mut last_edge_count = network.edge_count();

    run_with_observer(&mut network, &config, &mut rng, |net, step_index| {
        if net.edge_count() != last_edge_count {
            println!(
                "  -> Step {}: {} new connections formed.",
                step_index,
                net.edge_count() - last_edge_count
            );
            last_edge_count = net.edge_count();
        }

        let completed = step_index + 1;
        if completed % interval == 0 {
            let summary = net.summary();
            println!(
                "[Step {:>4}] mean belief {:.4} | polarization {:.4}",
                completed, summary.overall_mean, summary.polarization
            );
        }
    })?;

    println!();
    println!("--- {}: Final State ---", info.name);
    print!(
        "{}",
        render::summary_table(&network.summary(), settings.display.bar_width)
    );

    let report = RunReport::new(&info, seed, &network);
    match report::write_report(&report, Path::new(&settings.general.out_dir)) {
        Ok(path) => println!("  Wrote {}", path.display()),
        Err(e) => eprintln!("Warning: Could not write run report: {}", e),
    }

    Ok(())
}

/// Top-level failures; each ends the process with a nonzero exit.
#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Scenario(ScenarioError),
    Engine(EngineError),
    Io(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{}", e),
            CliError::Scenario(e) => write!(f, "{}", e),
            CliError::Engine(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Scenario(e) => Some(e),
            CliError::Engine(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<ScenarioError> for CliError {
    fn from(e: ScenarioError) -> Self {
        CliError::Scenario(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Engine(e)
    }
}
