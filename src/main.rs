use anyhow::{Context, Result};
use clap::Parser;
use dronefleet::behavior::SimulatedAirframe;
use dronefleet::core::config::Config;
use dronefleet::core::event_log::EventLog;
use dronefleet::metrics::report::{render_batch_report, render_run_report, write_report};
use dronefleet::metrics::MissionMetrics;
use dronefleet::simulation::batch::run_batch;
use dronefleet::simulation::Simulation;
use log::{info, LevelFilter};

#[derive(Parser)]
#[clap(author, version, about = "Drone fleet patrol simulator with coalition contracts")]
struct Cli {
    /// Path to config file
    #[clap(short, long, default_value = "mission_config.json")]
    config: String,

    /// Debug mode
    #[clap(short, long)]
    debug: bool,

    /// Skip the pause between ticks
    #[clap(long)]
    no_delay: bool,

    /// Where to write the markdown report
    #[clap(short, long)]
    report: Option<String>,

    /// Run N randomized headless simulations instead of a single one
    #[clap(long)]
    batch: Option<usize>,

    /// Drones per batch run
    #[clap(long, default_value_t = 3)]
    batch_drones: usize,

    /// Waypoints per generated route
    #[clap(long, default_value_t = 5)]
    batch_points: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .init();

    print_banner();

    // Load configuration; nothing runs if this fails
    let config = Config::from_file(&cli.config)?;

    if let Some(batches) = cli.batch {
        let summary = run_batch(&config, batches, cli.batch_drones, cli.batch_points).await?;
        let report = render_batch_report(&summary);
        let path = cli.report.unwrap_or_else(|| "batch_report.md".to_string());
        write_report(&path, &report).with_context(|| format!("Failed to write report {}", path))?;
        info!("Batch report written to {}", path);
        return Ok(());
    }

    let log = EventLog::new();
    let mut simulation = Simulation::new(config.clone(), log, SimulatedAirframe::shared())?;
    let outcome = simulation.run(!cli.no_delay).await?;

    let metrics = MissionMetrics::compute(&outcome, &config.metrics);
    info!(
        "Coverage {:.2}% | redundancy {:.2}% | {} contracts formed",
        metrics.area_coverage,
        metrics.route_redundancy,
        outcome.contracts.len()
    );

    let report = render_run_report(&metrics, outcome.coalition_id.as_deref());
    let path = cli.report.unwrap_or_else(|| "simulation_report.md".to_string());
    write_report(&path, &report).with_context(|| format!("Failed to write report {}", path))?;
    info!("Report written to {}", path);

    Ok(())
}

fn print_banner() {
    println!("\n====================================================");
    println!("  DRONEFLEET - Coalition Patrol Simulator v0.1.0");
    println!("====================================================");
    println!("  ✅ Contract Pipeline     ✅ Behavior Trees");
    println!("  ✅ Dynamic Events        ✅ Mission Metrics");
    println!("====================================================\n");
}
