mod autopilot;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info};

use courier_sim::simulation::{LogEffects, SimConfig, SimWorld};

#[derive(Parser)]
#[command(name = "courier_sim")]
#[command(about = "Headless courier delivery simulation")]
struct Cli {
    /// Blocks on each side of the origin, per axis
    #[arg(long, default_value = "4")]
    grid_size: u32,

    /// Block size (road spacing) in world units
    #[arg(long, default_value = "30")]
    block_size: f32,

    /// Road width in world units
    #[arg(long, default_value = "8")]
    road_width: f32,

    /// Number of traffic vehicles
    #[arg(long, default_value = "20")]
    vehicles: usize,

    /// Number of pedestrians
    #[arg(long, default_value = "15")]
    pedestrians: usize,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of frames to run
    #[arg(long, default_value = "3000")]
    ticks: u32,

    /// Frame delta in seconds
    #[arg(long, default_value = "0.1")]
    delta: f32,

    /// Session length in seconds
    #[arg(long, default_value = "300")]
    session_length: f32,

    /// Print an ASCII map at the start and end of the run
    #[arg(long)]
    map: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = format!("warn,courier_sim={}", level);
    Builder::from_env(Env::default().default_filter_or(filter)).init();

    if let Err(err) = run_headless(&cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

/// Run the simulation in headless mode with the autopilot courier
fn run_headless(cli: &Cli) -> Result<()> {
    let config = SimConfig {
        grid_size: cli.grid_size,
        block_size: cli.block_size,
        road_width: cli.road_width,
        vehicle_count: cli.vehicles,
        pedestrian_count: cli.pedestrians,
        session_length: cli.session_length,
        seed: cli.seed,
        ..SimConfig::default()
    };

    info!("Running courier simulation in headless mode...");
    info!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);

    let mut world = SimWorld::with_effects(config, LogEffects)?;
    let mut pilot = autopilot::Autopilot::new();

    world.log_summary();
    if cli.map {
        println!("{}", world.ascii_map(4.0));
    }

    // Summarise once per simulated ten seconds
    let report_every = ((10.0 / cli.delta).ceil() as u32).max(1);

    let mut tick = 0;
    while tick < cli.ticks && !world.is_session_over() {
        let input = pilot.next_input(&mut world);
        world.tick(cli.delta, &input);
        tick += 1;

        if tick % report_every == 0 {
            info!(
                "--- After tick {} ({:.1}s simulated time) ---",
                tick,
                world.clock.elapsed()
            );
            world.log_summary();
        }
    }

    let snapshot = world.snapshot();
    info!("=== SESSION COMPLETE ===");
    info!("Elapsed time: {:.2}s", snapshot.elapsed);
    info!("Orders accepted: {}", pilot.orders_accepted);
    info!("Deliveries completed: {}", snapshot.stats.deliveries_completed);
    info!("Deliveries failed: {}", snapshot.stats.deliveries_failed);
    info!("Earnings: ${}", snapshot.stats.earnings);
    info!("Active agents: {}", snapshot.agents.len());
    info!("Success rate: {:.1}%", snapshot.stats.success_rate());

    if cli.map {
        println!("{}", world.ascii_map(4.0));
    }

    world.shutdown();
    Ok(())
}
