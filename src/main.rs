//! Headless fly-through: streams terrain along +X and logs what happens.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   JSON terrain config (default: built-in defaults)
//!   --ticks <N>       Number of ticks to run (default: 600)
//!   --speed <U/S>     Observer speed in world units per second (default: 40)
//!   --tick-ms <MS>    Tick interval in milliseconds (default: 16)

use std::time::Duration;

use glam::Vec3;

use terrastream::core::{logging, time::FrameTimer};
use terrastream::{StreamingController, TerrainConfig};

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> terrastream::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = match parse_str_arg(&args, "--config") {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig::default(),
    };
    let ticks = parse_u64_arg(&args, "--ticks").unwrap_or(600);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(40.0);
    let tick_interval = Duration::from_millis(parse_u64_arg(&args, "--tick-ms").unwrap_or(16));

    let mut controller = StreamingController::new(config)?;
    let mut timer = FrameTimer::new();
    let mut observer = Vec3::new(0.0, 20.0, 0.0);
    let mut uploaded = 0usize;
    let mut released = 0usize;

    for tick in 0..ticks {
        let now = timer.tick();
        observer.x += speed * timer.delta_secs();

        let report = controller.update(observer, now);
        uploaded += report.terrain.delivered.len() + report.water.delivered.len();
        released += report.terrain.evicted.len() + report.water.evicted.len();

        if tick % 60 == 0 {
            let stats = controller.stats();
            log::info!(
                "tick {tick}: observer chunk {}, terrain {} active / {} pending / {} fading, water {} active, queue {} (dropped {})",
                report.terrain.center,
                stats.terrain.states.active,
                stats.terrain.states.pending,
                stats.terrain.states.fading_in + stats.terrain.states.fading_out,
                stats.water.states.active,
                stats.terrain.queue.queued,
                stats.terrain.queue.dropped,
            );
        }

        std::thread::sleep(tick_interval);
    }

    let stats = controller.stats();
    log::info!(
        "Done after {} ticks ({:.1} tps): {uploaded} meshes delivered, {released} released, {} generated, {} failed",
        timer.frame_count(),
        timer.average_tps(),
        stats.terrain.queue.generated + stats.water.queue.generated,
        stats.terrain.queue.failed + stats.water.queue.failed,
    );

    controller.shutdown();
    Ok(())
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u64_arg(args: &[String], name: &str) -> Option<u64> {
    parse_str_arg(args, name).and_then(|s| s.parse().ok())
}

fn parse_f32_arg(args: &[String], name: &str) -> Option<f32> {
    parse_str_arg(args, name).and_then(|s| s.parse().ok())
}
