mod net;
mod state;

use crate::net::start_websocket_server;
use crate::state::SharedGameState;

use log::{error, info, warn};
use racing_physics::config::SimConfig;
use racing_physics::logging;
use racing_physics::spawn::SpawnGrid;
use racing_physics::track::TrackLayout;
use racing_physics::PhysicsEngine;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

const CONFIG_ENV: &str = "RACING_PHYSICS_CONFIG";

/// First CLI argument, then the environment, then built-in defaults.
fn load_config() -> Result<SimConfig, racing_physics::error::ConfigError> {
    let path = std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV).ok());
    match path {
        Some(path) => {
            info!("📄 Loading config from {path}");
            SimConfig::load(path)
        }
        None => Ok(SimConfig::default()),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = logging::try_init() {
        eprintln!("logger already initialised: {e}");
    }
    info!("🚀 Starting racing physics server...");

    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("❌ {e}");
            std::process::exit(1);
        }
    };

    let track = TrackLayout::oval_circuit();
    let mut engine = PhysicsEngine::new(&config);
    engine.build_track(&track);

    let state = Arc::new(Mutex::new(SharedGameState::new(SpawnGrid::new(
        track.spawn,
        config.server.max_players,
    ))));
    let physics = Arc::new(Mutex::new(engine));

    // Start WebSocket server
    tokio::spawn(start_websocket_server(
        config.server.clone(),
        Arc::clone(&state),
        Arc::clone(&physics),
    ));

    let tick_hz = config.server.tick_hz.max(1);
    let mut ticker = interval(Duration::from_secs_f64(1.0 / tick_hz as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        // Inputs -> step -> evictions
        game.apply_inputs(&mut phys);
        let report = phys.update(dt);
        if !report.evicted.is_empty() {
            warn!("⚠️ {} vehicle(s) evicted this tick", report.evicted.len());
            game.respawn_evicted(&mut phys, &report.evicted);
        }

        // Advance tick + broadcast snapshot
        let effects = phys.drain_effects();
        game.tick += 1;
        game.broadcast_snapshot(&phys, &effects);
    }
}
