use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gravity_well::config::SimConfig;
use gravity_well::game::presenter::{dispatch, TracingPresenter};
use gravity_well::game::sensor::{AttitudeSource, NoSensor, ScriptedTilt};
use gravity_well::game::session::SessionEvent;
use gravity_well::runtime::spawn_session;

/// How often the binary drains the event channel
const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Gravity Well v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = SimConfig::load_or_default();
    config.validate()?;
    info!(
        "Configuration loaded: scene {}x{}, seed {}, auto_restart={}, sensor={}",
        config.scene_width, config.scene_height, config.seed, config.auto_restart, config.sensor_enabled
    );

    let source: Box<dyn AttitudeSource> = if config.sensor_enabled {
        Box::new(ScriptedTilt::new(4.0, 0.7))
    } else {
        Box::new(NoSensor)
    };

    let handle = spawn_session(&config, source);
    let mut presenter = TracingPresenter::default();
    let mut games_played: u32 = 1;

    let run = async {
        let mut drain = tokio::time::interval(DRAIN_INTERVAL);
        loop {
            drain.tick().await;
            let events: Vec<SessionEvent> = handle.events().try_iter().collect();
            for event in &events {
                dispatch(event, &mut presenter);
                if *event == SessionEvent::RestartAvailable && config.auto_restart {
                    if handle.restart() {
                        games_played += 1;
                    } else {
                        error!("Restart rejected");
                    }
                }
            }
        }
    };

    // Shutdown signal handler
    let shutdown = async {
        match config.run_seconds {
            Some(seconds) => {
                tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
                info!("Run time elapsed");
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to install Ctrl+C handler: {}", e);
                }
                info!("Shutdown signal received");
            }
        }
    };

    tokio::select! {
        _ = run => {}
        _ = shutdown => {
            info!("Shutting down...");
        }
    }

    let snapshot = handle.snapshot();
    let dropped = handle.dropped_events();
    handle.shutdown();

    info!(
        "Played {} game(s), {} effects, {} events dropped",
        games_played, presenter.effects, dropped
    );
    info!("Final state: {}", serde_json::to_string(&snapshot)?);

    Ok(())
}
