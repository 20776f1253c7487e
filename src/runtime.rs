//! Async driver
//!
//! Runs a [`GameSession`] on tokio: one task ticks physics at a fixed rate,
//! another samples the attitude source and writes the shared gravity angle.
//! Strong-tilt notices travel over a crossbeam channel that the session drains
//! at the start of each tick; session events leave over another bounded
//! channel and are dropped when the consumer falls behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::game::constants::{physics, timing};
use crate::game::sensor::{AttitudeSource, MotionSensor, SensorError, SharedGravity, TiltReading};
use crate::game::session::{GameSession, SessionEvent, SessionSnapshot};

/// Strong-tilt notices buffered between sensor samples and physics ticks
const TILT_BUFFER: usize = 256;

/// Running session and its background tasks. Dropping the handle stops them.
pub struct SessionHandle {
    session: Arc<Mutex<GameSession>>,
    gravity: Arc<SharedGravity>,
    events: Receiver<SessionEvent>,
    dropped_events: Arc<AtomicU64>,
    physics_task: JoinHandle<()>,
    sensor_task: JoinHandle<()>,
}

impl SessionHandle {
    /// Session events in the order they happened
    pub fn events(&self) -> &Receiver<SessionEvent> {
        &self.events
    }

    pub fn gravity(&self) -> &Arc<SharedGravity> {
        &self.gravity
    }

    /// Events discarded because the channel was full
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Cancel timers, reset and start again. Only valid after game over.
    pub fn restart(&self) -> bool {
        self.session.lock().restart()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    /// Run `f` with the session locked
    pub fn with_session<R>(&self, f: impl FnOnce(&mut GameSession) -> R) -> R {
        f(&mut self.session.lock())
    }

    /// Halt the session; the tasks stop when the handle drops
    pub fn shutdown(self) {
        info!("Session shutting down");
        self.session.lock().detach_surface();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.physics_task.abort();
        self.sensor_task.abort();
    }
}

/// Build a session from `config`, start it and spawn its tasks.
///
/// Must be called from within a tokio runtime.
pub fn spawn_session(config: &SimConfig, source: Box<dyn AttitudeSource>) -> SessionHandle {
    let gravity = Arc::new(SharedGravity::default());
    let (tilt_tx, tilt_rx) = bounded(TILT_BUFFER);
    let (event_tx, event_rx) = bounded(config.event_buffer);
    let dropped_events = Arc::new(AtomicU64::new(0));

    let mut session = GameSession::new(config.scene(), config.seed, gravity.clone());
    session.connect_tilt(tilt_rx);
    session.start();
    let session = Arc::new(Mutex::new(session));

    let sensor = MotionSensor::new(source, gravity.clone());
    let sensor_task = start_sensor_loop(sensor, tilt_tx);
    let physics_task = start_physics_loop(session.clone(), event_tx, dropped_events.clone());

    SessionHandle {
        session,
        gravity,
        events: event_rx,
        dropped_events,
        physics_task,
        sensor_task,
    }
}

fn start_physics_loop(
    session: Arc<Mutex<GameSession>>,
    events: Sender<SessionEvent>,
    dropped: Arc<AtomicU64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let tick_duration = Duration::from_micros(physics::TICK_DURATION_US);
        let mut ticker = interval(tick_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Physics loop started at {} Hz", physics::TICK_RATE);
        let start = Instant::now();
        let mut tick_count: u64 = 0;

        loop {
            ticker.tick().await;
            tick_count += 1;

            let tick_events = session.lock().tick(physics::DT);

            for event in tick_events {
                match events.try_send(event) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("Event consumer gone, physics loop stopping");
                        session.lock().detach_surface();
                        return;
                    }
                }
            }

            // Log stats periodically (every 30 seconds)
            if tick_count % (physics::TICK_RATE as u64 * 30) == 0 {
                let snapshot = session.lock().snapshot();
                info!(
                    "Session: {}s, level {}, score {}, lives {}, {} shapes, gravity {:.1}",
                    start.elapsed().as_secs(),
                    snapshot.state.level,
                    snapshot.state.score,
                    snapshot.state.lives,
                    snapshot.active_shapes,
                    snapshot.gravity_magnitude
                );
            }
        }
    })
}

fn start_sensor_loop(mut sensor: MotionSensor, notices: Sender<TiltReading>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs_f64(timing::MOTION_UPDATE_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match sensor.poll() {
                Ok(Some(reading)) if reading.strong => {
                    if let Err(TrySendError::Disconnected(_)) = notices.try_send(reading) {
                        return;
                    }
                }
                Ok(_) => {}
                Err(SensorError::Unavailable) => {
                    warn!("Sensor loop stopped, gravity stays static");
                    return;
                }
            }
        }
    })
}
