//! Game session controller
//!
//! Owns the physics world, zones, portal and timer schedule for one play
//! session and turns physics events and timer firings into state changes.
//! Everything runs on the caller's timeline: [`GameSession::tick`] advances
//! the session clock, steps physics, then fires due timers one at a time.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::game::body::BodyId;
use crate::game::constants::{physics, timing, ui};
use crate::game::portal::Portal;
use crate::game::schedule::{Schedule, TimerId, TimerKind};
use crate::game::sensor::{SharedGravity, TiltReading};
use crate::game::shape::{ColorId, ShapeKind};
use crate::game::state::{LevelChange, SessionPhase, SessionState};
use crate::game::world::{PhysicsWorld, PortalBoundary, WorldEvent};
use crate::game::zone::{corner_layout, CollectionZone};
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Outcome of session activity, consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SessionEvent {
    Started {
        level: u32,
        lives: u8,
        score: u32,
    },
    ShapeSpawned {
        body: BodyId,
        kind: ShapeKind,
        position: Vec2,
    },
    ShapeCollected {
        body: BodyId,
        kind: ShapeKind,
        zone: usize,
        color: ColorId,
        position: Vec2,
        points: u32,
        score: u32,
    },
    /// Left the inflated scene bounds; no score or life change
    ShapeDiscarded { body: BodyId },
    LevelUp(LevelChange),
    PortalHit {
        body: BodyId,
        kind: ShapeKind,
        position: Vec2,
        lives: u8,
    },
    StrongTilt { intensity: f32 },
    GameOver { final_score: u32 },
    RestartAvailable,
    Restarted,
}

/// Point-in-time summary of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub clock: f64,
    pub active_shapes: usize,
    pub gravity_magnitude: f32,
    pub gravity_angle: f32,
    pub spawn_interval: f64,
    pub portal_pulses: u64,
    pub portal_damage: u32,
    pub physics_steps: u64,
}

pub struct GameSession {
    state: SessionState,
    world: PhysicsWorld,
    portal: Portal,
    zones: Vec<CollectionZone>,
    schedule: Schedule,
    /// Live shapes and their overlap pollers
    roster: HashMap<BodyId, TimerId>,
    spawn_interval: f64,
    clock: f64,
    rng: StdRng,
    tilt_notices: Option<Receiver<TiltReading>>,
    pending: Vec<SessionEvent>,
}

impl GameSession {
    /// Session over `scene` with the portal at its center. Starts in Ready.
    pub fn new(scene: Rect, seed: u64, gravity: Arc<SharedGravity>) -> Self {
        let portal = Portal::new(scene.center());
        let boundary = PortalBoundary {
            center: portal.center,
            radius: portal.boundary_radius(),
        };
        let world = PhysicsWorld::new(scene, boundary, gravity);

        Self {
            state: SessionState::new(),
            world,
            portal,
            zones: corner_layout(&scene),
            schedule: Schedule::new(),
            roster: HashMap::new(),
            spawn_interval: timing::BASE_SPAWN_INTERVAL,
            clock: 0.0,
            rng: StdRng::seed_from_u64(seed),
            tilt_notices: None,
            pending: Vec::new(),
        }
    }

    /// Strong-tilt readings arriving here are handled at the start of each tick
    pub fn connect_tilt(&mut self, notices: Receiver<TiltReading>) {
        self.tilt_notices = Some(notices);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn portal(&self) -> &Portal {
        &self.portal
    }

    pub fn zones(&self) -> &[CollectionZone] {
        &self.zones
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn spawn_interval(&self) -> f64 {
        self.spawn_interval
    }

    pub fn active_shapes(&self) -> usize {
        self.roster.len()
    }

    pub fn is_tracked(&self, id: BodyId) -> bool {
        self.roster.contains_key(&id)
    }

    pub fn pending_timers(&self) -> usize {
        self.schedule.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            clock: self.clock,
            active_shapes: self.roster.len(),
            gravity_magnitude: self.world.gravity_magnitude(),
            gravity_angle: self.world.gravity().angle(),
            spawn_interval: self.spawn_interval,
            portal_pulses: self.portal.pulses,
            portal_damage: self.portal.damage_taken,
            physics_steps: self.world.steps(),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.world.is_halted()
    }

    /// The reference surface is gone. Halts physics and drops every timer and
    /// tracked shape; nothing spawns, polls or restarts afterwards.
    pub fn detach_surface(&mut self) {
        if self.world.is_halted() {
            return;
        }
        self.world.detach_surface();
        self.schedule.cancel_all();
        self.roster.clear();
        info!("Session halted at {:.1}s, score {}", self.clock, self.state.score);
    }

    /// Ready → Active. Ignored in any other phase.
    pub fn start(&mut self) -> bool {
        if self.world.is_halted() {
            debug!("start ignored, session halted");
            return false;
        }
        if self.state.phase != SessionPhase::Ready {
            debug!("start ignored in phase {:?}", self.state.phase);
            return false;
        }
        self.begin();
        true
    }

    /// GameOver → Active. Timers are cancelled before anything is reset so
    /// no stale poll or spawn can touch the new session.
    pub fn restart(&mut self) -> bool {
        if self.world.is_halted() {
            debug!("restart ignored, session halted");
            return false;
        }
        if !self.state.is_game_over() {
            debug!("restart ignored in phase {:?}", self.state.phase);
            return false;
        }

        self.schedule.cancel_all();
        self.roster.clear();
        self.world.clear();
        self.state.reset();
        self.portal.reset();
        self.world.set_gravity_magnitude(physics::BASE_GRAVITY_MAGNITUDE);

        info!("Session restarted");
        self.pending.push(SessionEvent::Restarted);
        self.begin();
        true
    }

    fn begin(&mut self) {
        self.state.start();
        self.world.set_gravity_magnitude(physics::BASE_GRAVITY_MAGNITUDE);
        self.restart_spawning(timing::BASE_SPAWN_INTERVAL);

        info!("Session started at level {}", self.state.level);
        self.pending.push(SessionEvent::Started {
            level: self.state.level,
            lives: self.state.lives,
            score: self.state.score,
        });
    }

    fn restart_spawning(&mut self, interval: f64) {
        self.schedule.cancel_where(|kind| *kind == TimerKind::Spawn);
        self.spawn_interval = interval;
        self.schedule
            .schedule_repeating(TimerKind::Spawn, self.clock, interval, interval);
    }

    /// Events queued since the last tick without advancing time
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Advance the session by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<SessionEvent> {
        if self.state.phase == SessionPhase::Ready || self.world.is_halted() {
            return self.take_events();
        }

        self.drain_tilt_notices();

        self.clock += dt as f64;
        for event in self.world.step(dt) {
            match event {
                WorldEvent::PortalContact { body, position, .. } => {
                    self.handle_portal_contact(body, position)
                }
                WorldEvent::BodyLost { body } => {
                    self.untrack(body);
                    self.pending.push(SessionEvent::ShapeDiscarded { body });
                }
            }
        }

        while let Some(timer) = self.schedule.pop_due(self.clock) {
            match timer.kind {
                TimerKind::Spawn => {
                    if self.state.is_game_active() {
                        self.spawn_shape();
                    }
                }
                TimerKind::OverlapPoll(body) => self.poll_overlap(body, timer.id),
                TimerKind::ShowRestartButton => {
                    if self.state.is_game_over() {
                        self.pending.push(SessionEvent::RestartAvailable);
                    }
                }
            }
        }

        self.take_events()
    }

    fn drain_tilt_notices(&mut self) {
        let Some(notices) = &self.tilt_notices else {
            return;
        };
        let readings: Vec<TiltReading> = notices.try_iter().collect();
        for reading in readings {
            if reading.strong {
                self.handle_strong_tilt(reading.intensity);
            }
        }
    }

    /// Cosmetic only
    pub fn handle_strong_tilt(&mut self, intensity: f32) {
        self.portal.pulse();
        self.pending.push(SessionEvent::StrongTilt { intensity });
    }

    /// Spawn a random shape at a random scene edge
    pub fn spawn_shape(&mut self) -> Option<BodyId> {
        let kind = ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())];
        let position = self.spawn_position();
        self.spawn_shape_at(kind, position)
    }

    /// Spawn `kind` at `position` and start its overlap poller
    pub fn spawn_shape_at(&mut self, kind: ShapeKind, position: Vec2) -> Option<BodyId> {
        if !self.state.is_game_active() || self.world.is_halted() {
            return None;
        }

        let body = self.world.add_body(kind, position, self.clock);
        let poller = self.schedule.schedule_repeating(
            TimerKind::OverlapPoll(body),
            self.clock,
            timing::COLLECTION_CHECK_DELAY,
            timing::COLLECTION_CHECK_INTERVAL,
        );
        self.roster.insert(body, poller);

        debug!(
            "Spawned {} #{} at ({:.0}, {:.0})",
            kind.name(),
            body,
            position.x,
            position.y
        );
        self.pending.push(SessionEvent::ShapeSpawned {
            body,
            kind,
            position,
        });
        Some(body)
    }

    /// One of the four scene edges, just outside the visible area
    fn spawn_position(&mut self) -> Vec2 {
        let bounds = self.world.bounds();
        let offset = ui::SPAWN_OFFSET;
        let (x_low, x_high) = (
            bounds.min_x() + ui::SPAWN_EDGE_INSET_X,
            bounds.max_x() - ui::SPAWN_EDGE_INSET_X,
        );
        let (y_low, y_high) = (
            bounds.min_y() + ui::SPAWN_EDGE_INSET_Y,
            bounds.max_y() - ui::SPAWN_EDGE_INSET_Y,
        );

        let rng = &mut self.rng;
        match rng.gen_range(0..4) {
            0 => Vec2::new(random_between(rng, x_low, x_high), bounds.min_y() - offset),
            1 => Vec2::new(bounds.max_x() + offset, random_between(rng, y_low, y_high)),
            2 => Vec2::new(random_between(rng, x_low, x_high), bounds.max_y() + offset),
            _ => Vec2::new(bounds.min_x() - offset, random_between(rng, y_low, y_high)),
        }
    }

    fn poll_overlap(&mut self, body: BodyId, timer: TimerId) {
        if !self.roster.contains_key(&body) {
            self.schedule.cancel(timer);
            return;
        }

        if let Some(zone) = self.world.matching_zone(body, &self.zones) {
            self.collect(body, zone);
        } else if self.world.is_out_of_bounds(body) {
            debug!("Shape #{} left the scene", body);
            self.remove_shape(body);
            self.pending.push(SessionEvent::ShapeDiscarded { body });
        }
    }

    fn collect(&mut self, body: BodyId, zone: usize) {
        let Some((kind, position)) = self.world.body(body).map(|b| (b.kind, b.position)) else {
            return;
        };
        let color = self.zones[zone].color;

        let points = self.state.add_score();
        self.remove_shape(body);
        debug!("Collected {} #{} for {} points", kind.name(), body, points);
        self.pending.push(SessionEvent::ShapeCollected {
            body,
            kind,
            zone,
            color,
            position,
            points,
            score: self.state.score,
        });

        if self.state.should_level_up() {
            self.level_up();
        }
    }

    fn level_up(&mut self) {
        let change = self.state.level_up();
        self.world.set_gravity_magnitude(change.gravity_magnitude as f32);
        self.restart_spawning(change.spawn_interval);

        info!(
            "Level {} (gravity {:.1}, spawn every {:.1}s)",
            change.level, change.gravity_magnitude, change.spawn_interval
        );
        self.pending.push(SessionEvent::LevelUp(change));
    }

    fn handle_portal_contact(&mut self, body: BodyId, position: Vec2) {
        if !self.state.is_game_active() || !self.roster.contains_key(&body) {
            return;
        }
        let Some(kind) = self.world.body(body).map(|b| b.kind) else {
            return;
        };

        self.portal.take_damage();
        self.portal.pulse();
        let game_over = self.state.lose_life();
        self.remove_shape(body);

        info!("{} #{} hit the portal, {} lives left", kind.name(), body, self.state.lives);
        self.pending.push(SessionEvent::PortalHit {
            body,
            kind,
            position,
            lives: self.state.lives,
        });

        if game_over {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.schedule.cancel_all();
        self.roster.clear();
        self.world.clear();
        self.schedule.schedule_once(
            TimerKind::ShowRestartButton,
            self.clock,
            timing::RESTART_BUTTON_DELAY,
        );

        info!("Game over, final score {}", self.state.score);
        self.pending.push(SessionEvent::GameOver {
            final_score: self.state.score,
        });
    }

    /// Remove a shape and cancel its poller. Untracked ids are ignored.
    pub fn remove_shape(&mut self, body: BodyId) -> bool {
        let tracked = self.untrack(body);
        self.world.remove_body(body).is_some() || tracked
    }

    fn untrack(&mut self, body: BodyId) -> bool {
        match self.roster.remove(&body) {
            Some(poller) => {
                self.schedule.cancel(poller);
                true
            }
            None => false,
        }
    }
}

/// Uniform in `[low, high]`, or `low` when the range is empty
fn random_between(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::balance;

    const DT: f32 = physics::DT;

    fn session() -> GameSession {
        let scene = Rect::new(0.0, 0.0, ui::DEFAULT_SCENE_WIDTH, ui::DEFAULT_SCENE_HEIGHT);
        GameSession::new(scene, 7, Arc::new(SharedGravity::default()))
    }

    fn started() -> GameSession {
        let mut session = session();
        assert!(session.start());
        session.take_events();
        session
    }

    /// Hold a body still at `position` while ticking `ticks` times
    fn pin_and_tick(session: &mut GameSession, body: BodyId, position: Vec2, ticks: usize) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            if let Some(b) = session.world_mut().body_mut(body) {
                b.position = position;
                b.velocity = Vec2::ZERO;
            }
            events.extend(session.tick(DT));
        }
        events
    }

    #[test]
    fn test_ready_until_started() {
        let mut session = session();
        assert_eq!(session.state().phase, SessionPhase::Ready);
        assert!(session.tick(DT).is_empty());
        assert_eq!(session.clock(), 0.0);
        assert!(session.spawn_shape().is_none());
    }

    #[test]
    fn test_start_emits_started() {
        let mut session = session();
        assert!(session.start());
        assert!(!session.start());
        let events = session.take_events();
        assert_eq!(
            events,
            vec![SessionEvent::Started {
                level: 1,
                lives: balance::INITIAL_LIVES,
                score: 0
            }]
        );
        assert_eq!(session.spawn_interval(), timing::BASE_SPAWN_INTERVAL);
        assert_eq!(session.world().gravity_magnitude(), physics::BASE_GRAVITY_MAGNITUDE);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut session = started();
        let mut spawned = 0;
        // 6.05 seconds
        for _ in 0..363 {
            spawned += session
                .tick(DT)
                .iter()
                .filter(|e| matches!(e, SessionEvent::ShapeSpawned { .. }))
                .count();
        }
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_spawn_positions_outside_scene() {
        let mut session = started();
        let bounds = session.world().bounds();
        for _ in 0..100 {
            let id = session.spawn_shape().unwrap();
            let p = session.world().body(id).unwrap().position;
            assert!(!bounds.inset(1.0, 1.0).contains(p), "spawned inside at {:?}", p);
            assert!(bounds.inset(-31.0, -31.0).contains(p));
        }
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let run = || {
            let mut session = started();
            (0..20)
                .map(|_| {
                    let id = session.spawn_shape().unwrap();
                    let body = session.world().body(id).unwrap();
                    (body.kind, body.position)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_matching_collection_scores() {
        let mut session = started();
        let zone = session.zones()[1].clone();
        assert_eq!(zone.accepts, ShapeKind::Star);

        let body = session.spawn_shape_at(ShapeKind::Star, zone.rect.center()).unwrap();
        let events = pin_and_tick(&mut session, body, zone.rect.center(), 31);

        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::ShapeCollected { points: 10, score: 10, zone: 1, .. }
        )));
        assert_eq!(session.state().score, 10);
        assert!(!session.is_tracked(body));
        assert!(!session.world().contains(body));
    }

    #[test]
    fn test_no_collection_before_first_poll() {
        let mut session = started();
        let center = session.zones()[1].rect.center();
        let body = session.spawn_shape_at(ShapeKind::Star, center).unwrap();
        pin_and_tick(&mut session, body, center, 25);
        assert!(session.is_tracked(body));
        assert_eq!(session.state().score, 0);
    }

    #[test]
    fn test_mismatched_zone_passes_through() {
        let mut session = started();
        let center = session.zones()[1].rect.center();
        let body = session.spawn_shape_at(ShapeKind::Hexagon, center).unwrap();
        pin_and_tick(&mut session, body, center, 60);
        assert!(session.is_tracked(body));
        assert_eq!(session.state().score, 0);
    }

    #[test]
    fn test_out_of_bounds_removed_silently() {
        let mut session = started();
        let far = Vec2::new(-500.0, 400.0);
        let body = session.spawn_shape_at(ShapeKind::Cross, far).unwrap();
        let events = pin_and_tick(&mut session, body, far, 31);
        assert!(events.contains(&SessionEvent::ShapeDiscarded { body }));
        assert_eq!(session.state().score, 0);
        assert_eq!(session.state().lives, balance::INITIAL_LIVES);
        assert!(!session.world().contains(body));
    }

    #[test]
    fn test_portal_hit_costs_one_life() {
        let mut session = started();
        let center = session.portal().center;
        let body = session
            .spawn_shape_at(ShapeKind::Circle, center - Vec2::new(0.0, 85.0))
            .unwrap();
        session.world_mut().body_mut(body).unwrap().velocity = Vec2::new(0.0, 200.0);

        let mut hits = 0;
        for _ in 0..60 {
            hits += session
                .tick(DT)
                .iter()
                .filter(|e| matches!(e, SessionEvent::PortalHit { .. }))
                .count();
        }
        assert_eq!(hits, 1);
        assert_eq!(session.state().lives, 2);
        assert_eq!(session.portal().damage_taken, 1);
        assert!(!session.is_tracked(body));
    }

    #[test]
    fn test_strong_tilt_pulses_only() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut session = started();
        session.connect_tilt(rx);

        let strong = TiltReading {
            angle: 0.0,
            intensity: 0.9,
            strong: true,
        };
        let weak = TiltReading {
            intensity: 0.1,
            strong: false,
            ..strong
        };
        tx.send(strong).unwrap();
        tx.send(weak).unwrap();
        tx.send(strong).unwrap();

        let events = session.tick(DT);
        let pulses = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::StrongTilt { .. }))
            .count();
        assert_eq!(pulses, 2);
        assert_eq!(session.portal().pulses, 2);
        assert_eq!(session.state().lives, balance::INITIAL_LIVES);
        assert_eq!(session.state().score, 0);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut session = started();
        assert!(!session.restart());
        assert!(session.state().is_game_active());
    }

    #[test]
    fn test_level_up_keeps_one_spawn_timer() {
        let mut session = started();
        session.level_up();
        session.level_up();
        assert_eq!(session.schedule.count_kind(TimerKind::Spawn), 1);
        assert!((session.spawn_interval() - 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_detached_surface_stops_spawns_and_polls() {
        let mut session = started();
        let center = session.zones()[1].rect.center();
        let body = session.spawn_shape_at(ShapeKind::Star, center).unwrap();

        session.detach_surface();
        assert!(session.is_halted());
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(session.active_shapes(), 0);

        let events = pin_and_tick(&mut session, body, center, 360);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::ShapeSpawned { .. } | SessionEvent::ShapeCollected { .. })));
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(session.state().score, 0);
        assert!(session.spawn_shape().is_none());
        assert!(!session.restart());
    }

    #[test]
    fn test_remove_untracked_is_noop() {
        let mut session = started();
        assert!(!session.remove_shape(4242));
        assert_eq!(session.active_shapes(), 0);
    }
}
