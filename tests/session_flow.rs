use std::sync::Arc;

use gravity_well::game::body::BodyId;
use gravity_well::game::constants::physics::DT;
use gravity_well::game::constants::ui;
use gravity_well::game::session::{GameSession, SessionEvent};
use gravity_well::game::sensor::SharedGravity;
use gravity_well::game::shape::ShapeKind;
use gravity_well::game::state::SessionPhase;
use gravity_well::util::rect::Rect;
use gravity_well::util::vec2::Vec2;

fn started_session() -> GameSession {
    let scene = Rect::new(0.0, 0.0, ui::DEFAULT_SCENE_WIDTH, ui::DEFAULT_SCENE_HEIGHT);
    let mut session = GameSession::new(scene, 42, Arc::new(SharedGravity::default()));
    assert!(session.start());
    session.take_events();
    session
}

fn count(events: &[SessionEvent], pred: impl Fn(&SessionEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

/// Hold bodies still at `position` while ticking
fn pin_and_tick(session: &mut GameSession, bodies: &[BodyId], position: Vec2, ticks: usize) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        for &id in bodies {
            if let Some(body) = session.world_mut().body_mut(id) {
                body.position = position;
                body.velocity = Vec2::ZERO;
            }
        }
        events.extend(session.tick(DT));
    }
    events
}

/// Drop a circle onto the portal and tick until it hits
fn drop_into_portal(session: &mut GameSession) -> Vec<SessionEvent> {
    let above = session.portal().center - Vec2::new(0.0, 85.0);
    let id = session
        .spawn_shape_at(ShapeKind::Circle, above)
        .expect("session active");
    session.world_mut().body_mut(id).unwrap().velocity = Vec2::new(0.0, 200.0);

    let mut events = Vec::new();
    for _ in 0..60 {
        let tick = session.tick(DT);
        let hit = tick
            .iter()
            .any(|e| matches!(e, SessionEvent::PortalHit { body, .. } if *body == id));
        events.extend(tick);
        if hit {
            return events;
        }
    }
    panic!("circle never reached the portal");
}

#[test]
fn ten_collections_reach_level_two() {
    let mut session = started_session();
    let zone = session.zones()[1].clone();
    assert_eq!(zone.accepts, ShapeKind::Star);

    let stars: Vec<BodyId> = (0..10)
        .map(|_| session.spawn_shape_at(ShapeKind::Star, zone.rect.center()).unwrap())
        .collect();
    let events = pin_and_tick(&mut session, &stars, zone.rect.center(), 31);

    assert_eq!(count(&events, |e| matches!(e, SessionEvent::ShapeCollected { .. })), 10);
    let level_ups: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::LevelUp(change) => Some(*change),
            _ => None,
        })
        .collect();
    assert_eq!(level_ups.len(), 1);
    assert_eq!(level_ups[0].level, 2);
    assert!((level_ups[0].gravity_magnitude - 0.6).abs() < 1e-9);
    assert!((level_ups[0].spawn_interval - 2.8).abs() < 1e-9);

    let state = session.state();
    assert_eq!(state.score, 100);
    assert_eq!(state.level, 2);
    assert!((session.world().gravity_magnitude() - 0.6).abs() < 1e-6);
    assert!((session.spawn_interval() - 2.8).abs() < 1e-9);
    assert_eq!(session.active_shapes(), 0);
}

#[test]
fn level_up_restarts_spawn_cadence() {
    let mut session = started_session();
    let center = session.zones()[1].rect.center();
    let stars: Vec<BodyId> = (0..10)
        .map(|_| session.spawn_shape_at(ShapeKind::Star, center).unwrap())
        .collect();
    pin_and_tick(&mut session, &stars, center, 31);
    assert_eq!(session.state().level, 2);

    // The level-1 spawn at 3.0s was replaced by one 2.8s after the level-up
    let mut spawned = 0;
    while session.clock() < 3.2 {
        spawned += count(&session.tick(DT), |e| matches!(e, SessionEvent::ShapeSpawned { .. }));
    }
    assert_eq!(spawned, 0);
    while session.clock() < 3.4 {
        spawned += count(&session.tick(DT), |e| matches!(e, SessionEvent::ShapeSpawned { .. }));
    }
    assert_eq!(spawned, 1);
}

#[test]
fn collection_points_scale_with_level() {
    let mut session = started_session();
    let center = session.zones()[1].rect.center();
    let stars: Vec<BodyId> = (0..11)
        .map(|_| session.spawn_shape_at(ShapeKind::Star, center).unwrap())
        .collect();
    let events = pin_and_tick(&mut session, &stars, center, 31);

    let points: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::ShapeCollected { points, .. } => Some(*points),
            _ => None,
        })
        .collect();
    assert_eq!(points.len(), 11);
    assert!(points[..10].iter().all(|&p| p == 10));
    assert_eq!(points[10], 20);
    assert_eq!(session.state().score, 120);
}

#[test]
fn three_portal_hits_end_the_game() {
    let mut session = started_session();

    let mut lives = Vec::new();
    for _ in 0..3 {
        let events = drop_into_portal(&mut session);
        for event in &events {
            if let SessionEvent::PortalHit { lives: left, .. } = event {
                lives.push(*left);
            }
        }
        let state = session.state();
        assert_eq!(state.lives == 0, state.is_game_over());
        if state.is_game_over() {
            assert!(!state.is_game_active());
            assert!(events.contains(&SessionEvent::GameOver { final_score: 0 }));
        }
    }
    assert_eq!(lives, vec![2, 1, 0]);
    assert_eq!(session.state().phase, SessionPhase::GameOver);
    assert_eq!(session.portal().damage_taken, 3);

    // Everything cleared; only the restart-button timer remains
    assert_eq!(session.active_shapes(), 0);
    assert_eq!(session.world().body_count(), 0);
    assert_eq!(session.pending_timers(), 1);
    assert!(session.spawn_shape().is_none());
}

#[test]
fn restart_button_appears_after_delay() {
    let mut session = started_session();
    for _ in 0..3 {
        drop_into_portal(&mut session);
    }
    let game_over_at = session.clock();

    let mut events = Vec::new();
    while session.clock() < game_over_at + 1.9 {
        events.extend(session.tick(DT));
    }
    assert!(!events.contains(&SessionEvent::RestartAvailable));

    while session.clock() < game_over_at + 2.1 {
        events.extend(session.tick(DT));
    }
    assert_eq!(count(&events, |e| *e == SessionEvent::RestartAvailable), 1);
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::ShapeSpawned { .. })), 0);
}

#[test]
fn restart_resets_and_cancels_stale_pollers() {
    let mut session = started_session();
    let center = session.zones()[1].rect.center();
    // Would be collected at 0.5s if its poller survived
    let star = session.spawn_shape_at(ShapeKind::Star, center).unwrap();
    for _ in 0..3 {
        drop_into_portal(&mut session);
    }
    assert!(session.state().is_game_over());
    assert!(session.clock() < 0.5);

    assert!(session.restart());
    let events = session.take_events();
    assert_eq!(events[0], SessionEvent::Restarted);
    assert!(matches!(events[1], SessionEvent::Started { level: 1, lives: 3, score: 0 }));

    let state = session.state();
    assert_eq!(state.score, 0);
    assert_eq!(state.lives, 3);
    assert_eq!(state.level, 1);
    assert!(state.is_game_active());
    assert_eq!(session.world().gravity_magnitude(), 0.5);
    assert_eq!(session.spawn_interval(), 3.0);
    assert_eq!(session.portal().damage_taken, 0);
    assert!(!session.world().contains(star));

    let events = pin_and_tick(&mut session, &[star], center, 60);
    assert_eq!(count(&events, |e| matches!(e, SessionEvent::ShapeCollected { .. })), 0);
    assert_eq!(session.state().score, 0);
}

#[test]
fn restart_ignored_while_active() {
    let mut session = started_session();
    assert!(!session.restart());
    assert!(session.take_events().is_empty());
    assert!(session.state().is_game_active());
}

#[test]
fn lives_never_increase_during_play() {
    let mut session = started_session();
    let mut last = session.state().lives;
    for _ in 0..(60 * 30) {
        session.tick(DT);
        let lives = session.state().lives;
        assert!(lives <= last);
        last = lives;
        if session.state().is_game_over() {
            assert_eq!(lives, 0);
            break;
        }
    }
}
