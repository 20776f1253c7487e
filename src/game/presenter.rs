//! Presentation interface
//!
//! Rendering, VFX and the HUD live outside this crate. They implement
//! [`Presenter`] and receive [`SessionEvent`]s through [`dispatch`].

use tracing::info;

use crate::game::body::BodyId;
use crate::game::constants::messages;
use crate::game::session::SessionEvent;
use crate::game::shape::{ColorId, ShapeKind};
use crate::util::vec2::Vec2;

pub trait Presenter {
    fn particle_burst(&mut self, position: Vec2, color: ColorId);
    fn explosion(&mut self, position: Vec2);
    fn screen_shake(&mut self);
    fn portal_pulse(&mut self);
    fn portal_damage(&mut self);
    fn zone_flash(&mut self, zone: usize);
    fn update_score(&mut self, score: u32);
    fn update_lives(&mut self, lives: u8);
    fn update_level(&mut self, level: u32);
    fn show_message(&mut self, text: &str, duration: f32, color: ColorId);
    fn show_restart_button(&mut self);
    fn hide_restart_button(&mut self);

    fn shape_added(&mut self, _body: BodyId, _kind: ShapeKind, _position: Vec2) {}
    fn shape_removed(&mut self, _body: BodyId) {}
}

pub fn ready_message(level: u32) -> String {
    format!("LEVEL {}\nREADY?", level)
}

pub fn points_message(points: u32) -> String {
    format!("+{} POINTS!", points)
}

pub fn game_over_message(final_score: u32) -> String {
    format!("GAME OVER\nFINAL SCORE: {:08}", final_score)
}

pub const LEVEL_UP_MESSAGE: &str = "LEVEL UP!\nSPEED INCREASE!";
pub const PORTAL_DAMAGED_MESSAGE: &str = "PORTAL DAMAGED!";

/// Translate one session event into presenter calls
pub fn dispatch(event: &SessionEvent, presenter: &mut dyn Presenter) {
    match *event {
        SessionEvent::Started { level, lives, score } => {
            presenter.update_score(score);
            presenter.update_lives(lives);
            presenter.update_level(level);
            presenter.show_message(
                &ready_message(level),
                messages::READY_DURATION,
                ColorId::Cyan,
            );
        }
        SessionEvent::ShapeSpawned {
            body,
            kind,
            position,
        } => presenter.shape_added(body, kind, position),
        SessionEvent::ShapeCollected {
            body,
            zone,
            color,
            position,
            points,
            score,
            ..
        } => {
            presenter.zone_flash(zone);
            presenter.particle_burst(position, color);
            presenter.update_score(score);
            presenter.shape_removed(body);
            presenter.show_message(
                &points_message(points),
                messages::POINTS_DURATION,
                ColorId::Green,
            );
        }
        SessionEvent::ShapeDiscarded { body } => presenter.shape_removed(body),
        SessionEvent::LevelUp(change) => {
            presenter.update_level(change.level);
            presenter.show_message(
                LEVEL_UP_MESSAGE,
                messages::LEVEL_UP_DURATION,
                ColorId::Yellow,
            );
        }
        SessionEvent::PortalHit {
            body,
            position,
            lives,
            ..
        } => {
            presenter.portal_damage();
            presenter.portal_pulse();
            presenter.update_lives(lives);
            presenter.screen_shake();
            presenter.explosion(position);
            presenter.shape_removed(body);
            if lives > 0 {
                presenter.show_message(
                    PORTAL_DAMAGED_MESSAGE,
                    messages::PORTAL_DAMAGED_DURATION,
                    ColorId::Red,
                );
            }
        }
        SessionEvent::StrongTilt { .. } => presenter.portal_pulse(),
        SessionEvent::GameOver { final_score } => presenter.show_message(
            &game_over_message(final_score),
            messages::GAME_OVER_DURATION,
            ColorId::Red,
        ),
        SessionEvent::RestartAvailable => presenter.show_restart_button(),
        SessionEvent::Restarted => presenter.hide_restart_button(),
    }
}

/// Logs HUD-level activity; effects are counted rather than logged
#[derive(Debug, Default)]
pub struct TracingPresenter {
    pub effects: u64,
    pub restart_visible: bool,
}

impl Presenter for TracingPresenter {
    fn particle_burst(&mut self, _position: Vec2, _color: ColorId) {
        self.effects += 1;
    }

    fn explosion(&mut self, _position: Vec2) {
        self.effects += 1;
    }

    fn screen_shake(&mut self) {
        self.effects += 1;
    }

    fn portal_pulse(&mut self) {
        self.effects += 1;
    }

    fn portal_damage(&mut self) {
        self.effects += 1;
    }

    fn zone_flash(&mut self, _zone: usize) {
        self.effects += 1;
    }

    fn update_score(&mut self, score: u32) {
        info!("Score: {:08}", score);
    }

    fn update_lives(&mut self, lives: u8) {
        info!("Lives: {}", lives);
    }

    fn update_level(&mut self, level: u32) {
        info!("Level: {}", level);
    }

    fn show_message(&mut self, text: &str, duration: f32, color: ColorId) {
        info!("[{:?} {:.1}s] {}", color, duration, text.replace('\n', " / "));
    }

    fn show_restart_button(&mut self) {
        self.restart_visible = true;
        info!("Restart available");
    }

    fn hide_restart_button(&mut self) {
        self.restart_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::LevelChange;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Burst(ColorId),
        Explosion,
        Shake,
        Pulse,
        Damage,
        Flash(usize),
        Score(u32),
        Lives(u8),
        Level(u32),
        Message(String, ColorId),
        ShowRestart,
        HideRestart,
        Removed(BodyId),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Presenter for Recorder {
        fn particle_burst(&mut self, _position: Vec2, color: ColorId) {
            self.calls.push(Call::Burst(color));
        }
        fn explosion(&mut self, _position: Vec2) {
            self.calls.push(Call::Explosion);
        }
        fn screen_shake(&mut self) {
            self.calls.push(Call::Shake);
        }
        fn portal_pulse(&mut self) {
            self.calls.push(Call::Pulse);
        }
        fn portal_damage(&mut self) {
            self.calls.push(Call::Damage);
        }
        fn zone_flash(&mut self, zone: usize) {
            self.calls.push(Call::Flash(zone));
        }
        fn update_score(&mut self, score: u32) {
            self.calls.push(Call::Score(score));
        }
        fn update_lives(&mut self, lives: u8) {
            self.calls.push(Call::Lives(lives));
        }
        fn update_level(&mut self, level: u32) {
            self.calls.push(Call::Level(level));
        }
        fn show_message(&mut self, text: &str, _duration: f32, color: ColorId) {
            self.calls.push(Call::Message(text.to_string(), color));
        }
        fn show_restart_button(&mut self) {
            self.calls.push(Call::ShowRestart);
        }
        fn hide_restart_button(&mut self) {
            self.calls.push(Call::HideRestart);
        }
        fn shape_removed(&mut self, body: BodyId) {
            self.calls.push(Call::Removed(body));
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(ready_message(1), "LEVEL 1\nREADY?");
        assert_eq!(points_message(20), "+20 POINTS!");
        assert_eq!(game_over_message(340), "GAME OVER\nFINAL SCORE: 00000340");
    }

    #[test]
    fn test_collect_dispatch() {
        let mut recorder = Recorder::default();
        let event = SessionEvent::ShapeCollected {
            body: 3,
            kind: ShapeKind::Star,
            zone: 1,
            color: ColorId::Magenta,
            position: Vec2::new(330.0, 784.0),
            points: 10,
            score: 40,
        };
        dispatch(&event, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec![
                Call::Flash(1),
                Call::Burst(ColorId::Magenta),
                Call::Score(40),
                Call::Removed(3),
                Call::Message("+10 POINTS!".to_string(), ColorId::Green),
            ]
        );
    }

    #[test]
    fn test_portal_hit_dispatch() {
        let mut recorder = Recorder::default();
        let hit = |lives| SessionEvent::PortalHit {
            body: 9,
            kind: ShapeKind::Cross,
            position: Vec2::ZERO,
            lives,
        };

        dispatch(&hit(2), &mut recorder);
        assert!(recorder.calls.contains(&Call::Damage));
        assert!(recorder.calls.contains(&Call::Shake));
        assert!(recorder.calls.contains(&Call::Explosion));
        assert!(recorder.calls.contains(&Call::Lives(2)));
        assert!(recorder
            .calls
            .contains(&Call::Message(PORTAL_DAMAGED_MESSAGE.to_string(), ColorId::Red)));

        recorder.calls.clear();
        dispatch(&hit(0), &mut recorder);
        assert!(!recorder
            .calls
            .iter()
            .any(|c| matches!(c, Call::Message(..))));
    }

    #[test]
    fn test_level_up_and_lifecycle_dispatch() {
        let mut recorder = Recorder::default();
        dispatch(
            &SessionEvent::LevelUp(LevelChange {
                level: 2,
                gravity_magnitude: 0.6,
                spawn_interval: 2.8,
            }),
            &mut recorder,
        );
        dispatch(&SessionEvent::StrongTilt { intensity: 0.8 }, &mut recorder);
        dispatch(&SessionEvent::RestartAvailable, &mut recorder);
        dispatch(&SessionEvent::Restarted, &mut recorder);
        assert_eq!(
            recorder.calls,
            vec![
                Call::Level(2),
                Call::Message(LEVEL_UP_MESSAGE.to_string(), ColorId::Yellow),
                Call::Pulse,
                Call::ShowRestart,
                Call::HideRestart,
            ]
        );
    }

    #[test]
    fn test_tracing_presenter_tracks_restart_button() {
        let mut presenter = TracingPresenter::default();
        dispatch(&SessionEvent::RestartAvailable, &mut presenter);
        assert!(presenter.restart_visible);
        dispatch(&SessionEvent::Restarted, &mut presenter);
        assert!(!presenter.restart_visible);
        dispatch(&SessionEvent::StrongTilt { intensity: 1.0 }, &mut presenter);
        assert_eq!(presenter.effects, 1);
    }
}
