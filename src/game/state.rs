//! Session state and difficulty curve
//!
//! Score, lives, level and phase for one play session, plus the pure
//! per-level formulas that drive spawn cadence, gravity and scoring.

use serde::{Deserialize, Serialize};

use crate::game::constants::{balance, physics, timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Constructed, not yet started
    Ready,
    Active,
    GameOver,
}

/// Seconds between spawns at `level`
pub fn spawn_interval(level: u32) -> f64 {
    (timing::BASE_SPAWN_INTERVAL - timing::SPAWN_SPEED_INCREASE * level as f64)
        .max(timing::MIN_SPAWN_INTERVAL)
}

/// Gravity magnitude at `level`
pub fn gravity_magnitude(level: u32) -> f64 {
    (physics::BASE_GRAVITY_MAGNITUDE as f64 + balance::GRAVITY_PER_LEVEL * level as f64)
        .min(physics::MAX_GRAVITY_MAGNITUDE as f64)
}

pub fn points_per_collection(level: u32) -> u32 {
    balance::BASE_POINTS_PER_SHAPE.saturating_mul(level)
}

/// Score at which `level` is completed
pub fn level_up_threshold(level: u32) -> u32 {
    balance::POINTS_PER_LEVEL.saturating_mul(level)
}

/// Difficulty applied on a level-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelChange {
    /// Level entered
    pub level: u32,
    pub gravity_magnitude: f64,
    pub spawn_interval: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub lives: u8,
    pub level: u32,
    pub phase: SessionPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            lives: balance::INITIAL_LIVES,
            level: 1,
            phase: SessionPhase::Ready,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_game_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    /// Fresh counters, phase Active
    pub fn start(&mut self) {
        *self = Self {
            phase: SessionPhase::Active,
            ..Self::default()
        };
    }

    /// Fresh counters, phase Ready
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Award the current level's collection points; returns the amount
    pub fn add_score(&mut self) -> u32 {
        let points = points_per_collection(self.level);
        self.score = self.score.saturating_add(points);
        points
    }

    pub fn should_level_up(&self) -> bool {
        self.score >= level_up_threshold(self.level)
    }

    /// Advance one level. Difficulty comes from the level just completed.
    pub fn level_up(&mut self) -> LevelChange {
        let completed = self.level;
        self.level = self.level.saturating_add(1);
        LevelChange {
            level: self.level,
            gravity_magnitude: gravity_magnitude(completed),
            spawn_interval: spawn_interval(completed),
        }
    }

    /// Lose one life; the session ends at zero. Returns true on game over.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = SessionPhase::GameOver;
        }
        self.is_game_over()
    }
}
