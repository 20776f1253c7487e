//! Central portal: the thing the player is defending

use serde::{Deserialize, Serialize};

use crate::game::constants::ui::{PORTAL_BARRIER_INSET, PORTAL_SIZE};
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portal {
    pub center: Vec2,
    /// Visual radius
    pub radius: f32,
    /// Cosmetic counters for the presentation layer
    pub pulses: u64,
    pub damage_taken: u32,
}

impl Portal {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            radius: PORTAL_SIZE / 2.0,
            pulses: 0,
            damage_taken: 0,
        }
    }

    /// Visual frame
    pub fn frame(&self) -> Rect {
        Rect::from_center(self.center, Vec2::new(self.radius * 2.0, self.radius * 2.0))
    }

    /// Radius of the collision barrier (frame inset by PORTAL_BARRIER_INSET)
    pub fn boundary_radius(&self) -> f32 {
        self.radius - PORTAL_BARRIER_INSET
    }

    #[cfg(test)]
    pub fn boundary_contains(&self, point: Vec2) -> bool {
        point.distance_sq_to(self.center) <= self.boundary_radius() * self.boundary_radius()
    }

    pub fn pulse(&mut self) {
        self.pulses += 1;
    }

    pub fn take_damage(&mut self) {
        self.damage_taken += 1;
    }

    pub fn reset(&mut self) {
        self.pulses = 0;
        self.damage_taken = 0;
    }
}
