//! Force fields applied to every body each physics step
//!
//! The world keeps a list of boxed fields and sums their accelerations, so
//! adding a new kind of pull is a matter of implementing [`ForceField`].

use std::sync::Arc;

use crate::game::constants::physics::{
    FIELD_UNIT, GRAVITY_UNIT, PORTAL_FIELD_FALLOFF, PORTAL_FIELD_RADIUS, PORTAL_FIELD_STRENGTH,
    PORTAL_MINIMUM_RADIUS,
};
use crate::game::sensor::SharedGravity;
use crate::util::vec2::Vec2;

pub trait ForceField: Send + Sync {
    /// Acceleration (px/s²) imparted on a body of `mass` at `position`
    fn acceleration(&self, position: Vec2, mass: f32) -> Vec2;

    fn name(&self) -> &'static str;
}

/// Uniform gravity whose direction follows device tilt
pub struct DirectionalGravity {
    gravity: Arc<SharedGravity>,
}

impl DirectionalGravity {
    pub fn new(gravity: Arc<SharedGravity>) -> Self {
        Self { gravity }
    }

    /// Current gravity vector in px/s²
    pub fn vector(&self) -> Vec2 {
        Vec2::from_angle(self.gravity.angle()) * (self.gravity.magnitude() * GRAVITY_UNIT)
    }
}

impl ForceField for DirectionalGravity {
    fn acceleration(&self, _position: Vec2, _mass: f32) -> Vec2 {
        // Mass-independent, like real gravity
        self.vector()
    }

    fn name(&self) -> &'static str {
        "directional_gravity"
    }
}

/// Radial field centered on the portal.
///
/// Force = strength * FIELD_UNIT / d^falloff along the outward direction, so a
/// negative strength pulls inward. Nothing is applied closer than
/// `minimum_radius` or farther than `radius`.
#[derive(Debug, Clone)]
pub struct RadialAttractor {
    pub center: Vec2,
    pub strength: f32,
    pub falloff: f32,
    pub minimum_radius: f32,
    pub radius: f32,
}

impl RadialAttractor {
    /// Portal attractor with the configured constants
    pub fn portal(center: Vec2) -> Self {
        Self {
            center,
            strength: PORTAL_FIELD_STRENGTH,
            falloff: PORTAL_FIELD_FALLOFF,
            minimum_radius: PORTAL_MINIMUM_RADIUS,
            radius: PORTAL_FIELD_RADIUS,
        }
    }

    /// Signed force magnitude at `distance` (negative is inward)
    pub fn force_at(&self, distance: f32) -> f32 {
        if distance < self.minimum_radius || distance > self.radius || distance <= 0.0 {
            return 0.0;
        }
        self.strength * FIELD_UNIT / distance.powf(self.falloff)
    }
}

impl ForceField for RadialAttractor {
    fn acceleration(&self, position: Vec2, mass: f32) -> Vec2 {
        let (outward, distance) = (position - self.center).normalize_with_length();
        let force = self.force_at(distance);
        if force == 0.0 || mass <= 0.0 {
            return Vec2::ZERO;
        }
        outward * (force / mass)
    }

    fn name(&self) -> &'static str {
        "radial_attractor"
    }
}

/// Sum of all fields at a point
pub fn total_acceleration(fields: &[Box<dyn ForceField>], position: Vec2, mass: f32) -> Vec2 {
    let mut total = Vec2::ZERO;
    for field in fields {
        total += field.acceleration(position, mass);
    }
    total
}
