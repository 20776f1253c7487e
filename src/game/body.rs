//! Dynamic bodies owned by the physics world

use serde::{Deserialize, Serialize};

use crate::game::constants::{physics, ui};
use crate::game::shape::{outline, Outline, ShapeKind};
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Body identifier, unique for the lifetime of a world
pub type BodyId = u64;

/// Boundary response parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub elasticity: f32,
    pub friction: f32,
    pub density: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            elasticity: physics::ELASTICITY,
            friction: physics::FRICTION,
            density: physics::DENSITY,
        }
    }
}

/// A spawned shape in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    // Integrated every step
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,

    pub id: BodyId,
    pub kind: ShapeKind,
    /// Bounding footprint (unrotated)
    pub size: Vec2,
    pub material: Material,
    /// Session clock at spawn (seconds)
    pub spawned_at: f64,
    /// Whether the outline touched the portal boundary on the last step
    #[serde(default)]
    pub touching_portal: bool,
    /// Set once the frame has been fully inside the scene; from then on the
    /// scene edges always contain the body
    #[serde(default)]
    pub entered_scene: bool,
}

impl Body {
    pub fn new(id: BodyId, kind: ShapeKind, position: Vec2, spawned_at: f64) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            id,
            kind,
            size: Vec2::new(ui::SHAPE_SIZE, ui::SHAPE_SIZE),
            material: Material::default(),
            spawned_at,
            touching_portal: false,
            entered_scene: false,
        }
    }

    /// Axis-aligned frame used for zone overlap and bounds checks
    pub fn frame(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    /// Mass relative to a standard shape (density 1.0 at SHAPE_SIZE² area = 1.0)
    pub fn mass(&self) -> f32 {
        let reference_area = ui::SHAPE_SIZE * ui::SHAPE_SIZE;
        self.material.density * (self.size.x * self.size.y) / reference_area
    }

    /// Radius of the circle enclosing the unrotated footprint
    pub fn bounding_radius(&self) -> f32 {
        self.size.length() * 0.5
    }

    /// Outline in local (frame) coordinates, unrotated
    pub fn local_outline(&self) -> Outline {
        outline(self.kind, self.frame())
    }

    /// Collision points in world space including rotation
    pub fn world_points(&self) -> Vec<Vec2> {
        let pivot = self.position;
        let rotation = self.rotation;
        self.local_outline()
            .collision_points()
            .into_iter()
            .map(|p| p.rotate_about(pivot, rotation))
            .collect()
    }

    /// Radius of the actual outline around the body center
    #[cfg(test)]
    pub fn outline_reach(&self) -> f32 {
        self.local_outline().reach_from(self.position)
    }
}
