//! Physics world
//!
//! Owns every live body, the force fields acting on them, and the two static
//! boundaries: the scene rectangle (bounce only) and the portal circle
//! (bounce + contact events). Integration is semi-implicit Euler with a fixed
//! step supplied by the caller.

use std::sync::Arc;

use hashbrown::HashMap;
#[cfg(feature = "parallel_forces")]
use rayon::prelude::*;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::game::body::{Body, BodyId};
use crate::game::constants::{physics, ui};
use crate::game::forces::{total_acceleration, DirectionalGravity, ForceField, RadialAttractor};
use crate::game::sensor::SharedGravity;
use crate::game::shape::ShapeKind;
use crate::game::zone::CollectionZone;
use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Distance within which an outline counts as touching the portal boundary
const CONTACT_SLOP: f32 = 0.5;

/// Events produced by a physics step
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// A body's outline reached the portal boundary (onset only)
    PortalContact {
        body: BodyId,
        kind: ShapeKind,
        position: Vec2,
    },
    /// A body's state became non-finite and was dropped
    BodyLost { body: BodyId },
}

pub type StepEvents = SmallVec<[WorldEvent; 4]>;

/// Circular barrier around the portal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalBoundary {
    pub center: Vec2,
    pub radius: f32,
}

pub struct PhysicsWorld {
    bounds: Rect,
    portal: PortalBoundary,
    gravity: Arc<SharedGravity>,
    fields: Vec<Box<dyn ForceField>>,
    bodies: HashMap<BodyId, Body>,
    next_body_id: BodyId,
    surface_attached: bool,
    steps: u64,
}

impl PhysicsWorld {
    /// World with tilt gravity and the portal attractor installed
    pub fn new(bounds: Rect, portal: PortalBoundary, gravity: Arc<SharedGravity>) -> Self {
        let fields: Vec<Box<dyn ForceField>> = vec![
            Box::new(DirectionalGravity::new(gravity.clone())),
            Box::new(RadialAttractor::portal(portal.center)),
        ];
        Self::with_fields(bounds, portal, gravity, fields)
    }

    pub fn with_fields(
        bounds: Rect,
        portal: PortalBoundary,
        gravity: Arc<SharedGravity>,
        fields: Vec<Box<dyn ForceField>>,
    ) -> Self {
        Self {
            bounds,
            portal,
            gravity,
            fields,
            bodies: HashMap::new(),
            next_body_id: 1,
            surface_attached: true,
            steps: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn portal(&self) -> PortalBoundary {
        self.portal
    }

    pub fn gravity(&self) -> &Arc<SharedGravity> {
        &self.gravity
    }

    pub fn set_gravity_magnitude(&self, magnitude: f32) {
        self.gravity.set_magnitude(magnitude);
    }

    pub fn gravity_magnitude(&self) -> f32 {
        self.gravity.magnitude()
    }

    /// Add a shape at `position`, drifting toward the scene center
    pub fn add_body(&mut self, kind: ShapeKind, position: Vec2, now: f64) -> BodyId {
        let id = self.next_body_id;
        self.next_body_id += 1;

        let mut body = Body::new(id, kind, position, now);
        body.velocity = (self.bounds.center() - position) * physics::VELOCITY_MULTIPLIER;
        body.entered_scene = self.bounds.contains_rect(&body.frame());
        self.bodies.insert(id, body);
        id
    }

    /// Remove a body; untracked ids are ignored
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Bodies in id order
    pub fn bodies_sorted(&self) -> Vec<&Body> {
        let mut bodies: Vec<&Body> = self.bodies.values().collect();
        bodies.sort_by_key(|b| b.id);
        bodies
    }

    /// Drop every body
    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// The reference surface is gone; stop integrating for good
    pub fn detach_surface(&mut self) {
        if self.surface_attached {
            warn!("Reference surface detached, physics halted with {} bodies", self.bodies.len());
        }
        self.surface_attached = false;
    }

    pub fn is_halted(&self) -> bool {
        !self.surface_attached
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance every body by `dt` seconds
    pub fn step(&mut self, dt: f32) -> StepEvents {
        let mut events = StepEvents::new();
        if !self.surface_attached || dt <= 0.0 {
            return events;
        }
        self.steps += 1;
        trace!("physics step {} ({} bodies)", self.steps, self.bodies.len());

        let fields = &self.fields;

        #[cfg(feature = "parallel_forces")]
        self.bodies
            .par_values_mut()
            .for_each(|body| integrate(body, fields, dt));

        #[cfg(not(feature = "parallel_forces"))]
        self.bodies
            .values_mut()
            .for_each(|body| integrate(body, fields, dt));

        // Boundary pass in id order so event order is deterministic
        let mut ids: Vec<BodyId> = self.bodies.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let Some(body) = self.bodies.get_mut(&id) else {
                continue;
            };

            if !body.position.is_finite() || !body.velocity.is_finite() {
                warn!("Dropped body {} with non-finite state", id);
                self.bodies.remove(&id);
                events.push(WorldEvent::BodyLost { body: id });
                continue;
            }

            resolve_scene_bounds(body, &self.bounds);

            let touching = resolve_portal(body, &self.portal);
            if touching && !body.touching_portal {
                debug!("Body {} ({}) reached the portal", id, body.kind.name());
                events.push(WorldEvent::PortalContact {
                    body: id,
                    kind: body.kind,
                    position: body.position,
                });
            }
            body.touching_portal = touching;
        }

        events
    }

    /// Index of the first zone whose rect overlaps the body's frame and
    /// accepts its kind. Mismatched kinds pass through with no effect.
    pub fn matching_zone(&self, id: BodyId, zones: &[CollectionZone]) -> Option<usize> {
        let body = self.bodies.get(&id)?;
        let frame = body.frame();
        zones
            .iter()
            .position(|zone| zone.accepts_overlap(body.kind, &frame))
    }

    /// True when the body's frame is entirely outside the inflated scene
    pub fn is_out_of_bounds(&self, id: BodyId) -> bool {
        let Some(body) = self.bodies.get(&id) else {
            return false;
        };
        let margin = ui::OUT_OF_BOUNDS_MARGIN;
        !self.bounds.inset(-margin, -margin).intersects(&body.frame())
    }
}

/// Accumulate field accelerations and integrate one body
fn integrate(body: &mut Body, fields: &[Box<dyn ForceField>], dt: f32) {
    let acceleration = total_acceleration(fields, body.position, body.mass());
    body.velocity += acceleration * dt;
    if body.velocity.length_sq() > physics::MAX_VELOCITY * physics::MAX_VELOCITY {
        body.velocity = body.velocity.normalize() * physics::MAX_VELOCITY;
    }
    body.position += body.velocity * dt;

    body.angular_velocity = body
        .angular_velocity
        .clamp(-physics::MAX_ANGULAR_VELOCITY, physics::MAX_ANGULAR_VELOCITY);
    body.rotation = (body.rotation + body.angular_velocity * dt) % std::f32::consts::TAU;
}

/// Reflect a body's velocity off a surface with outward-facing `normal`
/// (pointing from the surface into the free space the body belongs to)
fn bounce(body: &mut Body, normal: Vec2) {
    let (along, tangent) = body.velocity.decompose(normal);
    if along.dot(normal) >= 0.0 {
        return;
    }
    let material = body.material;
    body.velocity = tangent * (1.0 - material.friction) - along * material.elasticity;

    // Friction at the contact point spins the body
    let radius = body.bounding_radius().max(1.0);
    body.angular_velocity += normal.cross(tangent) * material.friction / radius;
}

/// Scene edges bounce bodies back in. Bodies still entering from outside are
/// left alone until their whole frame has crossed in once; after that the
/// edges always hold them, however far a single step carried them.
fn resolve_scene_bounds(body: &mut Body, bounds: &Rect) {
    if !body.entered_scene {
        if !bounds.contains_rect(&body.frame()) {
            return;
        }
        body.entered_scene = true;
    }
    let half = body.size * 0.5;

    if body.position.x - half.x < bounds.min_x() && body.velocity.x < 0.0 {
        body.position.x = bounds.min_x() + half.x;
        bounce(body, Vec2::new(1.0, 0.0));
    } else if body.position.x + half.x > bounds.max_x() && body.velocity.x > 0.0 {
        body.position.x = bounds.max_x() - half.x;
        bounce(body, Vec2::new(-1.0, 0.0));
    }

    if body.position.y - half.y < bounds.min_y() && body.velocity.y < 0.0 {
        body.position.y = bounds.min_y() + half.y;
        bounce(body, Vec2::new(0.0, 1.0));
    } else if body.position.y + half.y > bounds.max_y() && body.velocity.y > 0.0 {
        body.position.y = bounds.max_y() - half.y;
        bounce(body, Vec2::new(0.0, -1.0));
    }
}

/// Test the body's outline against the portal circle, pushing it out and
/// bouncing it on penetration. Returns whether the outline touches.
fn resolve_portal(body: &mut Body, portal: &PortalBoundary) -> bool {
    let (normal, center_distance) = (body.position - portal.center).normalize_with_length();
    // Cheap reject before building the outline
    if center_distance > portal.radius + body.bounding_radius() + CONTACT_SLOP {
        return false;
    }

    let closest = body
        .world_points()
        .into_iter()
        .map(|p| p.distance_to(portal.center))
        .fold(center_distance, f32::min);

    if closest > portal.radius + CONTACT_SLOP {
        return false;
    }

    let normal = if center_distance > 0.0 { normal } else { Vec2::new(0.0, -1.0) };
    let depth = portal.radius - closest;
    if depth > 0.0 {
        body.position += normal * depth;
    }
    bounce(body, normal);
    true
}
