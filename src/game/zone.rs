//! Collection zones in the scene corners

use serde::{Deserialize, Serialize};

use crate::game::constants::ui::{COLLECTION_ZONE_MARGIN, COLLECTION_ZONE_SIZE, TOP_ZONE_Y};
use crate::game::shape::{ColorId, ShapeKind};
use crate::util::rect::Rect;

/// Static region accepting a single shape kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionZone {
    pub rect: Rect,
    pub accepts: ShapeKind,
    pub color: ColorId,
}

impl CollectionZone {
    pub fn new(rect: Rect, accepts: ShapeKind) -> Self {
        Self {
            rect,
            accepts,
            color: accepts.color(),
        }
    }

    /// Bounding-rect overlap with a matching kind
    pub fn accepts_overlap(&self, kind: ShapeKind, frame: &Rect) -> bool {
        self.accepts == kind && self.rect.intersects(frame)
    }
}

/// Zone kinds in layout order: bottom-left, bottom-right, top-left, top-right.
/// Crosses have no zone.
pub const ZONE_KINDS: [ShapeKind; 4] = [
    ShapeKind::Triangle,
    ShapeKind::Star,
    ShapeKind::Hexagon,
    ShapeKind::Circle,
];

/// Place one zone per entry of `ZONE_KINDS` in the scene corners
pub fn corner_layout(scene: &Rect) -> Vec<CollectionZone> {
    let size = COLLECTION_ZONE_SIZE;
    let margin = COLLECTION_ZONE_MARGIN;
    let left = scene.min_x() + margin;
    let right = scene.max_x() - size - margin;
    let bottom = scene.max_y() - size - margin;
    let top = scene.min_y() + TOP_ZONE_Y;

    let origins = [(left, bottom), (right, bottom), (left, top), (right, top)];

    origins
        .iter()
        .zip(ZONE_KINDS)
        .map(|(&(x, y), kind)| CollectionZone::new(Rect::new(x, y, size, size), kind))
        .collect()
}
