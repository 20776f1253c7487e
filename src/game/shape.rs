//! Shape catalog
//!
//! Every shape kind maps to a closed outline inside its bounding rect. The
//! outline serves both rendering and precise collision, so the visual and
//! physical boundaries are the same geometry.

use std::f32::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::rect::Rect;
use crate::util::vec2::Vec2;

/// Points used to approximate an ellipse for collision tests
pub const ELLIPSE_SEGMENTS: usize = 32;

const STAR_POINTS: usize = 10;
const STAR_INNER_RATIO: f32 = 0.4;
const HEXAGON_POINTS: usize = 6;
const CROSS_THICKNESS_RATIO: f32 = 0.3;

/// Shape kinds that can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Star,
    Triangle,
    Hexagon,
    Circle,
    Cross,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Star,
        ShapeKind::Triangle,
        ShapeKind::Hexagon,
        ShapeKind::Circle,
        ShapeKind::Cross,
    ];

    /// Visual identity; zones accepting this kind share the color
    pub fn color(self) -> ColorId {
        match self {
            ShapeKind::Star => ColorId::Cyan,
            ShapeKind::Triangle => ColorId::Magenta,
            ShapeKind::Hexagon => ColorId::Green,
            ShapeKind::Circle => ColorId::Yellow,
            ShapeKind::Cross => ColorId::Orange,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Star => "star",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Hexagon => "hexagon",
            ShapeKind::Circle => "circle",
            ShapeKind::Cross => "cross",
        }
    }
}

/// Named colors shared with the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorId {
    Cyan,
    Magenta,
    Green,
    Yellow,
    Orange,
    Red,
}

/// One closed sub-path of an outline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Path {
    Polygon(Vec<Vec2>),
    Ellipse { center: Vec2, radii: Vec2 },
}

impl Path {
    /// Polygon vertices; ellipses are sampled at `ELLIPSE_SEGMENTS` points
    pub fn vertices(&self) -> Vec<Vec2> {
        match self {
            Path::Polygon(points) => points.clone(),
            Path::Ellipse { center, radii } => (0..ELLIPSE_SEGMENTS)
                .map(|i| {
                    let angle = i as f32 * TAU / ELLIPSE_SEGMENTS as f32;
                    Vec2::new(
                        center.x + angle.cos() * radii.x,
                        center.y + angle.sin() * radii.y,
                    )
                })
                .collect(),
        }
    }

    #[cfg(test)]
    fn contains(&self, point: Vec2) -> bool {
        match self {
            Path::Polygon(points) => polygon_contains(points, point),
            Path::Ellipse { center, radii } => {
                if radii.x <= 0.0 || radii.y <= 0.0 {
                    return false;
                }
                let dx = (point.x - center.x) / radii.x;
                let dy = (point.y - center.y) / radii.y;
                dx * dx + dy * dy <= 1.0
            }
        }
    }
}

/// Closed outline of a shape, one or more sub-paths
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub paths: SmallVec<[Path; 2]>,
}

impl Outline {
    /// All vertices used for collision, in outline order
    pub fn collision_points(&self) -> Vec<Vec2> {
        self.paths.iter().flat_map(|p| p.vertices()).collect()
    }

    /// Point-in-outline test (union of sub-paths)
    #[cfg(test)]
    pub fn contains(&self, point: Vec2) -> bool {
        self.paths.iter().any(|p| p.contains(point))
    }

    /// Largest distance from `center` to any collision point
    #[cfg(test)]
    pub fn reach_from(&self, center: Vec2) -> f32 {
        self.collision_points()
            .into_iter()
            .map(|p| p.distance_to(center))
            .fold(0.0, f32::max)
    }
}

/// Build the outline of `kind` inside `rect`
pub fn outline(kind: ShapeKind, rect: Rect) -> Outline {
    let mut paths = SmallVec::new();
    match kind {
        ShapeKind::Star => paths.push(star(rect)),
        ShapeKind::Triangle => paths.push(Path::Polygon(vec![
            Vec2::new(rect.mid_x(), rect.min_y()),
            Vec2::new(rect.max_x(), rect.max_y()),
            Vec2::new(rect.min_x(), rect.max_y()),
        ])),
        ShapeKind::Hexagon => paths.push(regular_polygon(
            rect.center(),
            rect.width().min(rect.height()) / 2.0,
            HEXAGON_POINTS,
        )),
        ShapeKind::Circle => paths.push(Path::Ellipse {
            center: rect.center(),
            radii: rect.size * 0.5,
        }),
        ShapeKind::Cross => {
            let (horizontal, vertical) = cross_bars(rect);
            paths.push(horizontal);
            paths.push(vertical);
        }
    }
    Outline { paths }
}

fn star(rect: Rect) -> Path {
    let center = rect.center();
    let outer = rect.width().min(rect.height()) / 2.0;
    let inner = outer * STAR_INNER_RATIO;
    let points = (0..STAR_POINTS)
        .map(|i| {
            let angle = i as f32 * TAU / STAR_POINTS as f32 - FRAC_PI_2;
            let radius = if i % 2 == 0 { outer } else { inner };
            center + Vec2::from_angle(angle) * radius
        })
        .collect();
    Path::Polygon(points)
}

fn regular_polygon(center: Vec2, radius: f32, sides: usize) -> Path {
    let points = (0..sides)
        .map(|i| {
            let angle = i as f32 * TAU / sides as f32 - FRAC_PI_2;
            center + Vec2::from_angle(angle) * radius
        })
        .collect();
    Path::Polygon(points)
}

fn cross_bars(rect: Rect) -> (Path, Path) {
    let half = rect.width() * CROSS_THICKNESS_RATIO / 2.0;
    let horizontal = Path::Polygon(vec![
        Vec2::new(rect.min_x(), rect.mid_y() - half),
        Vec2::new(rect.max_x(), rect.mid_y() - half),
        Vec2::new(rect.max_x(), rect.mid_y() + half),
        Vec2::new(rect.min_x(), rect.mid_y() + half),
    ]);
    let vertical = Path::Polygon(vec![
        Vec2::new(rect.mid_x() - half, rect.min_y()),
        Vec2::new(rect.mid_x() + half, rect.min_y()),
        Vec2::new(rect.mid_x() + half, rect.max_y()),
        Vec2::new(rect.mid_x() - half, rect.max_y()),
    ]);
    (horizontal, vertical)
}

/// Even-odd ray cast
#[cfg(test)]
fn polygon_contains(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
