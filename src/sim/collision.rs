//! Collision detection between the player circle and obstacle barriers
//!
//! Pure and stateless. A hit ends the session; nothing is resolved or pushed
//! apart.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacles::Obstacle;
use super::state::PlayerBody;

/// Axis-aligned rectangle, `min` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min: Vec2::new(x1, y1),
            max: Vec2::new(x2, y2),
        }
    }

    /// Rectangle from its left edge, vertical span and width
    pub fn from_span(x: f32, top: f32, bottom: f32, width: f32) -> Self {
        Self::new(x, top, x + width, bottom)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Finite coordinates, positive width, non-inverted vertical span
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.width() > 0.0 && self.height() >= 0.0
    }

    /// Shift horizontally
    pub fn translate_x(&mut self, dx: f32) {
        self.min.x += dx;
        self.max.x += dx;
    }
}

/// Circle vs. rectangle: nearest point on the rectangle within `radius`
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = center.max(rect.min).min(rect.max);
    center.distance_squared(closest) <= radius * radius
}

/// Player circle against both barriers of every obstacle
pub fn check_pipe_collision(player: &PlayerBody, obstacles: &[Obstacle]) -> bool {
    let center = player.center();
    obstacles.iter().any(|o| {
        circle_rect_overlap(center, player.radius, &o.top)
            || circle_rect_overlap(center, player.radius, &o.bottom)
    })
}
