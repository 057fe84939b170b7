//! Vertical motion of the player
//!
//! Per-tick constants, not dt-scaled: the driver always advances the
//! simulation in fixed steps.

use super::state::PlayerBody;
use crate::settings::PhysicsSettings;

/// Add one tick of gravity and clamp to `[-max_vy, max_vy]`
#[inline]
pub fn apply_gravity(vy: f32, gravity: f32, max_vy: f32) -> f32 {
    // `clamp` panics on a NaN bound
    (vy + gravity).max(-max_vy).min(max_vy)
}

/// Velocity after a flap; replaces whatever the player had
#[inline]
pub fn apply_flap(impulse: f32) -> f32 {
    impulse
}

/// Player circle touches the ceiling or the floor
#[inline]
pub fn check_bounds_collision(y: f32, radius: f32, world_height: f32) -> bool {
    y <= radius || y >= world_height - radius
}

/// Advance the player one tick under gravity
pub fn integrate(body: &mut PlayerBody, physics: &PhysicsSettings) {
    body.vy = apply_gravity(body.vy, physics.gravity, physics.max_vy);
    body.y += body.vy;
}
