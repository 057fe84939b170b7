//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by obstacle ID)
//! - No rendering, device or storage dependencies

pub mod collision;
pub mod control;
pub mod obstacles;
pub mod physics;
pub mod replay;
pub mod state;
pub mod tick;
pub mod timer;

pub use collision::{Rect, check_pipe_collision, circle_rect_overlap};
pub use control::Intent;
pub use obstacles::{DifficultyState, Obstacle, ObstacleGenerator, advance_obstacles};
pub use physics::{apply_flap, apply_gravity, check_bounds_collision};
pub use replay::{ObstacleShape, Replay, ReplayFrame};
pub use state::{
    GameEvent, GameMode, GameState, Overlay, OverlayKind, PlayerBody, Screen, Snapshot,
};
pub use tick::tick;
pub use timer::Timer;
