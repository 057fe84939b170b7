//! Flap Sim - simulation core for a "flap through gaps" arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, state machine, replay)
//! - `driver`: Fixed-step host loop adapter (timer, intent queue, persistence hooks)
//! - `highscores`: Score ledger and per-mode best scores
//! - `persistence`: Best-score load/save boundary
//! - `platform`: Clock sources
//! - `settings`: Data-driven game balance

pub mod driver;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use driver::Driver;
pub use highscores::{BestScores, ScoreLedger};
pub use settings::{ControlScheme, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one physics step per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions (y grows downward, origin top-left)
    pub const WORLD_WIDTH: f32 = 1080.0;
    pub const WORLD_HEIGHT: f32 = 920.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 220.0;
    pub const PLAYER_RADIUS: f32 = 70.0;

    /// Gravity added to vertical velocity every tick
    pub const GRAVITY: f32 = 1.5;
    /// Velocity set by a flap (negative is up)
    pub const FLAP_IMPULSE: f32 = -15.0;
    /// Symmetric vertical speed limit
    pub const MAX_VY: f32 = 15.0;

    /// Obstacle geometry
    pub const PIPE_WIDTH: f32 = 135.0;
    pub const PIPE_MIN_BARRIER: f32 = 40.0;
    pub const PIPE_FIRST_INSET: f32 = 30.0;
    pub const PIPE_CENTER_MIN_FRAC: f32 = 0.25;
    pub const PIPE_CENTER_MAX_FRAC: f32 = 0.75;
    pub const PIPE_CENTER_DELTA_FRAC: f32 = 0.15;
    pub const PIPE_CENTER_RETRIES: u32 = 8;

    /// Difficulty curve
    pub const PIPE_GAP_BASE: f32 = 380.0;
    pub const PIPE_GAP_MIN: f32 = 260.0;
    pub const PIPE_GAP_JITTER: i32 = 40;
    pub const PIPE_GAP_SHRINK: f32 = 2.0;
    pub const PIPE_SPEED_BASE: f32 = 8.0;
    pub const PIPE_SPEED_MAX: f32 = 14.0;
    pub const PIPE_SPEED_STEP: f32 = 0.05;
    pub const PIPE_SPAWN_EVERY: f32 = 1.6;
    pub const PIPE_SPAWN_MIN: f32 = 1.1;
    pub const PIPE_SPAWN_SHRINK: f32 = 0.01;

    /// Replay defaults (about three minutes of play at 60 Hz)
    pub const MAX_REPLAY_FRAMES: usize = 60 * 60 * 3;
    pub const REPLAY_SPEED: usize = 2;
}
