//! Game settings and balance
//!
//! Every tunable of the simulation lives here so a host can ship a JSON file
//! instead of recompiling. Missing fields fall back to the defaults in
//! [`crate::consts`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{PersistenceError, write_atomic};
use crate::sim::GameMode;

/// How a mode's sensor drives the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    /// Gravity pulls the player down, flaps replace the velocity
    Impulse,
    /// The sensor reports a position; gravity is not integrated
    AbsolutePosition,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Impulse => "Impulse",
            ControlScheme::AbsolutePosition => "AbsolutePosition",
        }
    }

    /// Whether flaps are meaningful under this scheme
    pub fn accepts_flap(&self) -> bool {
        matches!(self, ControlScheme::Impulse)
    }

    /// Whether absolute position reports are meaningful under this scheme
    pub fn accepts_position(&self) -> bool {
        matches!(self, ControlScheme::AbsolutePosition)
    }

    /// Whether the physics step integrates gravity
    pub fn integrates_gravity(&self) -> bool {
        matches!(self, ControlScheme::Impulse)
    }
}

/// Control scheme per game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeControls {
    pub button: ControlScheme,
    pub infrared: ControlScheme,
    pub potentiometer: ControlScheme,
    pub ultrasound: ControlScheme,
}

impl Default for ModeControls {
    fn default() -> Self {
        Self {
            // Both report discrete trigger events
            button: ControlScheme::Impulse,
            infrared: ControlScheme::Impulse,
            // Both report a continuous reading mapped to height
            potentiometer: ControlScheme::AbsolutePosition,
            ultrasound: ControlScheme::AbsolutePosition,
        }
    }
}

impl ModeControls {
    pub fn scheme(&self, mode: GameMode) -> ControlScheme {
        match mode {
            GameMode::Button => self.button,
            GameMode::Infrared => self.infrared,
            GameMode::Potentiometer => self.potentiometer,
            GameMode::Ultrasound => self.ultrasound,
        }
    }

    pub fn set_scheme(&mut self, mode: GameMode, scheme: ControlScheme) {
        match mode {
            GameMode::Button => self.button = scheme,
            GameMode::Infrared => self.infrared = scheme,
            GameMode::Potentiometer => self.potentiometer = scheme,
            GameMode::Ultrasound => self.ultrasound = scheme,
        }
    }
}

/// World and player geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub width: f32,
    pub height: f32,
    pub player_x: f32,
    pub player_radius: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            player_x: PLAYER_X,
            player_radius: PLAYER_RADIUS,
        }
    }
}

/// Per-tick physics constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: f32,
    pub flap_impulse: f32,
    pub max_vy: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            flap_impulse: FLAP_IMPULSE,
            max_vy: MAX_VY,
        }
    }
}

/// Obstacle geometry and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleSettings {
    pub width: f32,
    /// Shortest allowed top barrier
    pub min_barrier: f32,
    /// How far inside the right edge the first obstacle of a session appears
    pub first_inset: f32,
    /// Gap center range as fractions of world height
    pub center_min_frac: f32,
    pub center_max_frac: f32,
    /// Minimum distance between consecutive gap centers, as a fraction of world height
    pub center_delta_frac: f32,
    pub center_retries: u32,
    /// Uniform integer jitter applied to every gap (±)
    pub gap_jitter: i32,
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        Self {
            width: PIPE_WIDTH,
            min_barrier: PIPE_MIN_BARRIER,
            first_inset: PIPE_FIRST_INSET,
            center_min_frac: PIPE_CENTER_MIN_FRAC,
            center_max_frac: PIPE_CENTER_MAX_FRAC,
            center_delta_frac: PIPE_CENTER_DELTA_FRAC,
            center_retries: PIPE_CENTER_RETRIES,
            gap_jitter: PIPE_GAP_JITTER,
        }
    }
}

/// Difficulty curve: base values, per-point steps and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultySettings {
    pub gap_base: f32,
    pub gap_min: f32,
    pub gap_shrink_per_point: f32,
    pub speed_base: f32,
    pub speed_max: f32,
    pub speed_step: f32,
    /// Seconds between spawns
    pub spawn_interval_base: f32,
    pub spawn_interval_min: f32,
    pub spawn_shrink_per_point: f32,
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self {
            gap_base: PIPE_GAP_BASE,
            gap_min: PIPE_GAP_MIN,
            gap_shrink_per_point: PIPE_GAP_SHRINK,
            speed_base: PIPE_SPEED_BASE,
            speed_max: PIPE_SPEED_MAX,
            speed_step: PIPE_SPEED_STEP,
            spawn_interval_base: PIPE_SPAWN_EVERY,
            spawn_interval_min: PIPE_SPAWN_MIN,
            spawn_shrink_per_point: PIPE_SPAWN_SHRINK,
        }
    }
}

/// Replay recording and playback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    pub capacity: usize,
    /// Frames consumed per playback tick
    pub playback_speed: usize,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            capacity: MAX_REPLAY_FRAMES,
            playback_speed: REPLAY_SPEED,
        }
    }
}

/// All game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub physics: PhysicsSettings,
    pub obstacles: ObstacleSettings,
    pub difficulty: DifficultySettings,
    pub replay: ReplaySettings,
    pub controls: ModeControls,
    /// Where the best scores are stored
    pub best_scores_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world: WorldSettings::default(),
            physics: PhysicsSettings::default(),
            obstacles: ObstacleSettings::default(),
            difficulty: DifficultySettings::default(),
            replay: ReplaySettings::default(),
            controls: ModeControls::default(),
            best_scores_file: PathBuf::from("bestscores.json"),
        }
    }
}

impl Settings {
    /// Default settings file name, looked up in the working directory
    pub const FILE_NAME: &'static str = "flap_settings.json";

    /// Control scheme for a game mode
    pub fn scheme(&self, mode: GameMode) -> ControlScheme {
        self.controls.scheme(mode)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        Ok(settings.sanitized())
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) if e.is_not_found() => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path.as_ref(), &json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Repair values that would break simulation invariants
    pub fn sanitized(mut self) -> Self {
        let d = &mut self.difficulty;
        d.gap_min = d.gap_min.max(0.0);
        d.gap_base = d.gap_base.max(d.gap_min);
        d.speed_max = d.speed_max.max(d.speed_base);
        d.spawn_interval_min = d.spawn_interval_min.max(0.0);
        d.spawn_interval_base = d.spawn_interval_base.max(d.spawn_interval_min);

        let o = &mut self.obstacles;
        o.gap_jitter = o.gap_jitter.saturating_abs();
        if o.center_min_frac > o.center_max_frac {
            std::mem::swap(&mut o.center_min_frac, &mut o.center_max_frac);
        }

        let p = &mut self.physics;
        let fallback = PhysicsSettings::default();
        if !p.gravity.is_finite() {
            p.gravity = fallback.gravity;
        }
        if !p.flap_impulse.is_finite() {
            p.flap_impulse = fallback.flap_impulse;
        }
        p.max_vy = if p.max_vy.is_finite() {
            p.max_vy.abs()
        } else {
            fallback.max_vy
        };
        self.replay.playback_speed = self.replay.playback_speed.max(1);
        self
    }
}
