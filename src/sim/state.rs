//! Game state and core simulation types
//!
//! One owned `GameState` per running game; no globals. Renderers read it
//! through accessors or [`GameState::snapshot`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacles::{DifficultyState, Obstacle, ObstacleGenerator};
use super::replay::{Replay, ReplayFrame};
use crate::highscores::{BestScores, ScoreLedger};
use crate::settings::{ControlScheme, Settings};

/// Input device the player is using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Button,
    Infrared,
    /// Potentiometer or digital encoder
    Potentiometer,
    Ultrasound,
}

impl GameMode {
    /// Menu order
    pub const ALL: [GameMode; 4] = [
        GameMode::Button,
        GameMode::Infrared,
        GameMode::Potentiometer,
        GameMode::Ultrasound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Button => "Button",
            GameMode::Infrared => "Infrared",
            GameMode::Potentiometer => "Potentiometer",
            GameMode::Ultrasound => "Ultrasound",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "button" | "btn" => Some(GameMode::Button),
            "infrared" | "ir" => Some(GameMode::Infrared),
            "potentiometer" | "pot" | "encoder" => Some(GameMode::Potentiometer),
            "ultrasound" | "us" => Some(GameMode::Ultrasound),
            _ => None,
        }
    }

    /// Mode at a menu position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            GameMode::Button => 0,
            GameMode::Infrared => 1,
            GameMode::Potentiometer => 2,
            GameMode::Ultrasound => 3,
        }
    }
}

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    Replay,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Menu => "MENU",
            Screen::Playing => "PLAYING",
            Screen::GameOver => "GAME_OVER",
            Screen::Replay => "REPLAY",
        }
    }
}

/// Informational layers that freeze the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Controls help
    Info,
}

/// An overlay raised over a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    /// Screen restored when the overlay is dismissed
    pub resume: Screen,
}

/// The player's hitbox and vertical motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Fixed horizontal position
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub radius: f32,
}

impl PlayerBody {
    pub fn new(x: f32, radius: f32, y: f32) -> Self {
        Self {
            x,
            y,
            vy: 0.0,
            radius,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Back to rest at `y`
    pub fn reset(&mut self, y: f32) {
        self.y = y;
        self.vy = 0.0;
    }
}

/// Things that happened, for renderers and device encoders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged { from: Screen, to: Screen },
    ModeChanged(GameMode),
    OverlayShown(OverlayKind),
    OverlayHidden(OverlayKind),
    Flapped,
    Scored { score: u32, new_best: bool },
    /// Raised alongside `Scored` when the point beat the mode's best
    NewBest { mode: GameMode, best: u32 },
    /// A PLAYING session ended, by collision or by returning to the menu
    SessionEnded {
        mode: GameMode,
        score: u32,
        new_best: bool,
        abandoned: bool,
    },
    ReplayStarted { frames: usize },
    ReplayFinished,
}

/// Read-only view for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub screen: Screen,
    pub overlay: Option<Overlay>,
    pub mode: GameMode,
    pub player: PlayerBody,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub best: u32,
    pub best_scores: BestScores,
    /// The session set a new best for its mode
    pub new_best: bool,
    /// Playback completion while in REPLAY
    pub replay_progress: Option<f32>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) settings: Settings,
    /// Seed the obstacle generator started from
    pub seed: u64,
    pub(crate) screen: Screen,
    pub(crate) overlay: Option<Overlay>,
    pub(crate) mode: GameMode,
    pub player: PlayerBody,
    /// Active obstacles (sorted by id)
    pub obstacles: Vec<Obstacle>,
    pub difficulty: DifficultyState,
    pub(crate) generator: ObstacleGenerator,
    /// Seconds since the last spawn
    pub spawn_elapsed: f32,
    pub(crate) ledger: ScoreLedger,
    pub(crate) replay: Replay,
    pub(crate) events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Fresh game in MENU with the given best scores
    pub fn new(settings: Settings, seed: u64, best: BestScores) -> Self {
        let settings = settings.sanitized();
        let player = PlayerBody::new(
            settings.world.player_x,
            settings.world.player_radius,
            settings.world.height / 2.0,
        );
        Self {
            seed,
            screen: Screen::Menu,
            overlay: None,
            mode: GameMode::default(),
            player,
            obstacles: Vec::new(),
            difficulty: DifficultyState::new(&settings.difficulty),
            generator: ObstacleGenerator::new(seed),
            spawn_elapsed: 0.0,
            ledger: ScoreLedger::new(best),
            replay: Replay::new(settings.replay.capacity),
            events: Vec::new(),
            time_ticks: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn is_overlay_active(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Control scheme of the selected mode
    pub fn scheme(&self) -> ControlScheme {
        self.settings.scheme(self.mode)
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn score(&self) -> u32 {
        self.ledger.score()
    }

    pub fn best_scores(&self) -> &BestScores {
        self.ledger.best_scores()
    }

    pub fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Events not yet drained
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Record that the current best scores reached storage
    pub fn mark_best_scores_saved(&mut self) {
        self.ledger.mark_saved();
    }

    /// Owned copy of everything a renderer needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            screen: self.screen,
            overlay: self.overlay,
            mode: self.mode,
            player: self.player.clone(),
            obstacles: self.obstacles.clone(),
            score: self.ledger.score(),
            best: self.ledger.best(self.mode),
            best_scores: self.ledger.best_scores().clone(),
            new_best: self.ledger.session_new_best(),
            replay_progress: (self.screen == Screen::Replay).then(|| self.replay.progress()),
        }
    }

    /// Ensure obstacles are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.obstacles.sort_by_key(|o| o.id);
    }

    /// Player back to mid-screen at rest
    pub(crate) fn center_player(&mut self) {
        let mid = self.settings.world.height / 2.0;
        self.player.reset(mid);
    }

    /// Republish a recorded frame as the live view
    pub(crate) fn show_frame(&mut self, frame: &ReplayFrame) {
        self.player.y = frame.player_y;
        self.player.vy = frame.player_vy;
        self.ledger.show_score(frame.score);
        self.obstacles = frame
            .obstacles
            .iter()
            .map(|shape| shape.to_obstacle())
            .filter(|o| !o.is_degenerate())
            .collect();
    }
}
