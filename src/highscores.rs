//! Score ledger and per-mode best scores
//!
//! Best scores are loaded once at startup and persisted by the driver when a
//! session ends.

use serde::{Deserialize, Serialize};

use crate::sim::GameMode;

/// Best score for every game mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestScores {
    pub button: u32,
    pub infrared: u32,
    pub potentiometer: u32,
    pub ultrasound: u32,
}

impl BestScores {
    pub fn get(&self, mode: GameMode) -> u32 {
        match mode {
            GameMode::Button => self.button,
            GameMode::Infrared => self.infrared,
            GameMode::Potentiometer => self.potentiometer,
            GameMode::Ultrasound => self.ultrasound,
        }
    }

    pub fn set(&mut self, mode: GameMode, score: u32) {
        match mode {
            GameMode::Button => self.button = score,
            GameMode::Infrared => self.infrared = score,
            GameMode::Potentiometer => self.potentiometer = score,
            GameMode::Ultrasound => self.ultrasound = score,
        }
    }

    /// Raise a mode's best if `score` beats it; returns true when raised
    pub fn raise(&mut self, mode: GameMode, score: u32) -> bool {
        if score > self.get(mode) {
            self.set(mode, score);
            true
        } else {
            false
        }
    }

    /// Top score across all modes
    pub fn top_score(&self) -> u32 {
        GameMode::ALL.iter().map(|&m| self.get(m)).max().unwrap_or(0)
    }
}

/// Running score plus best-score bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreLedger {
    score: u32,
    best: BestScores,
    /// Set by the most recent increment only
    just_new_best: bool,
    /// A best changed this session
    session_new_best: bool,
    /// Best scores changed since the last persist
    dirty: bool,
}

impl ScoreLedger {
    pub fn new(best: BestScores) -> Self {
        Self {
            best,
            ..Self::default()
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_scores(&self) -> &BestScores {
        &self.best
    }

    pub fn best(&self, mode: GameMode) -> u32 {
        self.best.get(mode)
    }

    /// Whether the latest increment set a new best
    pub fn just_new_best(&self) -> bool {
        self.just_new_best
    }

    /// Whether any increment this session set a new best
    pub fn session_new_best(&self) -> bool {
        self.session_new_best
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Start a new session: score back to zero, bests kept
    pub fn reset_session(&mut self) {
        self.score = 0;
        self.just_new_best = false;
        self.session_new_best = false;
    }

    /// Add one point for `mode`; returns true when it set a new best
    pub fn increment(&mut self, mode: GameMode) -> bool {
        self.just_new_best = false;
        self.score += 1;
        if self.best.raise(mode, self.score) {
            self.just_new_best = true;
            self.session_new_best = true;
            self.dirty = true;
        }
        self.just_new_best
    }

    /// Overwrite the displayed score (replay playback)
    pub fn show_score(&mut self, score: u32) {
        self.score = score;
        self.just_new_best = false;
    }

    /// Mark the current bests as persisted
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
