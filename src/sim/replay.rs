//! Replay recording and playback
//!
//! A single slot: starting a recording throws the previous one away. Frames
//! are immutable snapshots; playback republishes them without simulating.

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::obstacles::Obstacle;
use super::state::PlayerBody;

/// Obstacle as it was on a recorded frame
///
/// Keeps the live id so renderers can track the same pipe during playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleShape {
    pub id: u32,
    pub top: Rect,
    pub bottom: Rect,
    pub scored: bool,
    pub gap_center: f32,
    pub gap: f32,
}

impl From<&Obstacle> for ObstacleShape {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            id: obstacle.id,
            top: obstacle.top,
            bottom: obstacle.bottom,
            scored: obstacle.scored,
            gap_center: obstacle.gap_center,
            gap: obstacle.gap,
        }
    }
}

impl ObstacleShape {
    /// Rebuild the live obstacle
    pub fn to_obstacle(&self) -> Obstacle {
        Obstacle {
            id: self.id,
            top: self.top,
            bottom: self.bottom,
            scored: self.scored,
            gap_center: self.gap_center,
            gap: self.gap,
        }
    }
}

/// One recorded tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub player_y: f32,
    pub player_vy: f32,
    pub score: u32,
    pub obstacles: Vec<ObstacleShape>,
}

impl ReplayFrame {
    pub fn capture(player: &PlayerBody, score: u32, obstacles: &[Obstacle]) -> Self {
        Self {
            player_y: player.y,
            player_vy: player.vy,
            score,
            obstacles: obstacles.iter().map(ObstacleShape::from).collect(),
        }
    }
}

/// Bounded recording plus a playback cursor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    frames: Vec<ReplayFrame>,
    capacity: usize,
    cursor: usize,
    recording: bool,
    playing: bool,
}

impl Replay {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::new(),
            capacity,
            cursor: 0,
            recording: false,
            playing: false,
        }
    }

    /// Discard the previous replay and start recording
    pub fn start_recording(&mut self) {
        self.frames.clear();
        self.cursor = 0;
        self.recording = true;
        self.playing = false;
        log::info!("Replay recording started");
    }

    pub fn stop_recording(&mut self) {
        if self.recording {
            self.recording = false;
            log::info!("Replay recording stopped ({} frames)", self.frames.len());
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Whether `record` would store a frame right now
    pub fn accepts_frames(&self) -> bool {
        self.recording && self.frames.len() < self.capacity
    }

    /// Append a frame; a no-op when not recording or full
    pub fn record(&mut self, frame: ReplayFrame) -> bool {
        if !self.accepts_frames() {
            return false;
        }
        self.frames.push(frame);
        true
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    /// A finished recording is available for playback
    pub fn has_replay(&self) -> bool {
        !self.recording && !self.frames.is_empty()
    }

    /// Rewind and start playback; false when there is nothing to play
    pub fn start_playback(&mut self) -> bool {
        if !self.has_replay() {
            log::info!("No replay available");
            return false;
        }
        self.cursor = 0;
        self.playing = true;
        log::info!("Replay playback started ({} frames)", self.frames.len());
        true
    }

    pub fn stop_playback(&mut self) {
        if self.playing {
            self.playing = false;
            self.cursor = 0;
            log::info!("Replay playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Next frame in recorded order, or None once the sequence is exhausted
    pub fn next_frame(&mut self) -> Option<&ReplayFrame> {
        if !self.playing {
            return None;
        }
        let frame = self.frames.get(self.cursor)?;
        self.cursor += 1;
        Some(frame)
    }

    /// Consume up to `count` frames and return the last one consumed
    pub fn advance(&mut self, count: usize) -> Option<&ReplayFrame> {
        if !self.playing || count == 0 || self.cursor >= self.frames.len() {
            return None;
        }
        self.cursor = (self.cursor + count).min(self.frames.len());
        self.frames.get(self.cursor - 1)
    }

    /// Playback reached the end of the sequence
    pub fn is_finished(&self) -> bool {
        self.playing && self.cursor >= self.frames.len()
    }

    /// Playback completion in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.frames.is_empty() {
            return 0.0;
        }
        self.cursor as f32 / self.frames.len() as f32
    }
}
