//! Obstacle pairs, procedural generation and difficulty progression
//!
//! Each spawn draws a gap size from the difficulty curve plus jitter, and a
//! gap center pushed away from the previous one so consecutive pipes never
//! line up. Obstacles live in an id-keyed arena (`Vec` sorted by id).

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::settings::{DifficultySettings, ObstacleSettings, WorldSettings};

/// A top/bottom barrier pair with a passable gap between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub top: Rect,
    pub bottom: Rect,
    /// Already counted toward the score
    pub scored: bool,
    /// Gap center at spawn time
    pub gap_center: f32,
    /// Gap size at spawn time
    pub gap: f32,
}

impl Obstacle {
    /// Build a pair at `x`
    ///
    /// The top barrier never gets shorter than `min_barrier`; when that
    /// clamp kicks in the whole gap shifts down so its size stays exact.
    pub fn new(
        id: u32,
        x: f32,
        width: f32,
        gap_center: f32,
        gap: f32,
        world_height: f32,
        min_barrier: f32,
    ) -> Self {
        let top_edge = (gap_center - gap / 2.0).max(min_barrier);
        let bottom_edge = top_edge + gap;
        Self {
            id,
            top: Rect::from_span(x, 0.0, top_edge, width),
            bottom: Rect::from_span(x, bottom_edge, world_height.max(bottom_edge), width),
            scored: false,
            gap_center,
            gap,
        }
    }

    /// Left edge
    #[inline]
    pub fn x(&self) -> f32 {
        self.top.min.x
    }

    /// Right (trailing) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.top.max.x
    }

    /// Distance between the top barrier's lower edge and the bottom barrier's upper edge
    #[inline]
    pub fn gap_span(&self) -> f32 {
        self.bottom.min.y - self.top.max.y
    }

    pub fn translate_x(&mut self, dx: f32) {
        self.top.translate_x(dx);
        self.bottom.translate_x(dx);
    }

    /// Geometry that cannot be placed or tested
    pub fn is_degenerate(&self) -> bool {
        !self.top.is_valid() || !self.bottom.is_valid()
    }
}

/// Current difficulty, reset at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Gap before jitter
    pub gap: f32,
    /// Horizontal scroll per tick
    pub speed: f32,
    /// Seconds between spawns
    pub spawn_interval: f32,
}

impl DifficultyState {
    pub fn new(settings: &DifficultySettings) -> Self {
        Self {
            gap: settings.gap_base.max(settings.gap_min),
            speed: settings.speed_base.min(settings.speed_max),
            spawn_interval: settings.spawn_interval_base.max(settings.spawn_interval_min),
        }
    }

    /// Tighten after the score reached `score`
    pub fn on_score(&mut self, score: u32, settings: &DifficultySettings) {
        let score = score as f32;
        self.gap = (settings.gap_base - score * settings.gap_shrink_per_point).max(settings.gap_min);
        self.spawn_interval = (settings.spawn_interval_base
            - score * settings.spawn_shrink_per_point)
            .max(settings.spawn_interval_min);
        self.speed = (self.speed + settings.speed_step).min(settings.speed_max);
    }
}

/// Seeded obstacle factory
#[derive(Debug, Clone)]
pub struct ObstacleGenerator {
    rng: Pcg32,
    last_center: Option<i32>,
    next_id: u32,
}

impl ObstacleGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            last_center: None,
            next_id: 1,
        }
    }

    /// Forget the previous gap center (new session); ids keep counting
    pub fn reset(&mut self) {
        self.last_center = None;
    }

    /// Allocate a new obstacle id
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Gap for the next pair: difficulty gap plus jitter, never below the floor
    pub fn gap_size(
        &mut self,
        difficulty: &DifficultyState,
        settings: &DifficultySettings,
        jitter: i32,
    ) -> f32 {
        let base = difficulty.gap.max(settings.gap_min);
        let jitter = jitter.saturating_abs();
        let offset = self.rng.random_range(-jitter..=jitter);
        (base + offset as f32).max(settings.gap_min)
    }

    /// Gap center for the next pair
    ///
    /// Draws from the half of the range opposite the previous center, then
    /// falls back to bounded uniform retries if the draw still sits within
    /// the minimum distance.
    pub fn gap_center(&mut self, world_height: f32, settings: &ObstacleSettings) -> f32 {
        let min_c = (world_height * settings.center_min_frac) as i32;
        let max_c = ((world_height * settings.center_max_frac) as i32).max(min_c);
        let min_delta = (world_height * settings.center_delta_frac) as i32;

        let center = match self.last_center {
            None => self.rng.random_range(min_c..=max_c),
            Some(last) => {
                let mid = (min_c + max_c) / 2;
                let mut center = if last < mid {
                    let lo = (last + min_delta).clamp(min_c, max_c);
                    self.rng.random_range(lo..=max_c)
                } else {
                    let hi = (last - min_delta).clamp(min_c, max_c);
                    self.rng.random_range(min_c..=hi)
                };

                if (center - last).abs() < min_delta {
                    for _ in 0..settings.center_retries {
                        let candidate = self.rng.random_range(min_c..=max_c);
                        if (candidate - last).abs() >= min_delta {
                            center = candidate;
                            break;
                        }
                    }
                }
                center
            }
        };

        self.last_center = Some(center);
        center as f32
    }

    /// Create the next pair at the right world edge
    ///
    /// `first` places it slightly inside the edge so a session starts with
    /// action on screen.
    pub fn spawn(
        &mut self,
        difficulty: &DifficultyState,
        world: &WorldSettings,
        obstacles: &ObstacleSettings,
        curve: &DifficultySettings,
        first: bool,
    ) -> Obstacle {
        let gap = self.gap_size(difficulty, curve, obstacles.gap_jitter);
        let center = self.gap_center(world.height, obstacles);
        let x = if first {
            world.width - obstacles.first_inset
        } else {
            world.width
        };

        let id = self.next_entity_id();
        log::debug!("Spawn obstacle {} at x={} center={} gap={}", id, x, center, gap);
        Obstacle::new(
            id,
            x,
            obstacles.width,
            center,
            gap,
            world.height,
            obstacles.min_barrier,
        )
    }
}

/// Scroll every obstacle left by `dx`, mark the ones the player has passed
/// and drop the ones that left the world
///
/// Returns how many obstacles were newly scored this call.
pub fn advance_obstacles(obstacles: &mut Vec<Obstacle>, dx: f32, player_x: f32) -> u32 {
    let mut scored = 0;

    obstacles.retain_mut(|obstacle| {
        if obstacle.is_degenerate() {
            log::debug!("Pruning degenerate obstacle {}", obstacle.id);
            return false;
        }

        obstacle.translate_x(-dx);

        if obstacle.right() < 0.0 {
            return false;
        }

        if !obstacle.scored && obstacle.right() < player_x {
            obstacle.scored = true;
            scored += 1;
        }
        true
    });

    scored
}
