//! Fixed timestep simulation tick
//!
//! Advances the game by one step. Intents are applied by the caller between
//! ticks, never in the middle of one.

use super::collision::check_pipe_collision;
use super::obstacles::advance_obstacles;
use super::physics::{check_bounds_collision, integrate};
use super::replay::ReplayFrame;
use super::state::{GameEvent, GameState, Screen};

/// Advance the game state by one fixed timestep
///
/// Physics constants are per tick; `dt` only feeds the spawn timer.
pub fn tick(state: &mut GameState, dt: f32) {
    // The overlay freezes everything, including replay playback
    if state.overlay.is_some() {
        return;
    }

    state.time_ticks += 1;

    match state.screen {
        Screen::Playing => tick_playing(state, dt),
        Screen::Replay => tick_replay(state),
        Screen::Menu | Screen::GameOver => {}
    }
}

fn tick_playing(state: &mut GameState, dt: f32) {
    if state.scheme().integrates_gravity() {
        integrate(&mut state.player, &state.settings.physics);
    }

    let mut crashed = check_bounds_collision(
        state.player.y,
        state.player.radius,
        state.settings.world.height,
    );

    if !crashed {
        update_spawning(state, dt);
        update_obstacles(state);
        crashed = check_pipe_collision(&state.player, &state.obstacles);
    }

    // The crash frame is kept so playback ends on the impact
    if state.replay.accepts_frames() {
        let frame = ReplayFrame::capture(&state.player, state.ledger.score(), &state.obstacles);
        state.replay.record(frame);
    }

    if crashed {
        crash(state);
    }
}

/// Emit a new pair once the spawn interval has elapsed
fn update_spawning(state: &mut GameState, dt: f32) {
    state.spawn_elapsed += dt;
    if state.spawn_elapsed < state.difficulty.spawn_interval {
        return;
    }
    state.spawn_elapsed = 0.0;

    let obstacle = state.generator.spawn(
        &state.difficulty,
        &state.settings.world,
        &state.settings.obstacles,
        &state.settings.difficulty,
        false,
    );
    state.obstacles.push(obstacle);
    state.normalize_order();
}

/// Scroll obstacles and credit every pair the player has passed
fn update_obstacles(state: &mut GameState) {
    let passed = advance_obstacles(
        &mut state.obstacles,
        state.difficulty.speed,
        state.player.x,
    );

    for _ in 0..passed {
        let new_best = state.ledger.increment(state.mode);
        let score = state.ledger.score();
        state.difficulty.on_score(score, &state.settings.difficulty);
        log::debug!(
            "Score {} (speed={:.2} gap={} interval={:.2})",
            score,
            state.difficulty.speed,
            state.difficulty.gap,
            state.difficulty.spawn_interval
        );

        state.events.push(GameEvent::Scored { score, new_best });
        if new_best {
            state.events.push(GameEvent::NewBest {
                mode: state.mode,
                best: score,
            });
        }
    }
}

/// PLAYING -> GAME_OVER
fn crash(state: &mut GameState) {
    state.end_session(false);
    state.set_screen(Screen::GameOver);
}

/// Consume `playback_speed` frames and show the last one
fn tick_replay(state: &mut GameState) {
    if state.replay.is_finished() {
        state.finish_replay();
        state.set_screen(Screen::Menu);
        return;
    }

    let speed = state.settings.replay.playback_speed;
    if let Some(frame) = state.replay.advance(speed).cloned() {
        state.show_frame(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::highscores::BestScores;
    use crate::settings::Settings;
    use crate::sim::{GameMode, Intent};

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(Settings::default(), seed, BestScores::default());
        assert!(state.apply_intent(Intent::StateChange(Screen::Playing)));
        state
    }

    /// Absolute-position autopilot: sit in the middle of the next gap
    fn park_in_gap(state: &mut GameState) {
        let reach = state.player.x - state.player.radius;
        let target = state
            .obstacles
            .iter()
            .find(|o| o.right() >= reach)
            .map(|o| o.top.max.y + o.gap_span() / 2.0)
            .unwrap_or(state.settings().world.height / 2.0);
        state.set_absolute_position(target);
    }

    fn sensor_state(seed: u64) -> GameState {
        let mut state = GameState::new(Settings::default(), seed, BestScores::default());
        assert!(state.request_mode_change(GameMode::Potentiometer));
        assert!(state.request_state_change(Screen::Playing));
        state
    }

    fn run_until_crash(state: &mut GameState, max_ticks: usize) {
        for _ in 0..max_ticks {
            if state.screen() != Screen::Playing {
                break;
            }
            tick(state, SIM_DT);
        }
    }

    #[test]
    fn test_menu_tick_is_idle() {
        let mut state = GameState::new(Settings::default(), 1, BestScores::default());
        let y = state.player.y;
        tick(&mut state, SIM_DT);
        assert_eq!(state.screen(), Screen::Menu);
        assert_eq!(state.player.y, y);
    }

    #[test]
    fn test_falling_player_hits_floor() {
        let mut state = playing_state(5);
        run_until_crash(&mut state, 600);

        assert_eq!(state.screen(), Screen::GameOver);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::SessionEnded {
                abandoned: false,
                ..
            }
        )));
        assert!(events.contains(&GameEvent::StateChanged {
            from: Screen::Playing,
            to: Screen::GameOver
        }));
        assert!(!state.replay().is_recording());
        assert!(state.replay().has_replay());
    }

    #[test]
    fn test_overlay_freezes_simulation() {
        let mut state = playing_state(5);
        tick(&mut state, SIM_DT);
        state.request_overlay_toggle();

        let frozen_y = state.player.y;
        let frozen_x = state.obstacles[0].x();
        let frames = state.replay().len();
        for _ in 0..120 {
            tick(&mut state, SIM_DT);
        }
        assert_eq!(state.player.y, frozen_y);
        assert_eq!(state.obstacles[0].x(), frozen_x);
        assert_eq!(state.replay().len(), frames);
        assert_eq!(state.screen(), Screen::Playing);

        state.request_overlay_toggle();
        tick(&mut state, SIM_DT);
        assert_ne!(state.player.y, frozen_y);
    }

    #[test]
    fn test_spawn_is_time_gated() {
        let mut state = sensor_state(8);
        state.obstacles.clear();
        let interval = state.difficulty.spawn_interval;

        let ticks_per_spawn = (interval / SIM_DT).ceil() as usize;
        for _ in 0..ticks_per_spawn - 1 {
            tick(&mut state, SIM_DT);
        }
        assert!(state.obstacles.is_empty());
        tick(&mut state, SIM_DT);
        tick(&mut state, SIM_DT);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].id, 2);
    }

    #[test]
    fn test_absolute_position_skips_gravity() {
        let mut state = GameState::new(Settings::default(), 2, BestScores::default());
        state.request_mode_change(GameMode::Ultrasound);
        state.request_state_change(Screen::Playing);

        assert!(state.set_absolute_position(400.0));
        tick(&mut state, SIM_DT);
        assert_eq!(state.player.y, 400.0);
        assert_eq!(state.player.vy, 0.0);
    }

    #[test]
    fn test_scoring_raises_difficulty() {
        let mut state = sensor_state(77);
        let start = state.difficulty.clone();
        for _ in 0..3000 {
            if state.screen() != Screen::Playing || state.score() >= 3 {
                break;
            }
            park_in_gap(&mut state);
            tick(&mut state, SIM_DT);
        }

        assert_eq!(state.screen(), Screen::Playing);
        assert_eq!(state.score(), 3);
        assert!(state.difficulty.speed > start.speed);
        assert!(state.difficulty.gap < start.gap);
        assert!(state.obstacles.iter().filter(|o| o.scored).count() <= 3);

        let events = state.drain_events();
        let scored: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Scored { score, .. } => Some(*score),
                _ => None,
            })
            .collect();
        assert_eq!(scored, vec![1, 2, 3]);
        // Every point beat a zero best
        assert!(events.contains(&GameEvent::NewBest {
            mode: GameMode::Potentiometer,
            best: 3
        }));
    }

    #[test]
    fn test_menu_play_gameover_play() {
        let mut state = GameState::new(Settings::default(), 4, BestScores::default());
        assert!(state.request_state_change(Screen::Playing));
        run_until_crash(&mut state, 600);
        assert_eq!(state.screen(), Screen::GameOver);

        assert!(state.request_state_change(Screen::Playing));
        assert_eq!(state.screen(), Screen::Playing);
        assert_eq!(state.score(), 0);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.replay().is_recording());
        assert!(state.replay().is_empty());
    }

    #[test]
    fn test_replay_plays_back_and_returns_to_menu() {
        let mut state = playing_state(6);
        run_until_crash(&mut state, 600);
        let recorded = state.replay().len();
        assert!(recorded > 0);

        assert!(state.apply_intent(Intent::ReplayStart));
        assert_eq!(state.screen(), Screen::Replay);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score(), 0);

        let first_y = state.replay().frames()[1].player_y;
        tick(&mut state, SIM_DT);
        // Two frames per tick: the second frame is shown
        assert_eq!(state.player.y, first_y);

        let speed = state.settings().replay.playback_speed;
        let ticks = recorded.div_ceil(speed) + 1;
        for _ in 0..ticks {
            tick(&mut state, SIM_DT);
        }
        assert_eq!(state.screen(), Screen::Menu);
        assert!(state.drain_events().contains(&GameEvent::ReplayFinished));
    }

    #[test]
    fn test_replay_can_be_left_early() {
        let mut state = playing_state(6);
        run_until_crash(&mut state, 600);
        state.request_replay_start();
        tick(&mut state, SIM_DT);

        assert!(state.request_state_change(Screen::Menu));
        assert!(!state.replay().is_playing());
        // The recording survives for another viewing
        assert!(state.request_replay_start());
    }

    #[test]
    fn test_obstacle_hit_ends_session() {
        let mut state = sensor_state(21);
        let first = state.obstacles[0].clone();
        let contact = state.player.x + state.player.radius;
        // Inside whichever barrier is taller, clear of the world bounds
        let blocked_y = if first.top.height() >= first.bottom.height() {
            90.0
        } else {
            830.0
        };

        let mut ticks = 0;
        while state.screen() == Screen::Playing && ticks < 400 {
            let approaching = state.obstacles[0].x() <= contact + 50.0;
            if approaching {
                assert!(state.set_absolute_position(blocked_y));
            } else {
                park_in_gap(&mut state);
            }
            tick(&mut state, SIM_DT);
            ticks += 1;
        }

        assert_eq!(state.screen(), Screen::GameOver);
        assert_eq!(state.obstacles[0].id, first.id);
        assert!(state.obstacles[0].x() <= contact);
        assert!(!check_bounds_collision(
            state.player.y,
            state.player.radius,
            state.settings().world.height
        ));

        assert!(state.request_state_change(Screen::Playing));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::SessionEnded {
            mode: GameMode::Potentiometer,
            score: 0,
            new_best: false,
            abandoned: false,
        }));
        let transitions: Vec<(Screen, Screen)> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (Screen::Menu, Screen::Playing),
                (Screen::Playing, Screen::GameOver),
                (Screen::GameOver, Screen::Playing),
            ]
        );
    }

    #[test]
    fn test_replay_keeps_obstacle_ids() {
        let mut settings = Settings::default();
        settings.replay.playback_speed = 1;
        let mut state = GameState::new(settings, 77, BestScores::default());
        state.request_mode_change(GameMode::Potentiometer);
        state.request_state_change(Screen::Playing);

        let ids = |state: &GameState| state.obstacles.iter().map(|o| o.id).collect::<Vec<_>>();
        let mut live = Vec::new();
        for _ in 0..400 {
            park_in_gap(&mut state);
            tick(&mut state, SIM_DT);
            live.push(ids(&state));
        }
        assert_eq!(state.screen(), Screen::Playing);
        // The first pair scrolled off during the session
        assert!(live.last().is_some_and(|last| !last.contains(&1)));

        assert!(state.request_state_change(Screen::Menu));
        assert!(state.request_replay_start());
        let mut replayed = Vec::new();
        for _ in 0..live.len() {
            tick(&mut state, SIM_DT);
            replayed.push(ids(&state));
        }
        assert_eq!(replayed, live);

        tick(&mut state, SIM_DT);
        assert_eq!(state.screen(), Screen::Menu);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = playing_state(99999);
        let mut state2 = playing_state(99999);

        for i in 0..400 {
            if i % 9 == 0 {
                state1.apply_intent(Intent::Flap);
                state2.apply_intent(Intent::Flap);
            }
            tick(&mut state1, SIM_DT);
            tick(&mut state2, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.screen(), state2.screen());
        assert_eq!(state1.score(), state2.score());
        assert_eq!(state1.snapshot(), state2.snapshot());
    }
}
