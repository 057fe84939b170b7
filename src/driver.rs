//! Host-loop adapter
//!
//! Owns one [`GameState`] plus everything around it that is not pure
//! simulation: the frame timer, the queued intents, the fixed-step
//! accumulator and best-score persistence.

use std::collections::VecDeque;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::highscores::BestScores;
use crate::persistence::BestScoreStore;
use crate::platform::Clock;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameMode, GameState, Intent, Screen, Snapshot, Timer, tick};

/// Drives a game from any host loop: call [`Driver::run_frame`] once per frame
pub struct Driver<C: Clock, S: BestScoreStore> {
    state: GameState,
    timer: Timer<C>,
    store: S,
    intents: VecDeque<Intent>,
    accumulator: f32,
    /// Timer reading at the previous frame
    last_elapsed: f64,
    events: Vec<GameEvent>,
}

impl<C: Clock, S: BestScoreStore> Driver<C, S> {
    /// New game in MENU; best scores come from `store` (zero on failure)
    pub fn new(settings: Settings, seed: u64, clock: C, mut store: S) -> Self {
        let best = load_best_scores(&mut store);
        let mut timer = Timer::new(clock);
        timer.start();
        log::info!("Driver ready (seed {})", seed);

        Self {
            state: GameState::new(settings, seed, best),
            timer,
            store,
            intents: VecDeque::new(),
            accumulator: 0.0,
            last_elapsed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn timer(&self) -> &Timer<C> {
        &self.timer
    }

    /// Queue an intent for the next frame
    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push_back(intent);
    }

    pub fn pending_intents(&self) -> usize {
        self.intents.len()
    }

    pub fn flap(&mut self) {
        self.push_intent(Intent::Flap);
    }

    pub fn change_mode(&mut self, mode: GameMode) {
        self.push_intent(Intent::ModeChange(mode));
    }

    pub fn change_state(&mut self, screen: Screen) {
        self.push_intent(Intent::StateChange(screen));
    }

    pub fn toggle_overlay(&mut self) {
        self.push_intent(Intent::OverlayToggle);
    }

    pub fn start_replay(&mut self) {
        self.push_intent(Intent::ReplayStart);
    }

    pub fn set_position(&mut self, y: f32) {
        self.push_intent(Intent::SetAbsolutePosition(y));
    }

    /// Apply queued intents, then run as many fixed ticks as elapsed time allows
    ///
    /// Returns the number of ticks run. A frame that raises the overlay runs
    /// no ticks, and the time since the previous frame is dropped rather than
    /// carried past the dismissal.
    pub fn run_frame(&mut self) -> u32 {
        while let Some(intent) = self.intents.pop_front() {
            if !self.state.apply_intent(intent) {
                log::debug!("Intent {:?} not applied", intent);
            }
        }
        self.collect_events();

        // No dt builds up behind an overlay
        if self.state.is_overlay_active() {
            self.timer.pause();
        } else {
            self.timer.start();
        }

        let elapsed = self.timer.elapsed();
        let dt = (elapsed - self.last_elapsed).max(0.0) as f32;
        self.last_elapsed = elapsed;
        if self.state.is_overlay_active() {
            return 0;
        }
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.collect_events();
        }

        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        substeps
    }

    /// Events since the last drain, in emission order
    ///
    /// The outbox is unbounded; hosts drain it every frame.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move state events to the outbox, persisting when a session ends
    fn collect_events(&mut self) {
        for event in self.state.drain_events() {
            if let GameEvent::SessionEnded { abandoned, .. } = &event {
                // A crash always saves; an abandoned session only with a new best
                if !*abandoned || self.state.ledger().is_dirty() {
                    self.persist_best_scores();
                }
            }
            self.events.push(event);
        }
    }

    fn persist_best_scores(&mut self) {
        match self.store.save(self.state.best_scores()) {
            Ok(()) => self.state.mark_best_scores_saved(),
            Err(e) => log::warn!("Failed to save best scores: {}", e),
        }
    }
}

fn load_best_scores<S: BestScoreStore>(store: &mut S) -> BestScores {
    match store.load() {
        Ok(scores) => scores,
        Err(e) if e.is_not_found() => {
            log::info!("No saved best scores, starting from zero");
            BestScores::default()
        }
        Err(e) => {
            log::warn!("Failed to load best scores: {}", e);
            BestScores::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::ManualClock;

    fn driver_with(store: MemoryStore) -> (Driver<ManualClock, MemoryStore>, ManualClock) {
        let clock = ManualClock::new();
        let driver = Driver::new(Settings::default(), 2024, clock.clone(), store);
        (driver, clock)
    }

    /// Advance one tick of wall time and run a frame
    fn step(driver: &mut Driver<ManualClock, MemoryStore>, clock: &ManualClock) -> u32 {
        clock.advance(SIM_DT as f64);
        driver.run_frame()
    }

    fn play_until_game_over(driver: &mut Driver<ManualClock, MemoryStore>, clock: &ManualClock) {
        for _ in 0..2000 {
            if driver.state().screen() == Screen::GameOver {
                return;
            }
            step(driver, clock);
        }
        panic!("session never ended");
    }

    #[test]
    fn test_load_failure_falls_back_to_zero() {
        let (driver, _) = driver_with(MemoryStore::failing());
        assert_eq!(driver.state().best_scores(), &BestScores::default());

        let (driver, _) = driver_with(MemoryStore::new());
        assert_eq!(driver.state().best_scores().top_score(), 0);
    }

    #[test]
    fn test_loads_existing_scores() {
        let mut scores = BestScores::default();
        scores.set(GameMode::Infrared, 9);
        let (driver, _) = driver_with(MemoryStore::with_scores(scores.clone()));
        assert_eq!(driver.state().best_scores(), &scores);
    }

    #[test]
    fn test_fixed_steps_per_frame() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        driver.change_state(Screen::Playing);
        assert_eq!(step(&mut driver, &clock), 1);
        assert_eq!(driver.state().time_ticks, 1);

        // No time passed: no tick
        assert_eq!(driver.run_frame(), 0);
    }

    #[test]
    fn test_substeps_are_capped() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        clock.advance(1.0);
        assert_eq!(driver.run_frame(), MAX_SUBSTEPS);
        // The backlog is dropped, not replayed next frame
        assert_eq!(step(&mut driver, &clock), 1);
    }

    #[test]
    fn test_intents_apply_before_ticks() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        driver.change_state(Screen::Playing);
        driver.flap();
        assert_eq!(driver.pending_intents(), 2);

        // Flap is applied after the start, then gravity runs once
        step(&mut driver, &clock);
        assert_eq!(driver.pending_intents(), 0);
        let physics = &driver.state().settings().physics;
        assert_eq!(driver.state().player.vy, physics.flap_impulse + physics.gravity);
    }

    #[test]
    fn test_overlay_pauses_timer() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        driver.change_state(Screen::Playing);
        step(&mut driver, &clock);

        driver.toggle_overlay();
        driver.run_frame();
        assert!(driver.timer().is_paused());
        let frozen = driver.timer().elapsed();

        clock.advance(30.0);
        assert_eq!(driver.run_frame(), 0);
        assert_eq!(driver.timer().elapsed(), frozen);

        // Dismissal resumes without a catch-up burst
        driver.toggle_overlay();
        assert_eq!(driver.run_frame(), 0);
        assert_eq!(step(&mut driver, &clock), 1);
    }

    #[test]
    fn test_time_before_overlay_is_dropped() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        driver.change_state(Screen::Playing);
        step(&mut driver, &clock);
        assert_eq!(driver.state().time_ticks, 1);

        // Half a second passes, then the overlay goes up in the same frame
        clock.advance(0.5);
        driver.toggle_overlay();
        assert_eq!(driver.run_frame(), 0);

        driver.toggle_overlay();
        assert_eq!(driver.run_frame(), 0);
        assert_eq!(driver.state().time_ticks, 1);
        assert_eq!(step(&mut driver, &clock), 1);
        assert_eq!(driver.state().time_ticks, 2);
    }

    #[test]
    fn test_drained_outbox_stays_small() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        driver.change_state(Screen::Playing);
        play_until_game_over(&mut driver, &clock);
        assert!(!driver.drain_events().is_empty());

        driver.start_replay();
        let mut finished = false;
        for _ in 0..2000 {
            step(&mut driver, &clock);
            let events = driver.drain_events();
            assert!(events.len() <= 3);
            finished |= events.contains(&GameEvent::ReplayFinished);
            if driver.state().screen() == Screen::Menu {
                break;
            }
        }
        assert!(finished);
        assert!(driver.drain_events().is_empty());
    }

    #[test]
    fn test_game_over_persists_exactly_once() {
        let store = MemoryStore::new();
        let (mut driver, clock) = driver_with(store.clone());
        driver.change_state(Screen::Playing);
        play_until_game_over(&mut driver, &clock);
        assert_eq!(store.save_count(), 1);

        // Idling on GAME_OVER saves nothing more
        for _ in 0..60 {
            step(&mut driver, &clock);
        }
        assert_eq!(store.save_count(), 1);
        assert!(!driver.state().ledger().is_dirty());
    }

    #[test]
    fn test_abandon_without_new_best_does_not_save() {
        let store = MemoryStore::new();
        let (mut driver, clock) = driver_with(store.clone());
        driver.change_state(Screen::Playing);
        step(&mut driver, &clock);
        driver.change_state(Screen::Menu);
        step(&mut driver, &clock);

        assert_eq!(driver.state().screen(), Screen::Menu);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let (mut driver, clock) = driver_with(MemoryStore::failing());
        driver.change_state(Screen::Playing);
        play_until_game_over(&mut driver, &clock);
        assert_eq!(driver.state().screen(), Screen::GameOver);
    }

    #[test]
    fn test_events_reach_outbox() {
        let (mut driver, clock) = driver_with(MemoryStore::new());
        driver.change_mode(GameMode::Ultrasound);
        driver.change_state(Screen::Playing);
        step(&mut driver, &clock);

        let events = driver.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::ModeChanged(GameMode::Ultrasound),
                GameEvent::StateChanged {
                    from: Screen::Menu,
                    to: Screen::Playing
                },
            ]
        );
        assert!(driver.drain_events().is_empty());
    }
}
