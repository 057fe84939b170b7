//! Game controller: input intents and the screen state machine
//!
//! Every request is validated against the current screen and overlay and
//! answers `true` when applied. Rejected requests leave the state untouched.

use serde::{Deserialize, Serialize};

use super::obstacles::DifficultyState;
use super::physics::apply_flap;
use super::state::{GameEvent, GameMode, GameState, Overlay, OverlayKind, Screen};

/// Device-independent input commands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    Flap,
    ModeChange(GameMode),
    StateChange(Screen),
    OverlayToggle,
    ReplayStart,
    /// Sensor-reported vertical position (absolute-position schemes)
    SetAbsolutePosition(f32),
}

impl GameState {
    /// Dispatch an intent to its request handler
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::Flap => self.request_flap(),
            Intent::ModeChange(mode) => self.request_mode_change(mode),
            Intent::StateChange(screen) => self.request_state_change(screen),
            Intent::OverlayToggle => self.request_overlay_toggle(),
            Intent::ReplayStart => self.request_replay_start(),
            Intent::SetAbsolutePosition(y) => self.set_absolute_position(y),
        }
    }

    /// Replace the player's velocity with the flap impulse
    pub fn request_flap(&mut self) -> bool {
        if !self.accepts_gameplay_input() || !self.scheme().accepts_flap() {
            return false;
        }
        self.player.vy = apply_flap(self.settings.physics.flap_impulse);
        self.events.push(GameEvent::Flapped);
        true
    }

    /// Place the player at a sensor-reported height, clamped to the world
    pub fn set_absolute_position(&mut self, y: f32) -> bool {
        if !self.accepts_gameplay_input() || !self.scheme().accepts_position() || !y.is_finite() {
            return false;
        }
        self.player.y = y.clamp(0.0, self.settings.world.height);
        self.player.vy = 0.0;
        true
    }

    /// Select the input mode (MENU only)
    pub fn request_mode_change(&mut self, mode: GameMode) -> bool {
        if self.screen != Screen::Menu || self.overlay.is_some() {
            log::debug!("Mode change to {} rejected in {}", mode.as_str(), self.screen.as_str());
            return false;
        }
        if mode == self.mode {
            return false;
        }
        log::info!("Mode: {} -> {}", self.mode.as_str(), mode.as_str());
        self.mode = mode;
        self.events.push(GameEvent::ModeChanged(mode));
        true
    }

    /// Show or dismiss the info overlay over the current screen
    pub fn request_overlay_toggle(&mut self) -> bool {
        match self.overlay.take() {
            Some(overlay) => {
                // Dismissal restores the screen the overlay was raised over
                self.screen = overlay.resume;
                log::info!("Overlay {:?} hidden", overlay.kind);
                self.events.push(GameEvent::OverlayHidden(overlay.kind));
            }
            None => {
                let kind = OverlayKind::Info;
                self.overlay = Some(Overlay {
                    kind,
                    resume: self.screen,
                });
                log::info!("Overlay {:?} shown over {}", kind, self.screen.as_str());
                self.events.push(GameEvent::OverlayShown(kind));
            }
        }
        true
    }

    /// Start playback of the last recorded session
    pub fn request_replay_start(&mut self) -> bool {
        self.request_state_change(Screen::Replay)
    }

    /// Validate and perform a screen transition
    ///
    /// GAME_OVER is only reached by a crash, never by request.
    pub fn request_state_change(&mut self, target: Screen) -> bool {
        if self.overlay.is_some() {
            log::debug!("Transition to {} rejected: overlay active", target.as_str());
            return false;
        }
        if target == self.screen {
            return false;
        }

        let applied = match (self.screen, target) {
            (Screen::Menu | Screen::GameOver, Screen::Playing) => {
                self.start_session();
                true
            }
            (Screen::Menu | Screen::GameOver, Screen::Replay) => self.start_replay(),
            (_, Screen::Menu) => {
                self.return_to_menu();
                true
            }
            _ => false,
        };

        if !applied {
            log::debug!(
                "Transition {} -> {} rejected",
                self.screen.as_str(),
                target.as_str()
            );
        }
        applied
    }

    /// Whether PLAYING input (flap, position) is live right now
    fn accepts_gameplay_input(&self) -> bool {
        self.screen == Screen::Playing && self.overlay.is_none()
    }

    pub(crate) fn set_screen(&mut self, to: Screen) {
        let from = self.screen;
        if from == to {
            return;
        }
        self.screen = to;
        log::info!("State: {} -> {}", from.as_str(), to.as_str());
        self.events.push(GameEvent::StateChanged { from, to });
    }

    /// Fresh session: player, difficulty, obstacles, score and recording
    fn start_session(&mut self) {
        self.replay.stop_playback();
        self.center_player();
        self.difficulty = DifficultyState::new(&self.settings.difficulty);
        self.obstacles.clear();
        self.generator.reset();
        let first = self.generator.spawn(
            &self.difficulty,
            &self.settings.world,
            &self.settings.obstacles,
            &self.settings.difficulty,
            true,
        );
        self.obstacles.push(first);
        self.spawn_elapsed = 0.0;
        self.ledger.reset_session();
        self.replay.start_recording();

        log::info!(
            "Session started: mode={} scheme={} best={}",
            self.mode.as_str(),
            self.scheme().as_str(),
            self.ledger.best(self.mode)
        );
        self.set_screen(Screen::Playing);
    }

    /// Close the running session; `abandoned` when left without a crash
    pub(crate) fn end_session(&mut self, abandoned: bool) {
        self.replay.stop_recording();
        let score = self.ledger.score();
        let new_best = self.ledger.session_new_best();
        log::info!(
            "Session ended: mode={} score={} best={}{}",
            self.mode.as_str(),
            score,
            self.ledger.best(self.mode),
            if abandoned { " (abandoned)" } else { "" }
        );
        self.events.push(GameEvent::SessionEnded {
            mode: self.mode,
            score,
            new_best,
            abandoned,
        });
    }

    fn return_to_menu(&mut self) {
        match self.screen {
            Screen::Playing => {
                self.end_session(true);
                self.obstacles.clear();
                self.center_player();
                self.ledger.reset_session();
            }
            Screen::Replay => self.finish_replay(),
            _ => {}
        }
        self.set_screen(Screen::Menu);
    }

    /// Neutral view, then playback from the first frame
    fn start_replay(&mut self) -> bool {
        if !self.replay.start_playback() {
            return false;
        }
        self.obstacles.clear();
        self.center_player();
        self.ledger.show_score(0);
        let frames = self.replay.len();
        self.events.push(GameEvent::ReplayStarted { frames });
        self.set_screen(Screen::Replay);
        true
    }

    /// Stop playback and clear the replayed view
    pub(crate) fn finish_replay(&mut self) {
        self.replay.stop_playback();
        self.obstacles.clear();
        self.center_player();
        self.ledger.show_score(0);
        self.events.push(GameEvent::ReplayFinished);
    }
}
