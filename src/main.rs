//! Flap Sim - headless demo
//!
//! Plays one autopilot session in real time, then watches its replay.
//! Usage: `flap-sim [seed] [mode]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use flap_sim::consts::SIM_DT;
    use flap_sim::persistence::JsonFileStore;
    use flap_sim::platform::SystemClock;
    use flap_sim::sim::{GameEvent, GameMode, Screen};
    use flap_sim::{Driver, Settings};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    env_logger::init();
    log::info!("Flap Sim (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
    let mode = args
        .next()
        .and_then(|s| GameMode::from_str(&s))
        .unwrap_or_default();

    let settings = Settings::load_or_default(Settings::FILE_NAME);
    let store = JsonFileStore::new(&settings.best_scores_file);
    let mut driver = Driver::new(settings, seed, SystemClock::new(), store);

    driver.change_mode(mode);
    driver.change_state(Screen::Playing);

    let frame = Duration::from_secs_f32(SIM_DT);
    // Two minutes of play at most
    for _ in 0..60 * 120 {
        driver.run_frame();
        if driver.state().screen() != Screen::Playing {
            break;
        }
        autopilot(&mut driver);
        std::thread::sleep(frame);
    }

    for event in driver.drain_events() {
        if let GameEvent::SessionEnded {
            mode,
            score,
            new_best,
            ..
        } = event
        {
            log::info!(
                "{} session over: score {}{}",
                mode.as_str(),
                score,
                if new_best { " (new best!)" } else { "" }
            );
        }
    }

    if driver.state().screen() == Screen::Playing {
        driver.change_state(Screen::Menu);
    }
    driver.start_replay();
    driver.run_frame();

    let frames = driver.state().replay().len();
    log::info!("Watching replay ({} frames)", frames);
    while driver.state().screen() == Screen::Replay {
        std::thread::sleep(frame);
        driver.run_frame();
        for event in driver.drain_events() {
            if event == GameEvent::ReplayFinished {
                log::info!("Replay finished");
            }
        }
    }

    let snapshot = driver.snapshot();
    log::info!(
        "Best scores: {}",
        serde_json::to_string(&snapshot.best_scores).unwrap_or_default()
    );
}

/// Steer toward the middle of the next gap
#[cfg(not(target_arch = "wasm32"))]
fn autopilot<C, S>(driver: &mut flap_sim::Driver<C, S>)
where
    C: flap_sim::platform::Clock,
    S: flap_sim::persistence::BestScoreStore,
{
    let state = driver.state();
    let player = &state.player;
    let target = state
        .obstacles
        .iter()
        .find(|o| o.right() >= player.x - player.radius)
        .map(|o| o.top.max.y + o.gap_span() / 2.0)
        .unwrap_or(state.settings().world.height / 2.0);

    if state.scheme().accepts_position() {
        driver.set_position(target);
    } else if player.y > target + 20.0 && player.vy >= 0.0 {
        driver.flap();
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless host on wasm; embedders drive `flap_sim::Driver` directly
}
