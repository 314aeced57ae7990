//! Brickfall headless runner
//!
//! Plays the simulation in idle mode at a fixed 60 Hz step, logs what
//! happens, and records the final score in the high-score table.
//!
//! Usage: `brickfall [settings.json] [player-name]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use brickfall::audio::{AudioManager, LogBackend};
    use brickfall::consts::FRAME_DT;
    use brickfall::sim::{GameEvent, GameState, TickInput, tick};
    use brickfall::{HighScores, Settings};

    /// Longest demo run in simulated seconds
    const MAX_RUN_SECONDS: f32 = 600.0;
    const HIGH_SCORE_FILE: &str = "highscores.json";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Brickfall (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load_from(Path::new(&path)),
        None => Settings::default(),
    };
    let player = args.next().unwrap_or_else(|| "AUTO".to_string());

    let mut state = match GameState::new(settings) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid settings ({}): {}", e.code(), e);
            std::process::exit(2);
        }
    };
    let mut audio = AudioManager::new(LogBackend);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let max_frames = (MAX_RUN_SECONDS / FRAME_DT) as u64;
    let mut frames = 0u64;
    while frames < max_frames && !state.lost_game() {
        if let Err(e) = tick(&mut state, &input, FRAME_DT) {
            log::error!("Simulation error: {}", e);
            std::process::exit(1);
        }
        let events = state.drain_events();
        for event in &events {
            if let GameEvent::LevelCleared { level, level_points } = event {
                log::info!("Cleared level {} (+{})", level, level_points);
            }
        }
        audio.handle_events(&events);
        frames += 1;
    }

    let score = state.final_score();
    let level = state.level.current_level;
    log::info!(
        "Finished after {:.1}s: score {}, level {}, lives {}",
        frames as f32 * FRAME_DT,
        score,
        level,
        state.lives
    );

    let path = Path::new(HIGH_SCORE_FILE);
    let mut scores = HighScores::load_from(path);
    if let Some(rank) = scores.add_score(&player, score, level) {
        log::info!("New high score for {} at rank {}", player, rank);
        if let Err(e) = scores.save_to(path) {
            log::warn!("Failed to save high scores: {}", e);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the embedding page; nothing to run here
}
