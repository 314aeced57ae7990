//! Level progression and score decay

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Per-level difficulty scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub current_level: u32,
    /// Brick durability, equal to the level number
    pub hit_multiplier: u32,
    /// Speed new balls start at this level (pixels/s)
    pub ball_speed: f32,
    /// Seconds until the level's score decays to zero
    pub max_time: f32,
    /// Seconds of play spent on this level
    pub time_spent: f32,
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelProgress {
    pub fn new() -> Self {
        let level = 1;
        Self {
            current_level: level,
            hit_multiplier: level,
            ball_speed: BALL_BASE_SPEED + level as f32 * BALL_SPEED_STEP,
            max_time: LEVEL_TIME_STEP * level as f32,
            time_spent: 0.0,
        }
    }

    pub fn increase_level(&mut self) {
        self.current_level += 1;
        self.hit_multiplier += 1;
        self.ball_speed += BALL_SPEED_STEP;
        self.max_time += LEVEL_TIME_STEP;
        self.time_spent = 0.0;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// `max(0, round(max_points * (1 - time_spent / max_time)))`
pub fn level_score(max_points: u32, time_spent: f32, max_time: f32) -> u64 {
    if max_time <= 0.0 {
        return 0;
    }
    let score = (f64::from(max_points) * (1.0 - f64::from(time_spent) / f64::from(max_time))).round();
    score.max(0.0) as u64
}
