//! Game settings
//!
//! Constants consumed when a `GameState` is built. Persisted as JSON next to
//! the binary; the simulation itself never touches the filesystem.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult, check_positive, check_probability};

/// Construction-time configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Field ===
    /// Side length of the square play field (pixels)
    pub field_size: f32,

    // === Ball ===
    /// Speed cap applied to every ball after each frame (pixels/s)
    pub max_ball_speed: f32,
    /// Maximum deflection from vertical off the paddle edge (degrees)
    pub paddle_max_angle: f32,

    // === Paddle ===
    /// Horizontal paddle speed for move commands (pixels/s)
    pub paddle_speed: f32,

    // === Modifiers ===
    /// Chance a destroyed brick drops a modifier
    pub modifier_drop_rate: f32,
    /// Per-frame chance of a modifier falling from the top while none are falling
    pub random_drop_chance: f32,
    /// Cap on concurrently falling modifiers
    pub max_dropped_modifiers: usize,

    // === Rules ===
    pub starting_lives: u8,
    /// Points available per level before time decay
    pub max_points: u32,

    /// RNG seed for drops and modifier choice
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_size: 500.0,

            max_ball_speed: 1500.0,
            paddle_max_angle: 45.0,

            paddle_speed: 300.0,

            modifier_drop_rate: 0.2,
            random_drop_chance: 1.0 / 500.0,
            max_dropped_modifiers: 5,

            starting_lives: 3,
            max_points: 100_000,

            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Reject configurations that indicate a caller bug
    pub fn validate(&self) -> SimResult<()> {
        check_positive("field_size", self.field_size)?;
        check_positive("max_ball_speed", self.max_ball_speed)?;
        check_positive("paddle_speed", self.paddle_speed)?;
        check_probability("modifier_drop_rate", self.modifier_drop_rate)?;
        check_probability("random_drop_chance", self.random_drop_chance)?;

        if !(self.paddle_max_angle > 0.0 && self.paddle_max_angle < 90.0) {
            return Err(SimError::InvalidSetting {
                name: "paddle_max_angle",
                reason: "must be between 0 and 90 degrees (exclusive)",
            });
        }
        if self.max_dropped_modifiers == 0 {
            return Err(SimError::InvalidSetting {
                name: "max_dropped_modifiers",
                reason: "must allow at least one falling modifier",
            });
        }
        if self.starting_lives == 0 {
            return Err(SimError::InvalidSetting {
                name: "starting_lives",
                reason: "must be at least 1",
            });
        }
        if self.max_points == 0 {
            return Err(SimError::InvalidSetting {
                name: "max_points",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty-printed JSON
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
