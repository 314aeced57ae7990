//! Brickfall - A Breakout-style arcade simulation
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (physics, collisions, modifiers, game state)
//! - `settings`: Construction-time configuration
//! - `highscores`: Top-5 leaderboard
//! - `audio`: Sound cues derived from game events
//!
//! Rendering, raw input polling and audio output are left to the caller.

pub mod audio;
pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Game tuning constants
pub mod consts {
    /// Nominal frame step used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Paddle defaults - paddle sits 20px above the bottom edge
    pub const PADDLE_WIDTH: f32 = 50.0;
    pub const PADDLE_HEIGHT: f32 = 10.0;
    pub const PADDLE_BOTTOM_OFFSET: f32 = 20.0;
    /// Width easing rate toward base width (pixels/s)
    pub const PADDLE_RESIZE_RATE: f32 = 60.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 5.0;
    /// Level 1 ball speed is BASE + STEP
    pub const BALL_BASE_SPEED: f32 = 300.0;
    pub const BALL_SPEED_STEP: f32 = 50.0;

    /// Brick grid layout
    pub const BRICK_WIDTH: f32 = 20.0;
    pub const BRICK_HEIGHT: f32 = 5.0;
    pub const BRICK_COLUMN_PITCH: f32 = 22.0;
    pub const BRICK_ROW_PITCH: f32 = 10.0;
    pub const BRICK_TOP: f32 = 20.0;
    pub const BRICK_ROWS: u32 = 8;

    /// Level time budget per level (seconds)
    pub const LEVEL_TIME_STEP: f32 = 120.0;

    /// Modifier pickups
    pub const MODIFIER_RADIUS: f32 = 5.0;
    pub const MODIFIER_FALL_SPEED: f32 = 120.0;

    /// Modifier effect strengths
    pub const FAST_BALL_BOOST: f32 = 150.0;
    pub const WIDE_PADDLE_BONUS: f32 = 25.0;
    pub const EXTRA_BALL_COUNT: usize = 2;
    pub const EXTRAVAGANZA_BALL_COUNT: usize = 8;
    pub const EXTRAVAGANZA_BOOST: f32 = 300.0;
    /// Half-angle of the fan new balls are spread over (degrees from vertical)
    pub const SPAWN_SPREAD_DEGREES: f32 = 60.0;

    /// Modifier durations (seconds)
    pub const FAST_BALL_DURATION: f32 = 10.0;
    pub const WIDE_PADDLE_DURATION: f32 = 15.0;
    pub const EXTRAVAGANZA_DURATION: f32 = 8.0;
}

/// Unit direction for an angle measured in degrees from the +x axis,
/// with screen-space y pointing down (90 degrees is straight up).
#[inline]
pub fn direction_from_degrees(angle: f32) -> Vec2 {
    let rad = angle.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Axis-aligned rectangle (top-left origin, screen space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive overlap test (touching edges count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}
