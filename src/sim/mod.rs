//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - Time is supplied by the caller as a per-frame delta
//! - Seeded RNG only, so a seed and an input sequence replay the same game
//! - `GameState` owns every entity collection
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod level;
pub mod modifier;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{CollisionTarget, ball_rect_collision, find_collision};
pub use grid::{Brick, BrickGrid, color_for_row};
pub use level::{LevelProgress, level_score};
pub use modifier::{EffectContext, Modifier, ModifierClass, ModifierKind, ModifierSystem};
pub use physics::EdgeContact;
pub use state::{
    Ball, Color, GameEvent, GamePhase, GameState, Paddle, PaddleDirection, ResetKind,
};
pub use tick::{TickInput, tick};
