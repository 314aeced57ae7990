//! Game state and core simulation types
//!
//! `GameState` is the single owner of every entity collection. Effects that
//! cross entities (modifiers touching balls or the paddle) only happen through
//! its methods.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::BrickGrid;
use super::level::{LevelProgress, level_score};
use super::modifier::{EffectContext, Modifier, ModifierKind, ModifierSystem};
use crate::Rect;
use crate::consts::*;
use crate::error::{SimError, SimResult, check_dt};
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball resting on the paddle, waiting for launch input
    PreGame,
    /// Active gameplay
    Playing,
    /// Level cleared; next level is laid out and waits for acknowledgement
    Won,
    /// Out of lives; frozen until restart
    Lost,
}

/// Discrete notifications for presentation and audio collaborators.
/// Raised once per occurrence and drained by the caller each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    BallLaunched,
    PaddleHit,
    BrickHit { destroyed: bool },
    WallHit,
    NewRowInserted,
    ExtravaganzaStart,
    ExtravaganzaStop,
    ModifierDropped(ModifierKind),
    ModifierCaught(ModifierKind),
    ModifierExpired(ModifierKind),
    LifeLost { lives_left: u8 },
    LevelCleared { level: u32, level_points: u64 },
    GameOver { final_score: u64 },
}

/// Cosmetic colors shared by bricks and modifier pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Red,
    Orange,
    Green,
    Yellow,
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Direction of travel; zero while resting on the paddle
    pub dir: Vec2,
    pub radius: f32,
    /// Scalar speed (pixels/s)
    pub speed: f32,
    pub is_dead: bool,
    /// Bottom edge bounces instead of killing the ball
    pub death_disabled: bool,
}

impl Ball {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            dir: Vec2::ZERO,
            radius: BALL_RADIUS,
            speed,
            is_dead: false,
            death_disabled: false,
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.dir != Vec2::ZERO
    }

    /// Bounding square used for every collision test
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// The player's paddle (position is the top-left corner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    /// Current width, eased toward `base_width`
    pub width: f32,
    /// Target width
    pub base_width: f32,
    pub height: f32,
}

/// Horizontal paddle command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddleDirection {
    Left,
    Right,
}

impl Paddle {
    /// Paddle centered near the bottom of the field
    pub fn new(field_size: f32) -> Self {
        Self {
            pos: Vec2::new(
                field_size / 2.0 - PADDLE_WIDTH / 2.0,
                field_size - PADDLE_BOTTOM_OFFSET,
            ),
            width: PADDLE_WIDTH,
            base_width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Shift horizontally, staying inside the field
    pub fn move_by(&mut self, dx: f32, field_size: f32) {
        let max_x = (field_size - self.width).max(0.0);
        self.pos.x = (self.pos.x + dx).clamp(0.0, max_x);
    }

    /// Ease width toward the target without overshooting, keeping the center fixed
    pub fn ease_width(&mut self, dt: f32) {
        let diff = self.base_width - self.width;
        if diff == 0.0 {
            return;
        }
        let max_step = PADDLE_RESIZE_RATE * dt;
        if max_step >= diff.abs() {
            // Clamp on arrival
            self.pos.x -= diff / 2.0;
            self.width = self.base_width;
        } else {
            let step = max_step * diff.signum();
            self.width += step;
            self.pos.x -= step / 2.0;
        }
    }
}

/// Which reset the orchestrator performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Lose a life; bricks and level stay
    LifeLost,
    /// Fresh bricks for the next level; total score kept
    NewLevel,
    /// Back to level 1 with full lives and zero score
    Restart,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Validated; replaced only through `set_settings`
    pub(crate) settings: Settings,
    pub phase: GamePhase,
    pub lives: u8,
    /// Score the current level is worth right now (decays with time)
    pub level_points: u64,
    /// Banked score from cleared levels
    pub total_points: u64,
    /// Seconds of play since the run started
    pub elapsed_time: f32,
    pub level: LevelProgress,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: BrickGrid,
    pub modifiers: ModifierSystem,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Build a new game from validated settings
    pub fn new(settings: Settings) -> SimResult<Self> {
        settings.validate()?;

        let level = LevelProgress::new();
        let mut state = Self {
            phase: GamePhase::PreGame,
            lives: settings.starting_lives,
            level_points: u64::from(settings.max_points),
            total_points: 0,
            elapsed_time: 0.0,
            paddle: Paddle::new(settings.field_size),
            balls: Vec::new(),
            bricks: BrickGrid::new(settings.field_size),
            modifiers: ModifierSystem::new(settings.max_dropped_modifiers),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            level,
            settings,
        };

        state.bricks.generate(state.level.hit_multiplier);
        state.regenerate_objects();
        log::info!(
            "New game: field={}, bricks={}, lives={}",
            state.settings.field_size,
            state.bricks.len(),
            state.lives
        );

        Ok(state)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Swap in new settings mid-game. The field size is fixed once entities
    /// are laid out; starting lives apply from the next restart and the seed
    /// only matters to new games.
    pub fn set_settings(&mut self, settings: Settings) -> SimResult<()> {
        settings.validate()?;
        if settings.field_size != self.settings.field_size {
            return Err(SimError::InvalidSetting {
                name: "field_size",
                reason: "cannot change while a game is running",
            });
        }
        self.modifiers.set_max_dropped(settings.max_dropped_modifiers);
        self.settings = settings;
        log::info!("Settings updated");
        Ok(())
    }

    pub fn game_started(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn won_game(&self) -> bool {
        self.phase == GamePhase::Won
    }

    pub fn lost_game(&self) -> bool {
        self.phase == GamePhase::Lost
    }

    /// Stable total for the high-score table
    pub fn final_score(&self) -> u64 {
        self.total_points
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Move the paddle for one frame's worth of input
    pub fn move_paddle(&mut self, direction: PaddleDirection, dt: f32) -> SimResult<()> {
        check_dt(dt)?;
        if matches!(self.phase, GamePhase::Won | GamePhase::Lost) {
            return Ok(());
        }

        let dx = self.settings.paddle_speed * dt;
        let dx = match direction {
            PaddleDirection::Left => -dx,
            PaddleDirection::Right => dx,
        };
        self.paddle.move_by(dx, self.settings.field_size);

        if self.phase == GamePhase::PreGame {
            for ball in self.balls.iter_mut().filter(|b| !b.is_moving()) {
                ball.rest_on(&self.paddle);
            }
        }
        Ok(())
    }

    /// Launch resting balls. Only valid before play starts.
    pub fn launch(&mut self) -> bool {
        if self.phase != GamePhase::PreGame {
            return false;
        }
        for ball in self.balls.iter_mut().filter(|b| !b.is_moving()) {
            ball.begin_launch();
        }
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::BallLaunched);
        log::debug!("Ball launched on level {}", self.level.current_level);
        true
    }

    /// Acknowledge a cleared level, or start over from scratch
    pub fn restart(&mut self) {
        if self.phase == GamePhase::Won {
            self.phase = GamePhase::PreGame;
            log::info!("Continuing to level {}", self.level.current_level);
        } else {
            self.reset(ResetKind::Restart);
        }
    }

    /// Reset per `kind`. Modifiers are always wound down before entities
    /// are regenerated.
    pub fn reset(&mut self, kind: ResetKind) {
        match kind {
            ResetKind::Restart => {
                self.lives = self.settings.starting_lives;
                self.total_points = 0;
                self.elapsed_time = 0.0;
                self.level.reset();
                self.bricks.generate(self.level.hit_multiplier);
                self.phase = GamePhase::PreGame;
                log::info!("Game restarted");
            }
            ResetKind::NewLevel => {
                self.bricks.generate(self.level.hit_multiplier);
                log::info!(
                    "Level {}: {} bricks, durability {}",
                    self.level.current_level,
                    self.bricks.len(),
                    self.level.hit_multiplier
                );
            }
            ResetKind::LifeLost => {
                self.lives = self.lives.saturating_sub(1);
                self.events.push(GameEvent::LifeLost {
                    lives_left: self.lives,
                });
                log::info!("Life lost, {} left", self.lives);
                if self.lives == 0 {
                    self.lose();
                }
            }
        }

        self.reset_all_modifiers();
        self.regenerate_objects();

        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::PreGame;
        }
        self.level_points = self.current_level_score();
    }

    /// Deactivate every active modifier and discard falling ones
    pub fn reset_all_modifiers(&mut self) {
        // One at a time so each revert sees the true remaining stack
        while let Some(modifier) = self.modifiers.pop_active() {
            self.deactivate(modifier);
        }
        self.modifiers.clear_dropped();
    }

    /// Fresh paddle and one resting ball at the level's speed
    fn regenerate_objects(&mut self) {
        self.paddle = Paddle::new(self.settings.field_size);
        let mut ball = Ball::new(Vec2::ZERO, self.level.ball_speed);
        ball.rest_on(&self.paddle);
        self.balls = vec![ball];
    }

    /// Bank the level and lay out the next one
    pub(crate) fn win(&mut self) {
        let cleared = self.level.current_level;
        self.total_points += self.level_points;
        self.events.push(GameEvent::LevelCleared {
            level: cleared,
            level_points: self.level_points,
        });
        log::info!(
            "Level {} cleared for {} points (total {})",
            cleared,
            self.level_points,
            self.total_points
        );

        self.level.increase_level();
        self.phase = GamePhase::Won;
        self.reset(ResetKind::NewLevel);
    }

    fn lose(&mut self) {
        self.phase = GamePhase::Lost;
        self.events.push(GameEvent::GameOver {
            final_score: self.total_points,
        });
        log::info!("Game over, final score {}", self.total_points);
    }

    pub fn current_level_score(&self) -> u64 {
        level_score(
            self.settings.max_points,
            self.level.time_spent,
            self.level.max_time,
        )
    }

    fn effect_context(&mut self) -> EffectContext<'_> {
        EffectContext {
            balls: &mut self.balls,
            paddle: &mut self.paddle,
            bricks: &mut self.bricks,
            events: &mut self.events,
            baseline_speed: self.level.ball_speed,
            durability: self.level.hit_multiplier,
        }
    }

    /// Apply a caught modifier; timed ones join the active set first so the
    /// stack count includes them
    pub(crate) fn activate(&mut self, mut modifier: Modifier) {
        let kind = modifier.kind;
        let origin = modifier.pos;
        modifier.activated_at = Some(self.elapsed_time);
        self.events.push(GameEvent::ModifierCaught(kind));
        log::info!("Activated {} at {:.2}s", kind.name(), self.elapsed_time);

        if modifier.time_remaining.is_some() {
            self.modifiers.push_active(modifier);
        }
        let stacks = self.modifiers.active_count(kind);
        kind.apply(&mut self.effect_context(), origin, stacks);
    }

    /// Revert an expired (already removed) modifier, returning it stamped
    /// with the deactivation time
    pub(crate) fn deactivate(&mut self, mut modifier: Modifier) -> Modifier {
        let kind = modifier.kind;
        modifier.deactivated_at = Some(self.elapsed_time);
        let remaining = self.modifiers.active_count(kind);
        kind.revert(&mut self.effect_context(), remaining);
        self.events.push(GameEvent::ModifierExpired(kind));

        let active_for = modifier
            .activated_at
            .map(|t| self.elapsed_time - t)
            .unwrap_or(0.0);
        log::info!(
            "Deactivated {} after {:.2}s ({} still active)",
            kind.name(),
            active_for,
            remaining
        );
        modifier
    }

    /// Drop a random catalog modifier at `pos`. Silently discarded at the cap.
    pub(crate) fn drop_modifier(&mut self, pos: Vec2, source_brick: Option<u32>) -> bool {
        let kind = ModifierKind::random(&mut self.rng);
        let mut modifier = Modifier::new(kind, pos);
        modifier.source_brick = source_brick;

        if self.modifiers.try_drop(modifier) {
            self.events.push(GameEvent::ModifierDropped(kind));
            log::debug!("Dropped modifier: {}", kind.name());
            true
        } else {
            log::debug!("Modifier cap reached, discarding {}", kind.name());
            false
        }
    }
}
