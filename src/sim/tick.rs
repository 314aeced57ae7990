//! Per-frame update
//!
//! One `tick` per rendered frame. Input is applied first, then
//! `GameState::update` runs the frame's fixed sequence of steps.

use glam::Vec2;
use rand::Rng;

use super::collision::{CollisionTarget, find_collision};
use super::physics::EdgeContact;
use super::state::{GameEvent, GamePhase, GameState, PaddleDirection, ResetKind};
use crate::error::{SimResult, check_dt};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Launch the resting ball
    pub launch: bool,
    /// Continue after a cleared level, or start over
    pub restart: bool,
    /// Idle/demo mode - the paddle plays itself
    pub idle_mode: bool,
}

/// Apply one frame of input and advance the simulation by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> SimResult<()> {
    check_dt(dt)?;

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(state, &mut input);
    }

    if input.restart {
        state.restart();
    }

    match (input.move_left, input.move_right) {
        (true, false) => state.move_paddle(PaddleDirection::Left, dt)?,
        (false, true) => state.move_paddle(PaddleDirection::Right, dt)?,
        _ => {}
    }

    if input.launch {
        state.launch();
    }

    state.update(dt)
}

/// Fill in input for idle mode: launch when ready, continue after a win,
/// and follow whatever is coming down
fn autopilot(state: &GameState, input: &mut TickInput) {
    match state.phase {
        GamePhase::PreGame => input.launch = true,
        GamePhase::Won => input.restart = true,
        _ => {}
    }

    // Lowest descending ball first, otherwise the lowest falling modifier
    let target_x = state
        .balls
        .iter()
        .filter(|b| b.is_moving() && b.dir.y > 0.0)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|b| b.pos.x)
        .or_else(|| {
            state
                .modifiers
                .dropped
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|m| m.pos.x)
        });

    let Some(target_x) = target_x else {
        return;
    };

    // Aim slightly off center so rallies don't loop straight up and down
    let aim = state.paddle.center_x() + state.paddle.width * 0.15;
    let deadzone = state.paddle.width / 4.0;
    input.move_left = target_x < aim - deadzone;
    input.move_right = target_x > aim + deadzone;
}

impl GameState {
    /// Advance the simulation one frame. No-op once the level is won or the
    /// game is lost.
    pub fn update(&mut self, dt: f32) -> SimResult<()> {
        check_dt(dt)?;
        if matches!(self.phase, GamePhase::Won | GamePhase::Lost) {
            return Ok(());
        }

        if self.phase == GamePhase::Playing {
            self.elapsed_time += dt;
            self.level.time_spent += dt;
        }

        self.update_balls(dt)?;
        if self.phase == GamePhase::Lost {
            return Ok(());
        }

        self.update_dropped_modifiers(dt);
        self.update_active_modifiers(dt);
        self.paddle.ease_width(dt);
        // Growing about the center can push a paddle at the wall past it
        self.paddle.move_by(0.0, self.settings.field_size);

        self.handle_ball_collisions();
        if self.phase == GamePhase::Won {
            return Ok(());
        }

        self.maybe_drop_from_top();

        let max_speed = self.settings.max_ball_speed;
        for ball in &mut self.balls {
            ball.speed = ball.speed.min(max_speed);
        }

        self.level_points = self.current_level_score();
        Ok(())
    }

    /// Move every ball, resolve the field edges and drop dead balls.
    /// Losing the last ball costs a life.
    fn update_balls(&mut self, dt: f32) -> SimResult<()> {
        let field = self.settings.field_size;

        for ball in &mut self.balls {
            ball.advance(dt)?;
            match ball.edge_bounce(field) {
                Some(EdgeContact::Fell) | None => {}
                Some(_) => self.events.push(GameEvent::WallHit),
            }
            if ball.recenter_if_outside(field) {
                log::warn!("Ball escaped the field, recentered");
            }
        }

        let before = self.balls.len();
        self.balls.retain(|b| !b.is_dead);
        if self.balls.len() < before {
            log::debug!("{} ball(s) lost, {} left", before - self.balls.len(), self.balls.len());
        }

        if self.balls.is_empty() {
            self.reset(ResetKind::LifeLost);
        }
        Ok(())
    }

    fn update_dropped_modifiers(&mut self, dt: f32) {
        let caught = self
            .modifiers
            .advance_falling(dt, self.settings.field_size, &self.paddle);
        for modifier in caught {
            self.activate(modifier);
        }
    }

    fn update_active_modifiers(&mut self, dt: f32) {
        self.modifiers.tick_active(dt);
        while let Some(modifier) = self.modifiers.pop_expired() {
            self.deactivate(modifier);
        }
    }

    /// At most one collision per ball per frame
    fn handle_ball_collisions(&mut self) {
        let max_angle = self.settings.paddle_max_angle;

        for i in 0..self.balls.len() {
            let Some(target) = find_collision(&self.balls[i], &self.paddle, self.bricks.as_slice())
            else {
                continue;
            };

            match target {
                CollisionTarget::Paddle => {
                    let ball = &mut self.balls[i];
                    // Falling or rightward balls bounce; a resting ball has zero direction
                    if ball.dir.y > 0.0 || ball.dir.x > 0.0 {
                        ball.paddle_bounce(max_angle, &self.paddle);
                        self.events.push(GameEvent::PaddleHit);
                    }
                }
                CollisionTarget::Brick(index) => {
                    let removed = self.bricks.damage(index);
                    self.balls[i].bounce_vertical();
                    self.events.push(GameEvent::BrickHit {
                        destroyed: removed.is_some(),
                    });

                    let Some(brick) = removed else {
                        continue;
                    };
                    if self.bricks.is_empty() {
                        self.win();
                        return;
                    }
                    if self.rng.random_bool(f64::from(self.settings.modifier_drop_rate)) {
                        let rect = brick.rect();
                        self.drop_modifier(Vec2::new(rect.center().x, rect.bottom()), Some(brick.id));
                    }
                }
            }
        }
    }

    /// Random pickup from the top edge while nothing else is falling
    fn maybe_drop_from_top(&mut self) {
        if self.phase != GamePhase::Playing || !self.modifiers.dropped.is_empty() {
            return;
        }
        if !self.rng.random_bool(f64::from(self.settings.random_drop_chance)) {
            return;
        }

        let field = self.settings.field_size;
        let r = crate::consts::MODIFIER_RADIUS;
        let x = if field > 4.0 * r {
            self.rng.random_range(2.0 * r..=field - 2.0 * r)
        } else {
            field / 2.0
        };
        self.drop_modifier(Vec2::new(x, r), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Settings;
    use crate::sim::modifier::{Modifier, ModifierKind};

    fn quiet_settings() -> Settings {
        Settings {
            modifier_drop_rate: 0.0,
            random_drop_chance: 0.0,
            ..Default::default()
        }
    }

    fn launched_state(settings: Settings) -> GameState {
        let mut state = GameState::new(settings).unwrap();
        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut state, &input, 0.0).unwrap();
        state.drain_events();
        state
    }

    #[test]
    fn test_tick_pregame_to_playing() {
        let mut state = GameState::new(quiet_settings()).unwrap();
        tick(&mut state, &TickInput::default(), FRAME_DT).unwrap();
        assert_eq!(state.phase, GamePhase::PreGame);
        assert_eq!(state.elapsed_time, 0.0);

        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.balls[0].dir.y < 0.0);
        assert!(state.elapsed_time > 0.0);
    }

    #[test]
    fn test_tick_rejects_negative_dt() {
        let mut state = GameState::new(quiet_settings()).unwrap();
        let before = state.paddle.pos;
        let input = TickInput {
            move_left: true,
            ..Default::default()
        };
        assert!(tick(&mut state, &input, -1.0).is_err());
        assert_eq!(state.paddle.pos, before);
        assert!(state.update(f32::NAN).is_err());
    }

    #[test]
    fn test_opposing_moves_cancel() {
        let mut state = GameState::new(quiet_settings()).unwrap();
        let before = state.paddle.pos.x;
        let input = TickInput {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT).unwrap();
        assert_eq!(state.paddle.pos.x, before);
    }

    #[test]
    fn test_zero_dt_changes_nothing() {
        let mut state = launched_state(quiet_settings());
        let ball = state.balls[0].clone();
        state.update(0.0).unwrap();
        assert_eq!(state.balls[0].pos, ball.pos);
        assert_eq!(state.elapsed_time, 0.0);
    }

    #[test]
    fn test_paddle_hit_deflects_and_emits() {
        let mut state = launched_state(quiet_settings());
        let paddle_top = state.paddle.pos.y;
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(state.paddle.center_x(), paddle_top - 6.0);
        ball.dir = Vec2::new(0.0, 1.0);

        state.update(FRAME_DT).unwrap();
        assert!(state.balls[0].dir.y < 0.0);
        assert!(state.drain_events().contains(&GameEvent::PaddleHit));

        // Still overlapping but now heading up and left: no second hit
        state.balls[0].dir = Vec2::new(-0.6, -0.8);
        state.update(0.0).unwrap();
        assert_eq!(state.balls[0].dir, Vec2::new(-0.6, -0.8));
        assert!(!state.drain_events().contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_rising_rightward_ball_still_bounces() {
        let mut state = launched_state(quiet_settings());
        let paddle = state.paddle.clone();
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(paddle.pos.x + paddle.width * 0.1, paddle.pos.y);
        ball.dir = Vec2::new(0.6, -0.8);

        state.update(0.0).unwrap();
        let dir = state.balls[0].dir;
        assert_ne!(dir, Vec2::new(0.6, -0.8));
        // Left-of-center hit deflects left and up
        assert!(dir.x < 0.0 && dir.y < 0.0);
        assert!(state.drain_events().contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_leftward_level_ball_ignores_paddle() {
        let mut state = launched_state(quiet_settings());
        let paddle = state.paddle.clone();
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(paddle.center_x(), paddle.pos.y);
        ball.dir = Vec2::new(-1.0, 0.0);

        state.update(0.0).unwrap();
        assert_eq!(state.balls[0].dir, Vec2::new(-1.0, 0.0));
        assert!(!state.drain_events().contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_resting_ball_ignores_paddle() {
        let mut state = GameState::new(quiet_settings()).unwrap();
        state.update(FRAME_DT).unwrap();
        assert!(!state.balls[0].is_moving());
        assert!(!state.drain_events().contains(&GameEvent::PaddleHit));
    }

    #[test]
    fn test_brick_hit_damages_and_bounces() {
        let settings = Settings {
            modifier_drop_rate: 0.0,
            random_drop_chance: 0.0,
            ..Default::default()
        };
        let mut state = launched_state(settings);
        state.level.hit_multiplier = 2;
        state.bricks.generate(2);
        let target = state.bricks.get(0).cloned().unwrap();
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(target.pos.x + 10.0, target.rect().bottom() + 8.0);
        ball.dir = Vec2::new(0.0, -1.0);

        state.update(FRAME_DT).unwrap();
        assert!(state.balls[0].dir.y > 0.0);
        assert_eq!(state.bricks.find(target.id).map(|b| b.hits), Some(1));
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::BrickHit { destroyed: false })
        );
    }

    #[test]
    fn test_destroyed_brick_always_drops_at_full_rate() {
        let settings = Settings {
            modifier_drop_rate: 1.0,
            random_drop_chance: 0.0,
            ..Default::default()
        };
        let mut state = launched_state(settings);
        let target = state.bricks.get(0).cloned().unwrap();
        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(target.pos.x + 10.0, target.rect().bottom() + 8.0);
        ball.dir = Vec2::new(0.0, -1.0);

        state.update(FRAME_DT).unwrap();
        assert!(state.bricks.find(target.id).is_none());
        assert_eq!(state.modifiers.dropped.len(), 1);
        let dropped = &state.modifiers.dropped[0];
        assert_eq!(dropped.source_brick, Some(target.id));
        assert!((dropped.pos.x - target.rect().center().x).abs() < 1e-4);
    }

    #[test]
    fn test_top_drop_only_when_nothing_falls() {
        let settings = Settings {
            modifier_drop_rate: 0.0,
            random_drop_chance: 1.0,
            ..Default::default()
        };
        let mut state = launched_state(settings);
        state.update(FRAME_DT).unwrap();
        assert_eq!(state.modifiers.dropped.len(), 1);
        let m = &state.modifiers.dropped[0];
        assert!(m.source_brick.is_none());
        assert!(m.pos.x >= 2.0 * MODIFIER_RADIUS && m.pos.x <= 500.0 - 2.0 * MODIFIER_RADIUS);

        state.update(FRAME_DT).unwrap();
        assert_eq!(state.modifiers.dropped.len(), 1);
    }

    #[test]
    fn test_speed_clamped_to_max() {
        let mut state = launched_state(quiet_settings());
        state.balls[0].speed = 5000.0;
        state.update(FRAME_DT).unwrap();
        assert_eq!(state.balls[0].speed, state.settings.max_ball_speed);
    }

    #[test]
    fn test_caught_modifier_activates_and_expires() {
        let mut state = launched_state(quiet_settings());
        let paddle = state.paddle.clone();
        state.modifiers.try_drop(Modifier::new(
            ModifierKind::WidePaddle,
            Vec2::new(paddle.center_x(), paddle.pos.y - 1.0),
        ));

        state.update(FRAME_DT).unwrap();
        assert_eq!(state.modifiers.active_count(ModifierKind::WidePaddle), 1);
        assert_eq!(state.paddle.base_width, PADDLE_WIDTH + WIDE_PADDLE_BONUS);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::ModifierCaught(ModifierKind::WidePaddle))
        );
        let caught_at = state.modifiers.active[0].activated_at.unwrap();
        assert!((caught_at - FRAME_DT).abs() < 1e-6);
        assert_eq!(state.modifiers.active[0].deactivated_at, None);

        // Keep the ball alive while the effect runs out
        for _ in 0..((WIDE_PADDLE_DURATION / 0.1) as usize + 2) {
            state.balls[0].pos = Vec2::new(250.0, 250.0);
            state.balls[0].dir = Vec2::new(1.0, 0.0);
            state.balls[0].speed = 0.0;
            state.update(0.1).unwrap();
        }
        assert_eq!(state.modifiers.active_count(ModifierKind::WidePaddle), 0);
        assert_eq!(state.paddle.base_width, PADDLE_WIDTH);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::ModifierExpired(ModifierKind::WidePaddle))
        );

        // Both ends of the active period are stamped with the elapsed clock
        state.activate(Modifier::new(ModifierKind::WidePaddle, Vec2::ZERO));
        let activated = state.elapsed_time;
        state.elapsed_time += 3.0;
        let active = state.modifiers.pop_active().unwrap();
        let done = state.deactivate(active);
        assert_eq!(done.activated_at, Some(activated));
        assert_eq!(done.deactivated_at, Some(activated + 3.0));
    }

    #[test]
    fn test_extravaganza_keeps_balls_from_dying() {
        let mut state = launched_state(quiet_settings());
        state.activate(Modifier::new(ModifierKind::Extravaganza, Vec2::new(250.0, 400.0)));
        let count = state.balls.len();

        let ball = &mut state.balls[0];
        ball.pos = Vec2::new(100.0, 497.0);
        ball.dir = Vec2::new(0.0, 1.0);
        state.update(FRAME_DT).unwrap();
        assert_eq!(state.lives, 3);
        assert!(state.balls.len() >= count);
        assert!(state.balls.iter().all(|b| b.death_disabled));
    }

    #[test]
    fn test_idle_mode_plays_itself() {
        let mut state = GameState::new(Settings::default()).unwrap();
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..(60 * 30) {
            tick(&mut state, &input, FRAME_DT).unwrap();
            if state.lost_game() {
                break;
            }
            for ball in &state.balls {
                assert!(ball.speed <= state.settings.max_ball_speed);
            }
            assert!(state.paddle.pos.x >= 0.0);
            assert!(state.paddle.rect().right() <= state.settings.field_size + 1e-3);
        }
        assert!(state.elapsed_time > 0.0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut a = GameState::new(Settings::default()).unwrap();
        let mut b = GameState::new(Settings::default()).unwrap();
        for _ in 0..600 {
            tick(&mut a, &input, FRAME_DT).unwrap();
            tick(&mut b, &input, FRAME_DT).unwrap();
        }
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.bricks.len(), b.bricks.len());
        assert_eq!(a.modifiers.dropped, b.modifiers.dropped);
        assert_eq!(a.total_points, b.total_points);
    }
}
