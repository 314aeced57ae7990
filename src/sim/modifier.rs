//! Modifiers: falling pickups that change game parameters
//!
//! A modifier drops from a destroyed brick (or from the top of the field),
//! falls until the paddle catches it or it leaves the field, and on catch
//! applies its effect. Timed modifiers sit in the active set until their time
//! runs out, then revert. Several instances of the same kind can be active at
//! once, so every revert is told how many of its kind remain.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::BrickGrid;
use super::state::{Ball, Color, GameEvent, Paddle};
use crate::consts::*;
use crate::{Rect, direction_from_degrees};

/// Cosmetic classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierClass {
    Positive,
    Negative,
    Special,
}

impl ModifierClass {
    pub fn color(self) -> Color {
        match self {
            ModifierClass::Positive => Color::Green,
            ModifierClass::Negative => Color::Red,
            ModifierClass::Special => Color::Yellow,
        }
    }
}

/// Every effect the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    FastBall,
    WidePaddle,
    ExtraBall,
    Extravaganza,
    ExtraBrickRow,
}

/// Entities an effect may touch, lent by the game state for one apply/revert
pub struct EffectContext<'a> {
    pub balls: &'a mut Vec<Ball>,
    pub paddle: &'a mut Paddle,
    pub bricks: &'a mut BrickGrid,
    pub events: &'a mut Vec<GameEvent>,
    /// Level speed that boosts may never revert below
    pub baseline_speed: f32,
    /// Durability for freshly inserted bricks
    pub durability: u32,
}

/// Balls ignore the bottom edge while at least one Extravaganza is active
#[inline]
pub fn death_disabled_for(extravaganza_stacks: usize) -> bool {
    extravaganza_stacks >= 1
}

impl ModifierKind {
    /// The drop catalog
    pub const ALL: [ModifierKind; 5] = [
        ModifierKind::FastBall,
        ModifierKind::WidePaddle,
        ModifierKind::ExtraBall,
        ModifierKind::Extravaganza,
        ModifierKind::ExtraBrickRow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModifierKind::FastBall => "Fast Ball",
            ModifierKind::WidePaddle => "Wide Paddle",
            ModifierKind::ExtraBall => "Extra Ball",
            ModifierKind::Extravaganza => "Extravaganza",
            ModifierKind::ExtraBrickRow => "Extra Brick Row",
        }
    }

    pub fn class(self) -> ModifierClass {
        match self {
            ModifierKind::WidePaddle | ModifierKind::ExtraBall => ModifierClass::Positive,
            ModifierKind::FastBall | ModifierKind::ExtraBrickRow => ModifierClass::Negative,
            ModifierKind::Extravaganza => ModifierClass::Special,
        }
    }

    /// Active time in seconds; `None` means the effect is instantaneous
    pub fn duration(self) -> Option<f32> {
        match self {
            ModifierKind::FastBall => Some(FAST_BALL_DURATION),
            ModifierKind::WidePaddle => Some(WIDE_PADDLE_DURATION),
            ModifierKind::Extravaganza => Some(EXTRAVAGANZA_DURATION),
            ModifierKind::ExtraBall | ModifierKind::ExtraBrickRow => None,
        }
    }

    /// Uniform pick from the catalog
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Apply the effect. `stacks` counts active instances of this kind,
    /// including the one being applied when it is timed.
    pub fn apply(self, ctx: &mut EffectContext<'_>, origin: Vec2, stacks: usize) {
        match self {
            ModifierKind::FastBall => {
                for ball in ctx.balls.iter_mut() {
                    ball.speed += FAST_BALL_BOOST;
                }
            }
            ModifierKind::WidePaddle => {
                ctx.paddle.base_width += WIDE_PADDLE_BONUS;
            }
            ModifierKind::ExtraBall => {
                spawn_balls(ctx, origin, EXTRA_BALL_COUNT);
            }
            ModifierKind::Extravaganza => {
                spawn_balls(ctx, origin, EXTRAVAGANZA_BALL_COUNT);
                let death_disabled = death_disabled_for(stacks);
                for ball in ctx.balls.iter_mut() {
                    ball.speed += EXTRAVAGANZA_BOOST;
                    ball.death_disabled = death_disabled;
                }
                if stacks == 1 {
                    ctx.events.push(GameEvent::ExtravaganzaStart);
                }
            }
            ModifierKind::ExtraBrickRow => {
                ctx.bricks.insert_row(ctx.durability);
                ctx.events.push(GameEvent::NewRowInserted);
            }
        }
    }

    /// Undo the effect. `remaining` counts instances of this kind still
    /// active after this one was removed.
    pub fn revert(self, ctx: &mut EffectContext<'_>, remaining: usize) {
        match self {
            ModifierKind::FastBall => release_speed(ctx, FAST_BALL_BOOST),
            ModifierKind::WidePaddle => {
                ctx.paddle.base_width -= WIDE_PADDLE_BONUS;
            }
            ModifierKind::Extravaganza => {
                release_speed(ctx, EXTRAVAGANZA_BOOST);
                let death_disabled = death_disabled_for(remaining);
                for ball in ctx.balls.iter_mut() {
                    ball.death_disabled = death_disabled;
                }
                if !death_disabled {
                    ctx.events.push(GameEvent::ExtravaganzaStop);
                }
            }
            // Instantaneous, nothing to undo
            ModifierKind::ExtraBall | ModifierKind::ExtraBrickRow => {}
        }
    }
}

/// Remove one boost from every ball, never dropping below the level baseline
fn release_speed(ctx: &mut EffectContext<'_>, boost: f32) {
    for ball in ctx.balls.iter_mut() {
        ball.speed = (ball.speed - boost).max(ctx.baseline_speed);
    }
}

/// Fan `count` new balls upward from `origin`, copying speed and death
/// state from an existing ball
fn spawn_balls(ctx: &mut EffectContext<'_>, origin: Vec2, count: usize) {
    let (speed, death_disabled) = ctx
        .balls
        .first()
        .map(|b| (b.speed, b.death_disabled))
        .unwrap_or((ctx.baseline_speed, false));

    // Start clear of the paddle so the new balls aren't caught by it
    let pos = Vec2::new(origin.x, origin.y.min(ctx.paddle.pos.y - BALL_RADIUS - 1.0));

    for i in 0..count {
        let t = if count > 1 {
            i as f32 / (count - 1) as f32
        } else {
            0.5
        };
        let angle = 90.0 - SPAWN_SPREAD_DEGREES + 2.0 * SPAWN_SPREAD_DEGREES * t;
        let mut ball = Ball::new(pos, speed);
        ball.dir = direction_from_degrees(angle);
        ball.death_disabled = death_disabled;
        ctx.balls.push(ball);
    }
}

/// A modifier instance in the field or in the active set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Pixels/s downward
    pub fall_speed: f32,
    /// Seconds left once active; `None` for instantaneous kinds
    pub time_remaining: Option<f32>,
    /// Brick this dropped from, if any
    pub source_brick: Option<u32>,
    /// Elapsed-clock time of activation
    pub activated_at: Option<f32>,
    /// Elapsed-clock time the effect was reverted
    pub deactivated_at: Option<f32>,
}

impl Modifier {
    pub fn new(kind: ModifierKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: MODIFIER_RADIUS,
            color: kind.class().color(),
            fall_speed: MODIFIER_FALL_SPEED,
            time_remaining: kind.duration(),
            source_brick: None,
            activated_at: None,
            deactivated_at: None,
        }
    }

    pub fn class(&self) -> ModifierClass {
        self.kind.class()
    }

    pub fn fall(&mut self, dt: f32) {
        self.pos.y += self.fall_speed * dt;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }

    pub fn is_caught(&self, paddle: &Paddle) -> bool {
        self.bounds().overlaps(&paddle.rect())
    }

    pub fn is_out_of_bounds(&self, field_size: f32) -> bool {
        self.pos.y - self.radius > field_size
    }
}

/// Falling and active modifier sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierSystem {
    /// Falling, not yet caught
    pub dropped: Vec<Modifier>,
    /// Caught timed modifiers still running
    pub active: Vec<Modifier>,
    max_dropped: usize,
}

impl ModifierSystem {
    pub fn new(max_dropped: usize) -> Self {
        Self {
            dropped: Vec::new(),
            active: Vec::new(),
            max_dropped,
        }
    }

    pub fn max_dropped(&self) -> usize {
        self.max_dropped
    }

    /// Lowering the cap keeps modifiers already falling
    pub fn set_max_dropped(&mut self, max_dropped: usize) {
        self.max_dropped = max_dropped;
    }

    /// Add a falling modifier unless the cap is reached
    pub fn try_drop(&mut self, modifier: Modifier) -> bool {
        if self.dropped.len() >= self.max_dropped {
            return false;
        }
        self.dropped.push(modifier);
        true
    }

    /// Move falling modifiers. Ones that left the field are discarded; ones
    /// the paddle caught are removed and returned in drop order.
    pub fn advance_falling(&mut self, dt: f32, field_size: f32, paddle: &Paddle) -> Vec<Modifier> {
        let mut caught = Vec::new();
        let mut still_falling = Vec::with_capacity(self.dropped.len());

        for mut modifier in self.dropped.drain(..) {
            modifier.fall(dt);
            if modifier.is_out_of_bounds(field_size) {
                log::debug!("{} fell out of the field", modifier.kind.name());
            } else if modifier.is_caught(paddle) {
                caught.push(modifier);
            } else {
                still_falling.push(modifier);
            }
        }

        self.dropped = still_falling;
        caught
    }

    /// Count down every active modifier
    pub fn tick_active(&mut self, dt: f32) {
        for modifier in &mut self.active {
            if let Some(t) = modifier.time_remaining.as_mut() {
                *t -= dt;
            }
        }
    }

    /// Remove and return the first modifier whose time is up
    pub fn pop_expired(&mut self) -> Option<Modifier> {
        let index = self
            .active
            .iter()
            .position(|m| m.time_remaining.is_some_and(|t| t <= 0.0))?;
        Some(self.active.remove(index))
    }

    /// Remove and return the most recently activated modifier
    pub fn pop_active(&mut self) -> Option<Modifier> {
        self.active.pop()
    }

    pub fn push_active(&mut self, modifier: Modifier) {
        self.active.push(modifier);
    }

    pub fn active_count(&self, kind: ModifierKind) -> usize {
        self.active.iter().filter(|m| m.kind == kind).count()
    }

    pub fn clear_dropped(&mut self) {
        self.dropped.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Fixture {
        balls: Vec<Ball>,
        paddle: Paddle,
        bricks: BrickGrid,
        events: Vec<GameEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut ball = Ball::new(Vec2::new(250.0, 300.0), 350.0);
            ball.dir = Vec2::new(0.0, -1.0);
            let mut bricks = BrickGrid::new(500.0);
            bricks.generate(1);
            Self {
                balls: vec![ball],
                paddle: Paddle::new(500.0),
                bricks,
                events: Vec::new(),
            }
        }

        fn ctx(&mut self) -> EffectContext<'_> {
            EffectContext {
                balls: &mut self.balls,
                paddle: &mut self.paddle,
                bricks: &mut self.bricks,
                events: &mut self.events,
                baseline_speed: 350.0,
                durability: 1,
            }
        }
    }

    #[test]
    fn test_catalog_classes_and_durations() {
        assert_eq!(ModifierKind::ALL.len(), 5);
        assert_eq!(ModifierKind::ExtraBall.duration(), None);
        assert_eq!(ModifierKind::ExtraBrickRow.duration(), None);
        assert!(ModifierKind::FastBall.duration().is_some());
        assert_eq!(ModifierKind::Extravaganza.class(), ModifierClass::Special);
        assert_eq!(Modifier::new(ModifierKind::WidePaddle, Vec2::ZERO).color, Color::Green);
        assert_eq!(Modifier::new(ModifierKind::FastBall, Vec2::ZERO).color, Color::Red);
    }

    #[test]
    fn test_random_pick_covers_catalog() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(ModifierKind::random(&mut rng));
        }
        assert_eq!(seen.len(), ModifierKind::ALL.len());
    }

    #[test]
    fn test_fast_ball_round_trip_restores_speed() {
        let mut f = Fixture::new();
        ModifierKind::FastBall.apply(&mut f.ctx(), Vec2::ZERO, 1);
        assert_eq!(f.balls[0].speed, 350.0 + FAST_BALL_BOOST);
        ModifierKind::FastBall.revert(&mut f.ctx(), 0);
        assert_eq!(f.balls[0].speed, 350.0);
    }

    #[test]
    fn test_fast_ball_revert_floors_at_baseline() {
        let mut f = Fixture::new();
        ModifierKind::FastBall.apply(&mut f.ctx(), Vec2::ZERO, 1);
        // Speed clamp ate part of the boost
        f.balls[0].speed = 400.0;
        ModifierKind::FastBall.revert(&mut f.ctx(), 0);
        assert_eq!(f.balls[0].speed, 350.0);
    }

    #[test]
    fn test_wide_paddle_round_trip() {
        let mut f = Fixture::new();
        let before = f.paddle.base_width;
        ModifierKind::WidePaddle.apply(&mut f.ctx(), Vec2::ZERO, 1);
        ModifierKind::WidePaddle.apply(&mut f.ctx(), Vec2::ZERO, 2);
        assert_eq!(f.paddle.base_width, before + 2.0 * WIDE_PADDLE_BONUS);
        ModifierKind::WidePaddle.revert(&mut f.ctx(), 1);
        ModifierKind::WidePaddle.revert(&mut f.ctx(), 0);
        assert_eq!(f.paddle.base_width, before);
    }

    #[test]
    fn test_extra_ball_spawns_diverging_balls() {
        let mut f = Fixture::new();
        f.balls[0].speed = 500.0;
        let origin = Vec2::new(100.0, f.paddle.pos.y);
        ModifierKind::ExtraBall.apply(&mut f.ctx(), origin, 0);

        assert_eq!(f.balls.len(), 1 + EXTRA_BALL_COUNT);
        let new_balls = &f.balls[1..];
        assert!(new_balls.iter().all(|b| b.speed == 500.0 && b.dir.y < 0.0));
        assert!(new_balls[0].dir.x > 0.0);
        assert!(new_balls[1].dir.x < 0.0);
        // Spawned above the paddle
        assert!(new_balls.iter().all(|b| b.pos.y + b.radius < f.paddle.pos.y));
    }

    #[test]
    fn test_extravaganza_stacking() {
        let mut f = Fixture::new();
        ModifierKind::Extravaganza.apply(&mut f.ctx(), Vec2::new(250.0, 480.0), 1);
        ModifierKind::Extravaganza.apply(&mut f.ctx(), Vec2::new(250.0, 480.0), 2);
        assert_eq!(f.balls.len(), 1 + 2 * EXTRAVAGANZA_BALL_COUNT);
        assert!(f.balls.iter().all(|b| b.death_disabled));
        assert_eq!(f.balls[0].speed, 350.0 + 2.0 * EXTRAVAGANZA_BOOST);
        let starts = f
            .events
            .iter()
            .filter(|e| **e == GameEvent::ExtravaganzaStart)
            .count();
        assert_eq!(starts, 1);

        // One of two expires: still protected
        ModifierKind::Extravaganza.revert(&mut f.ctx(), 1);
        assert!(f.balls.iter().all(|b| b.death_disabled));
        assert_eq!(f.balls[0].speed, 350.0 + EXTRAVAGANZA_BOOST);
        assert!(!f.events.contains(&GameEvent::ExtravaganzaStop));

        ModifierKind::Extravaganza.revert(&mut f.ctx(), 0);
        assert!(f.balls.iter().all(|b| !b.death_disabled));
        assert_eq!(f.balls[0].speed, 350.0);
        assert!(f.events.contains(&GameEvent::ExtravaganzaStop));
    }

    #[test]
    fn test_extra_brick_row_inserts() {
        let mut f = Fixture::new();
        let before = f.bricks.len();
        ModifierKind::ExtraBrickRow.apply(&mut f.ctx(), Vec2::ZERO, 0);
        assert!(f.bricks.len() > before);
        assert_eq!(f.events, vec![GameEvent::NewRowInserted]);
    }

    #[test]
    fn test_drop_cap() {
        let mut system = ModifierSystem::new(5);
        for i in 0..5 {
            assert!(system.try_drop(Modifier::new(ModifierKind::FastBall, Vec2::new(i as f32, 0.0))));
        }
        let before = system.dropped.clone();
        assert!(!system.try_drop(Modifier::new(ModifierKind::ExtraBall, Vec2::ZERO)));
        assert_eq!(system.dropped, before);
    }

    #[test]
    fn test_falling_lifecycle() {
        let paddle = Paddle::new(500.0);
        let mut system = ModifierSystem::new(5);
        // Straight above the paddle
        system.try_drop(Modifier::new(
            ModifierKind::WidePaddle,
            Vec2::new(paddle.center_x(), paddle.pos.y - 20.0),
        ));
        // Off to the side, will fall out
        system.try_drop(Modifier::new(ModifierKind::FastBall, Vec2::new(10.0, 495.0)));

        let caught = system.advance_falling(0.2, 500.0, &paddle);
        assert_eq!(caught.len(), 1);
        assert_eq!(caught[0].kind, ModifierKind::WidePaddle);
        assert!(system.dropped.is_empty());
    }

    #[test]
    fn test_active_expiry_in_order() {
        let mut system = ModifierSystem::new(5);
        let mut short = Modifier::new(ModifierKind::FastBall, Vec2::ZERO);
        short.time_remaining = Some(0.5);
        let mut long = Modifier::new(ModifierKind::FastBall, Vec2::ZERO);
        long.time_remaining = Some(2.0);
        system.push_active(short);
        system.push_active(long);

        system.tick_active(0.25);
        assert!(system.pop_expired().is_none());
        system.tick_active(0.25);
        let expired = system.pop_expired().unwrap();
        assert_eq!(expired.time_remaining, Some(0.0));
        assert!(system.pop_expired().is_none());
        assert_eq!(system.active_count(ModifierKind::FastBall), 1);
    }

    #[test]
    fn test_death_disabled_rule() {
        assert!(!death_disabled_for(0));
        assert!(death_disabled_for(1));
        assert!(death_disabled_for(3));
    }
}
