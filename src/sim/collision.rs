//! Collision detection
//!
//! Axis-aligned only: a ball is treated as its bounding square. No swept
//! tests, so a fast enough ball can tunnel through a thin brick. Balls pass
//! through each other.

use super::grid::Brick;
use super::state::{Ball, Paddle};
use crate::Rect;

/// What a ball hit this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionTarget {
    Paddle,
    /// Index into the brick collection
    Brick(usize),
}

/// Inclusive overlap between the ball's bounding square and a rectangle
#[inline]
pub fn ball_rect_collision(ball: &Ball, rect: &Rect) -> bool {
    ball.bounds().overlaps(rect)
}

/// First thing the ball touches: the paddle wins over any brick, then bricks
/// in collection order
pub fn find_collision(ball: &Ball, paddle: &Paddle, bricks: &[Brick]) -> Option<CollisionTarget> {
    if ball_rect_collision(ball, &paddle.rect()) {
        return Some(CollisionTarget::Paddle);
    }
    bricks
        .iter()
        .position(|brick| ball_rect_collision(ball, &brick.rect()))
        .map(CollisionTarget::Brick)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Color;
    use glam::Vec2;

    fn brick_at(x: f32, y: f32) -> Brick {
        Brick::new(0, Vec2::new(x, y), Color::Red, 0, 1)
    }

    #[test]
    fn test_touching_edges_collide() {
        let ball = Ball::new(Vec2::new(100.0, 100.0), 300.0);
        // Ball spans 95..105; rectangle starts exactly at 105
        assert!(ball_rect_collision(&ball, &Rect::new(105.0, 90.0, 20.0, 5.0)));
        assert!(!ball_rect_collision(&ball, &Rect::new(105.1, 90.0, 20.0, 5.0)));
    }

    #[test]
    fn test_miss_returns_none() {
        let paddle = Paddle::new(500.0);
        let ball = Ball::new(Vec2::new(250.0, 250.0), 300.0);
        let bricks = vec![brick_at(0.0, 20.0)];
        assert_eq!(find_collision(&ball, &paddle, &bricks), None);
    }

    #[test]
    fn test_first_brick_in_order_wins() {
        let paddle = Paddle::new(500.0);
        let ball = Ball::new(Vec2::new(30.0, 25.0), 300.0);
        let bricks = vec![brick_at(200.0, 20.0), brick_at(22.0, 20.0), brick_at(30.0, 22.0)];
        assert_eq!(
            find_collision(&ball, &paddle, &bricks),
            Some(CollisionTarget::Brick(1))
        );
    }

    #[test]
    fn test_paddle_takes_precedence() {
        let paddle = Paddle::new(500.0);
        let ball = Ball::new(Vec2::new(paddle.center_x(), paddle.pos.y), 300.0);
        // A brick overlapping the same spot
        let bricks = vec![brick_at(paddle.center_x() - 10.0, paddle.pos.y - 2.0)];
        assert_eq!(
            find_collision(&ball, &paddle, &bricks),
            Some(CollisionTarget::Paddle)
        );
    }
}
