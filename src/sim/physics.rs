//! Ball motion and bounce policies
//!
//! Screen space: origin top-left, y grows downward. The field is a square of
//! side `field_size`.

use glam::Vec2;

use super::state::{Ball, Paddle};
use crate::direction_from_degrees;
use crate::error::{SimResult, check_dt};

/// Which edge response `edge_bounce` applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeContact {
    /// Top-left or top-right corner
    Corner,
    /// Left or right wall
    Side,
    Top,
    /// Bottom edge while death is disabled
    Floor,
    /// Bottom edge; ball is now dead
    Fell,
}

impl Ball {
    /// Integrate position over `dt` seconds
    pub fn advance(&mut self, dt: f32) -> SimResult<()> {
        check_dt(dt)?;
        self.pos += self.dir * self.speed * dt;
        Ok(())
    }

    /// Resolve contact with the field edges, first match wins.
    ///
    /// A ball touching an edge it is already moving away from is clamped but
    /// reports no contact, so one wall hit yields one contact.
    pub fn edge_bounce(&mut self, field_size: f32) -> Option<EdgeContact> {
        let incoming = self.dir;
        match self.resolve_edges(field_size) {
            Some(EdgeContact::Fell) => Some(EdgeContact::Fell),
            Some(_) if self.dir == incoming => None,
            contact => contact,
        }
    }

    fn resolve_edges(&mut self, field_size: f32) -> Option<EdgeContact> {
        let r = self.radius;
        let left = self.pos.x - r <= 0.0;
        let right = self.pos.x + r >= field_size;
        let top = self.pos.y - r <= 0.0;
        let bottom = self.pos.y + r >= field_size;

        // Reflections always point back into the field so a ball resting on
        // an edge can't be flipped outward again next frame
        if (left || right) && top {
            self.dir.x = if left { self.dir.x.abs() } else { -self.dir.x.abs() };
            self.dir.y = self.dir.y.abs();
            self.pos.x = if left { r } else { field_size - r };
            self.pos.y = r;
            Some(EdgeContact::Corner)
        } else if left || right {
            self.dir.x = if left { self.dir.x.abs() } else { -self.dir.x.abs() };
            self.pos.x = if left { r } else { field_size - r };
            // Bottom corners resolve both axes, like the top ones
            if bottom {
                Some(self.bottom_contact(field_size))
            } else {
                Some(EdgeContact::Side)
            }
        } else if top {
            self.dir.y = self.dir.y.abs();
            self.pos.y = r;
            Some(EdgeContact::Top)
        } else if bottom {
            Some(self.bottom_contact(field_size))
        } else {
            None
        }
    }

    fn bottom_contact(&mut self, field_size: f32) -> EdgeContact {
        if self.death_disabled {
            self.dir.y = -self.dir.y.abs();
            self.pos.y = field_size - self.radius;
            EdgeContact::Floor
        } else {
            self.is_dead = true;
            EdgeContact::Fell
        }
    }

    /// Put a ball found entirely outside the field back in the middle.
    /// Returns true if it had to.
    pub fn recenter_if_outside(&mut self, field_size: f32) -> bool {
        let r = self.radius;
        let outside = self.pos.x + r < 0.0
            || self.pos.x - r > field_size
            || self.pos.y + r < 0.0
            || self.pos.y - r > field_size;
        if outside && !self.is_dead {
            self.pos = Vec2::splat(field_size / 2.0);
            true
        } else {
            false
        }
    }

    /// Deflect off the paddle by impact offset.
    ///
    /// `p` is the impact position relative to the paddle center in half-widths,
    /// clamped to [-1, 1]. The outgoing angle is `90 - max_angle * p` degrees:
    /// a center hit goes straight up, edge hits lean up to `max_angle` from
    /// vertical toward their side. Speed is unchanged.
    pub fn paddle_bounce(&mut self, max_angle: f32, paddle: &Paddle) {
        let half_width = paddle.width / 2.0;
        let p = if half_width > 0.0 {
            ((self.pos.x - paddle.center_x()) / half_width).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let angle = 90.0 - max_angle * p;

        if angle == 0.0 {
            self.dir = Vec2::new(0.0, -1.0);
            return;
        }

        let dir = direction_from_degrees(angle);
        // Never drive the ball back into the paddle
        self.dir = Vec2::new(dir.x, -dir.y.abs());
    }

    /// Reverse vertical travel (brick hits)
    pub fn bounce_vertical(&mut self) {
        self.dir.y = -self.dir.y;
    }

    /// Straight up, used at the start of every life and level
    pub fn begin_launch(&mut self) {
        self.dir = Vec2::new(0.0, -1.0);
    }

    /// Park on top of the paddle center
    pub fn rest_on(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.pos.y - self.radius);
    }
}
