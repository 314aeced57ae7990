//! Brick grid generation and bookkeeping

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Color;
use crate::Rect;
use crate::consts::*;

/// Row colors from the top: two rows per color
const ROW_COLORS: [Color; 4] = [Color::Red, Color::Orange, Color::Green, Color::Yellow];

/// Color for a grid row
pub fn color_for_row(row: u32) -> Color {
    ROW_COLORS[((row / 2) as usize) % ROW_COLORS.len()]
}

/// A destructible brick (position is the top-left corner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub color: Color,
    /// Grid row, 0 at the top
    pub row: u32,
    /// Hits needed to destroy
    pub durability: u32,
    pub hits: u32,
}

impl Brick {
    pub fn new(id: u32, pos: Vec2, color: Color, row: u32, durability: u32) -> Self {
        Self {
            id,
            pos,
            width: BRICK_WIDTH,
            height: BRICK_HEIGHT,
            color,
            row,
            durability: durability.max(1),
            hits: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.hits >= self.durability
    }

    /// Register one hit. Returns true if this hit destroyed the brick.
    pub fn damage(&mut self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.hits += 1;
        self.is_destroyed()
    }
}

/// The level's live bricks, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrickGrid {
    bricks: Vec<Brick>,
    field_size: f32,
    next_id: u32,
}

impl BrickGrid {
    pub fn new(field_size: f32) -> Self {
        Self {
            bricks: Vec::new(),
            field_size,
            next_id: 1,
        }
    }

    fn next_brick_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Left edges of every column that fits inside the field
    fn column_xs(&self) -> Vec<f32> {
        let columns = ((self.field_size - BRICK_WIDTH) / BRICK_COLUMN_PITCH).floor() as i64 + 1;
        (0..columns.max(0))
            .map(|c| c as f32 * BRICK_COLUMN_PITCH)
            .collect()
    }

    fn push_row(&mut self, row: u32, durability: u32) {
        let y = BRICK_TOP + row as f32 * BRICK_ROW_PITCH;
        let color = color_for_row(row);
        for x in self.column_xs() {
            let id = self.next_brick_id();
            self.bricks
                .push(Brick::new(id, Vec2::new(x, y), color, row, durability));
        }
    }

    /// Replace the layout with a fresh grid at the given durability
    pub fn generate(&mut self, durability: u32) {
        self.bricks.clear();
        for row in 0..BRICK_ROWS {
            self.push_row(row, durability);
        }
    }

    /// Shift every brick down one row and add a new row at the top
    pub fn insert_row(&mut self, durability: u32) {
        for brick in &mut self.bricks {
            brick.pos.y += BRICK_ROW_PITCH;
            brick.row += 1;
        }
        let existing = std::mem::take(&mut self.bricks);
        self.push_row(0, durability);
        self.bricks.extend(existing);
    }

    /// Hit the brick at `index`. A destroyed brick is removed and returned.
    pub fn damage(&mut self, index: usize) -> Option<Brick> {
        let brick = self.bricks.get_mut(index)?;
        if brick.damage() {
            Some(self.bricks.remove(index))
        } else {
            None
        }
    }

    /// Keep only bricks matching `keep` (custom layouts, debugging)
    pub fn retain<F: FnMut(&Brick) -> bool>(&mut self, keep: F) {
        self.bricks.retain(keep);
    }

    pub fn as_slice(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Brick> {
        self.bricks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Brick> {
        self.bricks.get(index)
    }

    pub fn find(&self, id: u32) -> Option<&Brick> {
        self.bricks.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }
}
