//! # Player
//!
//! The player avatar and its movement rules.

use crate::config::{COLLISION_MARGIN, HUMAN_SIZE, PLAYER_SPEED};
use crate::World;
use macroquad::math::Vec2;

/// The avatar the user controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    /// Pixels per second
    pub speed: f32,
    pub size: f32,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            speed: PLAYER_SPEED,
            size: HUMAN_SIZE,
        }
    }

    /// Moves along `direction` for `dt` seconds.
    ///
    /// The direction is normalized so diagonals are not faster. The move is rejected
    /// outright if the target tile is not walkable or the target lies too close to an
    /// agent. Returns the `(from, to)` pair when the player actually moved.
    pub fn try_move(&mut self, direction: Vec2, dt: f32, world: &World) -> Option<(Vec2, Vec2)> {
        if direction == Vec2::ZERO || dt <= 0.0 {
            return None;
        }

        let from = self.position;
        let target = from + direction.normalize_or_zero() * self.speed * dt;

        if !world.is_walkable(target) {
            return None;
        }
        let blocked = world
            .agents()
            .any(|agent| agent.position.distance(target) < agent.size + COLLISION_MARGIN);
        if blocked {
            return None;
        }

        self.position = target;
        Some((from, target))
    }
}
