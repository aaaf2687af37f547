//! # Game Module
//!
//! World entities and per-frame game state.
//!
//! - Agents: NPCs that own a dialogue session
//! - Player: the avatar and its movement rules
//! - World: chunks of tiles and the agents living in them
//! - State: the `GameState` tick tying input, movement, and dialogue together

pub mod agent;
pub mod player;
pub mod state;
pub mod world;

pub use agent::*;
pub use player::*;
pub use state::*;
pub use world::*;

use crate::config::CHUNK_PIXELS;
use crate::dialogue::CloseReason;
use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for game entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Grid coordinate of a chunk.
///
/// # Examples
///
/// ```
/// use wayfarer::ChunkCoord;
/// use macroquad::math::vec2;
///
/// let coord = ChunkCoord::containing(vec2(520.0, -10.0));
/// assert_eq!(coord, ChunkCoord::new(1, -1));
/// assert_eq!(coord.origin(), vec2(500.0, -500.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk containing a world point.
    pub fn containing(point: Vec2) -> Self {
        Self::new(
            (point.x / CHUNK_PIXELS).floor() as i32,
            (point.y / CHUNK_PIXELS).floor() as i32,
        )
    }

    /// World position of the chunk's top-left corner.
    pub fn origin(self) -> Vec2 {
        vec2(self.x as f32 * CHUNK_PIXELS, self.y as f32 * CHUNK_PIXELS)
    }

    /// Distance in chunks, counting diagonals as one step.
    pub fn chebyshev_distance(self, other: ChunkCoord) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }
}

/// Things that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A conversation opened
    DialogueOpened { agent_id: EntityId, speaker: String },
    /// A conversation moved on to a follow-up node
    DialogueAdvanced { agent_id: EntityId },
    /// A conversation closed
    DialogueClosed {
        agent_id: EntityId,
        reason: CloseReason,
    },
    /// A selected option carried an effect tag
    EffectTriggered { agent_id: EntityId, effect: String },
    /// An agent was asked to talk while someone else held the lock
    TriggerBlocked {
        agent_id: EntityId,
        holder: EntityId,
    },
    /// The player moved
    PlayerMoved { from: Vec2, to: Vec2 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_containing() {
        assert_eq!(ChunkCoord::containing(vec2(0.0, 0.0)), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(vec2(499.9, 499.9)), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::containing(vec2(500.0, 0.0)), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::containing(vec2(-0.1, 0.0)), ChunkCoord::new(-1, 0));
    }

    #[test]
    fn test_chunk_coord_distance() {
        let origin = ChunkCoord::new(0, 0);
        assert_eq!(origin.chebyshev_distance(ChunkCoord::new(1, 1)), 1);
        assert_eq!(origin.chebyshev_distance(ChunkCoord::new(-2, 1)), 2);
        assert_eq!(origin.chebyshev_distance(origin), 0);
    }

    #[test]
    fn test_entity_id_uniqueness() {
        let id1 = new_entity_id();
        let id2 = new_entity_id();
        assert_ne!(id1, id2);
    }
}
