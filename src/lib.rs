//! # Wayfarer
//!
//! A tile-based 2D adventure game: the player walks through a chunked world, bumps into
//! walls and townsfolk, and talks to NPCs through branching, data-driven dialogue.
//!
//! ## Architecture Overview
//!
//! - **Dialogue**: content store, node materialization, the per-agent session state
//!   machine, and the coordinator that keeps at most one conversation open
//! - **Game**: agents, the player, chunked world geometry, and the per-frame `GameState`
//! - **Input**: macroquad polling turned into an ordered batch of discrete events
//! - **Rendering**: macroquad drawing of the world and the dialogue box
//!
//! The dialogue core never touches macroquad's window or input state directly, so all of
//! it can be exercised headless from tests.

pub mod dialogue;
pub mod game;
pub mod input;
pub mod rendering;
pub mod scenes;

pub use dialogue::*;
pub use game::*;
pub use input::*;
pub use rendering::*;
pub use scenes::*;

use std::path::PathBuf;

/// Core error type for Wayfarer.
#[derive(thiserror::Error, Debug)]
pub enum WayfarerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The dialogue content file could not be read
    #[error("Failed to read dialogue content from {path}: {source}")]
    ContentLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dialogue content parsed but its top-level structure is unusable
    #[error("Invalid dialogue content: {0}")]
    InvalidContent(String),

    /// World layout is inconsistent
    #[error("Invalid world layout: {0}")]
    InvalidWorld(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Wayfarer codebase.
pub type WayfarerResult<T> = Result<T, WayfarerError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Edge length of a square tile in pixels
    pub const TILE_SIZE: f32 = 50.0;

    /// Tiles along each edge of a chunk
    pub const CHUNK_TILES: usize = 10;

    /// Edge length of a chunk in pixels
    pub const CHUNK_PIXELS: f32 = TILE_SIZE * CHUNK_TILES as f32;

    /// Chunks around the player's chunk that are drawn
    pub const RENDER_DISTANCE: i32 = 1;

    /// Player speed in pixels per second
    pub const PLAYER_SPEED: f32 = 200.0;

    /// Radius of humans (player and agents) in pixels
    pub const HUMAN_SIZE: f32 = 12.0;

    /// Extra clearance kept between the player and an agent
    pub const COLLISION_MARGIN: f32 = 8.0;

    /// Detection radius used when an agent spawn does not name one
    pub const DEFAULT_DETECTION_RADIUS: f32 = 60.0;

    /// Seconds before a flavour-text dialogue closes by itself
    pub const FLAVOR_TEXT_TIMEOUT_SECS: f64 = 5.0;

    /// Default location of the dialogue content file
    pub const DEFAULT_CONTENT_PATH: &str = "assets/dialogue.json";

    /// Requested window width in pixels
    pub const WINDOW_WIDTH: f32 = 1280.0;

    /// Requested window height in pixels
    pub const WINDOW_HEIGHT: f32 = 720.0;
}
