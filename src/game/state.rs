//! # Game State Module
//!
//! Central game state and the per-frame tick that ties input, movement, and dialogue
//! together.
//!
//! The tick is headless: it receives the frame's input batch and the clock from the
//! caller, so the whole game loop minus drawing can be driven from tests.

use crate::config::{FLAVOR_TEXT_TIMEOUT_SECS, RENDER_DISTANCE, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::dialogue::{ContentStore, DialogueContext, DialogueCoordinator, DialogueView, LinePicker};
use crate::input::FrameInput;
use crate::{Agent, ChunkCoord, ChunkLayout, GameEvent, Player, WayfarerError, WayfarerResult, World};
use log::debug;
use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Runtime choices for a play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seconds before flavour text closes by itself; `None` keeps it open until dismissed
    pub flavor_timeout: Option<f64>,
    /// Chunks around the player's chunk that are drawn
    pub render_distance: i32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl GameConfig {
    pub fn new(flavor_timeout: Option<f64>, render_distance: i32) -> Self {
        Self {
            flavor_timeout,
            render_distance,
            ..Self::default()
        }
    }

    /// Configuration for headless tests: a small viewport and the standard timeout.
    pub fn for_testing() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            ..Self::default()
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            flavor_timeout: Some(FLAVOR_TEXT_TIMEOUT_SECS),
            render_distance: RENDER_DISTANCE,
            viewport_width: WINDOW_WIDTH,
            viewport_height: WINDOW_HEIGHT,
        }
    }
}

/// Central game state containing the world, the player, and the interaction lock.
pub struct GameState {
    pub world: World,
    pub player: Player,
    pub coordinator: DialogueCoordinator,
    pub config: GameConfig,
    content: Rc<ContentStore>,
    picker: Box<dyn LinePicker>,
    /// Frames ticked so far
    pub frame_number: u64,
}

impl GameState {
    /// Builds the world from `layouts` and places the player at `spawn`.
    pub fn new(
        content: ContentStore,
        layouts: Vec<ChunkLayout>,
        spawn: Vec2,
        config: GameConfig,
        picker: Box<dyn LinePicker>,
    ) -> WayfarerResult<Self> {
        let content = Rc::new(content);
        let world = World::from_layouts(layouts, &content, config.render_distance)?;
        if !world.is_walkable(spawn) {
            return Err(WayfarerError::InvalidState(format!(
                "player spawn ({}, {}) is not on a walkable tile",
                spawn.x, spawn.y
            )));
        }

        Ok(Self {
            world,
            player: Player::new(spawn),
            coordinator: DialogueCoordinator::new(),
            config,
            content,
            picker,
            frame_number: 0,
        })
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// World position of the top-left corner of the screen, keeping the player centred.
    pub fn camera_offset(&self) -> Vec2 {
        self.player.position - vec2(self.config.viewport_width, self.config.viewport_height) / 2.0
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
    }

    /// Advances one frame.
    ///
    /// The player moves first, unless a conversation holds the lock. Every agent then
    /// sees the same ordered event batch.
    pub fn tick(&mut self, input: &FrameInput, dt: f32, now: f64) -> Vec<GameEvent> {
        self.frame_number += 1;
        let mut events = Vec::new();

        if !self.coordinator.is_locked() {
            if let Some((from, to)) = self.player.try_move(input.movement, dt, &self.world) {
                events.push(GameEvent::PlayerMoved { from, to });
            }
        }

        let player_position = self.player.position;
        let camera_offset = self.camera_offset();
        let mut ctx = DialogueContext {
            coordinator: &mut self.coordinator,
            picker: self.picker.as_mut(),
            now,
            flavor_timeout: self.config.flavor_timeout,
        };
        for agent in self.world.agents_mut() {
            events.extend(agent.update(player_position, camera_offset, &input.events, &mut ctx));
        }

        if !events.is_empty() {
            debug!("Frame {}: {} events", self.frame_number, events.len());
        }
        events
    }

    /// The agent currently in conversation, if any.
    pub fn talking_agent(&self) -> Option<&Agent> {
        self.coordinator
            .holder()
            .and_then(|holder| self.world.agent(holder))
    }

    pub fn active_dialogue(&self) -> Option<DialogueView> {
        self.talking_agent().and_then(Agent::dialogue_view)
    }

    pub fn open_session_count(&self) -> usize {
        self.world.agents().filter(|agent| agent.is_talking()).count()
    }

    pub fn load_chunk(&mut self, layout: ChunkLayout) -> WayfarerResult<()> {
        self.world.load_chunk(layout, &self.content)
    }

    /// Unloads a chunk, closing any conversation held by its agents.
    pub fn unload_chunk(&mut self, coord: ChunkCoord) -> Vec<GameEvent> {
        self.world
            .unload_chunk(coord, &mut self.coordinator)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::{CloseReason, DialogueKey, FixedPicker};
    use crate::input::{InputEvent, KeyAction};
    use crate::AgentSpec;

    const CONTENT: &str = r#"{
        "villager": {"dialogue": "Nice weather.", "options": [{"option": "Bye"}]},
        "default": ["Hm?"]
    }"#;

    fn game() -> GameState {
        let content = ContentStore::from_json_str(CONTENT).unwrap();
        let layout = ChunkLayout::open(ChunkCoord::new(0, 0), "field")
            .with_agent(
                AgentSpec::new("Ada", DialogueKey::entry("villager"))
                    .at_tile(2, 2)
                    .with_offset(vec2(25.0, 25.0)),
            )
            .with_agent(
                AgentSpec::new("Bo", DialogueKey::entry("villager"))
                    .at_tile(3, 2)
                    .with_offset(vec2(25.0, 25.0)),
            );
        GameState::new(
            content,
            vec![layout],
            vec2(150.0, 175.0),
            GameConfig::for_testing(),
            Box::new(FixedPicker::first()),
        )
        .unwrap()
    }

    #[test]
    fn test_spawn_must_be_walkable() {
        let content = ContentStore::from_json_str(CONTENT).unwrap();
        let result = GameState::new(
            content,
            vec![ChunkLayout::open(ChunkCoord::new(0, 0), "field")],
            vec2(-100.0, 0.0),
            GameConfig::for_testing(),
            Box::new(FixedPicker::first()),
        );
        assert!(matches!(result, Err(WayfarerError::InvalidState(_))));
    }

    #[test]
    fn test_camera_centres_player() {
        let game = game();
        assert_eq!(game.camera_offset(), vec2(-250.0, -125.0));
    }

    #[test]
    fn test_interact_opens_one_session_only() {
        let mut game = game();
        let input = FrameInput::new().with_event(InputEvent::Key(KeyAction::Interact));

        let events = game.tick(&input, 0.016, 0.0);

        // Both agents are in range; the first takes the lock, the second is blocked.
        assert_eq!(game.open_session_count(), 1);
        assert!(matches!(events[0], GameEvent::DialogueOpened { .. }));
        assert!(matches!(events[1], GameEvent::TriggerBlocked { .. }));
        assert_eq!(
            game.active_dialogue().map(|view| view.speaker),
            Some("Ada".to_string())
        );
    }

    #[test]
    fn test_movement_suppressed_while_talking() {
        let mut game = game();
        game.tick(
            &FrameInput::new().with_event(InputEvent::Key(KeyAction::Interact)),
            0.016,
            0.0,
        );
        let start = game.player.position;

        let events = game.tick(&FrameInput::new().with_movement(vec2(0.0, 1.0)), 0.1, 0.1);

        assert!(events.is_empty());
        assert_eq!(game.player.position, start);

        let events = game.tick(
            &FrameInput::new().with_event(InputEvent::Key(KeyAction::Confirm)),
            0.016,
            0.2,
        );
        assert!(events.contains(&GameEvent::DialogueClosed {
            agent_id: game.world.agent_named("Ada").unwrap().id(),
            reason: CloseReason::Selected,
        }));
        assert!(!game.coordinator.is_locked());

        let events = game.tick(&FrameInput::new().with_movement(vec2(0.0, 1.0)), 0.1, 0.3);
        assert!(matches!(events.as_slice(), [GameEvent::PlayerMoved { .. }]));
        assert_eq!(game.player.position, start + vec2(0.0, 20.0));
    }

    #[test]
    fn test_unload_chunk_closes_conversation() {
        let mut game = game();
        game.tick(
            &FrameInput::new().with_event(InputEvent::Key(KeyAction::Interact)),
            0.016,
            0.0,
        );

        let events = game.unload_chunk(ChunkCoord::new(0, 0));

        assert_eq!(events.len(), 1);
        assert!(!game.coordinator.is_locked());
        assert!(game.active_dialogue().is_none());
        assert!(game.unload_chunk(ChunkCoord::new(0, 0)).is_empty());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = GameConfig::new(None, 2);
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.flavor_timeout, None);
    }
}
