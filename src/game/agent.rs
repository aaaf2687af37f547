//! # Agents
//!
//! NPCs placed in the world. Each agent owns a dialogue session and decides, from the
//! frame's input batch, when to open it and how to drive it.

use crate::config::{DEFAULT_DETECTION_RADIUS, HUMAN_SIZE, TILE_SIZE};
use crate::dialogue::{
    materialize_entry, CloseReason, ConfirmOutcome, ContentStore, DialogueContext,
    DialogueCoordinator, DialogueKey, DialogueSession, DialogueView, Navigation,
};
use crate::input::{InputEvent, KeyAction};
use crate::{new_entity_id, EntityId, GameEvent};
use log::{debug, info};
use macroquad::math::{vec2, Vec2};
use std::rc::Rc;

/// Spawn data for an agent, as handed over by the world loader.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    /// Tile within the chunk
    pub tile: (usize, usize),
    /// Pixel offset from the tile's top-left corner
    pub tile_offset: Vec2,
    pub name: String,
    pub profession: String,
    pub detection_radius: f32,
    pub dialogue_key: DialogueKey,
    /// Non-interactive agents only ever say generic flavour text
    pub interactive: bool,
}

/// Name shown for agents spawned without one.
pub const UNNAMED_AGENT: &str = "Unknown";

impl AgentSpec {
    pub fn new(name: impl Into<String>, dialogue_key: DialogueKey) -> Self {
        Self {
            tile: (0, 0),
            tile_offset: Vec2::ZERO,
            name: name.into(),
            profession: "none".to_string(),
            detection_radius: DEFAULT_DETECTION_RADIUS,
            dialogue_key,
            interactive: true,
        }
    }

    /// An agent the world data gave no name.
    pub fn unnamed(dialogue_key: DialogueKey) -> Self {
        Self::new(UNNAMED_AGENT, dialogue_key)
    }

    pub fn at_tile(mut self, x: usize, y: usize) -> Self {
        self.tile = (x, y);
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.tile_offset = offset;
        self
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = profession.into();
        self
    }

    pub fn with_detection(mut self, radius: f32) -> Self {
        self.detection_radius = radius;
        self
    }

    /// Marks the agent as a bystander that only offers flavour text.
    pub fn ambient(mut self) -> Self {
        self.interactive = false;
        self
    }
}

/// A non-player character able to hold a conversation.
#[derive(Debug, Clone)]
pub struct Agent {
    id: EntityId,
    pub name: String,
    pub profession: String,
    pub position: Vec2,
    pub detection_radius: f32,
    pub size: f32,
    pub dialogue_key: DialogueKey,
    pub interactive: bool,
    content: Rc<ContentStore>,
    session: DialogueSession,
}

impl Agent {
    /// Creates an agent at an absolute world position.
    pub fn new(position: Vec2, spec: &AgentSpec, content: Rc<ContentStore>) -> Self {
        Self {
            id: new_entity_id(),
            name: spec.name.clone(),
            profession: spec.profession.clone(),
            position,
            detection_radius: spec.detection_radius,
            size: HUMAN_SIZE,
            dialogue_key: spec.dialogue_key.clone(),
            interactive: spec.interactive,
            content,
            session: DialogueSession::new(),
        }
    }

    /// Creates an agent placed relative to its chunk's origin.
    pub fn from_spec(spec: &AgentSpec, chunk_origin: Vec2, content: Rc<ContentStore>) -> Self {
        let tile_corner = vec2(
            spec.tile.0 as f32 * TILE_SIZE,
            spec.tile.1 as f32 * TILE_SIZE,
        );
        Self::new(chunk_origin + tile_corner + spec.tile_offset, spec, content)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn session(&self) -> &DialogueSession {
        &self.session
    }

    pub fn is_talking(&self) -> bool {
        self.session.is_open()
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }

    /// Whether the player stands close enough to talk.
    pub fn in_range(&self, player_position: Vec2) -> bool {
        self.distance_to(player_position) <= self.detection_radius
    }

    pub fn screen_position(&self, camera_offset: Vec2) -> Vec2 {
        self.position - camera_offset
    }

    /// The key this agent actually looks up.
    pub fn lookup_key(&self) -> DialogueKey {
        if self.interactive {
            self.dialogue_key.clone()
        } else {
            self.dialogue_key.to_generic()
        }
    }

    /// Render-ready view of the current conversation.
    pub fn dialogue_view(&self) -> Option<DialogueView> {
        self.session.view(&self.name)
    }

    fn is_interaction(&self, event: &InputEvent, camera_offset: Vec2) -> bool {
        match event {
            InputEvent::PointerDown { position } => {
                position.distance(self.screen_position(camera_offset)) <= self.detection_radius
            }
            InputEvent::Key(KeyAction::Interact) => true,
            InputEvent::Key(_) => false,
        }
    }

    /// Opens a conversation if the shared lock allows it.
    pub fn trigger(&mut self, ctx: &mut DialogueContext<'_>) -> Option<GameEvent> {
        if self.session.is_open() {
            return None;
        }
        if !ctx.coordinator.try_acquire(self.id) {
            let holder = ctx.coordinator.holder()?;
            debug!("{} cannot talk: another dialogue holds the lock", self.name);
            return Some(GameEvent::TriggerBlocked {
                agent_id: self.id,
                holder,
            });
        }

        let key = self.lookup_key();
        let entry = self.content.resolve(&key);
        let node = materialize_entry(entry, &self.name, ctx.picker);
        self.session.open(node, ctx.now, ctx.flavor_timeout);

        info!("{} opened dialogue \"{}\"", self.name, key);
        Some(GameEvent::DialogueOpened {
            agent_id: self.id,
            speaker: self.name.clone(),
        })
    }

    /// Processes one frame of input for this agent.
    ///
    /// Events are handled in order. While closed, interaction events from a player in
    /// range try to open the session; the event that opens it is not reused. While open,
    /// up/down/confirm drive the session.
    pub fn update(
        &mut self,
        player_position: Vec2,
        camera_offset: Vec2,
        events: &[InputEvent],
        ctx: &mut DialogueContext<'_>,
    ) -> Vec<GameEvent> {
        let mut out = Vec::new();

        if self.session.expire_if_due(ctx.now) {
            ctx.coordinator.release(self.id);
            debug!("{}'s flavour text timed out", self.name);
            out.push(GameEvent::DialogueClosed {
                agent_id: self.id,
                reason: CloseReason::Expired,
            });
        }

        let in_range = self.in_range(player_position);
        for event in events {
            if !self.session.is_open() {
                if in_range && self.is_interaction(event, camera_offset) {
                    out.extend(self.trigger(ctx));
                }
                continue;
            }

            match event {
                InputEvent::Key(KeyAction::Up) => {
                    self.session.navigate(Navigation::Up);
                }
                InputEvent::Key(KeyAction::Down) => {
                    self.session.navigate(Navigation::Down);
                }
                InputEvent::Key(KeyAction::Confirm) => {
                    self.confirm(ctx, &mut out);
                }
                InputEvent::Key(KeyAction::Interact) | InputEvent::PointerDown { .. } => {}
            }
        }

        out
    }

    fn confirm(&mut self, ctx: &mut DialogueContext<'_>, out: &mut Vec<GameEvent>) {
        match self.session.confirm(ctx.picker) {
            ConfirmOutcome::Advanced { effect } => {
                out.extend(self.effect_event(effect));
                out.push(GameEvent::DialogueAdvanced { agent_id: self.id });
            }
            ConfirmOutcome::Closed { effect, reason } => {
                out.extend(self.effect_event(effect));
                ctx.coordinator.release(self.id);
                info!("{} closed dialogue ({:?})", self.name, reason);
                out.push(GameEvent::DialogueClosed {
                    agent_id: self.id,
                    reason,
                });
            }
            ConfirmOutcome::Ignored => {}
        }
    }

    fn effect_event(&self, effect: Option<String>) -> Option<GameEvent> {
        effect.map(|effect| GameEvent::EffectTriggered {
            agent_id: self.id,
            effect,
        })
    }

    /// Closes an open conversation from outside, releasing the lock.
    pub fn end_dialogue(&mut self, coordinator: &mut DialogueCoordinator) -> Option<GameEvent> {
        if !self.session.close() {
            return None;
        }
        coordinator.release(self.id);
        Some(GameEvent::DialogueClosed {
            agent_id: self.id,
            reason: CloseReason::Interrupted,
        })
    }
}
