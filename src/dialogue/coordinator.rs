//! # Dialogue Coordinator
//!
//! Owner of the shared interaction lock. Exactly one agent may hold it; while it is
//! held no other agent may open a conversation and the player does not move.

use crate::dialogue::LinePicker;
use crate::EntityId;

/// Holds the interaction lock on behalf of at most one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogueCoordinator {
    holder: Option<EntityId>,
}

impl DialogueCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any conversation is open.
    pub fn is_locked(&self) -> bool {
        self.holder.is_some()
    }

    pub fn holder(&self) -> Option<EntityId> {
        self.holder
    }

    /// Takes the lock for `agent`. Succeeds when the lock is free or already theirs.
    pub fn try_acquire(&mut self, agent: EntityId) -> bool {
        match self.holder {
            None => {
                self.holder = Some(agent);
                true
            }
            Some(holder) => holder == agent,
        }
    }

    /// Releases the lock if `agent` holds it.
    pub fn release(&mut self, agent: EntityId) -> bool {
        if self.holder == Some(agent) {
            self.holder = None;
            true
        } else {
            false
        }
    }
}

/// Per-frame capabilities handed to every agent update.
pub struct DialogueContext<'a> {
    pub coordinator: &'a mut DialogueCoordinator,
    pub picker: &'a mut dyn LinePicker,
    /// Seconds since the game started
    pub now: f64,
    /// Seconds before flavour text closes by itself, if at all
    pub flavor_timeout: Option<f64>,
}
