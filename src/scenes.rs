//! # Scene Management System
//!
//! Drives the frame loop: poll input, tick the game, report events, draw.

use crate::{GameEvent, GameState, InputHandler, MacroquadDisplay, WayfarerResult};
use log::info;
use macroquad::prelude::*;

/// Message-log text for a game event, if it deserves one.
pub fn describe_event(game_state: &GameState, event: &GameEvent) -> Option<String> {
    let name_of = |id| {
        game_state
            .world
            .agent(id)
            .map_or_else(|| "Someone".to_string(), |agent| agent.name.clone())
    };

    match event {
        GameEvent::DialogueOpened { speaker, .. } => Some(format!("You talk to {}.", speaker)),
        GameEvent::EffectTriggered { agent_id, effect } => {
            Some(format!("{} triggers \"{}\".", name_of(*agent_id), effect))
        }
        GameEvent::TriggerBlocked { holder, .. } => {
            Some(format!("You are still talking to {}.", name_of(*holder)))
        }
        GameEvent::DialogueAdvanced { .. }
        | GameEvent::DialogueClosed { .. }
        | GameEvent::PlayerMoved { .. } => None,
    }
}

/// The main scene manager that owns the game and its presentation
pub struct SceneManager {
    game_state: GameState,
    display: MacroquadDisplay,
    input_handler: InputHandler,
}

impl SceneManager {
    pub fn new(game_state: GameState, display: MacroquadDisplay, input_handler: InputHandler) -> Self {
        let mut manager = Self {
            game_state,
            display,
            input_handler,
        };
        manager
            .display
            .add_message(format!("Welcome to Wayfarer v{}!", crate::VERSION));
        manager.display.add_message(
            "WASD/arrows to walk, click or E to talk, arrows + Enter to choose, Esc to quit"
                .to_string(),
        );
        manager
    }

    /// Runs the main loop until the player quits
    pub async fn run(&mut self) -> WayfarerResult<()> {
        loop {
            if self.update()? {
                info!("Quit requested after {} frames", self.game_state.frame_number);
                break;
            }
            next_frame().await;
        }
        Ok(())
    }

    /// Runs one frame, returns true if exit is requested
    fn update(&mut self) -> WayfarerResult<bool> {
        let input = self.input_handler.poll();
        if input.quit {
            return Ok(true);
        }

        self.display.resize(screen_width(), screen_height());
        self.game_state
            .set_viewport(self.display.screen_width, self.display.screen_height);

        let events = self
            .game_state
            .tick(&input, get_frame_time(), get_time());
        self.process_game_events(&events);

        self.display.render_game(&self.game_state)?;
        Ok(false)
    }

    fn process_game_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::EffectTriggered { agent_id, effect } = event {
                #[cfg(feature = "dev-tools")]
                tracing::info!(agent = %agent_id, effect = %effect, "dialogue effect triggered");
                #[cfg(not(feature = "dev-tools"))]
                info!("Dialogue effect \"{}\" triggered by {}", effect, agent_id);
            }

            if let Some(message) = describe_event(&self.game_state, event) {
                self.display.add_message(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{starter_layouts, starter_spawn, ContentStore, FixedPicker, GameConfig};

    fn game() -> GameState {
        let content = ContentStore::from_json_str(r#"{"default": ["Hm?"]}"#).unwrap();
        GameState::new(
            content,
            starter_layouts().unwrap(),
            starter_spawn(),
            GameConfig::for_testing(),
            Box::new(FixedPicker::first()),
        )
        .unwrap()
    }

    #[test]
    fn test_describe_event() {
        let game = game();
        let greta = game.world.agent_named("Greta").unwrap().id();

        assert_eq!(
            describe_event(
                &game,
                &GameEvent::EffectTriggered {
                    agent_id: greta,
                    effect: "open_store".to_string(),
                }
            ),
            Some("Greta triggers \"open_store\".".to_string())
        );
        assert_eq!(
            describe_event(
                &game,
                &GameEvent::TriggerBlocked {
                    agent_id: greta,
                    holder: crate::new_entity_id(),
                }
            ),
            Some("You are still talking to Someone.".to_string())
        );
        assert_eq!(
            describe_event(
                &game,
                &GameEvent::PlayerMoved {
                    from: Vec2::ZERO,
                    to: Vec2::ONE,
                }
            ),
            None
        );
    }
}
