//! # Display Management
//!
//! 2D rendering of the world, agents, player, message log, and dialogue box using
//! macroquad.

use crate::config::{CHUNK_PIXELS, TILE_SIZE};
use crate::game::{Agent, Chunk, GameState, TileKind};
use crate::rendering::DialogueBox;
use crate::WayfarerResult;
use macroquad::prelude::*;

/// Colour used for an agent of the given profession.
pub fn profession_color(profession: &str) -> Color {
    match profession {
        "shopkeeper" => BLUE,
        "beggar" => WHITE,
        _ => GREEN,
    }
}

/// Colour used for a tile.
pub fn tile_color(tile: TileKind) -> Color {
    match tile {
        TileKind::Floor => Color::new(0.35, 0.3, 0.25, 1.0),
        TileKind::Wall => DARKGRAY,
        TileKind::Furniture => BROWN,
    }
}

/// Macroquad display manager for the game.
pub struct MacroquadDisplay {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Message history
    pub messages: Vec<String>,
    /// Maximum number of messages to keep
    pub max_messages: usize,
    /// Draw chunk borders and room names
    pub show_chunk_overlay: bool,
    pub dialogue_box: DialogueBox,
}

impl MacroquadDisplay {
    pub fn new(screen_width: f32, screen_height: f32, show_chunk_overlay: bool) -> Self {
        Self {
            screen_width,
            screen_height,
            messages: Vec::new(),
            max_messages: 100,
            show_chunk_overlay,
            dialogue_box: DialogueBox::new(),
        }
    }

    /// Tracks a window resize.
    pub fn resize(&mut self, screen_width: f32, screen_height: f32) {
        self.screen_width = screen_width;
        self.screen_height = screen_height;
    }

    /// Renders the complete game screen.
    pub fn render_game(&self, game_state: &GameState) -> WayfarerResult<()> {
        clear_background(BLACK);

        let camera_offset = game_state.camera_offset();
        let player_position = game_state.player.position;

        for chunk in game_state.world.visible_chunks(player_position) {
            self.render_chunk(chunk, camera_offset);
        }
        for chunk in game_state.world.visible_chunks(player_position) {
            for agent in &chunk.agents {
                self.render_agent(agent, camera_offset);
            }
        }

        let player_screen = player_position - camera_offset;
        draw_circle(player_screen.x, player_screen.y, game_state.player.size, RED);

        if self.show_chunk_overlay {
            self.render_chunk_overlay(game_state, camera_offset);
        }

        self.render_messages();

        if let Some(view) = game_state.active_dialogue() {
            self.dialogue_box
                .render(&view, self.screen_width, self.screen_height);
        }

        Ok(())
    }

    fn render_chunk(&self, chunk: &Chunk, camera_offset: Vec2) {
        for (corner, tile) in chunk.tiles_with_positions() {
            let screen = corner - camera_offset;
            if screen.x > self.screen_width
                || screen.y > self.screen_height
                || screen.x + TILE_SIZE < 0.0
                || screen.y + TILE_SIZE < 0.0
            {
                continue;
            }
            draw_rectangle(screen.x, screen.y, TILE_SIZE, TILE_SIZE, tile_color(tile));
        }
    }

    fn render_agent(&self, agent: &Agent, camera_offset: Vec2) {
        let screen = agent.screen_position(camera_offset);
        draw_circle(screen.x, screen.y, agent.size, profession_color(&agent.profession));
        if agent.is_talking() {
            draw_circle_lines(screen.x, screen.y, agent.detection_radius, 1.0, YELLOW);
        }
        draw_text(
            &agent.name,
            screen.x - agent.size,
            screen.y - agent.size - 4.0,
            16.0,
            WHITE,
        );
    }

    fn render_chunk_overlay(&self, game_state: &GameState, camera_offset: Vec2) {
        for chunk in game_state.world.chunks() {
            let screen = chunk.origin() - camera_offset;
            draw_rectangle_lines(screen.x, screen.y, CHUNK_PIXELS, CHUNK_PIXELS, 2.0, MAGENTA);
            draw_text(
                &format!(
                    "{} ({}, {})",
                    chunk.room_identifier, chunk.coord.x, chunk.coord.y
                ),
                screen.x + 6.0,
                screen.y + 18.0,
                18.0,
                MAGENTA,
            );
        }
    }

    /// Renders the message area.
    fn render_messages(&self) {
        let message_area_y = self.screen_height - 80.0;
        let message_count = 3;
        let line_height = 18.0;

        draw_rectangle(
            0.0,
            message_area_y - 10.0,
            self.screen_width,
            90.0,
            Color::new(0.0, 0.0, 0.0, 0.8),
        );

        for (i, message) in self.recent_messages(message_count).iter().enumerate() {
            let y = message_area_y + i as f32 * line_height;
            draw_text(message, 10.0, y, 16.0, WHITE);
        }
    }

    /// The last `count` messages, oldest first.
    pub fn recent_messages(&self, count: usize) -> &[String] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    /// Adds a message to the message history.
    pub fn add_message(&mut self, message: String) {
        self.messages.push(message);

        if self.messages.len() > self.max_messages {
            self.messages.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profession_colors() {
        assert_eq!(profession_color("shopkeeper"), BLUE);
        assert_eq!(profession_color("beggar"), WHITE);
        assert_eq!(profession_color("guard"), GREEN);
        assert_eq!(profession_color("none"), GREEN);
    }

    #[test]
    fn test_message_history_is_capped() {
        let mut display = MacroquadDisplay::new(800.0, 600.0, false);
        display.max_messages = 3;

        for i in 0..5 {
            display.add_message(format!("message {}", i));
        }

        assert_eq!(display.messages.len(), 3);
        assert_eq!(display.messages[0], "message 2");
        assert_eq!(display.recent_messages(2), ["message 3", "message 4"]);
        assert_eq!(display.recent_messages(10).len(), 3);
    }
}
