//! # User Interface Elements
//!
//! The dialogue box drawn over the world while a conversation is open.

use crate::dialogue::{DialogueView, NodeKind};
use macroquad::prelude::*;

/// Colour of the highlighted option.
pub const SELECTED_COLOR: Color = YELLOW;

/// Box anchored to the bottom of the screen showing the speaker's line and options.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueBox {
    pub font_size: f32,
    pub line_height: f32,
    pub padding: f32,
    /// Distance between the box and the bottom of the screen
    pub bottom_margin: f32,
}

impl Default for DialogueBox {
    fn default() -> Self {
        Self {
            font_size: 22.0,
            line_height: 26.0,
            padding: 16.0,
            bottom_margin: 110.0,
        }
    }
}

impl DialogueBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text rows of the box, top to bottom, with their colours.
    pub fn rows(&self, view: &DialogueView) -> Vec<(String, Color)> {
        let mut rows = Vec::with_capacity(view.options.len() + 1);
        let heading = match view.kind {
            NodeKind::Placeholder => view.line.clone(),
            NodeKind::Flavor | NodeKind::Structured => format!("{}: {}", view.speaker, view.line),
        };
        rows.push((heading, WHITE));
        rows.extend(view.options.iter().map(|option| {
            if option.selected {
                (format!("> {}", option.text), SELECTED_COLOR)
            } else {
                (format!("  {}", option.text), LIGHTGRAY)
            }
        }));
        rows
    }

    /// Height of the box for a given number of rows.
    pub fn height(&self, rows: usize) -> f32 {
        rows as f32 * self.line_height + self.padding * 2.0
    }

    pub fn render(&self, view: &DialogueView, screen_width: f32, screen_height: f32) {
        let rows = self.rows(view);
        let height = self.height(rows.len());
        let x = self.padding;
        let y = screen_height - self.bottom_margin - height;
        let width = screen_width - self.padding * 2.0;

        draw_rectangle(x, y, width, height, Color::new(0.05, 0.05, 0.1, 0.9));
        draw_rectangle_lines(x, y, width, height, 2.0, GRAY);

        for (i, (text, color)) in rows.iter().enumerate() {
            let baseline = y + self.padding + (i as f32 + 0.75) * self.line_height;
            draw_text(text, x + self.padding, baseline, self.font_size, *color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::OptionView;

    fn view() -> DialogueView {
        DialogueView {
            speaker: "Greta".to_string(),
            line: "Welcome!".to_string(),
            options: vec![
                OptionView {
                    text: "Buy".to_string(),
                    selected: false,
                },
                OptionView {
                    text: "Leave".to_string(),
                    selected: true,
                },
            ],
            kind: NodeKind::Structured,
        }
    }

    #[test]
    fn test_rows_highlight_selection() {
        let rows = DialogueBox::new().rows(&view());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].0, "Greta: Welcome!");
        assert_eq!(rows[1].0, "  Buy");
        assert_eq!(rows[2], ("> Leave".to_string(), SELECTED_COLOR));
    }

    #[test]
    fn test_placeholder_row_names_speaker_once() {
        let placeholder = DialogueView {
            speaker: "Greta".to_string(),
            line: "Greta: Dialogue not found.".to_string(),
            options: Vec::new(),
            kind: NodeKind::Placeholder,
        };

        let rows = DialogueBox::new().rows(&placeholder);

        assert_eq!(rows, vec![("Greta: Dialogue not found.".to_string(), WHITE)]);
    }

    #[test]
    fn test_height_grows_with_options() {
        let dialogue_box = DialogueBox::new();
        assert!(dialogue_box.height(3) > dialogue_box.height(1));
        assert_eq!(dialogue_box.height(0), dialogue_box.padding * 2.0);
    }
}
