//! # Dialogue Session
//!
//! The per-agent conversation state machine.
//!
//! A session is either closed or open on a materialized node with a selection cursor.
//! Navigation moves the cursor, confirm either follows the selected option's response
//! (staying open) or closes. Releasing the shared interaction lock is the owning
//! agent's job; the session only reports that it closed.

use crate::dialogue::{materialize_node, ActiveNode, LinePicker, NodeKind};

/// Cursor movement through the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Up,
    Down,
}

/// Why a session closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// An option without a response was confirmed
    Selected,
    /// Confirm on a node with no options
    NoOptions,
    /// The cursor did not point at an option
    InvalidSelection,
    /// The flavour-text display timed out
    Expired,
    /// Closed from outside, e.g. the agent's chunk unloaded
    Interrupted,
}

/// Result of a confirm press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Moved on to the selected option's response
    Advanced { effect: Option<String> },
    /// The session is now closed
    Closed {
        effect: Option<String>,
        reason: CloseReason,
    },
    /// The session was not open
    Ignored,
}

/// State of an open conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenDialogue {
    pub node: ActiveNode,
    pub selected: usize,
    pub opened_at: f64,
    pub expires_at: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Closed,
    Open(OpenDialogue),
}

/// One option as the dialogue box should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub text: String,
    pub selected: bool,
}

/// Everything the presentation layer needs to draw a dialogue box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueView {
    pub speaker: String,
    pub line: String,
    pub options: Vec<OptionView>,
    /// Placeholder lines already carry the speaker's name
    pub kind: NodeKind,
}

/// Conversation state machine owned by a single agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueSession {
    state: SessionState,
}

impl DialogueSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Opens the session on a freshly materialized root node.
    ///
    /// Flavour-text nodes get an expiry deadline when `flavor_timeout` is set.
    pub fn open(&mut self, node: ActiveNode, now: f64, flavor_timeout: Option<f64>) {
        let expires_at = match node.kind {
            NodeKind::Flavor => flavor_timeout.map(|timeout| now + timeout),
            NodeKind::Structured | NodeKind::Placeholder => None,
        };
        self.state = SessionState::Open(OpenDialogue {
            node,
            selected: 0,
            opened_at: now,
            expires_at,
        });
    }

    /// Moves the cursor, wrapping around. Returns false when nothing moved.
    pub fn navigate(&mut self, direction: Navigation) -> bool {
        let SessionState::Open(open) = &mut self.state else {
            return false;
        };
        let count = open.node.options.len();
        if count == 0 {
            return false;
        }

        let current = open.selected % count;
        open.selected = match direction {
            Navigation::Up => (current + count - 1) % count,
            Navigation::Down => (current + 1) % count,
        };
        true
    }

    /// Confirms the selected option.
    pub fn confirm(&mut self, picker: &mut dyn LinePicker) -> ConfirmOutcome {
        let SessionState::Open(open) = &mut self.state else {
            return ConfirmOutcome::Ignored;
        };

        let Some(option) = open.node.options.get(open.selected) else {
            let reason = if open.node.options.is_empty() {
                CloseReason::NoOptions
            } else {
                CloseReason::InvalidSelection
            };
            self.state = SessionState::Closed;
            return ConfirmOutcome::Closed {
                effect: None,
                reason,
            };
        };

        let effect = option.effect.clone();
        match option.response.clone() {
            Some(next) => {
                open.node = materialize_node(&next, picker);
                open.selected = 0;
                open.expires_at = None;
                ConfirmOutcome::Advanced { effect }
            }
            None => {
                self.state = SessionState::Closed;
                ConfirmOutcome::Closed {
                    effect,
                    reason: CloseReason::Selected,
                }
            }
        }
    }

    /// Closes the session if its flavour-text deadline has passed.
    pub fn expire_if_due(&mut self, now: f64) -> bool {
        let due = matches!(
            &self.state,
            SessionState::Open(OpenDialogue { expires_at: Some(deadline), .. }) if now >= *deadline
        );
        if due {
            self.state = SessionState::Closed;
        }
        due
    }

    /// Closes the session unconditionally. Returns whether it was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = SessionState::Closed;
        was_open
    }

    pub fn current_node(&self) -> Option<&ActiveNode> {
        match &self.state {
            SessionState::Open(open) => Some(&open.node),
            SessionState::Closed => None,
        }
    }

    pub fn current_line(&self) -> Option<&str> {
        self.current_node().map(|node| node.line.as_str())
    }

    pub fn selected_index(&self) -> Option<usize> {
        match &self.state {
            SessionState::Open(open) => Some(open.selected),
            SessionState::Closed => None,
        }
    }

    pub fn opened_at(&self) -> Option<f64> {
        match &self.state {
            SessionState::Open(open) => Some(open.opened_at),
            SessionState::Closed => None,
        }
    }

    /// Render-ready view of an open session.
    pub fn view(&self, speaker: &str) -> Option<DialogueView> {
        let SessionState::Open(open) = &self.state else {
            return None;
        };
        Some(DialogueView {
            speaker: speaker.to_string(),
            line: open.node.line.clone(),
            options: open
                .node
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| OptionView {
                    text: option.text.clone(),
                    selected: index == open.selected,
                })
                .collect(),
            kind: open.node.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::{DialogueNode, DialogueOption, FixedPicker};

    fn shopkeeper_node() -> ActiveNode {
        let node = DialogueNode::line("Hello")
            .with_option(DialogueOption::new("Buy").with_effect("open_store"))
            .with_option(DialogueOption::new("Leave"));
        materialize_node(&node, &mut FixedPicker::first())
    }

    fn open_session(node: ActiveNode) -> DialogueSession {
        let mut session = DialogueSession::new();
        session.open(node, 0.0, None);
        session
    }

    #[test]
    fn test_open_resets_cursor() {
        let mut session = open_session(shopkeeper_node());
        session.navigate(Navigation::Down);
        session.open(shopkeeper_node(), 1.0, None);

        assert!(session.is_open());
        assert_eq!(session.selected_index(), Some(0));
        assert_eq!(session.opened_at(), Some(1.0));
        assert_eq!(session.current_line(), Some("Hello"));
    }

    #[test]
    fn test_cursor_wraps_both_ways() {
        let mut session = open_session(shopkeeper_node());

        assert!(session.navigate(Navigation::Up));
        assert_eq!(session.selected_index(), Some(1));
        assert!(session.navigate(Navigation::Down));
        assert_eq!(session.selected_index(), Some(0));
        session.navigate(Navigation::Down);
        session.navigate(Navigation::Down);
        assert_eq!(session.selected_index(), Some(0));
    }

    #[test]
    fn test_navigation_without_options_is_noop() {
        let mut session = open_session(ActiveNode::placeholder("nothing here"));

        assert!(!session.navigate(Navigation::Up));
        assert!(!session.navigate(Navigation::Down));
        assert_eq!(session.selected_index(), Some(0));

        let mut closed = DialogueSession::new();
        assert!(!closed.navigate(Navigation::Down));
    }

    #[test]
    fn test_confirm_plain_option_closes_with_effect() {
        let mut session = open_session(shopkeeper_node());

        let outcome = session.confirm(&mut FixedPicker::first());

        assert_eq!(
            outcome,
            ConfirmOutcome::Closed {
                effect: Some("open_store".to_string()),
                reason: CloseReason::Selected,
            }
        );
        assert!(!session.is_open());
    }

    #[test]
    fn test_confirm_follows_response() {
        let node = DialogueNode::line("Q1").with_option(
            DialogueOption::new("yes")
                .with_effect("agree")
                .with_response(DialogueNode::line("Q2")),
        );
        let mut session = open_session(materialize_node(&node, &mut FixedPicker::first()));

        let outcome = session.confirm(&mut FixedPicker::first());
        assert_eq!(
            outcome,
            ConfirmOutcome::Advanced {
                effect: Some("agree".to_string())
            }
        );
        assert_eq!(session.current_line(), Some("Q2"));
        assert_eq!(session.selected_index(), Some(0));
        assert!(session.current_node().unwrap().is_terminal());

        let outcome = session.confirm(&mut FixedPicker::first());
        assert_eq!(
            outcome,
            ConfirmOutcome::Closed {
                effect: None,
                reason: CloseReason::NoOptions,
            }
        );
        assert!(!session.is_open());
    }

    #[test]
    fn test_confirm_with_stale_cursor_closes() {
        let mut session = open_session(shopkeeper_node());
        if let SessionState::Open(open) = &mut session.state {
            open.selected = 5;
        }

        let outcome = session.confirm(&mut FixedPicker::first());

        assert_eq!(
            outcome,
            ConfirmOutcome::Closed {
                effect: None,
                reason: CloseReason::InvalidSelection,
            }
        );
        assert!(!session.is_open());
    }

    #[test]
    fn test_confirm_when_closed_is_ignored() {
        let mut session = DialogueSession::new();
        assert_eq!(session.confirm(&mut FixedPicker::first()), ConfirmOutcome::Ignored);
    }

    #[test]
    fn test_flavor_text_expires() {
        let flavor = ActiveNode {
            line: "Nice day.".to_string(),
            options: Vec::new(),
            kind: NodeKind::Flavor,
        };
        let mut session = DialogueSession::new();
        session.open(flavor, 10.0, Some(5.0));

        assert!(!session.expire_if_due(14.9));
        assert!(session.is_open());
        assert!(session.expire_if_due(15.0));
        assert!(!session.is_open());
    }

    #[test]
    fn test_structured_nodes_never_expire() {
        let mut session = DialogueSession::new();
        session.open(shopkeeper_node(), 0.0, Some(5.0));
        assert!(!session.expire_if_due(1_000.0));

        let mut placeholder = DialogueSession::new();
        placeholder.open(ActiveNode::placeholder("x: Dialogue not found."), 0.0, Some(5.0));
        assert!(!placeholder.expire_if_due(1_000.0));
    }

    #[test]
    fn test_view_marks_selection() {
        let mut session = open_session(shopkeeper_node());
        session.navigate(Navigation::Down);

        let view = session.view("Greta").unwrap();
        assert_eq!(view.speaker, "Greta");
        assert_eq!(view.line, "Hello");
        assert_eq!(
            view.options,
            vec![
                OptionView {
                    text: "Buy".to_string(),
                    selected: false
                },
                OptionView {
                    text: "Leave".to_string(),
                    selected: true
                },
            ]
        );

        session.close();
        assert!(session.view("Greta").is_none());
    }
}
