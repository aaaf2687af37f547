//! Property tests for the dialogue core: mutual exclusion, cursor wraparound,
//! termination, and determinism under a fixed picker.

use macroquad::math::vec2;
use proptest::prelude::*;
use wayfarer::{
    materialize_node, AgentSpec, ChunkCoord, ChunkLayout, ConfirmOutcome, ContentStore,
    DialogueKey, DialogueNode, DialogueOption, DialogueSession, FixedPicker, FrameInput,
    GameConfig, GameState, InputEvent, KeyAction, Navigation,
};

const CONTENT: &str = r#"{
    "talker": {"dialogue": "Hi", "options": [
        {"option": "More", "response": {"dialogue": "More!", "options": [{"option": "Bye"}]}},
        {"option": "Bye"}
    ]},
    "default": ["Hm?"],
    "generic": {"greeting": ["Hello there."]}
}"#;

/// Three agents around the player, all within talking range.
fn crowded_game() -> GameState {
    let layout = ChunkLayout::open(ChunkCoord::new(0, 0), "crowd")
        .with_agent(
            AgentSpec::new("A", DialogueKey::entry("talker"))
                .at_tile(4, 4)
                .with_offset(vec2(25.0, 25.0)),
        )
        .with_agent(
            AgentSpec::new("B", DialogueKey::entry("talker"))
                .at_tile(5, 4)
                .with_offset(vec2(25.0, 25.0)),
        )
        .with_agent(
            AgentSpec::new("C", DialogueKey::entry("greeting"))
                .at_tile(4, 5)
                .with_offset(vec2(25.0, 25.0))
                .ambient(),
        );
    GameState::new(
        ContentStore::from_json_str(CONTENT).unwrap(),
        vec![layout],
        vec2(250.0, 250.0),
        GameConfig::for_testing(),
        Box::new(FixedPicker::first()),
    )
    .unwrap()
}

fn any_event() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        Just(InputEvent::Key(KeyAction::Up)),
        Just(InputEvent::Key(KeyAction::Down)),
        Just(InputEvent::Key(KeyAction::Confirm)),
        Just(InputEvent::Key(KeyAction::Interact)),
        (300.0f32..500.0, 200.0f32..400.0)
            .prop_map(|(x, y)| InputEvent::PointerDown { position: vec2(x, y) }),
    ]
}

fn any_node() -> impl Strategy<Value = DialogueNode> {
    let leaf = "[a-z]{1,8}".prop_map(DialogueNode::line);
    leaf.prop_recursive(4, 32, 3, |inner| {
        (
            "[a-z]{1,8}",
            prop::collection::vec(("[a-z]{1,8}", prop::option::of(inner)), 0..3),
        )
            .prop_map(|(line, options)| {
                options
                    .into_iter()
                    .fold(DialogueNode::line(line), |node, (text, response)| {
                        let option = DialogueOption::new(text);
                        node.with_option(match response {
                            Some(response) => option.with_response(response),
                            None => option,
                        })
                    })
            })
    })
}

proptest! {
    #[test]
    fn test_at_most_one_session_open(
        frames in prop::collection::vec(prop::collection::vec(any_event(), 0..4), 1..30)
    ) {
        let mut game = crowded_game();
        for (i, events) in frames.into_iter().enumerate() {
            let input = FrameInput { events, ..FrameInput::default() };
            game.tick(&input, 1.0 / 60.0, i as f64);

            let open = game.open_session_count();
            prop_assert!(open <= 1);
            prop_assert_eq!(game.coordinator.is_locked(), open == 1);
            if let Some(agent) = game.talking_agent() {
                prop_assert!(agent.is_talking());
            }
        }
    }

    #[test]
    fn test_cursor_wraps_around(count in 1usize..8, start in 0usize..8) {
        let node = (0..count).fold(DialogueNode::line("pick"), |node, i| {
            node.with_option(DialogueOption::new(format!("option {}", i)))
        });
        let mut session = DialogueSession::new();
        session.open(materialize_node(&node, &mut FixedPicker::first()), 0.0, None);
        for _ in 0..start {
            session.navigate(Navigation::Down);
        }
        let before = session.selected_index();

        for _ in 0..count {
            prop_assert!(session.navigate(Navigation::Down));
        }
        prop_assert_eq!(session.selected_index(), before);

        for _ in 0..count {
            session.navigate(Navigation::Up);
        }
        prop_assert_eq!(session.selected_index(), before);
    }

    #[test]
    fn test_navigation_without_options_is_noop(ups in 0usize..5, downs in 0usize..5) {
        let mut session = DialogueSession::new();
        session.open(
            materialize_node(&DialogueNode::line("..."), &mut FixedPicker::first()),
            0.0,
            None,
        );
        for _ in 0..ups {
            prop_assert!(!session.navigate(Navigation::Up));
        }
        for _ in 0..downs {
            prop_assert!(!session.navigate(Navigation::Down));
        }
        prop_assert_eq!(session.selected_index(), Some(0));
        prop_assert!(session.is_open());
    }

    #[test]
    fn test_confirming_first_option_terminates(node in any_node()) {
        let mut picker = FixedPicker::first();
        let mut session = DialogueSession::new();
        session.open(materialize_node(&node, &mut picker), 0.0, None);

        let mut steps = 0;
        while session.is_open() {
            prop_assert!(steps <= node.depth(), "session outlived the node tree");
            match session.confirm(&mut picker) {
                ConfirmOutcome::Advanced { .. } | ConfirmOutcome::Closed { .. } => {}
                ConfirmOutcome::Ignored => prop_assert!(false, "open session ignored confirm"),
            }
            steps += 1;
        }
    }

    #[test]
    fn test_fixed_picker_always_yields_first_line(
        lines in prop::collection::vec("[a-z]{1,8}", 1..6)
    ) {
        let node = DialogueNode::variants(lines.clone());
        for _ in 0..5 {
            let active = materialize_node(&node, &mut FixedPicker::first());
            prop_assert_eq!(&active.line, &lines[0]);
        }
    }
}
