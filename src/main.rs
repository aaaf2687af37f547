//! # Wayfarer Main Entry Point
//!
//! Loads the dialogue content, builds the starter village, and runs the macroquad loop.

use clap::Parser;
use log::info;
use macroquad::prelude::*;
use std::path::PathBuf;
use wayfarer::config::{DEFAULT_CONTENT_PATH, WINDOW_HEIGHT, WINDOW_WIDTH};
use wayfarer::{
    starter_layouts, starter_spawn, ContentStore, GameConfig, GameState, InputHandler,
    LinePicker, MacroquadDisplay, RandomPicker, SceneManager, WayfarerResult,
};

/// Command line arguments for Wayfarer.
#[derive(Parser, Debug)]
#[command(name = "wayfarer")]
#[command(about = "A tile-based adventure with branching NPC dialogue")]
#[command(version)]
struct Args {
    /// Dialogue content file
    #[arg(long, default_value = DEFAULT_CONTENT_PATH)]
    content: PathBuf,

    /// Seed for dialogue line selection; entropy when absent
    #[arg(short, long)]
    seed: Option<u64>,

    /// Keep flavour text open until dismissed
    #[arg(long)]
    no_flavor_timeout: bool,

    /// Draw chunk borders and room names
    #[arg(long)]
    debug_chunks: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig::new(
            defaults.flavor_timeout.filter(|_| !self.no_flavor_timeout),
            defaults.render_distance,
        )
    }

    fn picker(&self) -> Box<dyn LinePicker> {
        match self.seed {
            Some(seed) => Box::new(RandomPicker::seeded(seed)),
            None => Box::new(RandomPicker::from_entropy()),
        }
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Wayfarer".to_string(),
        window_width: WINDOW_WIDTH as i32,
        window_height: WINDOW_HEIGHT as i32,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() -> WayfarerResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Wayfarer v{}", wayfarer::VERSION);

    let content = ContentStore::load(&args.content)?;
    if let Some(seed) = args.seed {
        info!("Dialogue lines seeded with {}", seed);
    }

    let game_state = GameState::new(
        content,
        starter_layouts()?,
        starter_spawn(),
        args.game_config(),
        args.picker(),
    )?;
    let display = MacroquadDisplay::new(screen_width(), screen_height(), args.debug_chunks);

    let mut scenes = SceneManager::new(game_state, display, InputHandler::new());
    scenes.run().await?;

    info!("Game loop ended");
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_timestamp(None)
            .init();
    }
}
