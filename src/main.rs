mod audio;
mod collision;
mod config;
mod controller;
mod effects;
mod error;
mod game;
mod input;
mod level;
mod rocket;

use audio::AudioBank;
use color_eyre::Result;
use config::GameConfig;
use game::GameState;
use macroquad::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn window_conf() -> Conf {
    Conf {
        window_title: "Rocket Lander".to_owned(),
        window_width: 1280,
        window_height: 720,
        fullscreen: false,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    if let Err(report) = run().await {
        error!("{report:#}");
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    setup()?;

    let config = GameConfig::load()?;
    let audio = AudioBank::load(&config.audio).await;
    let mut game = GameState::new(config, audio);
    info!("Game started");

    loop {
        let dt = get_frame_time();

        // Update game state
        game.update(dt);

        // Draw everything
        game.draw();

        next_frame().await
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();
    Ok(())
}
