use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{info, warn};
use std::sync::Arc;

mod config;
mod error;
mod game;
mod models;
mod providers;
mod routes;
mod store;
mod stream;
#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::game::{ChessRules, GameLoop};
use crate::models::AppState;
use crate::providers::{AnthropicProvider, OpenAiProvider};
use crate::store::SqliteStore;
use crate::stream::StateBroadcaster;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if dotenv.is_err() {
        warn!("No .env file found");
    }

    let config = Config::parse();

    let store = SqliteStore::open(&config.database_url)?;

    let http = reqwest::Client::builder()
        .timeout(config.provider_timeout())
        .build()?;
    let white = Arc::new(OpenAiProvider::new(
        http.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    ));
    let black = Arc::new(AnthropicProvider::new(
        http,
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
        config.anthropic_base_url.clone(),
    ));

    // One channel for the whole process, shared by every game played
    let broadcaster = StateBroadcaster::new(config.broadcast_capacity);

    let game = GameLoop::new(
        ChessRules::new(),
        white,
        black,
        Arc::new(store),
        broadcaster.clone(),
        config.loop_settings(),
    );
    actix_web::rt::spawn(game.run());

    let app_state = web::Data::new(AppState::new(broadcaster, config.keep_alive()));
    let origins = config.origins();

    info!("Server is running on {}:{}", config.bind, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(routes::cors(&origins))
            .wrap(Logger::default())
            .configure(routes::configure_routes)
    })
    .bind((config.bind.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
