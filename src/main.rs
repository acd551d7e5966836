#![deny(clippy::all)]

mod audio;
mod backend;
mod captions;
mod classify;
mod config;
mod error;
mod preferences;
mod recognition;
mod render;
mod session;
mod styles;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend::Backend;
use crate::error::AppError;
use crate::render::Renderer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Environment overrides may live in a local .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::load()?;
    if let Err(e) = preferences::seed_preferences() {
        warn!("Could not create preferences file: {}", e);
    }
    let kind = config.session.backend;
    info!(
        backend = %kind,
        language = %preferences::get_language_code(),
        "Starting caption engine"
    );

    let backend = Backend::build(kind, &config)?;
    let handle = session::spawn(backend, config.capture.clone());

    let renderer = Renderer::from_preferences();
    let events = session::spawn_event_handler(handle.subscribe(), renderer);

    handle.start().await;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.stop().await;

    // Classifications already in flight may still append after stop
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    let captions = handle.captions().await;
    info!(captions = captions.len(), "Session finished");

    events.abort();
    Ok(())
}
