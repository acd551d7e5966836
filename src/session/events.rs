//! Terminal presentation of session events

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::SessionEvent;
use crate::render::Renderer;

/// Spawn a task that prints session events until the channel closes
pub(crate) fn spawn_event_handler(
    mut event_rx: broadcast::Receiver<SessionEvent>,
    renderer: Renderer,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => handle_event(&renderer, event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn handle_event(renderer: &Renderer, event: SessionEvent) {
    match event {
        SessionEvent::Started => println!("listening..."),
        SessionEvent::Stopped => println!("stopped."),
        SessionEvent::Interim { text } => {
            if !text.is_empty() {
                println!("{}", renderer.interim_line(&text));
            }
        }
        SessionEvent::Caption { entry } => {
            println!("{}", renderer.caption_line(&entry));
        }
        SessionEvent::SegmentSkipped { bytes } => {
            debug!(bytes, "Silent segment skipped");
        }
        SessionEvent::Unsupported { message } => {
            eprintln!("{message}");
        }
        SessionEvent::MicrophoneDenied => {
            eprintln!("Microphone access was denied. Check your input permissions and try again.");
        }
    }
}
