//! Continuous speech-recognition capability
//!
//! The capture loop treats recognition as an opaque event source with
//! start/stop semantics: implementations emit interim and final transcript
//! strings on a broadcast channel. Interim text is display-only ("ghost"
//! text) and is never persisted as a caption by the loop.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Transcript event for subscribers
#[derive(Clone, Debug)]
pub(crate) enum RecognitionEvent {
    /// Partial transcript (still being recognized)
    Interim { text: String },
    /// Final committed transcript segment
    Final { text: String },
    /// Recognition error
    Error { message: String },
}

/// Errors that can occur starting recognition
#[derive(Debug, thiserror::Error)]
pub(crate) enum RecognitionError {
    #[error("Speech recognition is not supported on this device")]
    Unsupported,

    #[error("Recognition failed: {0}")]
    Failed(String),
}

/// Continuous speech recognizer with start/stop semantics
pub(crate) trait SpeechRecognizer: Send {
    fn start(&mut self) -> Result<(), RecognitionError>;
    fn stop(&mut self);
    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent>;
}

/// Recognizer that replays a scripted transcript on a timer
///
/// Emits word-by-word interim updates followed by a final event per line,
/// cycling through the script for as long as it runs. Stands in for a live
/// recognition source in the demo backend.
pub(crate) struct ScriptedRecognizer {
    lines: Vec<String>,
    cadence: Duration,
    event_tx: broadcast::Sender<RecognitionEvent>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedRecognizer {
    pub fn new(lines: Vec<String>, cadence: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            lines,
            cadence,
            event_tx,
            task: None,
        }
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<(), RecognitionError> {
        if self.task.is_some() {
            return Ok(());
        }
        if self.lines.is_empty() {
            return Err(RecognitionError::Failed("script is empty".to_string()));
        }
        let lines = self.lines.clone();
        let cadence = self.cadence;
        let event_tx = self.event_tx.clone();
        self.task = Some(tokio::spawn(run_script(lines, cadence, event_tx)));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
        self.event_tx.subscribe()
    }
}

async fn run_script(
    lines: Vec<String>,
    cadence: Duration,
    event_tx: broadcast::Sender<RecognitionEvent>,
) {
    loop {
        for line in &lines {
            let mut interim = String::new();
            for word in line.split_whitespace() {
                if !interim.is_empty() {
                    interim.push(' ');
                }
                interim.push_str(word);
                let _ = event_tx.send(RecognitionEvent::Interim {
                    text: interim.clone(),
                });
                tokio::time::sleep(cadence).await;
            }
            let _ = event_tx.send(RecognitionEvent::Final { text: line.clone() });
            tokio::time::sleep(cadence).await;
        }
    }
}

/// Recognizer that emits nothing
///
/// Used when no recognition capability is available but its absence is
/// not an error (the remote backend still produces captions from the
/// classifier).
pub(crate) struct NoopRecognizer {
    event_tx: broadcast::Sender<RecognitionEvent>,
}

impl NoopRecognizer {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(1);
        Self { event_tx }
    }
}

impl SpeechRecognizer for NoopRecognizer {
    fn start(&mut self) -> Result<(), RecognitionError> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
        self.event_tx.subscribe()
    }
}

/// Recognizer whose start always fails with `Unsupported`
#[cfg(test)]
pub(crate) struct UnsupportedRecognizer {
    event_tx: broadcast::Sender<RecognitionEvent>,
}

#[cfg(test)]
impl UnsupportedRecognizer {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(1);
        Self { event_tx }
    }
}

#[cfg(test)]
impl SpeechRecognizer for UnsupportedRecognizer {
    fn start(&mut self) -> Result<(), RecognitionError> {
        Err(RecognitionError::Unsupported)
    }

    fn stop(&mut self) {}

    fn subscribe(&self) -> broadcast::Receiver<RecognitionEvent> {
        self.event_tx.subscribe()
    }
}
