//! Pluggable session backends
//!
//! The prototype this engine replaces grew several near-duplicate listen
//! screens; they collapse here into one capture loop parameterized by a
//! backend bundle: a segment recorder, a speech recognizer, and an
//! optional classifier.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{DemoRecorder, MicRecorder, SegmentRecorder};
use crate::classify::{DemoClassifier, EmotionClassifier, HttpClassifier};
use crate::config::{Config, ConfigError};
use crate::recognition::{NoopRecognizer, ScriptedRecognizer, SpeechRecognizer};

/// Named backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum BackendKind {
    /// Scripted recognizer and canned classifier; no devices, no network
    #[default]
    Demo,
    /// Captions come straight from final recognition events; no classifier
    RecognizerOnly,
    /// Microphone capture with the remote classification endpoint
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Demo => write!(f, "demo"),
            BackendKind::RecognizerOnly => write!(f, "recognizer-only"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "demo" => Ok(BackendKind::Demo),
            "recognizer-only" => Ok(BackendKind::RecognizerOnly),
            "remote" => Ok(BackendKind::Remote),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Capability bundle for one listen session
pub(crate) struct Backend {
    pub recorder: Box<dyn SegmentRecorder>,
    pub recognizer: Box<dyn SpeechRecognizer>,
    pub classifier: Option<Arc<dyn EmotionClassifier>>,
}

/// Word cadence of the scripted demo recognizer
const DEMO_CADENCE: Duration = Duration::from_millis(350);

fn demo_script() -> Vec<String> {
    [
        "press start to begin live transcription",
        "captions appear here styled by the detected emotion",
        "the interim text you are reading now is never persisted",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Backend {
    /// Build the backend for the selected variant
    pub fn build(kind: BackendKind, config: &Config) -> Result<Self, ConfigError> {
        match kind {
            BackendKind::Demo => Ok(Self::demo(config)),
            BackendKind::RecognizerOnly => Ok(Self::recognizer_only()),
            BackendKind::Remote => Ok(Self::remote(config)?),
        }
    }

    fn demo(config: &Config) -> Self {
        // One second of synthetic audio, comfortably above the silence
        // threshold so every demo segment is classified
        let samples_per_segment = config.capture.sample_rate as usize;
        Self {
            recorder: Box::new(DemoRecorder::new(
                config.capture.sample_rate,
                samples_per_segment,
            )),
            recognizer: Box::new(ScriptedRecognizer::new(demo_script(), DEMO_CADENCE)),
            classifier: Some(Arc::new(DemoClassifier::new())),
        }
    }

    fn recognizer_only() -> Self {
        // No classifier: the recorder and segment timer stay disengaged
        Self {
            recorder: Box::new(DemoRecorder::new(16_000, 0)),
            recognizer: Box::new(ScriptedRecognizer::new(demo_script(), DEMO_CADENCE)),
            classifier: None,
        }
    }

    fn remote(config: &Config) -> Result<Self, ConfigError> {
        let endpoint = config.classifier_url()?;
        Ok(Self {
            recorder: Box::new(MicRecorder::new(config.capture.sample_rate)),
            recognizer: Box::new(NoopRecognizer::new()),
            classifier: Some(Arc::new(HttpClassifier::new(endpoint))),
        })
    }
}
