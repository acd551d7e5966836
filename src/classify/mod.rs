//! Emotion classification of audio segments
//!
//! The capture loop hands each accepted segment to a classifier and gets
//! back the spoken text plus a predicted emotion label. The HTTP
//! implementation talks to the remote classification endpoint; the demo
//! implementation returns canned pairs.

mod demo;
mod http;

pub(crate) use demo::DemoClassifier;
pub(crate) use http::HttpClassifier;

use futures_util::future::BoxFuture;

use crate::audio::AudioSegment;
use crate::error::ClassifyError;

/// Result of classifying one audio segment
#[derive(Debug, Clone)]
pub(crate) struct Classification {
    /// Transcribed text for the segment
    pub text: String,
    /// Predicted emotion label, if any
    pub emotion: Option<String>,
}

/// Classifier capability: one request per accepted segment
///
/// Returns a boxed future so implementations stay object-safe; the loop
/// spawns each call and receives the outcome as a message.
pub(crate) trait EmotionClassifier: Send + Sync {
    fn classify(
        &self,
        segment: AudioSegment,
    ) -> BoxFuture<'static, Result<Classification, ClassifyError>>;
}
