//! Canned classifier for the demo backend
//!
//! Cycles through a fixed set of (text, emotion) pairs so the full
//! caption pipeline can run without the remote endpoint.

use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Classification, EmotionClassifier};
use crate::audio::AudioSegment;
use crate::error::ClassifyError;

pub(crate) struct DemoClassifier {
    phrases: Vec<(&'static str, &'static str)>,
    next: AtomicUsize,
}

impl DemoClassifier {
    pub fn new() -> Self {
        Self {
            phrases: vec![
                ("Welcome to the live caption demo", "Happy"),
                ("Everything is running smoothly", "Calm"),
                ("Wait, did you see that", "Surprised"),
                ("I really wish this worked offline", "Sad"),
                ("Who wrote this classifier anyway", "Anger"),
                ("It is what it is", "Neutral"),
            ],
            next: AtomicUsize::new(0),
        }
    }
}

impl EmotionClassifier for DemoClassifier {
    fn classify(
        &self,
        _segment: AudioSegment,
    ) -> BoxFuture<'static, Result<Classification, ClassifyError>> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.phrases.len();
        let (text, emotion) = self.phrases[index];
        Box::pin(async move {
            Ok(Classification {
                text: text.to_string(),
                emotion: Some(emotion.to_string()),
            })
        })
    }
}
