//! HTTP client for the remote classification endpoint
//!
//! Sends one multipart POST per accepted segment, carrying the WAV bytes
//! under the `audio` file field, and parses a JSON response with a text
//! field and an emotion (or `label`) field. No authentication and no
//! retries: a failed request means the segment is dropped by the caller.

use futures_util::future::BoxFuture;
use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Classification, EmotionClassifier};
use crate::audio::AudioSegment;
use crate::error::ClassifyError;

/// Filename reported for the uploaded segment
const SEGMENT_FILENAME: &str = "segment.wav";

/// Classifier backed by the remote HTTP endpoint
pub(crate) struct HttpClassifier {
    endpoint: Url,
    client: reqwest::Client,
}

/// Response from the classification endpoint
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    text: String,
    #[serde(default, alias = "label")]
    emotion: Option<String>,
}

impl HttpClassifier {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    async fn submit(
        client: reqwest::Client,
        endpoint: Url,
        segment: AudioSegment,
    ) -> Result<Classification, ClassifyError> {
        let wav = segment
            .wav_bytes()
            .map_err(|e| ClassifyError::Encode(e.to_string()))?;
        let bytes = wav.len();

        let part = multipart::Part::bytes(wav)
            .file_name(SEGMENT_FILENAME)
            .mime_str("audio/wav")?;
        let form = multipart::Form::new().part("audio", part);

        debug!(bytes, endpoint = %endpoint, "Submitting segment for classification");

        let response = client.post(endpoint).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ClassifyError::ServerError { status, message });
        }

        let parsed: ClassifyResponse = response.json().await.map_err(|e| {
            ClassifyError::InvalidResponse(format!("Failed to parse classifier response: {}", e))
        })?;

        Ok(Classification {
            text: parsed.text,
            emotion: parsed.emotion,
        })
    }
}

impl EmotionClassifier for HttpClassifier {
    fn classify(
        &self,
        segment: AudioSegment,
    ) -> BoxFuture<'static, Result<Classification, ClassifyError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        Box::pin(Self::submit(client, endpoint, segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_emotion_field() {
        let json = r#"{"text": "hello", "emotion": "Happy"}"#;
        let parsed: ClassifyResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.text, "hello");
        assert_eq!(parsed.emotion.as_deref(), Some("Happy"));
    }

    #[test]
    fn test_response_with_label_alias() {
        let json = r#"{"text": "oh no", "label": "Sad"}"#;
        let parsed: ClassifyResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.text, "oh no");
        assert_eq!(parsed.emotion.as_deref(), Some("Sad"));
    }

    #[test]
    fn test_response_missing_fields_defaults() {
        let parsed: ClassifyResponse = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(parsed.text, "");
        assert_eq!(parsed.emotion, None);
    }

    #[test]
    fn test_response_null_emotion() {
        let json = r#"{"text": "quiet", "emotion": null}"#;
        let parsed: ClassifyResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.emotion, None);
    }
}
