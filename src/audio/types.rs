//! Audio segment types and capture error definitions

use std::io::Cursor;

/// WAV container header size in bytes (RIFF + fmt + data chunk headers)
const WAV_HEADER_LEN: usize = 44;

/// One completed recording segment
///
/// Contains mono PCM audio at the target sample rate, ready to be encoded
/// as WAV and submitted for classification.
#[derive(Debug, Clone)]
pub(crate) struct AudioSegment {
    /// PCM 16-bit signed samples (mono)
    pub samples: Vec<i16>,
    /// Sample rate in Hz (typically 16000)
    pub sample_rate: u32,
}

impl AudioSegment {
    /// Size of the segment once encoded as WAV bytes
    ///
    /// Computable without encoding; used for the silence threshold check.
    pub fn byte_len(&self) -> usize {
        WAV_HEADER_LEN + self.samples.len() * 2
    }

    /// Encode the segment as an in-memory WAV file
    pub fn wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

/// Errors that can occur during audio capture
#[derive(Debug, thiserror::Error)]
pub(crate) enum CaptureError {
    #[error("No audio input device found")]
    NoInputDevice,

    #[error("No supported audio configuration found")]
    NoSupportedConfig,

    #[error("Microphone access denied")]
    PermissionDenied,

    #[error("Audio configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("A recording segment is already active")]
    AlreadyRecording,

    #[error("No recording segment is active")]
    NotRecording,

    #[error("Audio stream error: {0}")]
    StreamError(String),

    #[error("Audio play error: {0}")]
    PlayError(#[from] cpal::PlayStreamError),

    #[error("Default config error: {0}")]
    DefaultConfigError(#[from] cpal::DefaultStreamConfigError),
}
