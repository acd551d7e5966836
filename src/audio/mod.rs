//! Audio capture module using cpal for cross-platform microphone access
//!
//! Records fixed-duration segments of microphone audio as mono PCM at the
//! target sample rate. Each start/stop pair yields one complete segment;
//! the input device is held only while a segment is recording.

mod resampler;
mod types;

pub(crate) use types::{AudioSegment, CaptureError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use resampler::{process_samples, CHUNK_SIZE};
use rubato::{SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Stream startup handshake timeout; start() never blocks longer than this
const READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Capture thread poll interval; bounds how long stop() waits on the join
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Recorder capability with start/stop semantics only
///
/// `start` begins capturing a new segment; `stop` yields the completed
/// segment. Implementations guarantee at most one segment is being
/// captured at a time.
pub(crate) trait SegmentRecorder: Send {
    fn start(&mut self) -> Result<(), CaptureError>;
    fn stop(&mut self) -> Result<AudioSegment, CaptureError>;
}

/// Microphone-backed segment recorder
///
/// Capture runs on a dedicated thread; samples are downmixed to mono and
/// resampled to the target rate when the device rate differs.
pub(crate) struct MicRecorder {
    target_sample_rate: u32,
    active: Option<ActiveCapture>,
}

struct ActiveCapture {
    is_capturing: Arc<AtomicBool>,
    thread_handle: thread::JoinHandle<Vec<i16>>,
}

impl MicRecorder {
    pub fn new(target_sample_rate: u32) -> Self {
        Self {
            target_sample_rate,
            active: None,
        }
    }
}

impl SegmentRecorder for MicRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.active.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        let is_capturing = Arc::new(AtomicBool::new(true));
        let is_capturing_thread = is_capturing.clone();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let target_sample_rate = self.target_sample_rate;

        let thread_handle = thread::spawn(move || {
            run_capture(is_capturing_thread, ready_tx, target_sample_rate)
        });

        // Wait for the stream to come up so device and permission errors
        // surface to the caller instead of dying on the capture thread.
        match ready_rx.recv_timeout(READY_TIMEOUT) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                return Err(e);
            }
            Err(_) => {
                is_capturing.store(false, Ordering::SeqCst);
                let _ = thread_handle.join();
                return Err(CaptureError::ConfigError(
                    "audio capture thread did not start".to_string(),
                ));
            }
        }

        self.active = Some(ActiveCapture {
            is_capturing,
            thread_handle,
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioSegment, CaptureError> {
        let Some(capture) = self.active.take() else {
            return Err(CaptureError::NotRecording);
        };

        capture.is_capturing.store(false, Ordering::SeqCst);
        // The thread notices the cleared flag within one POLL_INTERVAL,
        // so this join waits only for stream teardown
        let samples = capture
            .thread_handle
            .join()
            .map_err(|_| CaptureError::ConfigError("audio capture thread panicked".to_string()))?;

        info!(samples = samples.len(), "Segment capture stopped");
        Ok(AudioSegment {
            samples,
            sample_rate: self.target_sample_rate,
        })
    }
}

/// Run one segment capture on the current thread (blocking)
///
/// Signals stream startup success or failure over `ready_tx`, then
/// captures until the flag is cleared. Returns the collected samples.
fn run_capture(
    is_capturing: Arc<AtomicBool>,
    ready_tx: std_mpsc::Sender<Result<(), CaptureError>>,
    target_sample_rate: u32,
) -> Vec<i16> {
    let segment_buffer: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));

    let stream = match open_stream(target_sample_rate, segment_buffer.clone()) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return Vec::new();
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(e.into()));
        return Vec::new();
    }
    let _ = ready_tx.send(Ok(()));

    // Keep the stream alive until the segment is stopped
    while is_capturing.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
    }

    drop(stream);

    let samples = match segment_buffer.lock() {
        Ok(mut buf) => std::mem::take(&mut *buf),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    };
    samples
}

/// Open the default input device and build a capture stream feeding the
/// segment buffer
fn open_stream(
    target_sample_rate: u32,
    segment_buffer: Arc<Mutex<Vec<i16>>>,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or(CaptureError::NoInputDevice)?;

    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    info!("Using audio input device: {}", device_name);

    let supported_configs = device
        .supported_input_configs()
        .map_err(|e| CaptureError::ConfigError(e.to_string()))?;

    // Prefer a config that supports the target rate, else any supported rate
    let mut best_config = None;
    let mut found_target_rate = false;

    for config in supported_configs {
        if config.channels() > 0 {
            if config.min_sample_rate().0 <= target_sample_rate
                && config.max_sample_rate().0 >= target_sample_rate
            {
                best_config = Some(config.with_sample_rate(cpal::SampleRate(target_sample_rate)));
                found_target_rate = true;
                break;
            } else if best_config.is_none() {
                best_config = Some(config.with_max_sample_rate());
            }
        }
    }

    let supported_config = best_config.ok_or(CaptureError::NoSupportedConfig)?;

    if !found_target_rate {
        warn!(
            "{}Hz not supported, using {}Hz instead",
            target_sample_rate,
            supported_config.sample_rate().0
        );
    }

    let config: cpal::StreamConfig = supported_config.into();
    let sample_rate = config.sample_rate.0;
    let channels = config.channels as usize;

    info!("Audio config: {} channels, {} Hz", channels, sample_rate);

    // Create resampler if sample rate doesn't match target
    let (resampler, input_chunk_size): (Option<Arc<Mutex<SincFixedIn<f32>>>>, usize) =
        if sample_rate != target_sample_rate {
            info!(
                "Creating resampler: {} Hz -> {} Hz",
                sample_rate, target_sample_rate
            );
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            };
            let input_frames = (CHUNK_SIZE as f64 * sample_rate as f64 / target_sample_rate as f64)
                .ceil() as usize;
            match SincFixedIn::<f32>::new(
                target_sample_rate as f64 / sample_rate as f64,
                2.0,
                params,
                input_frames,
                1, // mono
            ) {
                Ok(resampler) => (Some(Arc::new(Mutex::new(resampler))), input_frames),
                Err(e) => {
                    error!("Failed to create resampler: {}", e);
                    (None, CHUNK_SIZE)
                }
            }
        } else {
            (None, CHUNK_SIZE)
        };

    let input_buffer: Arc<Mutex<Vec<i16>>> =
        Arc::new(Mutex::new(Vec::with_capacity(input_chunk_size * 2)));

    let err_callback = |err| {
        error!("Audio stream error: {}", err);
    };

    let stream = match device.default_input_config()?.sample_format() {
        SampleFormat::I16 => {
            let segment_i16 = segment_buffer.clone();
            let input_i16 = input_buffer.clone();
            let resampler_i16 = resampler.clone();
            device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _| {
                        process_samples(
                            data,
                            channels,
                            &input_i16,
                            input_chunk_size,
                            &segment_i16,
                            &resampler_i16,
                        );
                    },
                    err_callback,
                    None,
                )
                .map_err(map_build_error)?
        }
        SampleFormat::F32 => {
            let segment_f32 = segment_buffer.clone();
            let input_f32 = input_buffer.clone();
            let resampler_f32 = resampler.clone();
            device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _| {
                        // Convert f32 to i16
                        let samples: Vec<i16> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                            .collect();
                        process_samples(
                            &samples,
                            channels,
                            &input_f32,
                            input_chunk_size,
                            &segment_f32,
                            &resampler_f32,
                        );
                    },
                    err_callback,
                    None,
                )
                .map_err(map_build_error)?
        }
        sample_format => {
            return Err(CaptureError::UnsupportedFormat(format!(
                "{:?}",
                sample_format
            )));
        }
    };

    Ok(stream)
}

/// A refused microphone surfaces as the device becoming unavailable
fn map_build_error(e: cpal::BuildStreamError) -> CaptureError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::PermissionDenied,
        other => CaptureError::StreamError(other.to_string()),
    }
}

/// Recorder that synthesizes silent segments of a fixed size
///
/// Used by the demo backend and in tests; no device is opened.
pub(crate) struct DemoRecorder {
    sample_rate: u32,
    samples_per_segment: usize,
    recording: bool,
}

impl DemoRecorder {
    pub fn new(sample_rate: u32, samples_per_segment: usize) -> Self {
        Self {
            sample_rate,
            samples_per_segment,
            recording: false,
        }
    }
}

impl SegmentRecorder for DemoRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.recording {
            return Err(CaptureError::AlreadyRecording);
        }
        self.recording = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<AudioSegment, CaptureError> {
        if !self.recording {
            return Err(CaptureError::NotRecording);
        }
        self.recording = false;
        Ok(AudioSegment {
            samples: vec![0; self.samples_per_segment],
            sample_rate: self.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_recorder_start_stop() {
        let mut recorder = DemoRecorder::new(16_000, 8000);
        recorder.start().expect("start");
        assert!(matches!(
            recorder.start(),
            Err(CaptureError::AlreadyRecording)
        ));
        let segment = recorder.stop().expect("stop");
        assert_eq!(segment.samples.len(), 8000);
        assert_eq!(segment.sample_rate, 16_000);
        assert!(matches!(recorder.stop(), Err(CaptureError::NotRecording)));
    }

    #[test]
    fn test_mic_recorder_handles_missing_device() {
        // Only exercises the happy path on machines with audio input;
        // headless environments report a device or config error.
        let mut recorder = MicRecorder::new(16_000);
        match recorder.start() {
            Ok(()) => {
                let segment = recorder.stop().expect("stop after successful start");
                assert_eq!(segment.sample_rate, 16_000);
            }
            Err(e) => {
                println!("No usable audio input: {e}");
            }
        }
    }
}
