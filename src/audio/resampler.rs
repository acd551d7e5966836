//! Audio resampling and sample processing

use rubato::{Resampler, SincFixedIn};
use std::sync::{Arc, Mutex};
use tracing::error;

/// Resampler output chunk size in samples (0.1 seconds of audio at 16kHz)
pub(crate) const CHUNK_SIZE: usize = 1600;

/// Process incoming audio samples: convert to mono, optionally resample,
/// and append to the segment buffer
pub(crate) fn process_samples(
    data: &[i16],
    channels: usize,
    input_buffer: &Arc<Mutex<Vec<i16>>>,
    input_chunk_size: usize,
    segment_buffer: &Arc<Mutex<Vec<i16>>>,
    resampler: &Option<Arc<Mutex<SincFixedIn<f32>>>>,
) {
    // Convert to mono by averaging channels
    let mono_samples: Vec<i16> = if channels > 1 {
        data.chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    } else {
        data.to_vec()
    };

    if let Some(resampler_arc) = resampler {
        process_with_resampler(
            &mono_samples,
            input_buffer,
            input_chunk_size,
            segment_buffer,
            resampler_arc,
        );
    } else {
        // Device already runs at the target rate
        if let Ok(mut segment_buf) = segment_buffer.lock() {
            segment_buf.extend(mono_samples);
        }
    }
}

/// Process samples through the resampler in fixed-size chunks
///
/// A partial chunk left in the input buffer when the segment stops is
/// dropped; at 16kHz that is under 100 ms of trailing audio.
fn process_with_resampler(
    mono_samples: &[i16],
    input_buffer: &Arc<Mutex<Vec<i16>>>,
    input_chunk_size: usize,
    segment_buffer: &Arc<Mutex<Vec<i16>>>,
    resampler_arc: &Arc<Mutex<SincFixedIn<f32>>>,
) {
    let Ok(mut input_buf) = input_buffer.lock() else {
        return;
    };
    input_buf.extend(mono_samples);

    while input_buf.len() >= input_chunk_size {
        let input_chunk: Vec<i16> = input_buf.drain(..input_chunk_size).collect();

        // Convert i16 to f32 for resampling
        let input_f32: Vec<f32> = input_chunk.iter().map(|&s| s as f32 / 32768.0).collect();

        if let Ok(mut resampler) = resampler_arc.lock() {
            match resampler.process(&[input_f32], None) {
                Ok(resampled) => {
                    let output_i16: Vec<i16> = resampled[0]
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                        .collect();

                    if let Ok(mut segment_buf) = segment_buffer.lock() {
                        segment_buf.extend(&output_i16);
                    }
                }
                Err(e) => {
                    error!("Resampling error: {}", e);
                }
            }
        }
    }
}
