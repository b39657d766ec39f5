//! Output stage: a CPAL stream rendering one decoded buffer.
//!
//! The callback walks the buffer from a start frame, applies basic channel
//! mapping (mono↔stereo, best-effort otherwise), converts `f32` samples to
//! the device sample format, and flags completion once the buffer is
//! exhausted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Result, anyhow};
use cpal::traits::DeviceTrait;

use crate::decode::DecodedSound;

/// Shared flags and counters observed while a stream runs.
#[derive(Clone, Debug, Default)]
pub struct StreamProbe {
    /// Set once the buffer is fully rendered (natural end).
    pub finished: Arc<AtomicBool>,
    /// Incremented by output frames rendered from the buffer.
    pub played_frames: Arc<AtomicU64>,
}

impl StreamProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build a CPAL output stream rendering `sound` from `start_frame`.
///
/// The stream keeps running (emitting silence) after the buffer ends; the
/// session owning it observes `probe.finished` and tears it down.
pub fn build_output_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    sound: Arc<DecodedSound>,
    start_frame: usize,
    probe: StreamProbe,
) -> Result<cpal::Stream> {
    match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(device, config, sound, start_frame, probe),
        cpal::SampleFormat::I16 => build_stream::<i16>(device, config, sound, start_frame, probe),
        cpal::SampleFormat::I32 => build_stream::<i32>(device, config, sound, start_frame, probe),
        cpal::SampleFormat::U16 => build_stream::<u16>(device, config, sound, start_frame, probe),
        other => Err(anyhow!("Unsupported sample format: {other:?}")),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sound: Arc<DecodedSound>,
    start_frame: usize,
    probe: StreamProbe,
) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels_out = config.channels as usize;
    let total_frames = sound.frames();
    // Render position; owned by the callback, observed via `probe`.
    let mut cursor = start_frame.min(total_frames);

    let err_fn = |err| tracing::warn!("stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let frames_out = data.len() / channels_out;
            let mut rendered = 0usize;

            for frame in 0..frames_out {
                if cursor >= total_frames {
                    for idx in (frame * channels_out)..data.len() {
                        data[idx] = <T as cpal::Sample>::from_sample::<f32>(0.0);
                    }
                    break;
                }
                for ch in 0..channels_out {
                    let sample = mapped_sample(&sound, cursor, channels_out, ch);
                    data[frame * channels_out + ch] =
                        <T as cpal::Sample>::from_sample::<f32>(sample);
                }
                cursor += 1;
                rendered += 1;
            }

            if rendered > 0 {
                probe.played_frames.fetch_add(rendered as u64, Ordering::Relaxed);
            }
            if cursor >= total_frames {
                probe.finished.store(true, Ordering::Relaxed);
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Read one output sample for `dst_ch` from a buffer frame.
///
/// Mapping rules:
/// - mono → stereo: duplicate channel 0
/// - stereo → mono: average L/R
/// - stereo → stereo: pass-through
/// - other layouts: clamp to the available channels
fn mapped_sample(sound: &DecodedSound, frame: usize, dst_channels: usize, dst_ch: usize) -> f32 {
    let src_channels = sound.channels;
    let base = frame * src_channels;
    let get = |ch: usize| -> f32 { sound.samples.get(base + ch).copied().unwrap_or(0.0) };

    match (src_channels, dst_channels) {
        (1, 1) => get(0),
        (2, 2) => get(dst_ch.min(1)),
        (2, 1) => 0.5 * (get(0) + get(1)),
        (1, 2) => get(0),
        _ => get(dst_ch.min(src_channels.saturating_sub(1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(channels: usize, samples: Vec<f32>) -> DecodedSound {
        DecodedSound {
            channels,
            sample_rate: 48_000,
            source_rate: 48_000,
            samples,
            codec: None,
        }
    }

    #[test]
    fn mono_to_stereo_duplicates() {
        let s = sound(1, vec![0.25, 0.5]);
        assert_eq!(mapped_sample(&s, 1, 2, 0), 0.5);
        assert_eq!(mapped_sample(&s, 1, 2, 1), 0.5);
    }

    #[test]
    fn stereo_to_mono_averages() {
        let s = sound(2, vec![0.2, 0.4]);
        let out = mapped_sample(&s, 0, 1, 0);
        assert!((out - 0.3).abs() < 1e-6);
    }

    #[test]
    fn stereo_passthrough_keeps_channels() {
        let s = sound(2, vec![0.1, 0.9]);
        assert_eq!(mapped_sample(&s, 0, 2, 0), 0.1);
        assert_eq!(mapped_sample(&s, 0, 2, 1), 0.9);
    }

    #[test]
    fn out_of_range_frame_is_silence() {
        let s = sound(2, vec![0.1, 0.9]);
        assert_eq!(mapped_sample(&s, 5, 2, 0), 0.0);
    }

    #[test]
    fn multichannel_clamps_to_available() {
        let s = sound(4, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(mapped_sample(&s, 0, 6, 5), 0.4);
    }

    #[test]
    fn probe_starts_clear() {
        let probe = StreamProbe::new();
        assert!(!probe.finished.load(Ordering::Relaxed));
        assert_eq!(probe.played_frames.load(Ordering::Relaxed), 0);
    }
}
