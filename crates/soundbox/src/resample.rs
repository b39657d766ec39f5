//! Sample-rate conversion for decoded buffers.
//!
//! Uses Rubato's sinc resampler to convert a whole decoded buffer from its
//! source rate to the engine output rate once, at load time, so the playback
//! callback never resamples.

use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{
    Async, FixedAsync, Indexing, Resampler, SincInterpolationParameters, SincInterpolationType,
    WindowFunction, calculate_cutoff,
};

use crate::error::LoadError;

/// Convert interleaved `f32` `samples` from `src_rate` to `dst_rate`.
///
/// Returns the input untouched when the rates already match.
pub fn convert_rate(
    locator: &str,
    samples: Vec<f32>,
    channels: usize,
    src_rate: u32,
    dst_rate: u32,
    chunk_frames: usize,
) -> Result<Vec<f32>, LoadError> {
    if src_rate == dst_rate || samples.is_empty() || channels == 0 {
        return Ok(samples);
    }

    let fail = |reason: String| LoadError::Resample {
        locator: locator.to_string(),
        reason,
    };

    let f_ratio = dst_rate as f64 / src_rate as f64;

    let sinc_len = 128;
    let oversampling_factor = 256;
    let interpolation = SincInterpolationType::Cubic;
    let window = WindowFunction::BlackmanHarris2;
    let f_cutoff = calculate_cutoff(sinc_len, window);

    let params = SincInterpolationParameters {
        sinc_len,
        f_cutoff,
        interpolation,
        oversampling_factor,
        window,
    };

    let chunk_in_frames = chunk_frames.max(1);
    let mut resampler = Async::<f32>::new_sinc(
        f_ratio,
        1.1,
        &params,
        chunk_in_frames,
        channels,
        FixedAsync::Input,
    )
    .map_err(|e| fail(format!("init: {e}")))?;

    let in_frames = samples.len() / channels;
    let mut out: Vec<f32> =
        Vec::with_capacity(((in_frames as f64 * f_ratio) as usize + chunk_in_frames) * channels);
    // Scratch sized to hold a full chunk at the target ratio with headroom.
    let out_factor = (f_ratio.ceil() as usize + 2).max(3);
    let mut out_chunk = vec![0.0f32; channels * chunk_in_frames * out_factor];

    let mut indexing = Indexing {
        input_offset: 0,
        output_offset: 0,
        active_channels_mask: None,
        partial_len: None,
    };

    let mut frame = 0usize;
    while frame < in_frames {
        let take = chunk_in_frames.min(in_frames - frame);
        let chunk = &samples[frame * channels..(frame + take) * channels];

        let input_adapter = InterleavedSlice::new(chunk, channels, take)
            .map_err(|e| fail(format!("input adapter: {e}")))?;

        let out_capacity_frames = out_chunk.len() / channels;
        let mut output_adapter =
            InterleavedSlice::new_mut(&mut out_chunk, channels, out_capacity_frames)
                .map_err(|e| fail(format!("output adapter: {e}")))?;

        indexing.input_offset = 0;
        indexing.output_offset = 0;
        indexing.partial_len = if take < chunk_in_frames {
            Some(take)
        } else {
            None
        };

        let (_nbr_in, nbr_out) = resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, Some(&indexing))
            .map_err(|e| fail(format!("process: {e}")))?;

        out.extend_from_slice(&out_chunk[..nbr_out * channels]);
        frame += take;
    }

    Ok(out)
}
