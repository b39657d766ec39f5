//! Full-buffer audio decode.
//!
//! Uses Symphonia to probe the container/codec and decode the entire asset
//! into interleaved `f32` samples. Streaming decode is unnecessary here:
//! library sounds live whole in memory for the life of the engine.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::LoadError;

/// One decoded sound held by the library.
///
/// Samples are interleaved `f32` at `sample_rate` Hz. After a load completes
/// `sample_rate` equals the engine output rate; `source_rate` records the
/// rate the asset was decoded at.
#[derive(Clone, Debug)]
pub struct DecodedSound {
    pub channels: usize,
    pub sample_rate: u32,
    pub source_rate: u32,
    pub samples: Vec<f32>,
    /// Codec label captured at probe time (best-effort).
    pub codec: Option<String>,
}

impl DecodedSound {
    /// Number of whole frames in the buffer.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Buffer duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / self.sample_rate as f64
        }
    }

    /// Frame index for an offset in seconds, clamped to the buffer length.
    pub fn frame_at(&self, offset_seconds: f64) -> usize {
        let clamped = offset_seconds.clamp(0.0, self.duration_seconds());
        ((clamped * self.sample_rate as f64) as usize).min(self.frames())
    }
}

/// Decode `bytes` into a [`DecodedSound`].
///
/// Individual damaged packets are skipped; probe failures and streams
/// without usable parameters fail the load.
pub fn decode_bytes(
    locator: &str,
    bytes: Vec<u8>,
    ext_hint: Option<&str>,
) -> Result<DecodedSound, LoadError> {
    let decode_err = |source| LoadError::Decode {
        locator: locator.to_string(),
        source,
    };
    let unsupported = |reason: &str| LoadError::Unsupported {
        locator: locator.to_string(),
        reason: reason.to_string(),
    };

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = ext_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(decode_err)?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| unsupported("no default audio track"))?;

    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| unsupported("unknown channel layout"))?
        .count();
    let rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| unsupported("unknown sample rate"))?;

    let codec_params: CodecParameters = track.codec_params.clone();
    let codec = codec_name_from_params(&codec_params);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(decode_err)?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(_) => break, // EOF
        };

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(_) => continue,
        };

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, *decoded.spec());
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(unsupported("no decodable audio frames"));
    }

    Ok(DecodedSound {
        channels,
        sample_rate: rate,
        source_rate: rate,
        samples,
        codec,
    })
}

/// Best-effort codec label used for status/listing output.
fn codec_name_from_params(params: &CodecParameters) -> Option<String> {
    use symphonia::core::codecs::*;
    let name = match params.codec {
        CODEC_TYPE_FLAC => "FLAC",
        CODEC_TYPE_MP3 => "MP3",
        CODEC_TYPE_AAC => "AAC",
        CODEC_TYPE_ALAC => "ALAC",
        CODEC_TYPE_VORBIS => "VORBIS",
        CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S16BE => "PCM_S16",
        CODEC_TYPE_PCM_S24LE | CODEC_TYPE_PCM_S24BE => "PCM_S24",
        CODEC_TYPE_PCM_S32LE | CODEC_TYPE_PCM_S32BE => "PCM_S32",
        CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F32BE => "PCM_F32",
        _ => return None,
    };
    Some(name.to_string())
}
