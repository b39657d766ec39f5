//! Error taxonomy for asset loading and playback control.

use std::io;

use thiserror::Error;

/// Failure while fetching, decoding, or converting a single sound asset.
///
/// Load errors are always per-entry: one bad asset never aborts the rest of
/// a batch load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Local file read failed.
    #[error("read {locator}: {source}")]
    Read {
        locator: String,
        #[source]
        source: io::Error,
    },

    /// HTTP fetch failed or returned a non-success status.
    #[error("fetch {locator}: {reason}")]
    Http { locator: String, reason: String },

    /// The container or codec could not be probed or decoded.
    #[error("decode {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: symphonia::core::errors::Error,
    },

    /// The asset decoded but is missing required stream parameters.
    #[error("unsupported audio in {locator}: {reason}")]
    Unsupported { locator: String, reason: String },

    /// Rate conversion to the output rate failed.
    #[error("resample {locator}: {reason}")]
    Resample { locator: String, reason: String },
}

/// Errors surfaced by playback control operations.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The output device has not been initialized yet.
    #[error("audio output is not initialized")]
    NotInitialized,

    /// `play` was asked for a name the library does not hold.
    #[error("sound {0:?} is not loaded")]
    SoundNotFound(String),

    /// `seek` was called before any sound was played.
    #[error("no sound has been played yet")]
    NoActiveSound,

    /// Output device or stream setup failed.
    #[error(transparent)]
    Output(#[from] anyhow::Error),
}
