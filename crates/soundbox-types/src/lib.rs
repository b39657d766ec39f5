use serde::{Deserialize, Serialize};

/// Reason why the most recent playback ended.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackEndReason {
    /// Natural end of the decoded buffer.
    Eof,
    /// Stream setup or output error interrupted playback.
    Error,
    /// Playback was explicitly stopped by a command.
    Stopped,
}

/// A named sound asset to load.
///
/// `name` keys the library entry; `locator` is a filesystem path or an
/// http(s) URL.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoundSource {
    pub name: String,
    pub locator: String,
}

/// Point-in-time playback status reported by the player.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerStatus {
    /// Name of the current (or most recently played) sound.
    pub sound: Option<String>,
    /// Playback offset in seconds within the current sound.
    pub elapsed_seconds: f64,
    /// Total duration of the current sound in seconds.
    pub duration_seconds: Option<f64>,
    /// `true` while an output stream is rendering the sound.
    pub playing: bool,
    /// `true` when starting new playback is muted.
    pub muted: bool,
    /// Active output device name, if known.
    pub device: Option<String>,
    /// Output sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Channel count of the current sound.
    pub channels: Option<u16>,
    /// End reason recorded when playback last went idle.
    pub end_reason: Option<PlaybackEndReason>,
}
