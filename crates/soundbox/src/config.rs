use std::time::Duration;

/// Engine tuning parameters shared by load and playback.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// Output device substring to prefer; `None` picks the host default.
    pub device: Option<String>,
    /// Per-request timeout for HTTP asset fetches.
    pub http_timeout: Duration,
    /// Resampler input chunk size in frames.
    pub chunk_frames: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            device: None,
            http_timeout: Duration::from_secs(10),
            chunk_frames: 1024,
        }
    }
}
