//! Playback session bookkeeping.
//!
//! Tracks which sound is current, the retained offset, the mute flag, and
//! the handles observing a live output stream. The player façade and its
//! session threads share one instance behind a mutex.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use soundbox_types::{PlaybackEndReason, PlayerStatus};

/// Mutable session state shared between the player and its session threads.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Current (or most recently played) sound name.
    pub sound: Option<String>,
    /// Offset in seconds where the active stream started, or the retained
    /// offset when no stream is active.
    pub base_offset_seconds: f64,
    /// Mute flag; gates starting new playback only.
    pub muted: bool,
    /// Frames rendered by the active stream (`None` when idle).
    pub played_frames: Option<Arc<AtomicU64>>,
    /// Sample rate of the active stream.
    pub sample_rate: Option<u32>,
    /// Duration of the current sound in seconds.
    pub duration_seconds: Option<f64>,
    /// Channel count of the current sound.
    pub channels: Option<u16>,
    /// Output device name once initialized.
    pub device: Option<String>,
    /// End reason recorded when playback last went idle.
    pub end_reason: Option<PlaybackEndReason>,
}

impl SessionState {
    /// Create a shared, mutex-protected session store.
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    /// `true` while an output stream is live.
    pub fn is_playing(&self) -> bool {
        self.played_frames.is_some()
    }

    /// Current offset in seconds: the stream start offset plus rendered
    /// frames, clamped to the sound duration.
    pub fn elapsed_seconds(&self) -> f64 {
        let mut elapsed = self.base_offset_seconds;
        if let (Some(frames), Some(rate)) = (self.played_frames.as_ref(), self.sample_rate) {
            if rate > 0 {
                elapsed += frames.load(Ordering::Relaxed) as f64 / rate as f64;
            }
        }
        if let Some(duration) = self.duration_seconds {
            elapsed = elapsed.min(duration);
        }
        elapsed.max(0.0)
    }

    /// Record a freshly started stream.
    pub fn begin(
        &mut self,
        name: &str,
        offset_seconds: f64,
        sample_rate: u32,
        duration_seconds: f64,
        channels: u16,
        played_frames: Arc<AtomicU64>,
    ) {
        self.sound = Some(name.to_string());
        self.base_offset_seconds = offset_seconds;
        self.sample_rate = Some(sample_rate);
        self.duration_seconds = Some(duration_seconds);
        self.channels = Some(channels);
        self.played_frames = Some(played_frames);
        self.end_reason = None;
    }

    /// Fold the rendered frames into the retained offset and drop the live
    /// stream handles. Returns the retained offset.
    pub fn pause_to_offset(&mut self) -> f64 {
        let offset = self.elapsed_seconds();
        self.base_offset_seconds = offset;
        self.played_frames = None;
        offset
    }

    /// Reset the offset to zero and drop the live stream handles. The sound
    /// name survives so a later seek or resume can restart it.
    pub fn halt(&mut self, reason: PlaybackEndReason) {
        self.base_offset_seconds = 0.0;
        self.played_frames = None;
        self.end_reason = Some(reason);
    }

    /// Point-in-time status snapshot.
    pub fn snapshot(&self) -> PlayerStatus {
        PlayerStatus {
            sound: self.sound.clone(),
            elapsed_seconds: self.elapsed_seconds(),
            duration_seconds: self.duration_seconds,
            playing: self.is_playing(),
            muted: self.muted,
            device: self.device.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels,
            end_reason: self.end_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(rate: u32, offset: f64, duration: f64) -> (SessionState, Arc<AtomicU64>) {
        let mut state = SessionState::default();
        let frames = Arc::new(AtomicU64::new(0));
        state.begin("beep", offset, rate, duration, 2, frames.clone());
        (state, frames)
    }

    #[test]
    fn elapsed_tracks_rendered_frames() {
        let (state, frames) = started(48_000, 0.0, 10.0);
        assert_eq!(state.elapsed_seconds(), 0.0);

        frames.store(96_000, Ordering::Relaxed);
        assert!((state.elapsed_seconds() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn elapsed_adds_start_offset() {
        let (state, frames) = started(48_000, 1.5, 10.0);
        frames.store(24_000, Ordering::Relaxed);
        assert!((state.elapsed_seconds() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn elapsed_clamps_to_duration() {
        let (state, frames) = started(48_000, 0.0, 2.0);
        frames.store(480_000, Ordering::Relaxed);
        assert_eq!(state.elapsed_seconds(), 2.0);
    }

    #[test]
    fn elapsed_handles_zero_rate() {
        let (state, frames) = started(0, 0.5, 10.0);
        frames.store(1_000, Ordering::Relaxed);
        assert_eq!(state.elapsed_seconds(), 0.5);
    }

    #[test]
    fn pause_retains_offset_for_resume() {
        // Pause after a simulated 2s, then a restart at the retained offset
        // must report the same position.
        let (mut state, frames) = started(48_000, 0.0, 10.0);
        frames.store(96_000, Ordering::Relaxed);

        let offset = state.pause_to_offset();
        assert!((offset - 2.0).abs() < 1e-9);
        assert!(!state.is_playing());
        assert!((state.elapsed_seconds() - 2.0).abs() < 1e-9);

        let resumed = Arc::new(AtomicU64::new(0));
        state.begin("beep", offset, 48_000, 10.0, 2, resumed);
        assert!((state.elapsed_seconds() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn halt_resets_offset_regardless_of_state() {
        let (mut state, frames) = started(48_000, 1.0, 10.0);
        frames.store(48_000, Ordering::Relaxed);

        state.halt(PlaybackEndReason::Stopped);
        assert_eq!(state.elapsed_seconds(), 0.0);
        assert!(!state.is_playing());
        assert_eq!(state.end_reason, Some(PlaybackEndReason::Stopped));
        // Name survives for a later seek/restart.
        assert_eq!(state.sound.as_deref(), Some("beep"));
    }

    #[test]
    fn natural_end_resets_offset() {
        let (mut state, frames) = started(48_000, 0.0, 2.0);
        frames.store(96_000, Ordering::Relaxed);

        state.halt(PlaybackEndReason::Eof);
        assert_eq!(state.elapsed_seconds(), 0.0);
        assert_eq!(state.end_reason, Some(PlaybackEndReason::Eof));
    }

    #[test]
    fn begin_clears_prior_end_reason() {
        let (mut state, _) = started(48_000, 0.0, 2.0);
        state.halt(PlaybackEndReason::Stopped);

        let frames = Arc::new(AtomicU64::new(0));
        state.begin("boom", 0.0, 48_000, 4.0, 1, frames);
        assert_eq!(state.end_reason, None);
        assert_eq!(state.sound.as_deref(), Some("boom"));
        assert!(state.is_playing());
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut state, frames) = started(48_000, 0.0, 10.0);
        state.muted = true;
        state.device = Some("Speakers".to_string());
        frames.store(48_000, Ordering::Relaxed);

        let snap = state.snapshot();
        assert_eq!(snap.sound.as_deref(), Some("beep"));
        assert!((snap.elapsed_seconds - 1.0).abs() < 1e-9);
        assert_eq!(snap.duration_seconds, Some(10.0));
        assert!(snap.playing);
        assert!(snap.muted);
        assert_eq!(snap.device.as_deref(), Some("Speakers"));
        assert_eq!(snap.sample_rate, Some(48_000));
        assert_eq!(snap.channels, Some(2));
    }
}
