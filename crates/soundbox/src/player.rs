//! The playback controller.
//!
//! Owns the output handle, the sound library, and the single active output
//! stream. Each `play` starts a session thread that builds the CPAL stream
//! and tears it down on cancellation or natural end; replacing a session
//! cancels and joins the previous one first, so at most one stream is ever
//! live.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, StreamTrait};

use soundbox_types::{PlaybackEndReason, PlayerStatus, SoundSource};

use crate::config::PlayerConfig;
use crate::decode::DecodedSound;
use crate::device;
use crate::error::PlayerError;
use crate::library::{self, LoadReport, SoundLibrary};
use crate::playback::{self, StreamProbe};
use crate::session::SessionState;

/// The lazily created connection to the audio output device.
///
/// Fixes the engine output rate for the lifetime of the player; loaded
/// sounds are converted to this rate.
struct OutputHandle {
    stream_config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

/// Handle to the live session thread owning the active stream.
struct ActiveSession {
    cancel: Arc<AtomicBool>,
    join: thread::JoinHandle<()>,
}

/// Named-sound playback controller.
pub struct SoundPlayer {
    config: PlayerConfig,
    output: Option<OutputHandle>,
    library: SoundLibrary,
    session: Arc<Mutex<SessionState>>,
    active: Option<ActiveSession>,
    stream_id: Arc<AtomicU64>,
}

impl SoundPlayer {
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        Self {
            config,
            output: None,
            library: SoundLibrary::new(),
            session: SessionState::shared(),
            active: None,
            stream_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lazily open the output device. Idempotent: later calls are no-ops.
    pub fn initialize(&mut self) -> Result<(), PlayerError> {
        if self.output.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = device::pick_device(&host, self.config.device.as_deref())?;
        let config = device::output_config(&device)?;
        let mut stream_config: cpal::StreamConfig = config.clone().into();
        if let Some(buf) = device::pick_buffer_size(&config) {
            stream_config.buffer_size = buf;
        }

        let description = device.description().map(|d| d.to_string()).ok();
        tracing::info!(
            device = description.as_deref().unwrap_or("unknown"),
            rate_hz = stream_config.sample_rate,
            "output initialized"
        );
        if let Ok(mut s) = self.session.lock() {
            s.device = description;
        }

        self.output = Some(OutputHandle {
            stream_config,
            sample_format: config.sample_format(),
        });
        Ok(())
    }

    /// `true` once `initialize` has opened the output device.
    pub fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    /// Output sample rate in Hz, once initialized.
    pub fn output_sample_rate(&self) -> Option<u32> {
        self.output.as_ref().map(|o| o.stream_config.sample_rate)
    }

    /// The loaded sounds.
    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    /// Fetch, decode, and store a batch of named sounds.
    ///
    /// Entries fail independently; the report lists both outcomes. Duplicate
    /// names keep the buffer whose load completed last.
    pub fn load(&mut self, sources: Vec<SoundSource>) -> Result<LoadReport, PlayerError> {
        let output = self.output.as_ref().ok_or(PlayerError::NotInitialized)?;
        let target_rate = output.stream_config.sample_rate;

        let (loaded, failed) = library::load_batch(
            sources,
            target_rate,
            self.config.http_timeout,
            self.config.chunk_frames,
        );

        let mut report = LoadReport::default();
        for (name, sound) in loaded {
            self.library.insert(name.clone(), sound);
            report.loaded.push(name);
        }
        report.failed = failed;
        Ok(report)
    }

    /// Start playing `name`, replacing any active stream.
    ///
    /// `start_offset_seconds`: `Some(x)` plays from `x` (clamped to the
    /// sound's duration); `None` resumes the retained offset when `name` is
    /// the session's current sound, else plays from the beginning. When
    /// muted this is an `Ok` no-op that leaves session state untouched.
    pub fn play(&mut self, name: &str, start_offset_seconds: Option<f64>) -> Result<(), PlayerError> {
        if self.output.is_none() {
            return Err(PlayerError::NotInitialized);
        }

        let muted = self.session.lock().map(|s| s.muted).unwrap_or(false);
        if muted {
            tracing::debug!(name = %name, "muted; play skipped");
            return Ok(());
        }

        let Some(sound) = self.library.get(name) else {
            return Err(PlayerError::SoundNotFound(name.to_string()));
        };

        let offset = match start_offset_seconds {
            Some(x) => x,
            None => {
                let s = self.session.lock().unwrap();
                if s.sound.as_deref() == Some(name) {
                    s.base_offset_seconds
                } else {
                    0.0
                }
            }
        };
        let offset = offset.clamp(0.0, sound.duration_seconds());

        self.cancel_active();

        let probe = StreamProbe::new();
        if let Ok(mut s) = self.session.lock() {
            s.begin(
                name,
                offset,
                sound.sample_rate,
                sound.duration_seconds(),
                sound.channels as u16,
                probe.played_frames.clone(),
            );
        }
        tracing::info!(name = %name, offset_s = offset, "playback started");

        self.spawn_session(sound, offset, probe);
        Ok(())
    }

    /// Stop the active stream, folding rendered time into the retained
    /// offset. No-op when nothing is playing.
    pub fn pause(&mut self) -> Result<(), PlayerError> {
        let offset = {
            let mut s = self.session.lock().unwrap();
            if !s.is_playing() {
                return Ok(());
            }
            s.pause_to_offset()
        };
        self.cancel_active();
        tracing::debug!(offset_s = offset, "paused");
        Ok(())
    }

    /// Stop playback and reset the offset to zero.
    pub fn stop(&mut self) -> Result<(), PlayerError> {
        if let Ok(mut s) = self.session.lock() {
            s.halt(PlaybackEndReason::Stopped);
        }
        self.cancel_active();
        Ok(())
    }

    /// Restart the current sound at `position_ms`.
    ///
    /// Seeking tears the stream down and starts a fresh one at the requested
    /// offset; requires a sound from a prior `play`.
    pub fn seek(&mut self, position_ms: u64) -> Result<(), PlayerError> {
        let name = self
            .session
            .lock()
            .ok()
            .and_then(|s| s.sound.clone())
            .ok_or(PlayerError::NoActiveSound)?;
        self.play(&name, Some(position_ms as f64 / 1000.0))
    }

    /// Mute gates starting new playback; it never stops an active stream.
    pub fn set_muted(&mut self, muted: bool) {
        if let Ok(mut s) = self.session.lock() {
            s.muted = muted;
        }
    }

    pub fn muted(&self) -> bool {
        self.session.lock().map(|s| s.muted).unwrap_or(false)
    }

    /// Point-in-time status snapshot.
    pub fn status(&self) -> PlayerStatus {
        self.session.lock().map(|s| s.snapshot()).unwrap_or_default()
    }

    /// Cancel the active session thread and join it.
    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.store(true, Ordering::Relaxed);
            let _ = active.join.join();
        }
    }

    /// Spawn the session thread owning the new stream.
    ///
    /// The thread resolves the output device itself so the CPAL handles never
    /// cross threads; stream failures are logged and recorded as an `Error`
    /// end reason, guarded by the stream id so a newer session's state is
    /// never clobbered.
    fn spawn_session(&mut self, sound: Arc<DecodedSound>, offset_seconds: f64, probe: StreamProbe) {
        let Some(output) = self.output.as_ref() else {
            return;
        };
        let stream_config = output.stream_config.clone();
        let sample_format = output.sample_format;
        let device_hint = self.config.device.clone();
        let start_frame = sound.frame_at(offset_seconds);

        let cancel = Arc::new(AtomicBool::new(false));
        let my_id = self.stream_id.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        let stream_id = self.stream_id.clone();
        let session = self.session.clone();
        let cancel_for_thread = cancel.clone();

        let join = thread::spawn(move || {
            let host = cpal::default_host();
            if let Err(e) = run_stream(
                &host,
                device_hint.as_deref(),
                &stream_config,
                sample_format,
                sound,
                start_frame,
                probe,
                &cancel_for_thread,
                &session,
                my_id,
                &stream_id,
            ) {
                tracing::warn!("playback session error: {e:#}");
                if !cancel_for_thread.load(Ordering::Relaxed)
                    && stream_id.load(Ordering::Relaxed) == my_id
                {
                    if let Ok(mut s) = session.lock() {
                        s.halt(PlaybackEndReason::Error);
                    }
                }
            }
        });

        self.active = Some(ActiveSession { cancel, join });
    }
}

impl Default for SoundPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SoundPlayer {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

/// Build and drive one output stream until natural end or cancellation.
#[allow(clippy::too_many_arguments)]
fn run_stream(
    host: &cpal::Host,
    device_hint: Option<&str>,
    stream_config: &cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    sound: Arc<DecodedSound>,
    start_frame: usize,
    probe: StreamProbe,
    cancel: &Arc<AtomicBool>,
    session: &Arc<Mutex<SessionState>>,
    my_id: u64,
    stream_id: &Arc<AtomicU64>,
) -> Result<()> {
    let device = device::pick_device(host, device_hint)?;
    let stream = playback::build_output_stream(
        &device,
        stream_config,
        sample_format,
        sound,
        start_frame,
        probe.clone(),
    )
    .context("build output stream")?;
    stream.play().context("start output stream")?;

    loop {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        if probe.finished.load(Ordering::Relaxed) {
            if stream_id.load(Ordering::Relaxed) == my_id {
                if let Ok(mut s) = session.lock() {
                    s.halt(PlaybackEndReason::Eof);
                }
            }
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }

    drop(stream);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlayerError;

    #[test]
    fn fresh_player_is_idle() {
        let player = SoundPlayer::new();
        assert!(!player.is_initialized());
        assert!(player.output_sample_rate().is_none());
        assert!(player.library().is_empty());

        let status = player.status();
        assert!(status.sound.is_none());
        assert_eq!(status.elapsed_seconds, 0.0);
        assert!(!status.playing);
        assert!(!status.muted);
    }

    #[test]
    fn play_before_initialize_is_rejected() {
        let mut player = SoundPlayer::new();
        let err = player.play("beep", None).unwrap_err();
        assert!(matches!(err, PlayerError::NotInitialized));
    }

    #[test]
    fn load_before_initialize_is_rejected() {
        let mut player = SoundPlayer::new();
        let err = player
            .load(vec![SoundSource {
                name: "beep".to_string(),
                locator: "beep.wav".to_string(),
            }])
            .unwrap_err();
        assert!(matches!(err, PlayerError::NotInitialized));
    }

    #[test]
    fn seek_without_prior_play_is_rejected() {
        let mut player = SoundPlayer::new();
        let err = player.seek(1_500).unwrap_err();
        assert!(matches!(err, PlayerError::NoActiveSound));
        // No state change.
        assert!(player.status().sound.is_none());
        assert_eq!(player.status().elapsed_seconds, 0.0);
    }

    #[test]
    fn pause_without_stream_is_noop() {
        let mut player = SoundPlayer::new();
        player.pause().unwrap();
        assert_eq!(player.status().elapsed_seconds, 0.0);
        assert!(player.status().end_reason.is_none());
    }

    #[test]
    fn stop_always_resets_offset() {
        let mut player = SoundPlayer::new();
        player.stop().unwrap();
        let status = player.status();
        assert_eq!(status.elapsed_seconds, 0.0);
        assert_eq!(status.end_reason, Some(PlaybackEndReason::Stopped));
    }

    #[test]
    fn mute_round_trips() {
        let mut player = SoundPlayer::new();
        assert!(!player.muted());
        player.set_muted(true);
        assert!(player.muted());
        assert!(player.status().muted);
        player.set_muted(false);
        assert!(!player.muted());
    }
}
