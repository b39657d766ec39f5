//! Named library of decoded sounds and the batch loader.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use soundbox_types::SoundSource;

use crate::decode::{self, DecodedSound};
use crate::error::LoadError;
use crate::fetch;
use crate::resample;

/// Map from sound name to its decoded buffer.
///
/// Entries are only ever inserted or overwritten; a name collision keeps the
/// buffer whose load completed last.
#[derive(Debug, Default)]
pub struct SoundLibrary {
    sounds: HashMap<String, Arc<DecodedSound>>,
}

impl SoundLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a named buffer. Returns `true` when an existing
    /// entry was replaced.
    pub fn insert(&mut self, name: impl Into<String>, sound: Arc<DecodedSound>) -> bool {
        self.sounds.insert(name.into(), sound).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<DecodedSound>> {
        self.sounds.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Sorted list of loaded sound names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sounds.keys().cloned().collect();
        names.sort();
        names
    }
}

/// One failed entry from a batch load.
#[derive(Debug)]
pub struct FailedLoad {
    pub name: String,
    pub locator: String,
    pub error: LoadError,
}

/// Outcome of a batch load: which names loaded and which failed.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names stored in the library, in load-completion order.
    pub loaded: Vec<String>,
    pub failed: Vec<FailedLoad>,
}

impl LoadReport {
    /// `true` when every requested entry loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch, decode, and rate-convert a batch of sources in parallel.
///
/// Each entry runs on its own worker thread; results arrive in completion
/// order, which is also the overwrite order for duplicate names. A failed
/// entry is logged and reported without affecting the rest of the batch.
pub fn load_batch(
    sources: Vec<SoundSource>,
    target_rate: u32,
    http_timeout: Duration,
    chunk_frames: usize,
) -> (Vec<(String, Arc<DecodedSound>)>, Vec<FailedLoad>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let expected = sources.len();

    for source in sources {
        let tx = tx.clone();
        thread::spawn(move || {
            let outcome = load_one(&source.locator, target_rate, http_timeout, chunk_frames);
            let _ = tx.send((source.name, source.locator, outcome));
        });
    }
    drop(tx);

    let mut loaded = Vec::new();
    let mut failed = Vec::new();
    for _ in 0..expected {
        let Ok((name, locator, outcome)) = rx.recv() else {
            break;
        };
        match outcome {
            Ok(sound) => {
                tracing::info!(
                    name = %name,
                    rate_hz = sound.sample_rate,
                    channels = sound.channels,
                    duration_s = sound.duration_seconds(),
                    "sound loaded"
                );
                loaded.push((name, Arc::new(sound)));
            }
            Err(error) => {
                tracing::warn!(name = %name, locator = %locator, error = %error, "sound load failed");
                failed.push(FailedLoad {
                    name,
                    locator,
                    error,
                });
            }
        }
    }
    (loaded, failed)
}

/// Fetch + decode + rate-convert one asset.
fn load_one(
    locator: &str,
    target_rate: u32,
    http_timeout: Duration,
    chunk_frames: usize,
) -> Result<DecodedSound, LoadError> {
    let bytes = fetch::fetch_bytes(locator, http_timeout)?;
    let ext = fetch::infer_ext(locator);
    let mut sound = decode::decode_bytes(locator, bytes, ext.as_deref())?;
    if sound.sample_rate != target_rate {
        sound.samples = resample::convert_rate(
            locator,
            std::mem::take(&mut sound.samples),
            sound.channels,
            sound.sample_rate,
            target_rate,
            chunk_frames,
        )?;
        sound.sample_rate = target_rate;
    }
    Ok(sound)
}
