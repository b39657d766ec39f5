//! Named-sound playback engine.
//!
//! Load named audio assets (local files or http(s) URLs) into an in-memory
//! library of decoded buffers, then start/stop/pause/seek playback of any of
//! them on the host output device. At most one output stream is live at a
//! time; the playback offset survives pause/resume cycles.

pub mod config;
pub mod decode;
pub mod device;
pub mod error;
pub mod fetch;
pub mod library;
pub mod playback;
pub mod player;
pub mod resample;
pub mod session;

pub use config::PlayerConfig;
pub use error::{LoadError, PlayerError};
pub use library::{FailedLoad, LoadReport, SoundLibrary};
pub use player::SoundPlayer;
