use std::path::PathBuf;

use clap::Parser;
use soundbox_types::SoundSource;

#[derive(Parser, Debug)]
#[command(name = "soundbox", version)]
pub struct Args {
    /// Sounds to load, as name=locator pairs (file path or http(s) URL)
    pub sounds: Vec<String>,

    /// JSON manifest of sounds to load: [{"name": "...", "locator": "..."}]
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// List output devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Use a specific output device by substring match
    #[arg(long)]
    pub device: Option<String>,

    /// Per-request timeout for HTTP fetches, in seconds
    #[arg(long, default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Start with new playback muted
    #[arg(long)]
    pub muted: bool,
}

/// Parse one positional sound argument of the form `name=locator`.
pub fn parse_sound_arg(arg: &str) -> Option<SoundSource> {
    let (name, locator) = arg.split_once('=')?;
    if name.is_empty() || locator.is_empty() {
        return None;
    }
    Some(SoundSource {
        name: name.to_string(),
        locator: locator.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sound_arg_splits_on_first_equals() {
        let source = parse_sound_arg("beep=http://example/a.wav?x=1").unwrap();
        assert_eq!(source.name, "beep");
        assert_eq!(source.locator, "http://example/a.wav?x=1");
    }

    #[test]
    fn parse_sound_arg_rejects_malformed_input() {
        assert!(parse_sound_arg("no-separator").is_none());
        assert!(parse_sound_arg("=locator").is_none());
        assert!(parse_sound_arg("name=").is_none());
    }
}
