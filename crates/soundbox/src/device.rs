//! Output device discovery and selection.
//!
//! Thin wrappers around CPAL for listing output devices and choosing the
//! device/config pair that acts as the engine's output context.

use anyhow::{Context, Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait};

/// Pick a CPAL output device.
///
/// - If `needle` is `Some`, chooses the first output device whose name
///   contains the substring (case-insensitive).
/// - Otherwise, returns the host default output device.
pub fn pick_device(host: &cpal::Host, needle: Option<&str>) -> Result<cpal::Device> {
    let mut devices: Vec<cpal::Device> = host
        .output_devices()
        .context("No output devices")?
        .collect();

    if let Some(needle) = needle {
        if let Some(d) = devices.drain(..).find(|d| {
            d.description()
                .ok()
                .map(|n| matches_device_name(&n.name(), needle))
                .unwrap_or(false)
        }) {
            return Ok(d);
        }
        return Err(anyhow!("No output device matched: {needle}"));
    }

    host.default_output_device()
        .ok_or_else(|| anyhow!("No default output device"))
}

/// Choose the output stream config for the engine.
///
/// The device's default output config fixes the engine sample rate; every
/// loaded sound is converted to this rate once at load time.
pub fn output_config(device: &cpal::Device) -> Result<cpal::SupportedStreamConfig> {
    device
        .default_output_config()
        .context("No default output config")
}

/// Prefer a fixed stream buffer size if the device advertises a range,
/// leaning large to reduce underruns.
///
/// Returns `None` when the device only supports the default buffer size.
pub fn pick_buffer_size(config: &cpal::SupportedStreamConfig) -> Option<cpal::BufferSize> {
    match config.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max } => {
            Some(cpal::BufferSize::Fixed(chosen_buffer_frames(*min, *max)))
        }
        cpal::SupportedBufferSize::Unknown => None,
    }
}

fn chosen_buffer_frames(min: u32, max: u32) -> u32 {
    const MAX_FRAMES: u32 = 16_384;
    if max > MAX_FRAMES {
        if min > MAX_FRAMES { min } else { MAX_FRAMES }
    } else {
        max
    }
}

/// Print available output devices to stdout.
///
/// Intended for CLI UX (`--list-devices`) rather than structured output.
pub fn list_devices(host: &cpal::Host) -> Result<()> {
    let devices = host.output_devices().context("No output devices")?;
    for (i, d) in devices.enumerate() {
        println!("#{i}: {}", d.description()?);
    }
    Ok(())
}

fn matches_device_name(name: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }
    name.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_device_name_is_case_insensitive() {
        assert!(matches_device_name("USB DAC", "dac"));
        assert!(matches_device_name("usb dac", "USB"));
        assert!(!matches_device_name("USB DAC", "speaker"));
        assert!(!matches_device_name("USB DAC", ""));
    }

    #[test]
    fn chosen_buffer_frames_prefers_max_within_cap() {
        assert_eq!(chosen_buffer_frames(64, 4_096), 4_096);
    }

    #[test]
    fn chosen_buffer_frames_caps_large_ranges() {
        assert_eq!(chosen_buffer_frames(64, 65_536), 16_384);
    }

    #[test]
    fn chosen_buffer_frames_keeps_min_above_cap() {
        assert_eq!(chosen_buffer_frames(32_768, 65_536), 32_768);
    }
}
