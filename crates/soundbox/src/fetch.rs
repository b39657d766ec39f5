//! Source locator resolution.
//!
//! A locator is either an http(s) URL fetched with ureq or a local
//! filesystem path. Assets are buffered whole before decode; library sounds
//! are short clips, not streams.

use std::fs;
use std::io::Read;
use std::time::Duration;

use crate::error::LoadError;

/// True when the locator should be fetched over HTTP.
pub fn is_http_locator(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetch the raw bytes behind `locator`.
pub fn fetch_bytes(locator: &str, http_timeout: Duration) -> Result<Vec<u8>, LoadError> {
    if is_http_locator(locator) {
        fetch_http(locator, http_timeout)
    } else {
        fs::read(locator).map_err(|source| LoadError::Read {
            locator: locator.to_string(),
            source,
        })
    }
}

fn fetch_http(locator: &str, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    let http_err = |reason: String| LoadError::Http {
        locator: locator.to_string(),
        reason,
    };

    let resp = ureq::get(locator)
        .config()
        .timeout_per_call(Some(timeout))
        .build()
        .call()
        .map_err(|e| http_err(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(http_err(format!("status {status}")));
    }

    let (_, body) = resp.into_parts();
    let mut buf = Vec::new();
    body.into_reader()
        .read_to_end(&mut buf)
        .map_err(|e| http_err(format!("read failed: {e}")))?;
    Ok(buf)
}

/// Infer a file extension hint from the locator, if present.
///
/// Query strings are stripped first so URL locators hint correctly.
pub fn infer_ext(locator: &str) -> Option<String> {
    let tail = locator.split('?').next().unwrap_or(locator);
    let file = tail.rsplit(['/', '\\']).next().unwrap_or(tail);
    let mut parts = file.rsplit('.');
    let ext = parts.next()?;
    if parts.next().is_some() && !ext.is_empty() {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_http_locator_matches_schemes() {
        assert!(is_http_locator("http://example/a.wav"));
        assert!(is_http_locator("HTTPS://example/a.wav"));
        assert!(!is_http_locator("/tmp/a.wav"));
        assert!(!is_http_locator("httpish/a.wav"));
    }

    #[test]
    fn infer_ext_handles_query_and_missing_ext() {
        assert_eq!(
            infer_ext("http://example/a.flac?x=1"),
            Some("flac".to_string())
        );
        assert_eq!(infer_ext("http://example/a"), None);
    }

    #[test]
    fn infer_ext_handles_multiple_dots() {
        assert_eq!(
            infer_ext("http://example/archive.track.flac"),
            Some("flac".to_string())
        );
    }

    #[test]
    fn infer_ext_handles_local_paths() {
        assert_eq!(infer_ext("/sounds/Beep.WAV"), Some("wav".to_string()));
        assert_eq!(infer_ext("sounds\\beep.ogg"), Some("ogg".to_string()));
        assert_eq!(infer_ext("/sounds/beep"), None);
    }

    #[test]
    fn fetch_bytes_reports_missing_file() {
        let err = fetch_bytes("/definitely/not/here.wav", Duration::from_secs(1)).unwrap_err();
        match err {
            LoadError::Read { locator, .. } => assert_eq!(locator, "/definitely/not/here.wav"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
