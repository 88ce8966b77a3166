//! Encoded audio payloads
//!
//! Audio bytes are stored as RFC 2397 data URLs
//! (`data:<mime>;base64,<payload>`), the same representation a browser
//! `FileReader.readAsDataURL` produces. The string is assigned verbatim as the
//! media element's source, so no decoding step sits between storage and
//! playback.

use crate::error::{CassetteError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// MIME type used when neither the host nor the file extension provide one
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Self-contained text encoding of an audio file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedAudio(String);

impl EncodedAudio {
    /// Encode raw bytes under the given MIME type
    pub fn encode(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!(
            "{DATA_PREFIX}{mime_type}{BASE64_MARKER},{}",
            STANDARD.encode(bytes)
        ))
    }

    /// Encode a file's bytes, resolving its MIME type
    ///
    /// The host-declared type wins; otherwise the type is guessed from the
    /// file name, falling back to `application/octet-stream`.
    pub fn from_file(name: &str, declared_mime: Option<&str>, bytes: &[u8]) -> Self {
        let mime = resolve_mime(name, declared_mime);
        Self::encode(&mime, bytes)
    }

    /// Validate and wrap an existing data URL
    pub fn parse(data_url: impl Into<String>) -> Result<Self> {
        let encoded = Self(data_url.into());
        encoded.split()?;
        Ok(encoded)
    }

    /// Decode back into `(mime_type, bytes)`
    pub fn decode(&self) -> Result<(String, Vec<u8>)> {
        let (mime, payload) = self.split()?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| CassetteError::invalid_input(format!("invalid base64 payload: {e}")))?;
        Ok((mime.to_string(), bytes))
    }

    /// MIME type from the data URL header, if well formed
    pub fn mime_type(&self) -> Option<&str> {
        self.split().ok().map(|(mime, _)| mime)
    }

    /// The data URL itself
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the data URL string
    pub fn into_inner(self) -> String {
        self.0
    }

    fn split(&self) -> Result<(&str, &str)> {
        let rest = self
            .0
            .strip_prefix(DATA_PREFIX)
            .ok_or_else(|| CassetteError::invalid_input("not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CassetteError::invalid_input("data URL has no payload"))?;
        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| CassetteError::invalid_input("data URL is not base64"))?;
        Ok((mime, payload))
    }
}

/// Rows loaded from storage are wrapped as-is; validation happens on decode
impl From<String> for EncodedAudio {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EncodedAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn resolve_mime(name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_string(),
        None => mime_guess::from_path(name)
            .first_raw()
            .unwrap_or(FALLBACK_MIME)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_produces_data_url() {
        let audio = EncodedAudio::encode("audio/mpeg", b"hello");
        assert_eq!(audio.as_str(), "data:audio/mpeg;base64,aGVsbG8=");
        assert_eq!(audio.mime_type(), Some("audio/mpeg"));
    }

    #[test]
    fn declared_mime_wins_over_extension() {
        let audio = EncodedAudio::from_file("song.mp3", Some("audio/ogg"), b"x");
        assert_eq!(audio.mime_type(), Some("audio/ogg"));
    }

    #[test]
    fn mime_guessed_from_extension() {
        let audio = EncodedAudio::from_file("song.mp3", None, b"x");
        assert_eq!(audio.mime_type(), Some("audio/mpeg"));

        let audio = EncodedAudio::from_file("song.flac", Some("  "), b"x");
        assert_eq!(audio.mime_type(), Some("audio/flac"));
    }

    #[test]
    fn unknown_extension_falls_back() {
        let audio = EncodedAudio::from_file("mystery", None, b"x");
        assert_eq!(audio.mime_type(), Some(FALLBACK_MIME));
    }

    #[test]
    fn empty_file_encodes_to_empty_payload() {
        let audio = EncodedAudio::encode("audio/wav", &[]);
        assert_eq!(audio.as_str(), "data:audio/wav;base64,");
        assert_eq!(audio.decode().unwrap().1, Vec::<u8>::new());
    }

    #[test]
    fn parse_rejects_malformed_urls() {
        assert!(EncodedAudio::parse("new-audio-source.mp3").is_err());
        assert!(EncodedAudio::parse("data:audio/mpeg;base64").is_err());
        assert!(EncodedAudio::parse("data:audio/mpeg,plain").is_err());
        assert!(EncodedAudio::parse("data:audio/mpeg;base64,AAAA").is_ok());
    }

    #[test]
    fn decode_rejects_bad_payload() {
        let audio = EncodedAudio::from("data:audio/mpeg;base64,@@@".to_string());
        assert!(matches!(audio.decode(), Err(CassetteError::InvalidInput(_))));
    }

    proptest! {
        /// Property: encoding is reversible and deterministic
        #[test]
        fn decode_recovers_original_bytes(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
            let first = EncodedAudio::encode("audio/mpeg", &bytes);
            let second = EncodedAudio::encode("audio/mpeg", &bytes);
            prop_assert_eq!(&first, &second);

            let (mime, decoded) = first.decode().unwrap();
            prop_assert_eq!(mime, "audio/mpeg");
            prop_assert_eq!(decoded, bytes);
        }
    }
}
