//! Reference to a pronunciation audio file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::records::AudioRecord;

/// Audio file extensions accepted for cards.
pub const SUPPORTED_AUDIO_FORMATS: [&str; 4] = [".mp3", ".wav", ".ogg", ".m4a"];

/// Path to an audio file with a supported extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AudioRecord", into = "AudioRecord")]
pub struct AudioReference {
    path: String,
}

impl AudioReference {
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim();
        if path.is_empty() {
            return Err(DomainError::InvalidValueObject(
                "audio path cannot be empty".to_string(),
            ));
        }

        let extension = match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!(".{}", ext.to_lowercase()),
            None => {
                return Err(DomainError::InvalidValueObject(format!(
                    "audio path must have a file extension: {path}"
                )))
            }
        };

        if !SUPPORTED_AUDIO_FORMATS.contains(&extension.as_str()) {
            return Err(DomainError::InvalidValueObject(format!(
                "audio format {extension} is not supported, expected one of {}",
                SUPPORTED_AUDIO_FORMATS.join(", ")
            )));
        }

        Ok(Self {
            path: path.to_string(),
        })
    }

    /// Join a file name onto an optional directory.
    pub fn from_filename(filename: &str, directory: &str) -> Result<Self> {
        if directory.is_empty() {
            return Self::new(filename);
        }
        let joined: PathBuf = Path::new(directory).join(filename);
        Self::new(&joined.to_string_lossy())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn filename(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Parent directory, `"."` for a bare file name.
    pub fn directory(&self) -> String {
        match Path::new(&self.path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.to_string_lossy().into_owned()
            }
            _ => ".".to_string(),
        }
    }

    /// Lowercase extension including the leading dot.
    pub fn extension(&self) -> String {
        Path::new(&self.path)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        Path::new(&self.path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn exists(&self) -> bool {
        Path::new(&self.path).exists()
    }

    pub fn size_bytes(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }

    pub fn is_mp3(&self) -> bool {
        self.extension() == ".mp3"
    }

    pub fn is_wav(&self) -> bool {
        self.extension() == ".wav"
    }

    pub fn is_ogg(&self) -> bool {
        self.extension() == ".ogg"
    }

    pub fn is_m4a(&self) -> bool {
        self.extension() == ".m4a"
    }

    /// Sound tag understood by Anki, e.g. `[sound:hello.mp3]`.
    pub fn to_anki_tag(&self) -> String {
        format!("[sound:{}]", self.filename())
    }
}

impl fmt::Display for AudioReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_parts() {
        let audio = AudioReference::new(" media/audio/Hello.MP3 ").unwrap();
        assert_eq!(audio.path(), "media/audio/Hello.MP3");
        assert_eq!(audio.filename(), "Hello.MP3");
        assert_eq!(audio.directory(), "media/audio");
        assert_eq!(audio.extension(), ".mp3");
        assert_eq!(audio.stem(), "Hello");
        assert!(audio.is_mp3());
        assert!(!audio.is_wav());
        assert_eq!(audio.to_anki_tag(), "[sound:Hello.MP3]");
    }

    #[test]
    fn test_bare_filename_directory() {
        let audio = AudioReference::new("word.ogg").unwrap();
        assert_eq!(audio.directory(), ".");
        assert!(audio.is_ogg());
    }

    #[test]
    fn test_rejects_invalid_paths() {
        assert!(AudioReference::new("").is_err());
        assert!(AudioReference::new("media/noext").is_err());
        assert!(matches!(
            AudioReference::new("clip.flac"),
            Err(DomainError::InvalidValueObject(_))
        ));
    }

    #[test]
    fn test_from_filename() {
        let audio = AudioReference::from_filename("hello.wav", "media").unwrap();
        assert_eq!(audio.filename(), "hello.wav");
        assert_eq!(audio.directory(), "media");

        let bare = AudioReference::from_filename("hello.m4a", "").unwrap();
        assert_eq!(bare.path(), "hello.m4a");
        assert!(bare.is_m4a());
    }

    #[test]
    fn test_missing_file() {
        let audio = AudioReference::new("does/not/exist.mp3").unwrap();
        assert!(!audio.exists());
        assert_eq!(audio.size_bytes(), None);
    }
}
