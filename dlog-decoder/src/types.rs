//! Core types for the deferred log decoder library
//!
//! This module defines the records the decoder emits for every complete frame and
//! the error type used for construction-time failures. Streaming anomalies (corrupt
//! frames, unknown IDs) are never errors - see [`crate::decoder`].

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while building a dictionary or configuring the decoder
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to parse dictionary at line {line}, column {column}: {reason}")]
    DictionaryParse {
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("Dictionary section not found: \"{0}\"")]
    MissingSection(String),

    #[error("Invalid decoder configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Severity carried in the level byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    /// Map a wire level byte to a severity; anything above 3 is invalid
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warning),
            3 => Some(Level::Error),
            _ => None,
        }
    }

    /// Wire representation of this level
    pub fn as_byte(self) -> u8 {
        match self {
            Level::Debug => 0,
            Level::Info => 1,
            Level::Warning => 2,
            Level::Error => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A fully decoded frame - the primary output of the decoder
///
/// Strings borrow from the [`Dictionary`](crate::Dictionary) the decoder was built
/// with whenever possible. `message` is only an owned allocation when arguments had
/// to be substituted into the format string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame<'d> {
    /// Device tick counter, unit-less
    pub timestamp: u32,
    /// Severity from the frame header
    pub level: Level,
    /// Reconstructed message text (empty when the ID is unknown)
    pub message: Cow<'d, str>,
    /// 24-bit message ID exactly as received
    pub raw_id: u32,
    /// Source file of the log statement (None when the ID is unknown)
    pub source_file: Option<&'d str>,
    /// Source line of the log statement (None when the ID is unknown)
    pub source_line: Option<u32>,
}

impl<'d> DecodedFrame<'d> {
    /// True if the frame's ID had no dictionary entry
    pub fn is_unknown(&self) -> bool {
        self.source_file.is_none()
    }

    /// Render the `file:line` location, if the ID was known
    pub fn location(&self) -> Option<String> {
        match (self.source_file, self.source_line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        }
    }

    /// True if `message` is a fresh allocation rather than the dictionary's format string
    pub fn owns_message(&self) -> bool {
        matches!(self.message, Cow::Owned(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_byte() {
        assert_eq!(Level::from_byte(0), Some(Level::Debug));
        assert_eq!(Level::from_byte(3), Some(Level::Error));
        assert_eq!(Level::from_byte(4), None);
        assert_eq!(Level::from_byte(0xFF), None);

        for byte in 0..=3 {
            assert_eq!(Level::from_byte(byte).map(Level::as_byte), Some(byte));
        }
    }

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Warning), "warning");
        assert_eq!(format!("{:<7}|", Level::Info), "info   |");
    }
}
