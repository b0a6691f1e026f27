//! Decoder configuration types
//!
//! The wire protocol fixes the sync byte and an upper bound on frame size. Both are
//! exposed here so tools talking to non-default firmware builds can override them.

use crate::frame::{DEFAULT_SYNC_BYTE, HEADER_SIZE, MAX_FRAME_SIZE};
use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the frame decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Marker byte that starts every frame
    #[serde(default = "default_sync_byte")]
    pub sync_byte: u8,

    /// Largest accepted frame, sync byte included
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

fn default_sync_byte() -> u8 {
    DEFAULT_SYNC_BYTE
}

fn default_max_frame_size() -> usize {
    MAX_FRAME_SIZE
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sync_byte: default_sync_byte(),
            max_frame_size: default_max_frame_size(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the sync byte
    pub fn with_sync_byte(mut self, sync_byte: u8) -> Self {
        self.sync_byte = sync_byte;
        self
    }

    /// Builder method: set the maximum frame size
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Check that the frame bound fits between the header and the decoder buffer
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_size < HEADER_SIZE || self.max_frame_size > MAX_FRAME_SIZE {
            return Err(DecoderError::InvalidConfig(format!(
                "max_frame_size must be between {} and {}, got {}",
                HEADER_SIZE, MAX_FRAME_SIZE, self.max_frame_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::new();
        assert_eq!(config.sync_byte, 0x55);
        assert_eq!(config.max_frame_size, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = DecoderConfig::new().with_sync_byte(0xA5).with_max_frame_size(64);
        assert_eq!(config.sync_byte, 0xA5);
        assert!(config.validate().is_ok());

        assert!(DecoderConfig::new().with_max_frame_size(9).validate().is_err());
        assert!(DecoderConfig::new().with_max_frame_size(257).validate().is_err());
    }

    #[test]
    fn test_partial_deserialization() {
        let config: DecoderConfig = serde_json::from_str(r#"{ "max_frame_size": 128 }"#).unwrap();
        assert_eq!(config.sync_byte, 0x55);
        assert_eq!(config.max_frame_size, 128);
    }
}
