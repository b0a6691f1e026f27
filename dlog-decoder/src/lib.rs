//! Deferred Log Decoder Library
//!
//! Decodes the compact binary log frames emitted by embedded devices and rebuilds
//! human-readable log lines from a side-loaded message dictionary.
//!
//! # Architecture
//!
//! - [`Dictionary`]: message ID → format string, argument spec and source location
//! - [`args`]: argument spec parsing and little-endian argument reads
//! - [`MessageFormatter`]: `{d}` / `{x}` / `{X}` placeholder substitution
//! - [`FrameDecoder`]: byte-at-a-time state machine that finds, validates and decodes frames
//!
//! The library does NOT:
//! - Read from serial ports or spawn capture tools
//! - Persist anything
//! - Colour or align output (see dlog-cli)
//!
//! # Example Usage
//!
//! ```no_run
//! use dlog_decoder::{Dictionary, FrameDecoder};
//! use std::fs::File;
//! use std::path::Path;
//!
//! let dictionary = Dictionary::from_path(Path::new("firmware.dict.json")).unwrap();
//! let mut decoder = FrameDecoder::new(&dictionary);
//!
//! let capture = File::open("capture.bin").unwrap();
//! for frame in decoder.frames(capture) {
//!     match frame {
//!         Ok(frame) if frame.is_unknown() => println!("unknown id 0x{:06X}", frame.raw_id),
//!         Ok(frame) => println!("[{}] {} {}", frame.timestamp, frame.level, frame.message),
//!         Err(e) => eprintln!("Read error: {}", e),
//!     }
//! }
//! ```

// Public modules
pub mod args;
pub mod config;
pub mod decoder;
pub mod dictionary;
pub mod formatter;
pub mod frame;
pub mod types;

// Re-export main types for convenience
pub use args::{parse_arg_spec, read_args, ArgumentType, ArgumentValue};
pub use config::DecoderConfig;
pub use decoder::{DecoderState, DecoderStats, FrameDecoder, ResyncReason, StreamFrames};
pub use dictionary::{Dictionary, DictionaryStats, MessageDefinition};
pub use formatter::{FormattedMessage, MessageFormatter};
pub use frame::{encode_frame, FrameHeader};
pub use types::{DecodedFrame, DecoderError, Level, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty dictionary still decodes frames as unknown
        let dictionary = Dictionary::new();
        let mut decoder = FrameDecoder::new(&dictionary);
        let frames = decoder.feed(&encode_frame(Level::Info, 1, 2, &[]).unwrap());
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_unknown());
    }
}
