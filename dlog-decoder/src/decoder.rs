//! Streaming frame decoder
//!
//! [`FrameDecoder`] consumes the device byte stream one byte at a time, finds frame
//! boundaries, validates headers and turns every complete frame into a
//! [`DecodedFrame`] using the shared [`Dictionary`].
//!
//! The stream may start mid-frame or drop bytes, so corruption is never an error:
//! the partial frame is dropped and the decoder goes back to searching for the next
//! sync byte.

use crate::config::DecoderConfig;
use crate::dictionary::Dictionary;
use crate::formatter::MessageFormatter;
use crate::frame::{FrameHeader, HEADER_SIZE, MAX_FRAME_SIZE, MIN_DATA_SIZE};
use crate::types::{DecodedFrame, Result};
use std::borrow::Cow;
use std::fmt;
use std::io::{BufReader, Bytes, Read};

/// Framing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Discarding bytes until a sync byte shows up
    Searching,
    /// Collecting the fixed-size header
    ReadingHeader,
    /// Collecting argument bytes up to the declared frame length
    ReadingPayload,
}

/// Why an in-flight frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncReason {
    /// `DataSize` smaller than level + ID + timestamp
    DataSizeTooSmall,
    /// Declared frame length above the maximum frame size
    FrameTooLarge,
    /// Level byte outside 0..=3
    InvalidLevel,
    /// Payload grew past the maximum frame size. Header validation already rejects
    /// such frames, so this only fires if that check and the buffer disagree.
    BufferOverflow,
}

impl fmt::Display for ResyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResyncReason::DataSizeTooSmall => write!(f, "data size too small"),
            ResyncReason::FrameTooLarge => write!(f, "frame too large"),
            ResyncReason::InvalidLevel => write!(f, "invalid level"),
            ResyncReason::BufferOverflow => write!(f, "buffer overflow"),
        }
    }
}

/// Counters kept by a [`FrameDecoder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Bytes passed to `process_byte`
    pub bytes_processed: u64,
    /// Bytes dropped while searching or as part of a corrupt frame
    pub bytes_discarded: u64,
    /// Frames emitted, unknown IDs included
    pub frames_decoded: u64,
    /// Frames whose ID had no dictionary entry
    pub unknown_ids: u64,
    /// Partial frames dropped on corruption
    pub resyncs: u64,
    /// Messages with placeholders left unfilled for lack of argument bytes
    pub truncated_messages: u64,
}

/// Byte-at-a-time frame decoder
///
/// One instance owns its frame buffer and must not be fed from several threads at
/// once; the dictionary it borrows can be shared freely.
///
/// # Example
/// ```
/// use dlog_decoder::{Dictionary, FrameDecoder, Level};
///
/// let dict = Dictionary::parse(r#"{"messages": {
///     "1048476": {"fmt": "GPIO port {d} pin {d} initialized", "args": "u8u8", "file": "gpio.c", "line": 57}
/// }}"#).unwrap();
///
/// let mut decoder = FrameDecoder::new(&dict);
/// let frames = decoder.feed(&[0x55, 0x0A, 0x00, 0x9C, 0xFF, 0x0F, 0x10, 0x27, 0x00, 0x00, 0x02, 0x05]);
///
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].timestamp, 10000);
/// assert_eq!(frames[0].level, Level::Debug);
/// assert_eq!(frames[0].message, "GPIO port 2 pin 5 initialized");
/// ```
pub struct FrameDecoder<'d> {
    dictionary: &'d Dictionary,
    config: DecoderConfig,
    state: DecoderState,
    buffer: [u8; MAX_FRAME_SIZE],
    len: usize,
    /// Total frame length declared by the current header
    expected_len: usize,
    stats: DecoderStats,
}

impl<'d> FrameDecoder<'d> {
    /// Create a decoder with the default protocol settings
    pub fn new(dictionary: &'d Dictionary) -> Self {
        Self {
            dictionary,
            config: DecoderConfig::default(),
            state: DecoderState::Searching,
            buffer: [0; MAX_FRAME_SIZE],
            len: 0,
            expected_len: 0,
            stats: DecoderStats::default(),
        }
    }

    /// Create a decoder with a custom configuration
    pub fn with_config(dictionary: &'d Dictionary, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(dictionary)
        })
    }

    /// Current framing state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop any partially received frame and go back to searching
    pub fn reset(&mut self) {
        self.state = DecoderState::Searching;
        self.len = 0;
        self.expected_len = 0;
    }

    /// Feed one byte; returns a frame when this byte completes one
    pub fn process_byte(&mut self, byte: u8) -> Option<DecodedFrame<'d>> {
        self.stats.bytes_processed += 1;

        match self.state {
            DecoderState::Searching => {
                if byte == self.config.sync_byte {
                    self.buffer[0] = byte;
                    self.len = 1;
                    self.state = DecoderState::ReadingHeader;
                } else {
                    self.stats.bytes_discarded += 1;
                }
                None
            }
            DecoderState::ReadingHeader => {
                self.push(byte);
                if self.len < HEADER_SIZE {
                    return None;
                }
                self.check_header()
            }
            DecoderState::ReadingPayload => {
                if self.len + 1 > self.config.max_frame_size {
                    self.resync(ResyncReason::BufferOverflow);
                    return None;
                }
                self.push(byte);
                if self.len < self.expected_len {
                    return None;
                }
                self.decode()
            }
        }
    }

    /// Feed a chunk of bytes and collect every frame it completes
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<DecodedFrame<'d>> {
        bytes.iter().filter_map(|&byte| self.process_byte(byte)).collect()
    }

    /// Decode frames from a byte source until it is exhausted
    ///
    /// I/O errors are yielded as `Err`; framing problems are not.
    pub fn frames<R: Read>(&mut self, reader: R) -> StreamFrames<'_, 'd, R> {
        StreamFrames {
            decoder: self,
            bytes: BufReader::new(reader).bytes(),
        }
    }

    fn push(&mut self, byte: u8) {
        self.buffer[self.len] = byte;
        self.len += 1;
    }

    /// Validate a complete header; decodes straight away when there are no arguments
    fn check_header(&mut self) -> Option<DecodedFrame<'d>> {
        let header = FrameHeader::parse(&self.buffer[..self.len])?;

        if header.data_size < MIN_DATA_SIZE {
            self.resync(ResyncReason::DataSizeTooSmall);
            return None;
        }
        if header.frame_len() > self.config.max_frame_size {
            self.resync(ResyncReason::FrameTooLarge);
            return None;
        }
        if header.level().is_none() {
            self.resync(ResyncReason::InvalidLevel);
            return None;
        }

        if header.data_size == MIN_DATA_SIZE {
            return self.decode();
        }

        self.expected_len = header.frame_len();
        self.state = DecoderState::ReadingPayload;
        None
    }

    /// Turn the buffered frame into a record and reset for the next one
    fn decode(&mut self) -> Option<DecodedFrame<'d>> {
        let frame = self.decode_buffer();
        self.reset();
        frame
    }

    fn decode_buffer(&mut self) -> Option<DecodedFrame<'d>> {
        let header = FrameHeader::parse(&self.buffer[..self.len])?;
        let level = header.level()?;
        let dictionary = self.dictionary;

        self.stats.frames_decoded += 1;

        let Some(definition) = dictionary.lookup(header.id) else {
            log::trace!("Unknown message id {} (0x{:06X})", header.id, header.id);
            self.stats.unknown_ids += 1;
            return Some(DecodedFrame {
                timestamp: header.timestamp,
                level,
                message: Cow::Borrowed(""),
                raw_id: header.id,
                source_file: None,
                source_line: None,
            });
        };

        let args = &self.buffer[HEADER_SIZE..HEADER_SIZE + header.arg_len()];
        let formatted = MessageFormatter::format(&definition.format, &definition.arg_spec, args);
        if formatted.unfilled > 0 {
            log::warn!(
                "Message id {} ({}): {} placeholder(s) unfilled, {} argument byte(s) for spec {:?}",
                header.id,
                definition.location(),
                formatted.unfilled,
                args.len(),
                definition.arg_spec
            );
            self.stats.truncated_messages += 1;
        }

        Some(DecodedFrame {
            timestamp: header.timestamp,
            level,
            message: formatted.text,
            raw_id: header.id,
            source_file: Some(definition.source_file.as_str()),
            source_line: Some(definition.source_line),
        })
    }

    fn resync(&mut self, reason: ResyncReason) {
        log::debug!("Dropping {} buffered byte(s): {}", self.len, reason);
        self.stats.resyncs += 1;
        self.stats.bytes_discarded += self.len as u64;
        self.reset();
    }
}

/// Iterator over frames decoded from a [`Read`] source
pub struct StreamFrames<'a, 'd, R> {
    decoder: &'a mut FrameDecoder<'d>,
    bytes: Bytes<BufReader<R>>,
}

impl<'a, 'd, R: Read> Iterator for StreamFrames<'a, 'd, R> {
    type Item = Result<DecodedFrame<'d>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let byte = match self.bytes.next()? {
                Ok(byte) => byte,
                Err(e) => return Some(Err(e.into())),
            };
            if let Some(frame) = self.decoder.process_byte(byte) {
                return Some(Ok(frame));
            }
        }
    }
}
