//! Wire frame layout
//!
//! ```text
//! ┌──────┬──────────┬───────┬──────────────┬────────────────┬──────────┐
//! │ Sync │ DataSize │ Level │ ID (3B LE)   │ Timestamp (4B) │ Args     │
//! │ 0x55 │ 8 + args │ 0..=3 │ low/mid/high │ LE u32         │ 0..N     │
//! └──────┴──────────┴───────┴──────────────┴────────────────┴──────────┘
//! ```
//!
//! `DataSize` counts every byte after itself, so a complete frame is
//! `2 + DataSize` bytes long.

use crate::types::{DecoderError, Level, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Default frame marker
pub const DEFAULT_SYNC_BYTE: u8 = 0x55;

/// Sync, size, level, 3-byte ID and 4-byte timestamp
pub const HEADER_SIZE: usize = 10;

/// Smallest legal `DataSize`: level + ID + timestamp
pub const MIN_DATA_SIZE: u8 = 8;

/// Protocol upper bound on a complete frame, sync byte included
pub const MAX_FRAME_SIZE: usize = 256;

/// Largest ID representable in the 3-byte field
pub const MAX_MESSAGE_ID: u32 = 0x00FF_FFFF;

/// Decoded view of the first [`HEADER_SIZE`] bytes of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub sync: u8,
    pub data_size: u8,
    pub level_byte: u8,
    pub id: u32,
    pub timestamp: u32,
}

impl FrameHeader {
    /// Read the header fields; `None` if fewer than [`HEADER_SIZE`] bytes are given
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }

        let id = u32::from(bytes[3]) | (u32::from(bytes[4]) << 8) | (u32::from(bytes[5]) << 16);

        Some(Self {
            sync: bytes[0],
            data_size: bytes[1],
            level_byte: bytes[2],
            id,
            timestamp: LittleEndian::read_u32(&bytes[6..10]),
        })
    }

    /// Severity, if the level byte is one of the four known values
    pub fn level(&self) -> Option<Level> {
        Level::from_byte(self.level_byte)
    }

    /// Total length of the frame on the wire
    pub fn frame_len(&self) -> usize {
        2 + self.data_size as usize
    }

    /// Number of argument bytes following the header
    pub fn arg_len(&self) -> usize {
        (self.data_size as usize).saturating_sub(MIN_DATA_SIZE as usize)
    }
}

/// Build a wire frame using the default sync byte
///
/// Mostly useful for tests and device simulators that need to feed the decoder.
///
/// # Example
/// ```
/// use dlog_decoder::{encode_frame, Level};
///
/// let bytes = encode_frame(Level::Info, 331898, 1000, &[]).unwrap();
/// assert_eq!(bytes, [0x55, 0x08, 0x01, 0x7A, 0x10, 0x05, 0xE8, 0x03, 0x00, 0x00]);
/// ```
pub fn encode_frame(level: Level, id: u32, timestamp: u32, args: &[u8]) -> Result<Vec<u8>> {
    if id > MAX_MESSAGE_ID {
        return Err(DecoderError::InvalidFrame(format!(
            "message id {} does not fit in 24 bits",
            id
        )));
    }

    let frame_len = HEADER_SIZE + args.len();
    if frame_len > MAX_FRAME_SIZE {
        return Err(DecoderError::InvalidFrame(format!(
            "frame of {} bytes exceeds maximum of {}",
            frame_len, MAX_FRAME_SIZE
        )));
    }

    let mut bytes = Vec::with_capacity(frame_len);
    bytes.push(DEFAULT_SYNC_BYTE);
    bytes.push((frame_len - 2) as u8);
    bytes.push(level.as_byte());
    bytes.write_u24::<LittleEndian>(id)?;
    bytes.write_u32::<LittleEndian>(timestamp)?;
    bytes.extend_from_slice(args);

    Ok(bytes)
}
