//! Argument codec
//!
//! Parses compact argument specifications such as `"u8u32"` into typed slots and
//! reads those slots from the little-endian argument bytes of a frame.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Maximum number of arguments a single log statement can carry
pub const MAX_ARGS: usize = 8;

/// Binary argument types supported by the device logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
}

/// Spec tokens in matching order; two-character tokens come first.
const TOKENS: [(&str, ArgumentType); 7] = [
    ("u8", ArgumentType::U8),
    ("i8", ArgumentType::I8),
    ("u16", ArgumentType::U16),
    ("i16", ArgumentType::I16),
    ("u32", ArgumentType::U32),
    ("i32", ArgumentType::I32),
    ("f32", ArgumentType::F32),
];

impl ArgumentType {
    /// Width of this type in the payload
    pub fn size(self) -> usize {
        match self {
            ArgumentType::U8 | ArgumentType::I8 => 1,
            ArgumentType::U16 | ArgumentType::I16 => 2,
            ArgumentType::U32 | ArgumentType::I32 | ArgumentType::F32 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArgumentType::U8 => "u8",
            ArgumentType::I8 => "i8",
            ArgumentType::U16 => "u16",
            ArgumentType::I16 => "i16",
            ArgumentType::U32 => "u32",
            ArgumentType::I32 => "i32",
            ArgumentType::F32 => "f32",
        }
    }

    /// Decode one value from the start of `data`, or `None` if it is too short
    pub fn read(self, data: &[u8]) -> Option<ArgumentValue> {
        if data.len() < self.size() {
            return None;
        }

        let value = match self {
            ArgumentType::U8 => ArgumentValue::U8(data[0]),
            ArgumentType::I8 => ArgumentValue::I8(data[0] as i8),
            ArgumentType::U16 => ArgumentValue::U16(LittleEndian::read_u16(data)),
            ArgumentType::I16 => ArgumentValue::I16(LittleEndian::read_u16(data) as i16),
            ArgumentType::U32 => ArgumentValue::U32(LittleEndian::read_u32(data)),
            ArgumentType::I32 => ArgumentValue::I32(LittleEndian::read_u32(data) as i32),
            ArgumentType::F32 => ArgumentValue::F32(f32::from_bits(LittleEndian::read_u32(data))),
        };
        Some(value)
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded argument value
///
/// `Display` renders the `{d}` form (floats with six fractional digits);
/// `LowerHex`/`UpperHex` render the `{x}`/`{X}` forms. Signed values print their
/// two's-complement bit pattern at their own width and floats print their IEEE-754 bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgumentValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    F32(f32),
}

impl ArgumentValue {
    /// Raw bit pattern, zero-extended to 32 bits
    pub fn bits(&self) -> u32 {
        match *self {
            ArgumentValue::U8(v) => u32::from(v),
            ArgumentValue::I8(v) => u32::from(v as u8),
            ArgumentValue::U16(v) => u32::from(v),
            ArgumentValue::I16(v) => u32::from(v as u16),
            ArgumentValue::U32(v) => v,
            ArgumentValue::I32(v) => v as u32,
            ArgumentValue::F32(v) => v.to_bits(),
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentValue::U8(v) => write!(f, "{}", v),
            ArgumentValue::I8(v) => write!(f, "{}", v),
            ArgumentValue::U16(v) => write!(f, "{}", v),
            ArgumentValue::I16(v) => write!(f, "{}", v),
            ArgumentValue::U32(v) => write!(f, "{}", v),
            ArgumentValue::I32(v) => write!(f, "{}", v),
            // Non-finite values use the C printf spellings
            ArgumentValue::F32(v) if v.is_nan() => f.write_str("nan"),
            ArgumentValue::F32(v) if v.is_infinite() => f.write_str(if *v < 0.0 { "-inf" } else { "inf" }),
            ArgumentValue::F32(v) => write!(f, "{:.6}", v),
        }
    }
}

impl fmt::LowerHex for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.bits(), f)
    }
}

impl fmt::UpperHex for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.bits(), f)
    }
}

/// Parse an argument specification into at most [`MAX_ARGS`] types
///
/// Matching is greedy and lenient: characters that start no known token are skipped
/// one at a time, and anything after the eighth recognised type is ignored.
pub fn parse_arg_spec(spec: &str) -> Vec<ArgumentType> {
    let mut types = Vec::new();
    let mut rest = spec;

    while !rest.is_empty() && types.len() < MAX_ARGS {
        match TOKENS.iter().find(|(token, _)| rest.starts_with(token)) {
            Some((token, arg_type)) => {
                types.push(*arg_type);
                rest = &rest[token.len()..];
            }
            None => {
                let skipped = rest.chars().next().map_or(1, char::len_utf8);
                log::trace!("Skipping unrecognised character {:?} in argument spec {:?}", &rest[..skipped], spec);
                rest = &rest[skipped..];
            }
        }
    }

    types
}

/// Decode `types` in order from `data`
///
/// Stops at the first type that no longer fits, so the result may be shorter than
/// `types`. Never reads past the end of `data`.
pub fn read_args(types: &[ArgumentType], data: &[u8]) -> Vec<ArgumentValue> {
    let mut values = Vec::with_capacity(types.len());
    let mut offset = 0;

    for arg_type in types {
        match arg_type.read(&data[offset..]) {
            Some(value) => {
                values.push(value);
                offset += arg_type.size();
            }
            None => break,
        }
    }

    values
}
