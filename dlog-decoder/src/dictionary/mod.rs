//! Message dictionary and its source reader
//!
//! This module contains the reader for the dictionary source text produced by
//! the firmware build and the in-memory dictionary used during decoding.

pub mod database;
pub mod json;

// Re-export key types for convenience
pub use database::{Dictionary, DictionaryStats, MessageDefinition};
