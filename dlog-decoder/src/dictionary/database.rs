//! Message dictionary
//!
//! Maps the 24-bit message IDs emitted by the device to their format strings,
//! argument layouts and source locations. Built once, then shared read-only.

use crate::types::{DecoderError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// One dictionary entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    /// Message ID
    pub id: u32,
    /// Format string with `{d}`, `{x}`, `{X}` placeholders
    pub format: String,
    /// Argument spec, e.g. `"u8u32"`
    pub arg_spec: String,
    /// Source file of the log statement
    pub source_file: String,
    /// Source line of the log statement
    pub source_line: u32,
}

impl MessageDefinition {
    /// Create a new message definition
    pub fn new(
        id: u32,
        format: impl Into<String>,
        arg_spec: impl Into<String>,
        source_file: impl Into<String>,
        source_line: u32,
    ) -> Self {
        Self {
            id,
            format: format.into(),
            arg_spec: arg_spec.into(),
            source_file: source_file.into(),
            source_line,
        }
    }

    /// `file:line` as shown in the location column
    pub fn location(&self) -> String {
        format!("{}:{}", self.source_file, self.source_line)
    }

    fn location_width(&self) -> usize {
        self.location().chars().count()
    }
}

/// The message dictionary
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Definitions by message ID; the first definition seen for an ID wins
    messages: HashMap<u32, MessageDefinition>,

    /// Widest `file:line` across all entries, maintained on insert
    max_location_len: usize,

    /// Definitions dropped because their ID was already present
    duplicates_discarded: usize,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dictionary from its JSON source text
    ///
    /// # Example
    /// ```
    /// use dlog_decoder::Dictionary;
    ///
    /// let dict = Dictionary::parse(r#"{
    ///     "messages": {
    ///         "331898": { "fmt": "System initialized", "args": "", "file": "main.c", "line": 42 }
    ///     }
    /// }"#).unwrap();
    ///
    /// assert_eq!(dict.lookup(331898).unwrap().format, "System initialized");
    /// assert_eq!(dict.max_location_len(), "main.c:42".len());
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let definitions = super::json::parse_dictionary(source)?;
        Ok(Self::from_definitions(definitions))
    }

    /// Load and parse a dictionary file
    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading dictionary: {:?}", path);

        let source = std::fs::read_to_string(path)?;
        let dictionary = Self::parse(&source)?;

        log::info!(
            "Dictionary loaded: {} messages ({} duplicates discarded) from {:?}",
            dictionary.len(),
            dictionary.duplicates_discarded,
            path
        );
        Ok(dictionary)
    }

    /// Build a dictionary from definitions, keeping the first definition of each ID
    pub fn from_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = MessageDefinition>,
    {
        let mut dictionary = Self::new();
        for definition in definitions {
            dictionary.insert(definition);
        }
        dictionary
    }

    /// Insert a definition unless its ID is already present; returns true if inserted
    fn insert(&mut self, definition: MessageDefinition) -> bool {
        if self.messages.contains_key(&definition.id) {
            log::warn!("Duplicate message id {} ignored, keeping first definition", definition.id);
            self.duplicates_discarded += 1;
            return false;
        }

        self.max_location_len = self.max_location_len.max(definition.location_width());
        self.messages.insert(definition.id, definition);
        true
    }

    /// Find the definition for a message ID
    pub fn lookup(&self, id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&id)
    }

    /// Widest `file:line` string, for column alignment
    pub fn max_location_len(&self) -> usize {
        self.max_location_len
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All message IDs, sorted
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get dictionary statistics
    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            num_messages: self.messages.len(),
            duplicates_discarded: self.duplicates_discarded,
            max_location_len: self.max_location_len,
        }
    }
}

impl FromStr for Dictionary {
    type Err = DecoderError;

    fn from_str(source: &str) -> Result<Self> {
        Self::parse(source)
    }
}

/// Dictionary statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryStats {
    /// Number of distinct message IDs
    pub num_messages: usize,
    /// Definitions dropped because their ID was already present
    pub duplicates_discarded: usize,
    /// Widest `file:line` string
    pub max_location_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: u32, format: &str, file: &str, line: u32) -> MessageDefinition {
        MessageDefinition::new(id, format, "", file, line)
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = Dictionary::new();
        assert!(dict.is_empty());
        assert_eq!(dict.max_location_len(), 0);
        assert!(dict.lookup(0).is_none());
    }

    #[test]
    fn test_first_definition_wins() {
        let dict = Dictionary::from_definitions(vec![
            definition(7, "first", "a.c", 1),
            definition(7, "second", "much_longer_file_name.c", 1000),
            definition(8, "other", "b.c", 2),
        ]);

        assert_eq!(dict.len(), 2);
        let msg = dict.lookup(7).unwrap();
        assert_eq!(msg.format, "first");
        assert_eq!(msg.source_file, "a.c");
        assert_eq!(dict.stats().duplicates_discarded, 1);

        // The discarded duplicate must not widen the location column
        assert_eq!(dict.max_location_len(), "a.c:1".len());
    }

    #[test]
    fn test_max_location_len_tracks_widest() {
        let dict = Dictionary::from_definitions(vec![
            definition(1, "", "main.c", 9),
            definition(2, "", "drivers/gpio.c", 1234),
            definition(3, "", "x.c", 5),
        ]);
        assert_eq!(dict.max_location_len(), "drivers/gpio.c:1234".len());
    }

    #[test]
    fn test_location_counts_chars() {
        let def = definition(1, "", "réseau.c", 10);
        assert_eq!(def.location(), "réseau.c:10");
        assert_eq!(def.location_width(), 11);
    }

    #[test]
    fn test_ids_sorted() {
        let dict = Dictionary::from_definitions(vec![
            definition(30, "", "", 0),
            definition(10, "", "", 0),
            definition(20, "", "", 0),
        ]);
        assert_eq!(dict.ids(), vec![10, 20, 30]);
    }
}
