//! Dictionary source reader
//!
//! A small recursive-descent reader for the JSON dictionary emitted by the firmware
//! build:
//!
//! ```json
//! {
//!     "version": 1,
//!     "messages": {
//!         "1048476": { "fmt": "GPIO port {d} pin {d} initialized", "args": "u8u8",
//!                      "file": "gpio.c", "line": 57 }
//!     }
//! }
//! ```
//!
//! Only the `"messages"` section is interpreted; every other top-level key is
//! skipped. String escapes are not decoded: a backslash and the byte after it are
//! passed through verbatim. Definitions are returned in source order so the
//! dictionary can apply its first-wins rule.

use super::database::MessageDefinition;
use crate::types::{DecoderError, Result};

const MESSAGES_SECTION: &str = "messages";

/// Nesting limit for skipped values
const MAX_DEPTH: usize = 64;

/// Parse dictionary source text into message definitions, in source order
pub fn parse_dictionary(source: &str) -> Result<Vec<MessageDefinition>> {
    let mut reader = Reader::new(source);
    let definitions = reader.document()?;

    log::debug!("Read {} message definitions from dictionary source", definitions.len());
    Ok(definitions)
}

struct Reader<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        let mut reader = Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        };
        if src.starts_with('\u{feff}') {
            reader.pos = '\u{feff}'.len_utf8();
        }
        reader
    }

    /// `{ ... "messages": { ... } ... }` followed by nothing but whitespace
    fn document(&mut self) -> Result<Vec<MessageDefinition>> {
        let mut messages: Option<Vec<MessageDefinition>> = None;

        self.object(|reader, key, _| {
            if key != MESSAGES_SECTION {
                return reader.skip_value(0);
            }
            if messages.is_some() {
                log::warn!("Repeated \"{}\" section ignored", MESSAGES_SECTION);
                return reader.skip_value(0);
            }
            messages = Some(reader.messages()?);
            Ok(())
        })?;

        self.skip_ws();
        if self.pos < self.bytes.len() {
            return Err(self.unexpected("end of input"));
        }

        messages.ok_or_else(|| DecoderError::MissingSection(MESSAGES_SECTION.to_string()))
    }

    /// `{ "<id>": { entry }, ... }`
    fn messages(&mut self) -> Result<Vec<MessageDefinition>> {
        let mut definitions = Vec::new();

        self.object(|reader, key, key_start| {
            let id = reader.parse_id(key, key_start)?;
            definitions.push(reader.entry(id)?);
            Ok(())
        })?;

        Ok(definitions)
    }

    /// `{ "fmt": "...", "args": "...", "file": "...", "line": 12 }`
    fn entry(&mut self, id: u32) -> Result<MessageDefinition> {
        self.skip_ws();
        let start = self.pos;

        let mut format = None;
        let mut arg_spec = "";
        let mut source_file = "";
        let mut source_line = 0;

        self.object(|reader, key, _| {
            match key {
                "fmt" => format = Some(reader.string()?),
                "args" => arg_spec = reader.string()?,
                "file" => source_file = reader.string()?,
                "line" => source_line = reader.unsigned()?,
                _ => reader.skip_value(0)?,
            }
            Ok(())
        })?;

        let format = format.ok_or_else(|| {
            self.error_at(start, format!("entry for message id {} has no \"fmt\" field", id))
        })?;

        Ok(MessageDefinition::new(id, format, arg_spec, source_file, source_line))
    }

    /// Walk an object, handing each key and the offset of its opening quote to `member`
    /// with the reader positioned at the value
    fn object<F>(&mut self, mut member: F) -> Result<()>
    where
        F: FnMut(&mut Self, &'a str, usize) -> Result<()>,
    {
        self.expect(b'{')?;
        if self.eat(b'}') {
            return Ok(());
        }

        loop {
            self.skip_ws();
            let key_start = self.pos;
            let key = self.string()?;
            self.expect(b':')?;
            member(self, key, key_start)?;

            if self.eat(b',') {
                continue;
            }
            self.expect(b'}')?;
            return Ok(());
        }
    }

    /// Raw string contents between quotes; escapes are skipped, not decoded
    fn string(&mut self) -> Result<&'a str> {
        self.expect(b'"')?;
        let start = self.pos;

        loop {
            match self.bytes.get(self.pos) {
                None => return Err(self.error_at(start - 1, "unterminated string")),
                Some(b'"') => {
                    let value = &self.src[start..self.pos];
                    self.pos += 1;
                    return Ok(value);
                }
                Some(b'\\') => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Base-10 digits only, no sign, fraction or exponent
    fn unsigned(&mut self) -> Result<u32> {
        self.skip_ws();
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }

        if start == self.pos {
            return Err(self.unexpected("unsigned decimal number"));
        }
        self.src[start..self.pos]
            .parse()
            .map_err(|_| self.error_at(start, "number does not fit in 32 bits"))
    }

    /// Message IDs are decimal strings used as object keys
    fn parse_id(&self, key: &str, key_start: usize) -> Result<u32> {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error_at(key_start, format!("message id {:?} is not a decimal number", key)));
        }
        key.parse()
            .map_err(|_| self.error_at(key_start, format!("message id {} does not fit in 32 bits", key)))
    }

    fn skip_value(&mut self, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(self.error_at(self.pos, "values nested too deeply"));
        }

        self.skip_ws();
        match self.bytes.get(self.pos) {
            Some(b'"') => self.string().map(|_| ()),
            Some(b'{') => self.object(|reader, _, _| reader.skip_value(depth + 1)),
            Some(b'[') => self.skip_array(depth),
            Some(b'-' | b'0'..=b'9') => {
                while matches!(
                    self.bytes.get(self.pos),
                    Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
                ) {
                    self.pos += 1;
                }
                Ok(())
            }
            Some(b't') => self.literal("true"),
            Some(b'f') => self.literal("false"),
            Some(b'n') => self.literal("null"),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn skip_array(&mut self, depth: usize) -> Result<()> {
        self.expect(b'[')?;
        if self.eat(b']') {
            return Ok(());
        }

        loop {
            self.skip_value(depth + 1)?;
            if self.eat(b',') {
                continue;
            }
            self.expect(b']')?;
            return Ok(());
        }
    }

    fn literal(&mut self, word: &str) -> Result<()> {
        if self.bytes[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    /// Consume `byte` if it is the next token
    fn eat(&mut self, byte: u8) -> bool {
        self.skip_ws();
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", byte as char)))
        }
    }

    fn unexpected(&self, expected: &str) -> DecoderError {
        let found = match self.src.get(self.pos..).and_then(|rest| rest.chars().next()) {
            Some(c) => format!("{:?}", c),
            None if self.pos >= self.bytes.len() => "end of input".to_string(),
            None => format!("byte 0x{:02X}", self.bytes[self.pos]),
        };
        self.error_at(self.pos, format!("expected {}, found {}", expected, found))
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> DecoderError {
        let consumed = &self.bytes[..offset.min(self.bytes.len())];
        let line_start = consumed.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);

        DecoderError::DictionaryParse {
            line: consumed.iter().filter(|&&b| b == b'\n').count() + 1,
            column: consumed.len() - line_start + 1,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(source: &str) -> (usize, usize, String) {
        match parse_dictionary(source) {
            Err(DecoderError::DictionaryParse { line, column, reason }) => (line, column, reason),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_entries_in_order() {
        let defs = parse_dictionary(
            r#"{
                "messages": {
                    "1048476": {"fmt": "GPIO port {d} pin {d} initialized", "args": "u8u8", "file": "gpio.c", "line": 57},
                    "331898": {"line": 12, "file": "main.c", "args": "", "fmt": "System initialized"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].id, 1048476);
        assert_eq!(defs[0].arg_spec, "u8u8");
        assert_eq!(defs[0].source_line, 57);
        assert_eq!(defs[1].id, 331898);
        assert_eq!(defs[1].format, "System initialized");
        assert_eq!(defs[1].source_file, "main.c");
    }

    #[test]
    fn test_skips_other_sections_and_fields() {
        let defs = parse_dictionary(
            r#"{
                "version": 3,
                "build": {"hash": "abc", "flags": [1, -2.5e3, true, null, {"x": []}]},
                "messages": {
                    "5": {"fmt": "hi", "args": "", "file": "a.c", "line": 1, "extra": [false]}
                },
                "trailer": "done"
            }"#,
        )
        .unwrap();

        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].format, "hi");
    }

    #[test]
    fn test_escapes_are_kept_verbatim() {
        let defs = parse_dictionary(
            r#"{"messages": {"1": {"fmt": "say \"hi\"\\n", "args": "", "file": "c:\\src\\a.c", "line": 3}}}"#,
        )
        .unwrap();

        assert_eq!(defs[0].format, r#"say \"hi\"\\n"#);
        assert_eq!(defs[0].source_file, r"c:\\src\\a.c");
    }

    #[test]
    fn test_optional_fields_default() {
        let defs = parse_dictionary(r#"{"messages": {"9": {"fmt": "bare"}}}"#).unwrap();
        assert_eq!(defs[0].arg_spec, "");
        assert_eq!(defs[0].source_file, "");
        assert_eq!(defs[0].source_line, 0);
    }

    #[test]
    fn test_duplicates_are_all_returned() {
        let defs = parse_dictionary(
            r#"{"messages": {"1": {"fmt": "first"}, "1": {"fmt": "second"}}}"#,
        )
        .unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].format, "first");
    }

    #[test]
    fn test_empty_messages_section() {
        assert!(parse_dictionary(r#"{ "messages": {} }"#).unwrap().is_empty());
    }

    #[test]
    fn test_missing_section() {
        let result = parse_dictionary(r#"{"version": 1}"#);
        assert!(matches!(result, Err(DecoderError::MissingSection(s)) if s == "messages"));
    }

    #[test]
    fn test_missing_fmt() {
        let (_, _, reason) = parse_err(r#"{"messages": {"4": {"args": "u8"}}}"#);
        assert!(reason.contains("\"fmt\""));
    }

    #[test]
    fn test_rejects_non_decimal_id() {
        let (line, column, reason) = parse_err("{\n  \"messages\": {\n    \"0x10\": {\"fmt\": \"x\"}}}");
        assert_eq!(line, 3);
        assert_eq!(column, 5);
        assert!(reason.contains("0x10"));
    }

    #[test]
    fn test_id_error_points_at_key_with_spaced_colon() {
        let (line, column, reason) = parse_err(r#"{"messages"  :  {"abc"   :   {"fmt": "x"}}}"#);
        assert_eq!((line, column), (1, 18));
        assert!(reason.contains("abc"));

        let (_, column, reason) = parse_err(r#"{"messages": {"1": {"fmt": "a"}, "99999999999" : {"fmt": "b"}}}"#);
        assert_eq!(column, 34);
        assert!(reason.contains("32 bits"));
    }

    #[test]
    fn test_rejects_signed_or_fractional_line() {
        parse_err(r#"{"messages": {"1": {"fmt": "x", "line": -1}}}"#);
        parse_err(r#"{"messages": {"1": {"fmt": "x", "line": 1.5}}}"#);
        parse_err(r#"{"messages": {"1": {"fmt": "x", "line": "7"}}}"#);
    }

    #[test]
    fn test_reports_position_of_bad_token() {
        let (line, column, reason) = parse_err("{\n\"messages\" {}}");
        assert_eq!((line, column), (2, 12));
        assert!(reason.contains("expected ':'"));
    }

    #[test]
    fn test_rejects_truncated_and_trailing_input() {
        parse_err(r#"{"messages": {"1": {"fmt": "unterminated}}}"#);
        parse_err(r#"{"messages": {}"#);
        parse_err(r#"{"messages": {}} extra"#);
        parse_err("");
        parse_err("[]");
    }
}
