//! Message formatter
//!
//! Substitutes decoded arguments into `{d}`, `{x}` and `{X}` placeholders.

use crate::args::{parse_arg_spec, read_args, ArgumentValue};
use std::borrow::Cow;

/// Result of formatting one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage<'a> {
    /// Borrowed when the definition has no arguments, owned otherwise
    pub text: Cow<'a, str>,
    /// Placeholders left verbatim because the payload ran out of arguments
    pub unfilled: usize,
}

/// Placeholder rendering selected by the character inside the braces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Decimal,
    LowerHex,
    UpperHex,
}

impl Placeholder {
    fn parse(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'{', b'd', b'}', ..] => Some(Placeholder::Decimal),
            [b'{', b'x', b'}', ..] => Some(Placeholder::LowerHex),
            [b'{', b'X', b'}', ..] => Some(Placeholder::UpperHex),
            _ => None,
        }
    }

    fn render(self, value: &ArgumentValue, out: &mut String) {
        let text = match self {
            Placeholder::Decimal => format!("{}", value),
            Placeholder::LowerHex => format!("{:x}", value),
            Placeholder::UpperHex => format!("{:X}", value),
        };
        out.push_str(&text);
    }
}

/// Length of every recognised placeholder
const PLACEHOLDER_LEN: usize = 3;

/// Message formatter - rebuilds log text from a format string and argument bytes
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format `template` with arguments decoded from `data` according to `arg_spec`
    ///
    /// An empty `arg_spec` returns the template itself without allocating.
    pub fn format<'a>(template: &'a str, arg_spec: &str, data: &[u8]) -> FormattedMessage<'a> {
        if arg_spec.is_empty() {
            return FormattedMessage {
                text: Cow::Borrowed(template),
                unfilled: 0,
            };
        }

        let types = parse_arg_spec(arg_spec);
        let values = read_args(&types, data);
        Self::substitute(template, &values)
    }

    /// Replace placeholders in `template` with `values`, in order
    pub fn substitute<'a>(template: &str, values: &[ArgumentValue]) -> FormattedMessage<'a> {
        let bytes = template.as_bytes();
        let mut out = String::with_capacity(template.len() + values.len() * 4);
        let mut values = values.iter();
        let mut unfilled = 0;
        let mut literal_start = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            let Some(placeholder) = Placeholder::parse(&bytes[pos..]) else {
                pos += 1;
                continue;
            };

            // Placeholders are ASCII, so `pos` is always a char boundary here
            out.push_str(&template[literal_start..pos]);
            match values.next() {
                Some(value) => placeholder.render(value, &mut out),
                None => {
                    out.push_str(&template[pos..pos + PLACEHOLDER_LEN]);
                    unfilled += 1;
                }
            }
            pos += PLACEHOLDER_LEN;
            literal_start = pos;
        }
        out.push_str(&template[literal_start..]);

        FormattedMessage {
            text: Cow::Owned(out),
            unfilled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_borrows_template() {
        let template = "System initialized";
        let formatted = MessageFormatter::format(template, "", &[1, 2, 3]);
        assert!(matches!(formatted.text, Cow::Borrowed(t) if std::ptr::eq(t, template)));
        assert_eq!(formatted.unfilled, 0);
    }

    #[test]
    fn test_decimal_substitution() {
        let formatted = MessageFormatter::format("GPIO port {d} pin {d} initialized", "u8u8", &[2, 5]);
        assert_eq!(formatted.text, "GPIO port 2 pin 5 initialized");
        assert!(matches!(formatted.text, Cow::Owned(_)));
    }

    #[test]
    fn test_hex_substitution() {
        let data = [0xEF, 0xBE, 0xAD, 0xDE, 0xFF];
        let formatted = MessageFormatter::format("reg={x} REG={X} s={d}", "u32u8", &data);
        assert_eq!(formatted.text, "reg=deadbeef REG=FF s={d}");
        assert_eq!(formatted.unfilled, 1);

        let formatted = MessageFormatter::format("{X}/{d}", "u16i8", &[0xAB, 0x00, 0xFF]);
        assert_eq!(formatted.text, "AB/-1");
    }

    #[test]
    fn test_float_rendering() {
        let data = 2.5f32.to_le_bytes();
        let formatted = MessageFormatter::format("t={d}C raw={x}", "f32", &data);
        assert_eq!(formatted.text, "t=2.500000C raw={x}");

        let formatted = MessageFormatter::format("raw={x}", "f32", &data);
        assert_eq!(formatted.text, "raw=40200000");

        let nan = f32::from_bits(0x7FC0_0000).to_le_bytes();
        let formatted = MessageFormatter::format("v={d} bits={X}", "f32f32", &[nan, nan].concat());
        assert_eq!(formatted.text, "v=nan bits=7FC00000");
        assert_eq!(formatted.unfilled, 0);
    }

    #[test]
    fn test_truncated_payload_leaves_placeholders() {
        let formatted = MessageFormatter::format("a={d} b={d} c={x}", "u8u16u32", &[7, 1]);
        assert_eq!(formatted.text, "a=7 b={d} c={x}");
        assert_eq!(formatted.unfilled, 2);
    }

    #[test]
    fn test_unrecognised_braces_are_literal() {
        let formatted = MessageFormatter::format("{} {s} {d", "u8", &[9]);
        assert_eq!(formatted.text, "{} {s} {d");
        assert_eq!(formatted.unfilled, 0);
    }

    #[test]
    fn test_non_ascii_template() {
        let formatted = MessageFormatter::format("temp {d}°C → ok", "i8", &[0xF6]);
        assert_eq!(formatted.text, "temp -10°C → ok");
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let formatted = MessageFormatter::format("only {d}", "u8u8", &[1, 2]);
        assert_eq!(formatted.text, "only 1");
    }
}
