//! JSON Lines encoding
//!
//! Events go through `serde_json` with [`TraceFormatter`], which pins the
//! string escaping used by the trace format: `\\`, `\"`, `\n`, `\r` and `\t`
//! are written by name, every other byte below 0x20 as `\u00XX` in lowercase
//! hex, everything else unchanged. Output is compact, so one value is always
//! one line.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::ser::{CharEscape, Formatter};
use std::io;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Compact formatter with the trace escaping rules
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceFormatter;

impl TraceFormatter {
    fn write_control<W>(writer: &mut W, byte: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let buf = [
            b'\\',
            b'u',
            b'0',
            b'0',
            HEX_DIGITS[(byte >> 4) as usize],
            HEX_DIGITS[(byte & 0xf) as usize],
        ];
        writer.write_all(&buf)
    }
}

impl Formatter for TraceFormatter {
    fn write_char_escape<W>(&mut self, writer: &mut W, char_escape: CharEscape) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let named: &[u8] = match char_escape {
            CharEscape::Quote => b"\\\"",
            CharEscape::ReverseSolidus => b"\\\\",
            CharEscape::Solidus => b"/",
            CharEscape::LineFeed => b"\\n",
            CharEscape::CarriageReturn => b"\\r",
            CharEscape::Tab => b"\\t",
            CharEscape::Backspace => return Self::write_control(writer, 0x08),
            CharEscape::FormFeed => return Self::write_control(writer, 0x0c),
            CharEscape::AsciiControl(byte) => return Self::write_control(writer, byte),
        };
        writer.write_all(named)
    }
}

/// Serializes `value` into a single trace line (no trailing newline)
pub fn to_line<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, TraceFormatter);
    value
        .serialize(&mut ser)
        .map_err(|e| Error::serialize(&e))?;
    String::from_utf8(buf).map_err(|e| Error::Serialize {
        message: e.to_string(),
    })
}

/// Escapes free text for embedding between JSON double quotes
pub fn escape_json(text: &str) -> String {
    let mut quoted = Vec::with_capacity(text.len() + 8);
    let mut ser = serde_json::Serializer::with_formatter(&mut quoted, TraceFormatter);
    if text.serialize(&mut ser).is_err() {
        // Writing into a Vec cannot fail; keep the input rather than panic
        return text.to_string();
    }
    let inner = &quoted[1..quoted.len() - 1];
    String::from_utf8_lossy(inner).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_escapes() {
        assert_eq!(escape_json(r#"a\b"c"#), r#"a\\b\"c"#);
        assert_eq!(escape_json("l1\nl2\r\tend"), r"l1\nl2\r\tend");
    }

    #[test]
    fn test_control_bytes_use_lowercase_unicode_escapes() {
        assert_eq!(escape_json("\u{08}"), r"\u0008");
        assert_eq!(escape_json("\u{0c}"), r"\u000c");
        assert_eq!(escape_json("\u{01}\u{1f}"), r"\u0001\u001f");
        assert_eq!(escape_json("\u{1b}[0m"), r"\u001b[0m");
    }

    #[test]
    fn test_other_bytes_pass_through() {
        assert_eq!(escape_json("/usr/x.c"), "/usr/x.c");
        assert_eq!(escape_json("\u{7f}"), "\u{7f}");
        assert_eq!(escape_json("café"), "café");
    }

    #[test]
    fn test_line_has_no_raw_newline() {
        let line = to_line(&serde_json::json!({"file": "a\nb", "n": 1})).unwrap();
        assert!(!line.contains('\n'));
        let back: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(back["file"], "a\nb");
    }
}
