//! Typed values in GLib-style key files.
//!
//! The sections and `key=value` lines of the file are parsed and written by
//! the `rust-ini` crate.  This module adds the GLib value rules on top, so
//! files written here read back the same way through GLib's `GKeyFile`, which
//! the rest of the desktop session uses:
//!
//! ```text
//! [Shutdown]
//! CanPlay=true
//! SoundTheme=deepin
//! SoundEvent=\sleading space kept
//! ```
//!
//! # Why `rust-ini` runs with escapes turned off (for beginners)
//!
//! `rust-ini` and GLib disagree about backslashes: `rust-ini` reads `\s` as a
//! plain `s`, while GLib reads it as a space.  So `rust-ini` stores the raw
//! text (`enabled_escape: false` / `EscapePolicy::Nothing`) and this module
//! does the GLib decoding itself:
//!
//! | Escape   | Meaning                                   |
//! |----------|-------------------------------------------|
//! | `\s`     | space                                     |
//! | `\n`     | newline                                   |
//! | `\t`     | tab                                       |
//! | `\r`     | carriage return                           |
//! | `\\`     | backslash                                 |
//! | `\xHHHH` | any other character, by code point        |
//!
//! `rust-ini` trims whitespace from both ends of every value.  Whitespace at
//! either end of a string is therefore always written as an escape, and the
//! trim never sees it.  A space becomes `\s`.  Other whitespace, such as
//! U+3000 IDEOGRAPHIC SPACE, becomes `\xHHHH`, the same spelling `rust-ini`
//! uses for its own Unicode escapes.  Whitespace inside a string is written
//! as is.

use std::io;

use ini::{EscapePolicy, Ini, LineSeparator, ParseOption, WriteOption};
use thiserror::Error;

/// A key is present but its value cannot be decoded as the requested type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Booleans must be `true`, `false`, `1` or `0`.
    #[error("{0:?} is not a boolean")]
    NotBoolean(String),

    /// A string value contains a malformed `\` sequence.
    #[error("{value:?} contains an invalid escape sequence: {reason}")]
    InvalidEscape { value: String, reason: String },
}

/// Why a typed lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldError {
    /// The group or the key does not exist.
    Missing,
    Invalid(ValueError),
}

// ── Document ──────────────────────────────────────────────────────────────────

/// Parses key file text.  A leading UTF-8 byte order mark is ignored.
pub(crate) fn parse(text: &str) -> Result<Ini, ini::ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ini::load_from_str_opt(
        text,
        ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        },
    )
}

/// Serializes `ini` with `\n` line endings and values written verbatim.
pub(crate) fn to_data(ini: &Ini) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    ini.write_to_opt(
        &mut buf,
        WriteOption {
            escape_policy: EscapePolicy::Nothing,
            line_separator: LineSeparator::CR,
            ..WriteOption::default()
        },
    )?;
    Ok(buf)
}

// ── Typed accessors ───────────────────────────────────────────────────────────

fn raw<'a>(ini: &'a Ini, group: &str, key: &str) -> Result<&'a str, FieldError> {
    ini.section(Some(group))
        .and_then(|props| props.get(key))
        .ok_or(FieldError::Missing)
}

pub(crate) fn get_boolean(ini: &Ini, group: &str, key: &str) -> Result<bool, FieldError> {
    let value = raw(ini, group, key)?;
    parse_boolean(value).map_err(FieldError::Invalid)
}

pub(crate) fn get_string(ini: &Ini, group: &str, key: &str) -> Result<String, FieldError> {
    let value = raw(ini, group, key)?;
    unescape(value).map_err(FieldError::Invalid)
}

pub(crate) fn set_boolean(ini: &mut Ini, group: &str, key: &str, value: bool) {
    ini.with_section(Some(group))
        .set(key, if value { "true" } else { "false" });
}

pub(crate) fn set_string(ini: &mut Ini, group: &str, key: &str, value: &str) {
    ini.with_section(Some(group)).set(key, escape(value));
}

// ── Value encoding ────────────────────────────────────────────────────────────

fn parse_boolean(value: &str) -> Result<bool, ValueError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ValueError::NotBoolean(other.to_string())),
    }
}

fn escape(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut out = String::with_capacity(value.len());
    for (i, ch) in value.chars().enumerate() {
        let at_edge = i == 0 || i == last;
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ' ' if at_edge => out.push_str("\\s"),
            c if at_edge && c.is_whitespace() => {
                out.push_str(&format!("\\x{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}

fn unescape(value: &str) -> Result<String, ValueError> {
    let invalid = |reason: String| ValueError::InvalidEscape {
        value: value.to_string(),
        reason,
    };

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(format!("bad code point \\x{hex}")))?;
                out.push(decoded);
            }
            Some(other) => return Err(invalid(format!("unknown escape \\{other}"))),
            None => return Err(invalid("trailing backslash".to_string())),
        }
    }
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &str) -> String {
        let mut ini = Ini::new();
        set_string(&mut ini, "G", "K", value);
        let data = String::from_utf8(to_data(&ini).expect("serialize")).expect("utf-8");
        let reparsed = parse(&data).expect("reparse");
        get_string(&reparsed, "G", "K").expect("get")
    }

    // ── Document ──────────────────────────────────────────────────────────────

    #[test]
    fn test_to_data_writes_group_then_keys_in_order() {
        // Arrange
        let mut ini = Ini::new();
        set_boolean(&mut ini, "Shutdown", "CanPlay", true);
        set_string(&mut ini, "Shutdown", "SoundTheme", "deepin");
        set_string(&mut ini, "Shutdown", "SoundEvent", "shutdown");

        // Act
        let data = String::from_utf8(to_data(&ini).unwrap()).unwrap();

        // Assert
        let lines: Vec<&str> = data.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(
            lines,
            vec!["[Shutdown]", "CanPlay=true", "SoundTheme=deepin", "SoundEvent=shutdown"]
        );
        assert!(!data.contains('\r'), "line endings must be \\n");
    }

    #[test]
    fn test_parse_unterminated_group_header_fails() {
        assert!(parse("[Shutdown\nCanPlay=true\n").is_err());
    }

    #[test]
    fn test_parse_ignores_byte_order_mark() {
        let ini = parse("\u{feff}[Shutdown]\nCanPlay=false\n").expect("parse");
        assert_eq!(get_boolean(&ini, "Shutdown", "CanPlay"), Ok(false));
    }

    #[test]
    fn test_parse_keeps_backslashes_for_glib_decoding() {
        let ini = parse("[G]\nK=\\sa\\\\b\n").expect("parse");
        assert_eq!(get_string(&ini, "G", "K").as_deref(), Ok(" a\\b"));
    }

    // ── Typed accessors ───────────────────────────────────────────────────────

    #[test]
    fn test_get_boolean_accepts_glib_forms() {
        let ini = parse("[G]\nA=true\nB=false\nC=1\nD=0\n").expect("parse");

        assert_eq!(get_boolean(&ini, "G", "A"), Ok(true));
        assert_eq!(get_boolean(&ini, "G", "B"), Ok(false));
        assert_eq!(get_boolean(&ini, "G", "C"), Ok(true));
        assert_eq!(get_boolean(&ini, "G", "D"), Ok(false));
    }

    #[test]
    fn test_get_boolean_rejects_other_text() {
        let ini = parse("[G]\nA=notabool\nB=True\n").expect("parse");

        assert_eq!(
            get_boolean(&ini, "G", "A"),
            Err(FieldError::Invalid(ValueError::NotBoolean("notabool".to_string())))
        );
        assert!(matches!(get_boolean(&ini, "G", "B"), Err(FieldError::Invalid(_))));
    }

    #[test]
    fn test_missing_group_and_key_are_missing() {
        let ini = parse("[G]\nA=1\n").expect("parse");

        assert_eq!(get_string(&ini, "Other", "A"), Err(FieldError::Missing));
        assert_eq!(get_string(&ini, "G", "B"), Err(FieldError::Missing));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut ini = parse("[G]\nK=old\nOther=kept\n").expect("parse");

        set_string(&mut ini, "G", "K", "new");

        assert_eq!(get_string(&ini, "G", "K").as_deref(), Ok("new"));
        assert_eq!(get_string(&ini, "G", "Other").as_deref(), Ok("kept"));
    }

    // ── Value encoding ────────────────────────────────────────────────────────

    #[test]
    fn test_escape_edge_spaces_only() {
        assert_eq!(escape(" a b "), "\\sa b\\s");
        assert_eq!(escape("a\nb\tc\rd\\e"), "a\\nb\\tc\\rd\\\\e");
    }

    #[test]
    fn test_escape_non_ascii_edge_whitespace_by_code_point() {
        assert_eq!(escape("\u{3000}deepin\u{a0}"), "\\x3000deepin\\x00a0");
        assert_eq!(escape("a\u{3000}b"), "a\u{3000}b");
    }

    #[test]
    fn test_round_trip_keeps_leading_and_trailing_whitespace() {
        for value in [
            "\u{3000}deepin",
            "\u{a0}theme\u{2003}",
            "  two spaces  ",
            "\ttabbed",
            "",
            " ",
            "a = b ; # c",
            "\\s is literal",
        ] {
            assert_eq!(round_trip(value), value, "value {value:?}");
        }
    }

    #[test]
    fn test_unescape_rejects_malformed_sequences() {
        assert!(unescape("bad\\q").is_err());
        assert!(unescape("bad\\").is_err());
        assert!(unescape("\\x30").is_err());
        assert!(unescape("\\xzzzz").is_err());
        assert!(unescape("\\xd800").is_err());
    }

    #[test]
    fn test_unescape_decodes_code_points() {
        assert_eq!(unescape("\\x3000x").as_deref(), Ok("\u{3000}x"));
    }
}
