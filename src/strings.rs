//! Adaptive PDF string encoding.
//!
//! PDF strings carry text either in the single-byte PDFDocEncoding or in
//! UTF-16BE prefixed with a byte-order mark. The `auto` mode tries the
//! single-byte encoding first and falls back to UTF-16BE whenever any
//! character is unrepresentable; downstream viewers depend on this exact
//! fallback, so it is reproduced without modification.

use crate::document::Document;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Escape the encoded bytes inside literal-string parentheses.
pub const ESCAPE: u8 = 1;
/// Keep literal newlines instead of the `\012` octal escape.
pub const LITERAL_NEWLINES: u8 = 2;
/// Un-escape parenthesis pairs when the string is balanced.
pub const UNESCAPE_BALANCED: u8 = 4;

/// Encoding hint for a PDF string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// PDFDocEncoding when representable, else UTF-16BE with BOM
    #[default]
    Auto,
    /// Bytes emitted exactly as supplied
    Raw,
    /// Always UTF-16BE with BOM
    Utf16Be,
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Text(String),
    Bytes(Vec<u8>),
}

/// A PDF string object: text or raw bytes plus encoding and escape flags.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfString {
    source: Source,
    /// Escape-mode flags (`ESCAPE`, `LITERAL_NEWLINES`, `UNESCAPE_BALANCED`)
    pub escape: u8,
    /// Encoding hint
    pub encoding: Encoding,
}

impl PdfString {
    /// Text string with automatic encoding selection.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            source: Source::Text(text.into()),
            escape: ESCAPE,
            encoding: Encoding::Auto,
        }
    }

    /// Byte string; a UTF-16 byte-order mark is sniffed at format time,
    /// otherwise the bytes are taken as UTF-8 text.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            source: Source::Bytes(bytes),
            escape: ESCAPE,
            encoding: Encoding::Auto,
        }
    }

    /// Byte string emitted exactly as supplied (still escaped).
    pub fn raw(bytes: Vec<u8>) -> Self {
        Self {
            source: Source::Bytes(bytes),
            escape: ESCAPE,
            encoding: Encoding::Raw,
        }
    }

    /// Override the escape-mode flags.
    pub fn with_escape(mut self, flags: u8) -> Self {
        self.escape = flags;
        self
    }

    /// Override the encoding hint.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Choose the byte encoding for this string, without escaping.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match (&self.source, self.encoding) {
            (Source::Bytes(b), Encoding::Raw) => Ok(b.clone()),
            (Source::Text(t), Encoding::Raw) => Ok(t.as_bytes().to_vec()),
            (Source::Text(t), Encoding::Utf16Be) => Ok(utf16_be_with_bom(t)),
            (Source::Text(t), Encoding::Auto) => Ok(auto_encode(t)),
            (Source::Bytes(b), hint) => {
                let text = sniff_decode(b)?;
                match hint {
                    Encoding::Utf16Be => Ok(utf16_be_with_bom(&text)),
                    _ => Ok(auto_encode(&text)),
                }
            },
        }
    }

    /// Format as a literal string, applying encryption and escaping.
    ///
    /// Encryption, if active, is applied to the encoded bytes before
    /// escaping and forces escaping on regardless of the caller's flags.
    pub fn format(&self, document: &Document) -> Result<Vec<u8>> {
        let mut bytes = self.encode()?;
        let mut escape = self.escape;
        if document.encryption_active() {
            bytes = document.encrypt_bytes(&bytes);
            escape |= ESCAPE;
        }
        if escape & ESCAPE != 0 {
            let balanced = is_balanced(&bytes);
            let mut out = Vec::with_capacity(bytes.len() + 2);
            out.push(b'(');
            out.extend(escape_literal(&bytes));
            out.push(b')');
            if escape & LITERAL_NEWLINES != 0 {
                out = replace(&out, b"\\012", b"\n");
            }
            if escape & UNESCAPE_BALANCED != 0 && balanced {
                out = replace(&out, b"\\(", b"(");
                out = replace(&out, b"\\)", b")");
            }
            Ok(out)
        } else {
            let mut out = Vec::with_capacity(bytes.len() + 2);
            out.push(b'(');
            out.extend_from_slice(&bytes);
            out.push(b')');
            Ok(out)
        }
    }
}

/// Encode text in PDFDocEncoding; `None` if any character is unrepresentable.
pub fn encode_pdfdoc(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        out.push(*PDFDOC_FROM_UNICODE.get(&c)?);
    }
    Some(out)
}

/// Decode PDFDocEncoding bytes; `None` on an undefined code point.
pub fn decode_pdfdoc(bytes: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        let u = PDFDOC_TO_UNICODE[b as usize];
        if u == UNDEFINED {
            return None;
        }
        out.push(char::from_u32(u as u32)?);
    }
    Some(out)
}

fn auto_encode(text: &str) -> Vec<u8> {
    match encode_pdfdoc(text) {
        Some(bytes) => bytes,
        None => utf16_be_with_bom(text),
    }
}

fn utf16_be_with_bom(text: &str) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Sniff a UTF-16 byte-order mark; without one the bytes are taken as UTF-8.
fn sniff_decode(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        decode_utf16(&bytes[2..], u16::from_be_bytes)
    } else if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        decode_utf16(&bytes[2..], u16::from_le_bytes)
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::Unsupported("string bytes are not valid UTF-8".to_string()))
    }
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Unsupported("odd-length UTF-16 string".to_string()));
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| combine([c[0], c[1]])).collect();
    String::from_utf16(&units)
        .map_err(|_| Error::Unsupported("string bytes are not valid UTF-16".to_string()))
}

/// Backslash-escape control characters and parentheses.
fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\n' => out.extend_from_slice(b"\\012"),
            b'\r' => out.extend_from_slice(b"\\015"),
            b'\t' => out.extend_from_slice(b"\\011"),
            0x00..=0x1F => {
                out.push(b'\\');
                out.extend_from_slice(format!("{:03o}", b).as_bytes());
            },
            _ => out.push(b),
        }
    }
    out
}

/// Test whether parentheses in the bytes are balanced.
fn is_balanced(bytes: &[u8]) -> bool {
    let mut depth: i32 = 0;
    for &b in bytes {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            _ => {},
        }
    }
    depth == 0
}

fn replace(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

const UNDEFINED: u16 = 0xFFFF;

/// PDFDocEncoding, PDF Reference Appendix D. Undefined positions are
/// marked with the `UNDEFINED` sentinel.
#[rustfmt::skip]
const PDFDOC_TO_UNICODE: [u16; 256] = [
    // 0x00..0x17: control characters, identity
    0x0000, 0x0001, 0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007,
    0x0008, 0x0009, 0x000A, 0x000B, 0x000C, 0x000D, 0x000E, 0x000F,
    0x0010, 0x0011, 0x0012, 0x0013, 0x0014, 0x0015, 0x0016, 0x0017,
    // 0x18..0x1F: breve caron circumflex dotaccent hungarumlaut ogonek ring tilde
    0x02D8, 0x02C7, 0x02C6, 0x02D9, 0x02DD, 0x02DB, 0x02DA, 0x02DC,
    // 0x20..0x7E: ASCII
    0x0020, 0x0021, 0x0022, 0x0023, 0x0024, 0x0025, 0x0026, 0x0027,
    0x0028, 0x0029, 0x002A, 0x002B, 0x002C, 0x002D, 0x002E, 0x002F,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037,
    0x0038, 0x0039, 0x003A, 0x003B, 0x003C, 0x003D, 0x003E, 0x003F,
    0x0040, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047,
    0x0048, 0x0049, 0x004A, 0x004B, 0x004C, 0x004D, 0x004E, 0x004F,
    0x0050, 0x0051, 0x0052, 0x0053, 0x0054, 0x0055, 0x0056, 0x0057,
    0x0058, 0x0059, 0x005A, 0x005B, 0x005C, 0x005D, 0x005E, 0x005F,
    0x0060, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067,
    0x0068, 0x0069, 0x006A, 0x006B, 0x006C, 0x006D, 0x006E, 0x006F,
    0x0070, 0x0071, 0x0072, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077,
    0x0078, 0x0079, 0x007A, 0x007B, 0x007C, 0x007D, 0x007E, UNDEFINED,
    // 0x80..0x9E: punctuation, ligatures, accented capitals
    0x2022, 0x2020, 0x2021, 0x2026, 0x2014, 0x2013, 0x0192, 0x2044,
    0x2039, 0x203A, 0x2212, 0x2030, 0x201E, 0x201C, 0x201D, 0x2018,
    0x2019, 0x201A, 0x2122, 0xFB01, 0xFB02, 0x0141, 0x0152, 0x0160,
    0x0178, 0x017D, 0x0131, 0x0142, 0x0153, 0x0161, 0x017E, UNDEFINED,
    // 0xA0: Euro; 0xA1..0xFF: Latin-1 except 0xAD
    0x20AC, 0x00A1, 0x00A2, 0x00A3, 0x00A4, 0x00A5, 0x00A6, 0x00A7,
    0x00A8, 0x00A9, 0x00AA, 0x00AB, 0x00AC, UNDEFINED, 0x00AE, 0x00AF,
    0x00B0, 0x00B1, 0x00B2, 0x00B3, 0x00B4, 0x00B5, 0x00B6, 0x00B7,
    0x00B8, 0x00B9, 0x00BA, 0x00BB, 0x00BC, 0x00BD, 0x00BE, 0x00BF,
    0x00C0, 0x00C1, 0x00C2, 0x00C3, 0x00C4, 0x00C5, 0x00C6, 0x00C7,
    0x00C8, 0x00C9, 0x00CA, 0x00CB, 0x00CC, 0x00CD, 0x00CE, 0x00CF,
    0x00D0, 0x00D1, 0x00D2, 0x00D3, 0x00D4, 0x00D5, 0x00D6, 0x00D7,
    0x00D8, 0x00D9, 0x00DA, 0x00DB, 0x00DC, 0x00DD, 0x00DE, 0x00DF,
    0x00E0, 0x00E1, 0x00E2, 0x00E3, 0x00E4, 0x00E5, 0x00E6, 0x00E7,
    0x00E8, 0x00E9, 0x00EA, 0x00EB, 0x00EC, 0x00ED, 0x00EE, 0x00EF,
    0x00F0, 0x00F1, 0x00F2, 0x00F3, 0x00F4, 0x00F5, 0x00F6, 0x00F7,
    0x00F8, 0x00F9, 0x00FA, 0x00FB, 0x00FC, 0x00FD, 0x00FE, 0x00FF,
];

lazy_static::lazy_static! {
    static ref PDFDOC_FROM_UNICODE: HashMap<char, u8> = {
        let mut map = HashMap::with_capacity(256);
        for (byte, &unicode) in PDFDOC_TO_UNICODE.iter().enumerate() {
            if unicode != UNDEFINED {
                if let Some(c) = char::from_u32(unicode as u32) {
                    map.insert(c, byte as u8);
                }
            }
        }
        map
    };
}
