//! Stream filters: named, reversible byte transforms applied to stream
//! payloads and declared in the stream dictionary's `Filter` entry.

use crate::error::{Error, Result};
use std::io::{Read, Write};

/// A reversible stream transform.
pub trait StreamFilter {
    /// PDF name of the decode filter a reader must apply (e.g. `FlateDecode`).
    fn name(&self) -> &'static str;
    /// Forward transform applied at write time.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;
    /// Inverse transform.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Deflate (zlib) compression, `/FlateDecode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlateFilter;

impl StreamFilter for FlateFilter {
    fn name(&self) -> &'static str {
        "FlateDecode"
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| Error::Filter(format!("zlib inflate failed: {}", e)))?;
        Ok(out)
    }
}

/// ASCII-85 text armoring with line wrapping, `/ASCII85Decode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ascii85Filter;

/// Column width for wrapping armored output.
const WRAP_COLUMNS: usize = 78;

impl StreamFilter for Ascii85Filter {
    fn name(&self) -> &'static str {
        "ASCII85Decode"
    }

    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(wrap_lines(&ascii85_encode(data), WRAP_COLUMNS))
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        ascii85_decode(data)
    }
}

fn ascii85_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 5 / 4 + 2);
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(word);
        let mut digits = [0u8; 5];
        for d in digits.iter_mut().rev() {
            *d = (value % 85) as u8 + b'!';
            value /= 85;
        }
        // partial final group: emit one more digit than input bytes
        let keep = if chunk.len() == 4 { 5 } else { chunk.len() + 1 };
        out.extend_from_slice(&digits[..keep]);
    }
    out.extend_from_slice(b"~>");
    out
}

fn ascii85_decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    // drop whitespace, expand the zero-group shorthand
    let mut digits = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x00' => continue,
            b'z' if digits.len() % 5 == 0 => digits.extend_from_slice(b"!!!!!"),
            b'!'..=b'u' => digits.push(byte),
            _ => return Err(Error::Filter(format!("invalid ASCII-85 byte 0x{:02x}", byte))),
        }
    }

    let mut out = Vec::with_capacity(digits.len() * 4 / 5);
    for chunk in digits.chunks(5) {
        if chunk.len() == 1 {
            return Err(Error::Filter("truncated ASCII-85 group".to_string()));
        }
        let mut padded = [b'u'; 5];
        padded[..chunk.len()].copy_from_slice(chunk);
        let mut value: u32 = 0;
        for &byte in &padded {
            value = value
                .checked_mul(85)
                .and_then(|v| v.checked_add((byte - b'!') as u32))
                .ok_or_else(|| Error::Filter("ASCII-85 group overflow".to_string()))?;
        }
        let bytes = value.to_be_bytes();
        let keep = if chunk.len() == 5 { 4 } else { chunk.len() - 1 };
        out.extend_from_slice(&bytes[..keep]);
    }
    Ok(out)
}

fn wrap_lines(data: &[u8], columns: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / columns + 1);
    for (i, chunk) in data.chunks(columns).enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(chunk);
    }
    out
}

/// Storable filter selector for stream pipelines.
///
/// Streams and document configuration hold these instead of trait objects
/// so that objects stay cheaply cloneable and comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Deflate compression
    Flate,
    /// ASCII-85 armoring
    Ascii85,
}

impl Filter {
    /// Resolve to the filter implementation.
    pub fn as_filter(&self) -> &'static dyn StreamFilter {
        match self {
            Filter::Flate => &FlateFilter,
            Filter::Ascii85 => &Ascii85Filter,
        }
    }

    /// PDF name of the decode filter.
    pub fn name(&self) -> &'static str {
        self.as_filter().name()
    }
}
