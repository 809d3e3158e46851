//! Append-only output buffer with offset tracking.
//!
//! Cross-reference entries need the byte offset of every indirect object,
//! so all file content funnels through this accumulator and each append
//! reports the offset it landed at.

/// Marker comment bytes above 0x80, telling transfer agents the file is
/// binary.
const BINARY_MARKER: &[u8] = b"%\x93\x8c\x8b\x9e pdfscribe generated file\n";

/// Accumulates the serialized file and tracks the running offset.
#[derive(Debug, Default)]
pub struct Accumulator {
    buffer: Vec<u8>,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current byte offset, i.e. where the next append will land.
    pub fn offset(&self) -> u64 {
        self.buffer.len() as u64
    }

    /// Append bytes, returning the offset they were written at.
    pub fn add(&mut self, data: &[u8]) -> u64 {
        let at = self.offset();
        self.buffer.extend_from_slice(data);
        at
    }

    /// Write the file header: version line plus binary marker comment.
    pub fn write_header(&mut self, major: u8, minor: u8) {
        self.add(format!("%PDF-{}.{}\n", major, minor).as_bytes());
        self.add(BINARY_MARKER);
    }

    /// Consume the accumulator and return the file bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// View the bytes accumulated so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}
