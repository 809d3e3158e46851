//! Pluggable encryption hook.
//!
//! The engine never implements an encryption algorithm itself; it only
//! threads strings and stream payloads through the hook and records the
//! object numbers the hook needs for key derivation.

use crate::object::Dictionary;

/// Contract an encryption implementation must satisfy.
pub trait EncryptionHook: std::fmt::Debug {
    /// Called once before the serialization pass begins.
    fn prepare(&mut self) {}

    /// Transform encoded string or stream bytes.
    fn encode(&self, data: &[u8]) -> Vec<u8>;

    /// Record the indirect object about to be formatted.
    fn register(&mut self, object_number: u32, generation: u16);

    /// The Encrypt dictionary to register and point at from the trailer,
    /// if any.
    fn info(&self) -> Option<Dictionary>;

    /// Whether the hook actually transforms bytes. When true, string
    /// escaping is forced on.
    fn active(&self) -> bool {
        true
    }
}

/// Default no-op hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEncryption;

impl EncryptionHook for NoEncryption {
    fn encode(&self, data: &[u8]) -> Vec<u8> {
        data.to_vec()
    }

    fn register(&mut self, _object_number: u32, _generation: u16) {}

    fn info(&self) -> Option<Dictionary> {
        None
    }

    fn active(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_encryption_is_identity() {
        let hook = NoEncryption;
        assert_eq!(hook.encode(b"payload"), b"payload");
        assert!(!hook.active());
        assert!(hook.info().is_none());
    }
}
