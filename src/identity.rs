//! Document identity digest.
//!
//! A rolling MD5 over a fixed salt, the creation timestamp, and the Info
//! metadata, rendered twice in the trailer's `/ID` array. The digest is
//! memoized on first render; later updates are ignored.

use md5::{Digest, Md5};

use crate::object::{Array, Object};
use crate::strings::PdfString;

const SALT: &[u8] = b"document identity seed";

/// Rolling digest fed during document assembly.
#[derive(Debug, Clone)]
pub struct IdentityDigest {
    hasher: Md5,
    digest: Option<[u8; 16]>,
}

impl IdentityDigest {
    /// Seed the digest with the salt and a creation timestamp.
    pub fn new(timestamp: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(SALT);
        hasher.update(timestamp.as_bytes());
        Self {
            hasher,
            digest: None,
        }
    }

    /// Feed more identifying bytes. No effect once the digest has been
    /// rendered.
    pub fn add(&mut self, data: &[u8]) {
        if self.digest.is_none() {
            self.hasher.update(data);
        }
    }

    /// Finalize (memoized) and return the 16 digest bytes.
    pub fn digest(&mut self) -> [u8; 16] {
        if let Some(d) = self.digest {
            return d;
        }
        let d: [u8; 16] = self.hasher.clone().finalize().into();
        self.digest = Some(d);
        d
    }

    /// The `/ID` value: an array holding the same escaped digest string
    /// twice.
    pub fn to_object(&mut self) -> Object {
        let digest = self.digest();
        let mut array = Array::new();
        array.push(Object::String(PdfString::raw(digest.to_vec())));
        array.push(Object::String(PdfString::raw(digest.to_vec())));
        Object::Array(array)
    }
}
