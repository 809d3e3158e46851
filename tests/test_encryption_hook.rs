//! Behavior of the engine with a transforming encryption hook installed.
//!
//! The hook used here is a toy byte cipher with optional padding; it
//! exists to observe the engine's contract, not to protect anything.

use std::cell::RefCell;
use std::rc::Rc;

use pdfscribe::object::Dictionary;
use pdfscribe::{Document, DocumentConfig, EncryptionHook, Object, Page, PdfString};

#[derive(Debug)]
struct XorCipher {
    key: u8,
    pad: usize,
    registered: Rc<RefCell<Vec<(u32, u16)>>>,
}

impl XorCipher {
    fn new(key: u8, pad: usize) -> (Self, Rc<RefCell<Vec<(u32, u16)>>>) {
        let registered = Rc::new(RefCell::new(Vec::new()));
        let cipher = Self {
            key,
            pad,
            registered: Rc::clone(&registered),
        };
        (cipher, registered)
    }
}

impl EncryptionHook for XorCipher {
    fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut out: Vec<u8> = data.iter().map(|b| b ^ self.key).collect();
        out.extend(std::iter::repeat(b'#').take(self.pad));
        out
    }

    fn register(&mut self, object_number: u32, generation: u16) {
        self.registered.borrow_mut().push((object_number, generation));
    }

    fn info(&self) -> Option<Dictionary> {
        let mut dict = Dictionary::new();
        dict.insert("Filter", Object::Name("Standard".to_string()));
        dict.insert("V", 1i64);
        Some(dict)
    }
}

#[test]
fn test_active_hook_forces_string_escaping() {
    let mut doc = Document::new(DocumentConfig::default().with_invariant(true));
    // 'W' ^ 0x7F == '(' -- without forced escaping the literal string
    // would come out unbalanced
    let (cipher, _) = XorCipher::new(0x7F, 0);
    doc.set_encryption(Box::new(cipher));
    let s = PdfString::new("W").with_escape(0);
    assert_eq!(s.format(&doc).unwrap(), b"(\\()".to_vec());
}

#[test]
fn test_inactive_hook_leaves_strings_alone() {
    let doc = Document::new(DocumentConfig::default().with_invariant(true));
    let s = PdfString::new("W").with_escape(0);
    assert_eq!(s.format(&doc).unwrap(), b"(W)".to_vec());
}

#[test]
fn test_stream_length_counts_encrypted_payload() {
    let mut doc = Document::new(DocumentConfig::default().with_invariant(true));
    let (cipher, _) = XorCipher::new(0, 3);
    doc.set_encryption(Box::new(cipher));
    doc.add_page(Page::new(&b"BT ET"[..])).expect("add page");
    let bytes = doc.save_to_bytes().expect("save");
    let text = String::from_utf8_lossy(&bytes);
    // 5 content bytes plus 3 bytes of cipher padding
    assert!(text.contains("/Length 8"));
    assert!(text.contains("stream\nBT ET###\nendstream"));
}

#[test]
fn test_hook_sees_every_object_number_in_pass_order() {
    let mut doc = Document::new(DocumentConfig::default().with_invariant(true));
    let (cipher, registered) = XorCipher::new(0, 0);
    doc.set_encryption(Box::new(cipher));
    doc.add_page(Page::new(&b"BT ET"[..])).expect("add page");
    let bytes = doc.save_to_bytes().expect("save");
    assert!(!bytes.is_empty());

    let expected: Vec<(u32, u16)> = (1..=doc.object_count() as u32).map(|n| (n, 0)).collect();
    assert_eq!(*registered.borrow(), expected);
}

#[test]
fn test_trailer_points_at_encrypt_dictionary() {
    let mut doc = Document::new(DocumentConfig::default().with_invariant(true));
    let (cipher, _) = XorCipher::new(0, 0);
    doc.set_encryption(Box::new(cipher));
    doc.add_page(Page::new(&b"BT ET"[..])).expect("add page");
    let bytes = doc.save_to_bytes().expect("save");
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Filter /Standard"));
    let trailer = &text[text.rfind("trailer").expect("trailer")..];
    assert!(trailer.contains("/Encrypt "));
    assert!(trailer.contains(" R"));
}
