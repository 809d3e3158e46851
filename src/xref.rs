//! Cross-reference table and trailer builders.
//!
//! The table is emitted as a single subsection covering objects
//! `0..=max`, with the synthetic free entry for object 0 supplied here.
//! Entries are the classic fixed 20-byte form.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::Dictionary;

/// Collects (object number, byte offset) pairs during the serialization
/// pass and formats the `xref` section.
#[derive(Debug, Default)]
pub struct CrossReferenceTable {
    entries: Vec<(u32, u64)>,
}

impl CrossReferenceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the offset of an indirect object.
    pub fn add_entry(&mut self, number: u32, offset: u64) -> Result<()> {
        if number == 0 {
            return Err(Error::CrossReferenceCollision(
                "object number 0 is reserved for the free-list head".to_string(),
            ));
        }
        if self.entries.iter().any(|&(n, _)| n == number) {
            return Err(Error::CrossReferenceCollision(format!(
                "object number {} recorded twice",
                number
            )));
        }
        self.entries.push((number, offset));
        Ok(())
    }

    /// Number of in-use entries recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format the full `xref` section.
    ///
    /// The recorded numbers must form the contiguous range `1..=N`; a gap
    /// means the registry and the pass disagree and the file would be
    /// unreadable.
    pub fn format(&self) -> Result<Vec<u8>> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|&(n, _)| n);
        for (i, &(number, _)) in entries.iter().enumerate() {
            let expected = i as u32 + 1;
            if number != expected {
                return Err(Error::CrossReferenceCollision(format!(
                    "expected object number {} in sequence, found {}",
                    expected, number
                )));
            }
        }
        let mut out = format!("xref\n0 {}\n", entries.len() + 1).into_bytes();
        out.extend_from_slice(b"0000000000 65535 f \n");
        for &(_, offset) in &entries {
            out.extend_from_slice(format!("{:010} {:05} n \n", offset, 0).as_bytes());
        }
        Ok(out)
    }
}

/// The trailer dictionary plus the `startxref` epilogue.
///
/// `Size` and `Root` are checked at construction so a missing catalog
/// surfaces before any bytes are written.
#[derive(Debug)]
pub struct Trailer {
    dictionary: Dictionary,
    startxref: u64,
}

impl Trailer {
    /// Build a trailer. Fails unless `Size` and `Root` are present.
    pub fn new(dictionary: Dictionary, startxref: u64) -> Result<Self> {
        if !dictionary.contains_key("Size") {
            return Err(Error::TrailerConstraint("Size"));
        }
        if !dictionary.contains_key("Root") {
            return Err(Error::TrailerConstraint("Root"));
        }
        Ok(Self {
            dictionary,
            startxref,
        })
    }

    /// Format `trailer ... startxref ... %%EOF`.
    pub fn format(&self, document: &mut Document) -> Result<Vec<u8>> {
        let mut out = b"trailer\n".to_vec();
        out.extend(self.dictionary.format(document)?);
        out.extend_from_slice(format!("\nstartxref\n{}\n%%EOF\n", self.startxref).as_bytes());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentConfig};
    use crate::object::Object;

    #[test]
    fn test_entry_format_is_twenty_bytes() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, 15).unwrap();
        let out = table.format().unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("xref"));
        assert_eq!(lines.next(), Some("0 2"));
        let free = lines.next().unwrap();
        assert_eq!(free.len() + 1, 20);
        let entry = lines.next().unwrap();
        assert_eq!(entry, "0000000015 00000 n ");
        assert_eq!(entry.len() + 1, 20);
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, 0).unwrap();
        assert!(matches!(
            table.add_entry(1, 99),
            Err(Error::CrossReferenceCollision(_))
        ));
    }

    #[test]
    fn test_object_zero_rejected() {
        let mut table = CrossReferenceTable::new();
        assert!(table.add_entry(0, 0).is_err());
    }

    #[test]
    fn test_gap_in_numbering_rejected() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(1, 10).unwrap();
        table.add_entry(3, 20).unwrap();
        assert!(matches!(
            table.format(),
            Err(Error::CrossReferenceCollision(_))
        ));
    }

    #[test]
    fn test_entries_sorted_regardless_of_recording_order() {
        let mut table = CrossReferenceTable::new();
        table.add_entry(2, 200).unwrap();
        table.add_entry(1, 100).unwrap();
        let text = String::from_utf8(table.format().unwrap()).unwrap();
        let first = text.find("0000000100").unwrap();
        let second = text.find("0000000200").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_trailer_requires_size_and_root() {
        let empty = Dictionary::new();
        assert!(matches!(
            Trailer::new(empty, 0),
            Err(Error::TrailerConstraint("Size"))
        ));

        let mut only_size = Dictionary::new();
        only_size.insert("Size", 6i64);
        assert!(matches!(
            Trailer::new(only_size, 0),
            Err(Error::TrailerConstraint("Root"))
        ));
    }

    #[test]
    fn test_trailer_epilogue() {
        let mut d = Document::new(DocumentConfig::default());
        let root = d
            .reference(Object::Dictionary(Dictionary::new()), Some("Catalog"))
            .unwrap();
        let mut dict = Dictionary::new();
        dict.insert("Size", 6i64);
        dict.insert("Root", root);
        let trailer = Trailer::new(dict, 1234).unwrap();
        let text = String::from_utf8(trailer.format(&mut d).unwrap()).unwrap();
        assert!(text.starts_with("trailer\n<< "));
        assert!(text.ends_with("startxref\n1234\n%%EOF\n"));
    }
}
