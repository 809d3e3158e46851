//! pdfscribe: a PDF document-construction engine.
//!
//! Builds structurally valid PDF files from an object graph: indirect
//! object numbering, cross-reference table, stream filter pipelines,
//! adaptive string encoding, and a threaded outline tree. Page content
//! streams are taken as opaque bytes; drawing operators, font metrics,
//! and image codecs live upstream.
//!
//! # Example
//!
//! ```
//! use pdfscribe::{Document, DocumentConfig, Page};
//!
//! let mut doc = Document::new(DocumentConfig::default().with_invariant(true));
//! doc.set_title("Hello");
//! doc.add_page(Page::new(&b"BT /F1 24 Tf 72 720 Td (Hello, world) Tj ET"[..]))?;
//! let bytes = doc.save_to_bytes()?;
//! assert!(bytes.starts_with(b"%PDF-1.3\n"));
//! assert!(bytes.ends_with(b"%%EOF\n"));
//! # Ok::<(), pdfscribe::Error>(())
//! ```

pub mod accumulator;
pub mod document;
pub mod encryption;
pub mod error;
pub mod filters;
pub mod identity;
pub mod object;
pub mod outline;
pub mod strings;
pub mod structure;
pub mod xref;

pub use document::{Document, DocumentConfig};
pub use encryption::{EncryptionHook, NoEncryption};
pub use error::{Error, Result};
pub use filters::{Filter, StreamFilter};
pub use object::{Array, Dictionary, Object, Stream};
pub use strings::{Encoding, PdfString};
pub use structure::{Destination, DocumentInfo, Page, PageMode, PdfDate};
