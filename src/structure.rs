//! Document-structure nodes: catalog, page tree, metadata, dates,
//! destinations, and the standard resource dictionaries.

use crate::object::{format_real, Array, Dictionary, Object};
use crate::strings::PdfString;

/// How a viewer should open the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageMode {
    /// Neither outline nor thumbnails visible
    #[default]
    UseNone,
    /// Outline panel open
    UseOutlines,
    /// Full-screen presentation
    FullScreen,
}

impl PageMode {
    fn name(&self) -> &'static str {
        match self {
            PageMode::UseNone => "UseNone",
            PageMode::UseOutlines => "UseOutlines",
            PageMode::FullScreen => "FullScreen",
        }
    }
}

/// Build the catalog dictionary. `/Outlines` appears only when an
/// outline tree was actually registered.
pub fn catalog(outlines: Option<Object>, page_mode: PageMode) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.insert("Type", Object::Name("Catalog".to_string()));
    dict.insert("Pages", Object::Reference("Pages".to_string()));
    if let Some(outlines) = outlines {
        dict.insert("Outlines", outlines);
    }
    if page_mode != PageMode::UseNone {
        dict.insert("PageMode", Object::Name(page_mode.name().to_string()));
    }
    dict.mark_reference_only();
    dict
}

/// Build the page-tree root from the collected page references.
pub fn page_tree(kids: Vec<Object>) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.insert("Type", Object::Name("Pages".to_string()));
    dict.insert("Count", kids.len() as i64);
    dict.insert("Kids", Array::from(kids));
    dict.mark_reference_only();
    dict
}

/// A4 in default user-space units.
pub const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 595.0, 842.0];

/// A page under construction: content-stream payload plus layout knobs.
/// The document turns this into a content stream and a page dictionary
/// when the page is added.
#[derive(Debug, Clone)]
pub struct Page {
    /// Visible area, `[llx lly urx ury]`
    pub media_box: [f64; 4],
    /// Overrides the document-wide compression setting when set
    pub compression: Option<bool>,
    /// Replaces the default font/proc-set resources when set
    pub resources: Option<Dictionary>,
    content: bytes::Bytes,
}

impl Page {
    /// Page with the given content-stream payload and default layout.
    pub fn new(content: impl Into<bytes::Bytes>) -> Self {
        Self {
            media_box: DEFAULT_MEDIA_BOX,
            compression: None,
            resources: None,
            content: content.into(),
        }
    }

    /// Builder-style media box override.
    pub fn with_media_box(mut self, media_box: [f64; 4]) -> Self {
        self.media_box = media_box;
        self
    }

    /// Builder-style per-page compression override.
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Builder-style resource dictionary override.
    pub fn with_resources(mut self, resources: Dictionary) -> Self {
        self.resources = Some(resources);
        self
    }

    /// The raw content-stream payload.
    pub fn content(&self) -> &bytes::Bytes {
        &self.content
    }

    /// Build the page dictionary, given references to the content stream
    /// and the page-tree root.
    pub fn to_dictionary(&self, contents: Object) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.insert("Type", Object::Name("Page".to_string()));
        dict.insert("Parent", Object::Reference("Pages".to_string()));
        let mut media_box = Array::new();
        for v in self.media_box {
            media_box.push(Object::Real(v));
        }
        dict.insert("MediaBox", media_box);
        dict.insert("Contents", contents);
        dict.insert(
            "Resources",
            self.resources.clone().unwrap_or_else(default_resources),
        );
        dict.mark_reference_only();
        dict
    }
}

/// Document metadata rendered into the Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// `/Title`
    pub title: String,
    /// `/Author`
    pub author: String,
    /// `/Subject`
    pub subject: String,
    /// `/Keywords`, omitted from the Info dictionary while empty
    pub keywords: String,
    /// `/Producer`
    pub producer: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "untitled".to_string(),
            author: "anonymous".to_string(),
            subject: "unspecified".to_string(),
            keywords: String::new(),
            producer: concat!("pdfscribe ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl DocumentInfo {
    /// Build the Info dictionary.
    pub fn to_dictionary(&self, creation_date: &PdfDate) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.insert("Title", PdfString::new(self.title.clone()));
        dict.insert("Author", PdfString::new(self.author.clone()));
        dict.insert("Subject", PdfString::new(self.subject.clone()));
        if !self.keywords.is_empty() {
            dict.insert("Keywords", PdfString::new(self.keywords.clone()));
        }
        dict.insert("Producer", PdfString::new(self.producer.clone()));
        dict.insert("CreationDate", creation_date.to_object());
        dict
    }
}

/// Fixed instant used when byte-reproducible output is requested:
/// 2000-01-01T00:00:00Z.
const INVARIANT_EPOCH: i64 = 946_684_800;

/// A timestamp rendered in the `D:YYYYMMDDHHmmSS` date form.
#[derive(Debug, Clone, Copy)]
pub struct PdfDate {
    datetime: chrono::DateTime<chrono::Utc>,
}

impl PdfDate {
    /// Current time.
    pub fn now() -> Self {
        Self {
            datetime: chrono::Utc::now(),
        }
    }

    /// The fixed invariant instant.
    pub fn fixed() -> Self {
        Self {
            datetime: chrono::DateTime::<chrono::Utc>::from_timestamp(INVARIANT_EPOCH, 0)
                .unwrap_or_default(),
        }
    }

    /// Seconds since the Unix epoch, fed into the identity digest.
    pub fn timestamp(&self) -> i64 {
        self.datetime.timestamp()
    }

    /// Render as a PDF date string.
    pub fn to_object(&self) -> Object {
        let formatted = self.datetime.format("D:%Y%m%d%H%M%S+00'00'").to_string();
        Object::String(PdfString::new(formatted))
    }
}

/// An explicit destination: a page plus a view of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Destination {
    /// Position with zoom; zero zoom keeps the current one
    Xyz {
        /// Left edge in user space
        left: f64,
        /// Top edge in user space
        top: f64,
        /// Zoom factor, 0 to keep
        zoom: f64,
    },
    /// Whole page
    Fit,
    /// Fit width, scroll to `top`
    FitH(f64),
    /// Fit height, scroll to `left`
    FitV(f64),
    /// Fit bounding box
    FitB,
    /// Fit bounding-box width, scroll to `top`
    FitBH(f64),
    /// Fit bounding-box height, scroll to `left`
    FitBV(f64),
    /// Fit the given rectangle
    FitR {
        /// Left edge
        left: f64,
        /// Bottom edge
        bottom: f64,
        /// Right edge
        right: f64,
        /// Top edge
        top: f64,
    },
}

impl Destination {
    /// Build the destination array for the given page reference.
    pub fn to_object(&self, page: Object) -> Object {
        let mut array = Array::new();
        array.push(page);
        match *self {
            Destination::Xyz { left, top, zoom } => {
                array.push(Object::Name("XYZ".to_string()));
                array.push(Object::Real(left));
                array.push(Object::Real(top));
                array.push(Object::Real(zoom));
            },
            Destination::Fit => array.push(Object::Name("Fit".to_string())),
            Destination::FitH(top) => {
                array.push(Object::Name("FitH".to_string()));
                array.push(Object::Real(top));
            },
            Destination::FitV(left) => {
                array.push(Object::Name("FitV".to_string()));
                array.push(Object::Real(left));
            },
            Destination::FitB => array.push(Object::Name("FitB".to_string())),
            Destination::FitBH(top) => {
                array.push(Object::Name("FitBH".to_string()));
                array.push(Object::Real(top));
            },
            Destination::FitBV(left) => {
                array.push(Object::Name("FitBV".to_string()));
                array.push(Object::Real(left));
            },
            Destination::FitR {
                left,
                bottom,
                right,
                top,
            } => {
                array.push(Object::Name("FitR".to_string()));
                array.push(Object::Real(left));
                array.push(Object::Real(bottom));
                array.push(Object::Real(right));
                array.push(Object::Real(top));
            },
        }
        Object::Array(array)
    }
}

const STANDARD_FONTS: &[(&str, &str)] = &[
    ("F1", "Helvetica"),
    ("F2", "Times-Roman"),
    ("F3", "Courier"),
    ("F4", "Symbol"),
];

/// The shared standard Type 1 font dictionary, registered once per
/// document under the `BasicFonts` name.
pub fn basic_fonts() -> Dictionary {
    let mut fonts = Dictionary::new();
    for &(key, base) in STANDARD_FONTS {
        let mut font = Dictionary::new();
        font.multiline = false;
        font.insert("Type", Object::Name("Font".to_string()));
        font.insert("Subtype", Object::Name("Type1".to_string()));
        font.insert("Name", Object::Name(key.to_string()));
        font.insert("BaseFont", Object::Name(base.to_string()));
        font.insert("Encoding", Object::Name("WinAnsiEncoding".to_string()));
        fonts.insert(key, font);
    }
    fonts
}

/// Proc sets for text and vector content.
pub fn basic_procs() -> Array {
    Array::from(vec![
        Object::Name("PDF".to_string()),
        Object::Name("Text".to_string()),
    ])
}

/// Proc sets including the image variants.
pub fn all_procs() -> Array {
    let mut procs = basic_procs();
    for name in ["ImageB", "ImageC", "ImageI"] {
        procs.push(Object::Name(name.to_string()));
    }
    procs
}

/// The default page resource dictionary: shared fonts plus basic procs.
pub fn default_resources() -> Dictionary {
    let mut resources = Dictionary::new();
    resources.insert("Font", Object::Reference("BasicFonts".to_string()));
    resources.insert("ProcSet", basic_procs());
    resources
}

/// Format a rectangle for debug logging.
pub fn rect_display(rect: &[f64; 4]) -> String {
    rect.iter()
        .map(|&v| format_real(v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentConfig};

    fn fmt(d: &mut Document, obj: Object) -> String {
        String::from_utf8(obj.format(d, true).unwrap()).unwrap()
    }

    #[test]
    fn test_catalog_omits_outlines_when_absent() {
        let dict = catalog(None, PageMode::UseNone);
        assert!(!dict.contains_key("Outlines"));
        assert!(!dict.contains_key("PageMode"));
        assert!(dict.is_reference_only());
    }

    #[test]
    fn test_catalog_with_outlines_and_mode() {
        let dict = catalog(
            Some(Object::Reference("Outlines".to_string())),
            PageMode::UseOutlines,
        );
        assert!(dict.contains_key("Outlines"));
        assert_eq!(
            dict.get("PageMode"),
            Some(&Object::Name("UseOutlines".to_string()))
        );
    }

    #[test]
    fn test_page_tree_counts_kids() {
        let kids = vec![
            Object::Reference("Page1".to_string()),
            Object::Reference("Page2".to_string()),
        ];
        let dict = page_tree(kids);
        assert_eq!(dict.get("Count"), Some(&Object::Integer(2)));
    }

    #[test]
    fn test_page_defaults() {
        let page = Page::new(&b"BT ET"[..]);
        assert_eq!(page.media_box, DEFAULT_MEDIA_BOX);
        let dict = page.to_dictionary(Object::Reference("PageContent1".to_string()));
        assert_eq!(dict.get("Type"), Some(&Object::Name("Page".to_string())));
        assert!(dict.is_reference_only());
        assert!(dict.get("Resources").is_some());
    }

    #[test]
    fn test_fixed_date_rendering() {
        let mut d = Document::new(DocumentConfig::default());
        let out = fmt(&mut d, PdfDate::fixed().to_object());
        assert_eq!(out, "(D:20000101000000+00'00')");
    }

    #[test]
    fn test_destination_arrays() {
        let mut d = Document::new(DocumentConfig::default());
        let page = || Object::Reference("Page1".to_string());
        let r = d
            .reference(Object::Dictionary(Dictionary::new()), Some("Page1"))
            .unwrap();
        let page_ref = String::from_utf8(r.format(&mut d, false).unwrap()).unwrap();
        assert_eq!(
            fmt(&mut d, Destination::Fit.to_object(page())),
            format!("[ {} /Fit ]", page_ref)
        );
        assert_eq!(
            fmt(&mut d, Destination::FitH(700.0).to_object(page())),
            format!("[ {} /FitH 700 ]", page_ref)
        );
        let xyz = Destination::Xyz {
            left: 0.0,
            top: 792.5,
            zoom: 0.0,
        };
        assert_eq!(
            fmt(&mut d, xyz.to_object(page())),
            format!("[ {} /XYZ 0 792.5 0 ]", page_ref)
        );
    }

    #[test]
    fn test_basic_fonts_cover_f1_to_f4() {
        let fonts = basic_fonts();
        for key in ["F1", "F2", "F3", "F4"] {
            let font = fonts.get(key).and_then(Object::as_dict).unwrap();
            assert_eq!(font.get("Subtype"), Some(&Object::Name("Type1".to_string())));
        }
    }

    #[test]
    fn test_proc_sets() {
        assert_eq!(basic_procs().len(), 2);
        assert_eq!(all_procs().len(), 5);
    }

    #[test]
    fn test_rect_display() {
        assert_eq!(rect_display(&[0.0, 0.0, 595.0, 842.0]), "0 0 595 842");
    }
}
