//! PDF object types and their byte serialization.
//!
//! Every variant formats itself against the owning [`Document`], which
//! resolves references and supplies encryption and default filters.
//! Formatting a container below top level substitutes a reference for any
//! child that must only appear as an indirect object.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::filters::Filter;
use crate::strings::PdfString;
use indexmap::IndexMap;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String with adaptive encoding
    String(PdfString),
    /// Name (starting with /)
    Name(String),
    /// Ordered sequence of objects
    Array(Array),
    /// Ordered key-value mapping
    Dictionary(Dictionary),
    /// Dictionary plus raw payload
    Stream(Stream),
    /// Reference to a registered object by logical name
    Reference(String),
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream(_) => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Whether this object must never be inlined below top level.
    pub fn must_be_reference_only(&self) -> bool {
        match self {
            Object::Stream(_) => true,
            Object::Dictionary(d) => d.is_reference_only(),
            _ => false,
        }
    }

    /// Serialize to bytes.
    ///
    /// `toplevel` is true only for the body of an indirect object; at any
    /// other position a reference-only object is registered on the fly and
    /// replaced by a reference.
    pub fn format(&self, document: &mut Document, toplevel: bool) -> Result<Vec<u8>> {
        if !toplevel && self.must_be_reference_only() {
            let reference = document.reference(self.clone(), None)?;
            return reference.format(document, false);
        }
        match self {
            Object::Null => Ok(b"null".to_vec()),
            Object::Boolean(b) => Ok(if *b { b"true".to_vec() } else { b"false".to_vec() }),
            Object::Integer(i) => Ok(i.to_string().into_bytes()),
            Object::Real(r) => Ok(format_real(*r).into_bytes()),
            Object::String(s) => s.format(document),
            Object::Name(n) => Ok(format_name(n).into_bytes()),
            Object::Array(a) => a.format(document),
            Object::Dictionary(d) => d.format(document),
            Object::Stream(s) => s.format(document),
            Object::Reference(name) => {
                let (number, generation) = document.object_number(name)?;
                Ok(format!("{} {} R", number, generation).into_bytes())
            },
        }
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for streams too.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dictionary),
            _ => None,
        }
    }

    /// Try to cast to a reference's logical name.
    pub fn as_reference(&self) -> Option<&str> {
        match self {
            Object::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
}

impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Object::Boolean(v)
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::Integer(v)
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::Real(v)
    }
}

impl From<PdfString> for Object {
    fn from(v: PdfString) -> Self {
        Object::String(v)
    }
}

impl From<Array> for Object {
    fn from(v: Array) -> Self {
        Object::Array(v)
    }
}

impl From<Dictionary> for Object {
    fn from(v: Dictionary) -> Self {
        Object::Dictionary(v)
    }
}

impl From<Stream> for Object {
    fn from(v: Stream) -> Self {
        Object::Stream(v)
    }
}

/// Format a real number deterministically, independent of locale.
///
/// Whole values print as integers; fractional values keep up to five
/// decimal places with trailing zeros trimmed.
pub fn format_real(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.5}", value);
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Reserved name bytes that always need escaping.
const NAME_RESERVED: &[u8] = b"%()<>{}[]#";

/// Format a PDF name: `/` plus the literal with `#xx` hex escapes for
/// bytes outside `!`..`~` or in the reserved set.
pub fn format_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    out.push('/');
    for byte in name.bytes() {
        if !(0x21..=0x7E).contains(&byte) || NAME_RESERVED.contains(&byte) {
            out.push_str(&format!("#{:02x}", byte));
        } else {
            out.push(byte as char);
        }
    }
    out
}

/// Ordered key-value mapping of names to objects.
///
/// Keys are stored without the leading slash; formatting sorts them for
/// deterministic output. The multiline flag only affects whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    entries: IndexMap<String, Object>,
    /// One entry per line when set
    pub multiline: bool,
    ref_only: bool,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            multiline: true,
            ref_only: false,
        }
    }

    /// Insert an entry. The key is stored as supplied; call
    /// [`Dictionary::normalize`] to strip slash-form keys.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get an entry.
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.entries.shift_remove(key)
    }

    /// Whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }

    /// Strip a redundant leading `/` from keys supplied in slash form.
    pub fn normalize(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        for (key, value) in entries {
            let key = key.strip_prefix('/').map(str::to_string).unwrap_or(key);
            self.entries.insert(key, value);
        }
    }

    /// Mark this dictionary as reference-only: it will never be inlined
    /// below top level.
    pub fn mark_reference_only(&mut self) {
        self.ref_only = true;
    }

    /// Whether this dictionary is reference-only.
    pub fn is_reference_only(&self) -> bool {
        self.ref_only
    }

    /// Convert one entry into a registered reference.
    pub fn reference(&mut self, key: &str, document: &mut Document) -> Result<()> {
        if let Some(value) = self.entries.get(key).cloned() {
            let reference = document.reference(value, None)?;
            self.entries.insert(key.to_string(), reference);
        }
        Ok(())
    }

    /// Format as `<< /K1 V1 /K2 V2 >>` with sorted keys.
    pub fn format(&self, document: &mut Document) -> Result<Vec<u8>> {
        let mut pairs: Vec<(String, Object)> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let mut parts: Vec<Vec<u8>> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let mut part = format_name(&key).into_bytes();
            part.push(b' ');
            part.extend(value.format(document, false)?);
            parts.push(part);
        }
        let separator: &[u8] = if self.multiline { b"\n " } else { b" " };
        let mut out = b"<< ".to_vec();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(separator);
            }
            out.extend_from_slice(part);
        }
        out.extend_from_slice(b" >>");
        Ok(out)
    }
}

impl FromIterator<(String, Object)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (String, Object)>>(iter: T) -> Self {
        let mut dict = Dictionary::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// Ordered sequence of objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    items: Vec<Object>,
    /// One element per line when set
    pub multiline: bool,
}

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element.
    pub fn push(&mut self, item: impl Into<Object>) {
        self.items.push(item.into());
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an element.
    pub fn get(&self, index: usize) -> Option<&Object> {
        self.items.get(index)
    }

    /// Iterate elements.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.items.iter()
    }

    /// Convert every element in place to a registered reference.
    ///
    /// Used when a collection must not inline its members, e.g. the
    /// page list.
    pub fn references(&mut self, document: &mut Document) -> Result<()> {
        let items = std::mem::take(&mut self.items);
        for item in items {
            self.items.push(document.reference(item, None)?);
        }
        Ok(())
    }

    /// Format as `[ e1 e2 ... ]`.
    pub fn format(&self, document: &mut Document) -> Result<Vec<u8>> {
        let separator: &[u8] = if self.multiline { b"\n " } else { b" " };
        let mut out = b"[ ".to_vec();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(separator);
            }
            out.extend(item.format(document, false)?);
        }
        out.extend_from_slice(b" ]");
        Ok(out)
    }
}

impl From<Vec<Object>> for Array {
    fn from(items: Vec<Object>) -> Self {
        Self {
            items,
            multiline: false,
        }
    }
}

/// Dictionary plus raw payload.
///
/// `Length` and `Filter` are derived at format time and never stored
/// directly; a `Filter` entry already present on the dictionary disables
/// the pipeline entirely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stream {
    /// Stream metadata
    pub dictionary: Dictionary,
    content: Option<bytes::Bytes>,
    /// Filter pipeline in decode order; `None` uses the document default
    pub filters: Option<Vec<Filter>>,
}

impl Stream {
    /// Create an empty stream with no payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw payload.
    pub fn set_content(&mut self, content: impl Into<bytes::Bytes>) {
        self.content = Some(content.into());
    }

    /// Builder-style payload setter.
    pub fn with_content(mut self, content: impl Into<bytes::Bytes>) -> Self {
        self.set_content(content);
        self
    }

    /// Builder-style filter pipeline setter.
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// The raw payload, if set.
    pub fn content(&self) -> Option<&bytes::Bytes> {
        self.content.as_ref()
    }

    /// Format as `<<dict>>\nstream\n<payload>\nendstream`.
    ///
    /// Filters are applied last-to-first so the first name in the emitted
    /// `Filter` array is the outermost decode step. `Length` counts the
    /// post-filter, post-encryption payload.
    pub fn format(&self, document: &mut Document) -> Result<Vec<u8>> {
        let content = self.content.as_ref().ok_or(Error::MalformedStream)?;
        let mut dictionary = self.dictionary.clone();
        let filters = self
            .filters
            .clone()
            .or_else(|| document.default_stream_filters());
        let mut payload = content.to_vec();
        if let Some(filters) = filters {
            if !filters.is_empty() && !dictionary.contains_key("Filter") {
                let mut names: Vec<Object> = Vec::with_capacity(filters.len());
                for filter in filters.iter().rev() {
                    log::trace!("applying stream filter {}", filter.name());
                    payload = filter.as_filter().encode(&payload)?;
                    names.insert(0, Object::Name(filter.name().to_string()));
                }
                dictionary.insert("Filter", Array::from(names));
            }
        }
        // encryption runs after all filters
        payload = document.encrypt_bytes(&payload);
        dictionary.insert("Length", payload.len() as i64);
        let mut out = dictionary.format(document)?;
        out.extend_from_slice(b"\nstream\n");
        out.extend_from_slice(&payload);
        out.extend_from_slice(b"\nendstream");
        Ok(out)
    }
}

/// An object together with its registry identity, formatted as
/// `<n> <g> obj ... endobj`.
#[derive(Debug, Clone)]
pub struct IndirectObject {
    name: String,
    content: Object,
}

impl IndirectObject {
    /// Wrap a registered object for top-level emission.
    pub fn new(name: impl Into<String>, content: Object) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Format the full indirect object. The body always ends with a
    /// newline before `endobj`.
    pub fn format(&self, document: &mut Document) -> Result<Vec<u8>> {
        let (number, generation) = document.object_number(&self.name)?;
        document.register_encryption(number, generation);
        let body = self.content.format(document, true)?;
        let mut out = format!("{} {} obj\n", number, generation).into_bytes();
        out.extend_from_slice(&body);
        out.extend_from_slice(b"\nendobj\n");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentConfig};

    fn doc() -> Document {
        Document::new(DocumentConfig::default())
    }

    fn fmt(obj: &Object) -> String {
        let mut d = doc();
        String::from_utf8(obj.format(&mut d, true).unwrap()).unwrap()
    }

    #[test]
    fn test_format_primitives() {
        assert_eq!(fmt(&Object::Null), "null");
        assert_eq!(fmt(&Object::Boolean(true)), "true");
        assert_eq!(fmt(&Object::Boolean(false)), "false");
        assert_eq!(fmt(&Object::Integer(42)), "42");
        assert_eq!(fmt(&Object::Integer(-7)), "-7");
    }

    #[test]
    fn test_format_real() {
        assert_eq!(fmt(&Object::Real(1.0)), "1");
        assert_eq!(fmt(&Object::Real(0.5)), "0.5");
        assert_eq!(fmt(&Object::Real(3.14159)), "3.14159");
        assert_eq!(fmt(&Object::Real(-2.25)), "-2.25");
        assert_eq!(fmt(&Object::Real(72.0)), "72");
    }

    #[test]
    fn test_format_name_plain() {
        assert_eq!(fmt(&Object::Name("Type".to_string())), "/Type");
    }

    #[test]
    fn test_format_name_escapes() {
        assert_eq!(format_name("A B"), "/A#20B");
        assert_eq!(format_name("a(b)"), "/a#28b#29");
        assert_eq!(format_name("50%"), "/50#25");
    }

    #[test]
    fn test_format_string() {
        let s = Object::String(PdfString::new("Hello (world)"));
        assert_eq!(fmt(&s), "(Hello \\(world\\))");
    }

    #[test]
    fn test_dictionary_sorted_keys() {
        let mut d = Dictionary::new();
        d.multiline = false;
        d.insert("Zebra", 1i64);
        d.insert("Alpha", 2i64);
        assert_eq!(fmt(&Object::Dictionary(d)), "<< /Alpha 2 /Zebra 1 >>");
    }

    #[test]
    fn test_dictionary_multiline_whitespace_only() {
        let mut a = Dictionary::new();
        a.insert("K", 1i64);
        a.insert("L", 2i64);
        let mut b = a.clone();
        a.multiline = true;
        b.multiline = false;
        let fa = fmt(&Object::Dictionary(a)).replace("\n ", " ");
        let fb = fmt(&Object::Dictionary(b));
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_dictionary_normalize() {
        let mut d = Dictionary::new();
        d.insert("/Type", Object::Name("Page".to_string()));
        d.normalize();
        assert!(d.contains_key("Type"));
        assert!(!d.contains_key("/Type"));
    }

    #[test]
    fn test_array_format() {
        let arr = Array::from(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ]);
        assert_eq!(fmt(&Object::Array(arr)), "[ 0 0 612 792 ]");
    }

    #[test]
    fn test_array_references_pass_through_primitives() {
        let mut d = doc();
        let mut arr = Array::from(vec![Object::Integer(5), Object::Name("X".to_string())]);
        arr.references(&mut d).unwrap();
        assert_eq!(arr.get(0), Some(&Object::Integer(5)));
        assert_eq!(arr.get(1), Some(&Object::Name("X".to_string())));
    }

    #[test]
    fn test_array_references_registers_compounds() {
        let mut d = doc();
        let mut arr = Array::from(vec![Object::Dictionary(Dictionary::new())]);
        arr.references(&mut d).unwrap();
        assert!(matches!(arr.get(0), Some(Object::Reference(_))));
    }

    #[test]
    fn test_stream_without_content_fails() {
        let mut d = doc();
        let s = Stream::new();
        assert!(matches!(
            s.format(&mut d),
            Err(crate::error::Error::MalformedStream)
        ));
    }

    #[test]
    fn test_stream_derives_length() {
        let mut d = doc();
        let s = Stream::new().with_content(&b"0 0 m 10 10 l S"[..]);
        let out = String::from_utf8(s.format(&mut d).unwrap()).unwrap();
        assert!(out.contains("/Length 15"));
        assert!(out.contains("stream\n0 0 m 10 10 l S\nendstream"));
    }

    #[test]
    fn test_stream_filter_names_in_decode_order() {
        let mut d = doc();
        let s = Stream::new()
            .with_content(&b"payload payload payload"[..])
            .with_filters(vec![Filter::Ascii85, Filter::Flate]);
        let out = String::from_utf8_lossy(&s.format(&mut d).unwrap()).to_string();
        let a85 = out.find("/ASCII85Decode").unwrap();
        let flate = out.find("/FlateDecode").unwrap();
        assert!(a85 < flate);
    }

    #[test]
    fn test_stream_pipeline_skipped_when_filter_present() {
        let mut d = doc();
        let mut s = Stream::new()
            .with_content(&b"already encoded"[..])
            .with_filters(vec![Filter::Flate]);
        s.dictionary
            .insert("Filter", Object::Name("FlateDecode".to_string()));
        let out = s.format(&mut d).unwrap();
        // payload untouched, Length matches the raw bytes
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("stream\nalready encoded\nendstream"));
        assert!(text.contains("/Length 15"));
    }

    #[test]
    fn test_dictionary_entry_to_reference() {
        let mut d = doc();
        let mut inner = Dictionary::new();
        inner.insert("K", 1i64);
        let mut dict = Dictionary::new();
        dict.insert("Extras", inner);
        dict.reference("Extras", &mut d).unwrap();
        assert!(matches!(dict.get("Extras"), Some(Object::Reference(_))));
        // missing keys are left untouched
        dict.reference("Absent", &mut d).unwrap();
        assert!(dict.get("Absent").is_none());
    }

    #[test]
    fn test_ref_only_substitution_below_top_level() {
        let mut d = doc();
        let mut dict = Dictionary::new();
        dict.insert(
            "Contents",
            Object::Stream(Stream::new().with_content(&b"BT ET"[..])),
        );
        let out = String::from_utf8(Object::Dictionary(dict).format(&mut d, true).unwrap()).unwrap();
        assert!(out.contains("/Contents"));
        assert!(out.contains(" R"));
        assert!(!out.contains("stream"));
    }

    #[test]
    fn test_reference_display() {
        let mut d = doc();
        let r = d
            .reference(Object::Dictionary(Dictionary::new()), Some("Extras"))
            .unwrap();
        let out = fmt_with(&mut d, &r);
        assert!(out.ends_with(" 0 R"));
    }

    fn fmt_with(d: &mut Document, obj: &Object) -> String {
        String::from_utf8(obj.format(d, false).unwrap()).unwrap()
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let mut d = doc();
        let r = Object::Reference("NeverRegistered".to_string());
        assert!(matches!(
            r.format(&mut d, false),
            Err(crate::error::Error::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Object::Null.type_name(), "Null");
        assert_eq!(Object::Integer(1).type_name(), "Integer");
        assert_eq!(Object::Stream(Stream::new()).type_name(), "Stream");
    }
}
