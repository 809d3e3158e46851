//! The object registry and single-pass serializer.
//!
//! A [`Document`] owns every registered object, keyed by logical name.
//! Object numbers are the registration order starting at 1; generation is
//! always 0. Serialization is one pass over the registry driven by a
//! counter, because formatting an object may register further objects
//! that the pass must still pick up.

use indexmap::IndexMap;

use crate::accumulator::Accumulator;
use crate::encryption::{EncryptionHook, NoEncryption};
use crate::error::{Error, Result};
use crate::filters::Filter;
use crate::identity::IdentityDigest;
use crate::object::{Dictionary, IndirectObject, Object, Stream};
use crate::outline::OutlineBuilder;
use crate::structure::{
    basic_fonts, catalog, page_tree, rect_display, DocumentInfo, Page, PageMode, PdfDate,
};
use crate::xref::{CrossReferenceTable, Trailer};

/// Document-wide settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Compress page content streams
    pub compression: bool,
    /// Fixed timestamps so identical input yields identical bytes
    pub invariant: bool,
    /// Header version, bumped by [`Document::ensure_min_version`]
    pub version: (u8, u8),
    /// Filter pipeline for streams that do not choose their own
    pub default_stream_filters: Option<Vec<Filter>>,
    /// Initial viewer page mode
    pub page_mode: PageMode,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            compression: false,
            invariant: false,
            version: (1, 3),
            default_stream_filters: None,
            page_mode: PageMode::UseNone,
        }
    }
}

impl DocumentConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle page-content compression.
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// Toggle byte-reproducible output.
    pub fn with_invariant(mut self, invariant: bool) -> Self {
        self.invariant = invariant;
        self
    }

    /// Set the initial header version.
    pub fn with_version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    /// Set the default stream filter pipeline.
    pub fn with_default_stream_filters(mut self, filters: Vec<Filter>) -> Self {
        self.default_stream_filters = Some(filters);
        self
    }

    /// Set the initial viewer page mode.
    pub fn with_page_mode(mut self, page_mode: PageMode) -> Self {
        self.page_mode = page_mode;
        self
    }
}

/// Object registry, document state, and serializer in one.
#[derive(Debug)]
pub struct Document {
    config: DocumentConfig,
    version: (u8, u8),
    page_mode: PageMode,
    objects: IndexMap<String, Object>,
    encryption: Box<dyn EncryptionHook>,
    identity: IdentityDigest,
    info: DocumentInfo,
    creation_date: PdfDate,
    outline: OutlineBuilder,
    named_destinations: IndexMap<String, Object>,
    pages: Vec<Object>,
    page_count: u32,
    saved: bool,
}

impl Document {
    /// Create a document and register the shared standard-font
    /// dictionary under `BasicFonts`.
    pub fn new(config: DocumentConfig) -> Self {
        let creation_date = if config.invariant {
            PdfDate::fixed()
        } else {
            PdfDate::now()
        };
        let identity = IdentityDigest::new(&creation_date.timestamp().to_string());
        let version = config.version;
        let page_mode = config.page_mode;
        let mut document = Self {
            config,
            version,
            page_mode,
            objects: IndexMap::new(),
            encryption: Box::new(NoEncryption),
            identity,
            info: DocumentInfo::default(),
            creation_date,
            outline: OutlineBuilder::new(),
            named_destinations: IndexMap::new(),
            pages: Vec::new(),
            page_count: 0,
            saved: false,
        };
        let mut fonts = basic_fonts();
        fonts.mark_reference_only();
        document
            .objects
            .insert("BasicFonts".to_string(), Object::Dictionary(fonts));
        document
    }

    /// Install an encryption hook. Must happen before any string or
    /// stream is formatted.
    pub fn set_encryption(&mut self, hook: Box<dyn EncryptionHook>) {
        self.encryption = hook;
    }

    /// Whether the installed hook actually transforms bytes.
    pub fn encryption_active(&self) -> bool {
        self.encryption.active()
    }

    /// Run string or stream bytes through the encryption hook.
    pub fn encrypt_bytes(&self, data: &[u8]) -> Vec<u8> {
        if self.encryption.active() {
            self.encryption.encode(data)
        } else {
            data.to_vec()
        }
    }

    /// Tell the hook which indirect object is about to be formatted.
    pub fn register_encryption(&mut self, object_number: u32, generation: u16) {
        self.encryption.register(object_number, generation);
    }

    /// Filter pipeline for streams that do not declare their own.
    pub fn default_stream_filters(&self) -> Option<Vec<Filter>> {
        self.config.default_stream_filters.clone()
    }

    /// Register an object, or pass it through.
    ///
    /// Unnamed primitives and existing references come back unchanged.
    /// An unnamed compound object is deduplicated by value against the
    /// registry, otherwise registered under a generated `R<n>` name.
    /// Re-registering a name with a different object is fatal.
    pub fn reference(&mut self, object: Object, name: Option<&str>) -> Result<Object> {
        if name.is_none() {
            match &object {
                Object::Reference(_) => return Ok(object),
                Object::Null
                | Object::Boolean(_)
                | Object::Integer(_)
                | Object::Real(_)
                | Object::String(_)
                | Object::Name(_) => return Ok(object),
                _ => {},
            }
            if let Some(existing) = self
                .objects
                .iter()
                .find_map(|(k, v)| (*v == object).then(|| k.clone()))
            {
                return Ok(Object::Reference(existing));
            }
        }
        let name = match name {
            Some(name) => {
                if let Some(existing) = self.objects.get(name) {
                    if *existing == object {
                        return Ok(Object::Reference(name.to_string()));
                    }
                    return Err(Error::NamingConflict(name.to_string()));
                }
                name.to_string()
            },
            None => self.generate_name(),
        };
        log::debug!(
            "registering object {} as '{}' ({})",
            self.objects.len() + 1,
            name,
            object.type_name()
        );
        self.objects.insert(name.clone(), object);
        Ok(Object::Reference(name))
    }

    fn generate_name(&self) -> String {
        let mut n = self.objects.len() + 1;
        loop {
            let candidate = format!("R{}", n);
            if !self.objects.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Resolve a logical name to (object number, generation).
    pub fn object_number(&self, name: &str) -> Result<(u32, u16)> {
        let index = self
            .objects
            .get_index_of(name)
            .ok_or_else(|| Error::UnresolvedReference(name.to_string()))?;
        Ok((index as u32 + 1, 0))
    }

    /// Look up a registered object by name.
    pub fn registered(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    /// Number of registered objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // Pages

    /// Name of the page currently being composed, before it is added.
    pub fn this_page_name(&self) -> String {
        format!("Page{}", self.page_count + 1)
    }

    /// Forward reference to the page currently being composed.
    pub fn this_page_ref(&self) -> Object {
        Object::Reference(self.this_page_name())
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Add a finished page: registers its content stream and page
    /// dictionary, returning the page reference.
    pub fn add_page(&mut self, page: Page) -> Result<Object> {
        self.page_count += 1;
        let n = self.page_count;
        log::debug!("page {} media box [{}]", n, rect_display(&page.media_box));
        let compress = page.compression.unwrap_or(self.config.compression);
        let filters = if compress {
            vec![Filter::Ascii85, Filter::Flate]
        } else {
            Vec::new()
        };
        let stream = Stream::new()
            .with_content(page.content().clone())
            .with_filters(filters);
        let contents = self.reference(
            Object::Stream(stream),
            Some(&format!("PageContent{}", n)),
        )?;
        let dict = page.to_dictionary(contents);
        let page_ref = self.reference(Object::Dictionary(dict), Some(&format!("Page{}", n)))?;
        self.pages.push(page_ref.clone());
        Ok(page_ref)
    }

    // Form XObjects

    /// Registry name for a form XObject.
    pub fn xobject_name(name: &str) -> String {
        format!("FormXob.{}", name)
    }

    /// Register a form XObject under its conventional name.
    pub fn add_form(&mut self, name: &str, form: Object) -> Result<Object> {
        self.reference(form, Some(&Self::xobject_name(name)))
    }

    /// Whether a form with this name has been registered.
    pub fn has_form(&self, name: &str) -> bool {
        self.objects.contains_key(&Self::xobject_name(name))
    }

    /// Build an XObject resource dictionary referencing the named forms.
    pub fn xobj_dict(names: &[&str]) -> Dictionary {
        let mut inner = Dictionary::new();
        for name in names {
            inner.insert(*name, Object::Reference(Self::xobject_name(name)));
        }
        let mut outer = Dictionary::new();
        outer.insert("XObject", inner);
        outer
    }

    // Annotations

    /// Register an annotation under `Annot.<name>`.
    pub fn add_annotation(&mut self, name: &str, annotation: Object) -> Result<Object> {
        self.reference(annotation, Some(&format!("Annot.{}", name)))
    }

    /// Reference to a registered annotation.
    pub fn ref_annotation(&self, name: &str) -> Object {
        Object::Reference(format!("Annot.{}", name))
    }

    // Named destinations and outlines

    /// Record a destination under a name that outline entries can use.
    pub fn add_named_destination(&mut self, name: &str, destination: Object) {
        self.named_destinations.insert(name.to_string(), destination);
    }

    /// Look up a named destination.
    pub fn named_destination(&self, name: &str) -> Option<&Object> {
        self.named_destinations.get(name)
    }

    /// Add an outline entry pointing at a named destination.
    pub fn add_outline_entry(
        &mut self,
        destination: &str,
        level: i32,
        title: &str,
        closed: bool,
    ) -> Result<()> {
        self.outline.add_entry(destination, level, title, closed)
    }

    // Metadata

    /// Set the Info title; also feeds the identity digest.
    pub fn set_title(&mut self, title: &str) {
        self.identity.add(title.as_bytes());
        self.info.title = title.to_string();
    }

    /// Set the Info author; also feeds the identity digest.
    pub fn set_author(&mut self, author: &str) {
        self.identity.add(author.as_bytes());
        self.info.author = author.to_string();
    }

    /// Set the Info subject; also feeds the identity digest.
    pub fn set_subject(&mut self, subject: &str) {
        self.identity.add(subject.as_bytes());
        self.info.subject = subject.to_string();
    }

    /// Set the Info keywords; also feeds the identity digest.
    pub fn set_keywords(&mut self, keywords: &str) {
        self.identity.add(keywords.as_bytes());
        self.info.keywords = keywords.to_string();
    }

    /// Set the Info producer string.
    pub fn set_producer(&mut self, producer: &str) {
        self.info.producer = producer.to_string();
    }

    /// Open the outline panel when the document is first displayed.
    pub fn show_outline(&mut self) {
        self.page_mode = PageMode::UseOutlines;
    }

    /// Open in full-screen presentation mode.
    pub fn show_full_screen(&mut self) {
        self.page_mode = PageMode::FullScreen;
    }

    /// Current header version.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Bump the header version if the named feature needs a newer one.
    pub fn ensure_min_version(&mut self, feature: &str) -> Result<()> {
        let required = match feature {
            "transparency" => (1, 4),
            _ => return Err(Error::Unsupported(format!("version feature '{}'", feature))),
        };
        if self.version < required {
            log::debug!(
                "feature '{}' raises version {}.{} -> {}.{}",
                feature,
                self.version.0,
                self.version.1,
                required.0,
                required.1
            );
            self.version = required;
        }
        Ok(())
    }

    // Serialization

    /// Serialize the whole document to bytes.
    ///
    /// A document serializes once; a second call is fatal because object
    /// numbers and the identity digest are already fixed.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>> {
        if self.saved {
            return Err(Error::ReuseViolation);
        }
        self.saved = true;
        self.encryption.prepare();

        // assemble the document structure before the pass
        let outlines = {
            let mut builder = std::mem::take(&mut self.outline);
            let reference = builder.prepare(self)?;
            self.outline = builder;
            reference
        };
        self.reference(
            Object::Dictionary(page_tree(self.pages.clone())),
            Some("Pages"),
        )?;
        let root = self.reference(
            Object::Dictionary(catalog(outlines, self.page_mode)),
            Some("Catalog"),
        )?;
        let info_dict = self.info.to_dictionary(&self.creation_date);
        let info = self.reference(Object::Dictionary(info_dict), Some("Info"))?;
        let encrypt = match self.encryption.info() {
            Some(mut dict) => {
                dict.mark_reference_only();
                Some(self.reference(Object::Dictionary(dict), Some("Encrypt"))?)
            },
            None => None,
        };

        // single pass; the registry may grow while it runs
        let mut accumulator = Accumulator::new();
        accumulator.write_header(self.version.0, self.version.1);
        let mut xref = CrossReferenceTable::new();
        let mut formatted = 0usize;
        let mut index = 0usize;
        while index < self.objects.len() {
            let (name, object) = {
                let (name, object) = self
                    .objects
                    .get_index(index)
                    .ok_or_else(|| Error::CrossReferenceCollision(format!(
                        "registry entry {} vanished during the pass",
                        index + 1
                    )))?;
                (name.clone(), object.clone())
            };
            let number = index as u32 + 1;
            log::debug!("formatting object {} '{}'", number, name);
            let bytes = IndirectObject::new(name, object).format(self)?;
            let offset = accumulator.add(&bytes);
            xref.add_entry(number, offset)?;
            formatted += 1;
            index += 1;
        }
        if formatted != self.objects.len() {
            return Err(Error::CountMismatch {
                formatted,
                registered: self.objects.len(),
            });
        }

        let startxref = accumulator.offset();
        let xref_bytes = xref.format()?;
        accumulator.add(&xref_bytes);

        let mut trailer_dict = Dictionary::new();
        trailer_dict.insert("Size", (self.objects.len() + 1) as i64);
        trailer_dict.insert("Root", root);
        trailer_dict.insert("Info", info);
        trailer_dict.insert("ID", self.identity.to_object());
        if let Some(encrypt) = encrypt {
            trailer_dict.insert("Encrypt", encrypt);
        }
        let trailer = Trailer::new(trailer_dict, startxref)?;
        let trailer_bytes = trailer.format(self)?;
        accumulator.add(&trailer_bytes);

        log::debug!(
            "serialized {} objects, {} bytes",
            formatted,
            accumulator.offset()
        );
        Ok(accumulator.into_bytes())
    }

    /// Serialize the document into a writer.
    pub fn save_to<W: std::io::Write>(&mut self, writer: &mut W) -> Result<()> {
        let bytes = self.save_to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}
