//! The output document under construction.
//!
//! [`OutputDocument`] owns a single flat page tree. Pages are only ever
//! appended, so the order of the `Kids` array is the order inputs were
//! processed in.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::error::{Result, StitchError};
use crate::merge::placement::{A4_HEIGHT, A4_WIDTH, fit_and_center};
use crate::raster::RasterImage;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

const PLACEHOLDER_FONT_SIZE: f32 = 12.0;
const PLACEHOLDER_X: f32 = 50.0;
const PLACEHOLDER_Y: f32 = A4_HEIGHT - 50.0;

/// Text drawn on the page that stands in for a failed input.
///
/// The standard Helvetica font is single-byte, so characters outside
/// printable ASCII are replaced with `?`.
pub fn placeholder_text(name: &str) -> String {
    let printable: String = name
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect();
    format!("Error loading: {printable}")
}

/// A PDF being assembled page by page.
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    font_id: Option<ObjectId>,
}

impl OutputDocument {
    /// Create an empty document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            font_id: None,
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page object ids in output order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// Borrow the underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the builder and return the underlying document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Copy every page of `source`, in order and at its own size.
    ///
    /// Returns the number of pages appended. Attributes the source pages
    /// inherited from their page tree are copied onto the pages themselves
    /// before they are re-parented.
    ///
    /// # Errors
    ///
    /// Returns [`StitchError::DocumentParse`] if the source is encrypted or
    /// has no pages.
    pub fn append_document(&mut self, name: &str, mut source: Document) -> Result<usize> {
        if source.is_encrypted() {
            return Err(StitchError::document_parse(name, "document is encrypted"));
        }

        source.renumber_objects_with(self.document.max_id + 1);

        let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
        if source_pages.is_empty() {
            return Err(StitchError::document_parse(name, "document has no pages"));
        }

        for &page_id in &source_pages {
            let inherited = inherited_attributes(&source, page_id);
            let page = source
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| StitchError::document_parse(name, format!("bad page object: {e}")))?;

            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", self.pages_id);
        }

        self.document.max_id = self.document.max_id.max(source.max_id);
        self.document.objects.extend(source.objects);
        self.push_pages(&source_pages)?;

        debug!(name, pages = source_pages.len(), "Copied document pages");
        Ok(source_pages.len())
    }

    /// Append an A4 page showing `raster` scaled to fit and centered.
    pub fn append_image_page(&mut self, raster: &RasterImage) -> Result<ObjectId> {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width as i64,
                "Height" => raster.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            raster.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = self.document.add_object(image);

        let placement = fit_and_center(raster.width as f32, raster.height as f32, A4_WIDTH, A4_HEIGHT);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.into(),
                        0.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };

        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        };

        self.append_generated_page(content, resources)
    }

    /// Append an A4 page carrying a single diagnostic line naming `name`.
    pub fn append_placeholder_page(&mut self, name: &str) -> Result<ObjectId> {
        let font_id = self.placeholder_font();

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), PLACEHOLDER_FONT_SIZE.into()]),
                Operation::new("Td", vec![PLACEHOLDER_X.into(), PLACEHOLDER_Y.into()]),
                Operation::new("Tj", vec![Object::string_literal(placeholder_text(name))]),
                Operation::new("ET", vec![]),
            ],
        };

        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };

        self.append_generated_page(content, resources)
    }

    fn append_generated_page(&mut self, content: Content, resources: Dictionary) -> Result<ObjectId> {
        let encoded = content.encode().map_err(StitchError::serialize)?;
        let content_id = self.document.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = self.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        self.push_pages(&[page_id])?;
        Ok(page_id)
    }

    fn placeholder_font(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    /// Append page references to the root page tree node.
    fn push_pages(&mut self, page_ids: &[ObjectId]) -> Result<()> {
        let pages = self
            .document
            .get_object_mut(self.pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| StitchError::serialize(format!("Failed to get pages object: {e}")))?;

        let kids = pages
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|_| StitchError::serialize("Pages dictionary missing Kids array"))?;
        kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));

        self.page_ids.extend_from_slice(page_ids);
        pages.set("Count", self.page_ids.len() as i64);
        Ok(())
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Inheritable attributes a page lacks but an ancestor defines.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    INHERITABLE_KEYS
        .iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| {
            let mut node = page;
            for _ in 0..MAX_TREE_DEPTH {
                let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
                node = doc.get_dictionary(parent).ok()?;
                if let Ok(value) = node.get(key) {
                    return Some((key.to_vec(), value.clone()));
                }
            }
            None
        })
        .collect()
}
