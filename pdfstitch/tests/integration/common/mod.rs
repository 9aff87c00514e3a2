//! Shared fixtures for integration tests.
//!
//! Fixtures are generated in memory: PDFs with lopdf, images with the
//! `image` encoders.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId, dictionary};
use pdfstitch::InputFile;
use std::io::Cursor;

/// Encode a solid-color RGB image.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 120, 200])));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// Encode a fully transparent PNG.
pub fn transparent_png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0])));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A PDF with `pages` pages of the given size.
pub fn pdf_bytes(pages: usize, width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            }))
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn png_input(name: &str, width: u32, height: u32) -> InputFile {
    InputFile::new(
        name,
        Some("image/png".to_string()),
        image_bytes(width, height, ImageFormat::Png),
    )
}

pub fn pdf_input(name: &str, pages: usize) -> InputFile {
    InputFile::new(
        name,
        Some("application/pdf".to_string()),
        pdf_bytes(pages, 612, 792),
    )
}

pub fn corrupt_input(name: &str) -> InputFile {
    InputFile::new(name, Some("image/png".to_string()), b"\x89PNG but not really".to_vec())
}

/// Page ids of a document, in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// MediaBox of a page as floats.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect()
}

/// Strings shown with `Tj` on a page.
pub fn shown_text(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|o| o.as_str().ok())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

/// Whether a page draws an image XObject.
pub fn has_image(doc: &Document, page_id: ObjectId) -> bool {
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content.operations.iter().any(|op| op.operator == "Do")
}
