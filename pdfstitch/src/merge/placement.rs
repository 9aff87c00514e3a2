//! Page geometry for generated pages.

/// A4 page width in points.
pub const A4_WIDTH: f32 = 595.0;
/// A4 page height in points.
pub const A4_HEIGHT: f32 = 842.0;

/// Where an image lands on a page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
}

/// Scale an image uniformly to fit inside the page and center it.
///
/// The image may be scaled up or down; its aspect ratio is preserved and
/// the margins on the constrained axis are zero.
pub fn fit_and_center(image_w: f32, image_h: f32, page_w: f32, page_h: f32) -> Placement {
    let scale = (page_w / image_w).min(page_h / image_h);
    let width = image_w * scale;
    let height = image_h * scale;

    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}
