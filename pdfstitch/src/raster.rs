//! Image rasterization.
//!
//! Decodes an image input, paints it onto an opaque white canvas scaled by
//! the tier's scale factor and re-encodes the canvas as JPEG. Painting onto
//! white flattens transparency before the lossy encode.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, instrument};

use crate::error::{Result, StitchError};
use crate::input::AccessHandle;
use crate::quality::QualitySettings;

/// Fallback intrinsic size when an image reports no usable dimensions
/// (A4 in points).
pub const DEFAULT_INTRINSIC_SIZE: (u32, u32) = (595, 842);

/// Largest edge a baseline JPEG can encode.
const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

/// Upper bound on the pixel count of a rasterized image. Larger results are
/// scaled down to fit, keeping the aspect ratio.
pub const MAX_OUTPUT_PIXELS: u64 = 50_000_000;

/// A rasterized image ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// JPEG-encoded pixels.
    pub jpeg: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Turns image inputs into [`RasterImage`]s at a fixed quality.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    settings: QualitySettings,
    decode_timeout: Option<Duration>,
}

impl Rasterizer {
    /// Create a rasterizer with no decode time bound.
    pub fn new(settings: QualitySettings) -> Self {
        Self {
            settings,
            decode_timeout: None,
        }
    }

    /// Bound the time spent waiting on one input.
    ///
    /// When the bound is exceeded the input fails with
    /// [`StitchError::DecodeTimeout`], but the decode already running on the
    /// blocking pool is not interrupted and runs to completion in the
    /// background; its result is discarded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.decode_timeout = timeout;
        self
    }

    /// Rasterize the payload behind `handle` on the blocking pool.
    ///
    /// # Errors
    ///
    /// - [`StitchError::AssetDecode`] if the image cannot be decoded or encoded
    /// - [`StitchError::DecodeTimeout`] if the configured bound is exceeded
    pub async fn rasterize(&self, name: &str, handle: &AccessHandle) -> Result<RasterImage> {
        let bytes: Arc<[u8]> = handle.shared_bytes();
        let settings = self.settings;
        let task_name = name.to_string();

        run_bounded(name, self.decode_timeout, move || {
            rasterize_bytes(&task_name, &bytes, settings)
        })
        .await?
        .map_err(|e| StitchError::asset_decode(name, format!("decoder task failed: {e}")))?
    }
}

/// Run `work` on the blocking pool, waiting at most `timeout` for it.
///
/// The outer error is [`StitchError::DecodeTimeout`]; the inner one is the
/// task's join error (a panic inside `work`). On timeout the task is left to
/// finish in the background.
pub(crate) async fn run_bounded<T, F>(
    name: &str,
    timeout: Option<Duration>,
    work: F,
) -> Result<std::result::Result<T, JoinError>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);

    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, task)
            .await
            .map_err(|_| StitchError::DecodeTimeout {
                name: name.to_string(),
                timeout,
            }),
        None => Ok(task.await),
    }
}

/// Decode, flatten onto white, scale and JPEG-encode an image.
#[instrument(skip(bytes, settings), fields(bytes_len = bytes.len()))]
pub fn rasterize_bytes(name: &str, bytes: &[u8], settings: QualitySettings) -> Result<RasterImage> {
    let source = image::load_from_memory(bytes).map_err(|e| StitchError::asset_decode(name, e))?;

    let (intrinsic_w, intrinsic_h) = intrinsic_dimensions(&source);
    let (width, height) = scaled_dimensions(intrinsic_w, intrinsic_h, settings.scale_factor);

    debug!(
        intrinsic_w,
        intrinsic_h,
        width,
        height,
        scale = settings.scale_factor,
        "Rasterizing image"
    );

    let resized = imageops::resize(&source.to_rgba8(), width, height, FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &resized, 0, 0);
    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, settings.jpeg_quality())
        .encode_image(&flattened)
        .map_err(|e| StitchError::asset_decode(name, format!("JPEG encoding failed: {e}")))?;

    debug!(jpeg_bytes = jpeg.len(), "Image rasterized");

    Ok(RasterImage {
        jpeg,
        width,
        height,
    })
}

fn intrinsic_dimensions(image: &DynamicImage) -> (u32, u32) {
    match (image.width(), image.height()) {
        (0, _) | (_, 0) => DEFAULT_INTRINSIC_SIZE,
        dims => dims,
    }
}

/// Intrinsic size times `scale`, at least 1px, within JPEG edge limits and
/// at most [`MAX_OUTPUT_PIXELS`] in total.
fn scaled_dimensions(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    let edge_limit = (f64::from(MAX_JPEG_DIMENSION) / w).min(f64::from(MAX_JPEG_DIMENSION) / h);
    let pixel_limit = (MAX_OUTPUT_PIXELS as f64 / (w * h)).sqrt();

    let scale = f64::from(scale);
    // Rounding up could overshoot the pixel budget, so round down when it binds.
    let pixel_bound = scale > pixel_limit && pixel_limit < edge_limit;
    let scale = scale.min(edge_limit).min(pixel_limit);

    let scaled = |v: f64| {
        let v = v * scale;
        let v = if pixel_bound { v.floor() } else { v.round() };
        (v as u32).clamp(1, MAX_JPEG_DIMENSION)
    };
    (scaled(w), scaled(h))
}
