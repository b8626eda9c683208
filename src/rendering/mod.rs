//! Rasterization seam used by image capture.
//!
//! Capture never draws pixels itself: it hands the element to a `Rasterizer`
//! and awaits a `Canvas`. The bundled `BlockRasterizer` (feature `raster`)
//! is a block-level wireframe renderer; embedders with a real browser or
//! layout engine plug in their own implementation.

#[cfg(feature = "raster")]
pub mod layout;
#[cfg(feature = "raster")]
pub mod paint;
#[cfg(feature = "raster")]
pub mod raster;

#[cfg(feature = "raster")]
pub use raster::BlockRasterizer;

use crate::dom::{Document, NodeId};
use crate::{Error, Result};
use base64::Engine as _;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Options handed to the rasterizer for a single capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RasterOptions {
    /// Opaque background painted behind the element; `None` keeps it
    /// transparent
    pub background_color: Option<String>,
    /// Device pixel ratio of the capture
    pub scale: f32,
    /// Whether the rasterizer may emit its own diagnostics
    pub logging: bool,
    /// Allow cross-origin images to taint the canvas
    pub allow_taint: bool,
    /// Request cross-origin images with CORS
    #[serde(rename = "useCORS")]
    pub use_cors: bool,
    /// CSS width of the capture viewport
    pub window_width: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            background_color: None,
            scale: 1.0,
            logging: false,
            allow_taint: true,
            use_cors: true,
            window_width: 816,
        }
    }
}

/// Largest canvas edge, in device pixels
pub const MAX_CANVAS_DIMENSION: u32 = 32_767;
/// Largest canvas area, in device pixels
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// Device-pixel size of a `width` x `height` CSS-pixel area at `scale`.
/// Fails when the scale is not a positive finite number or the result
/// exceeds the canvas limits.
pub fn device_size(width: u32, height: u32, scale: f32) -> Result<(u32, u32)> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(Error::RenderError(format!("invalid scale: {}", scale)));
    }
    let to_px = |v: u32| ((v as f64) * (scale as f64)).round().max(1.0);
    let (w, h) = (to_px(width), to_px(height));
    let max = MAX_CANVAS_DIMENSION as f64;
    if w > max || h > max || w * h > MAX_CANVAS_AREA as f64 {
        return Err(Error::RenderError(format!(
            "canvas of {}x{} device px exceeds the canvas limits",
            w, h
        )));
    }
    Ok((w as u32, h as u32))
}

/// A rasterized element
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, png_data: Vec<u8>) -> Self {
        Self { width, height, png_data }
    }

    /// Serialize as a `data:image/png;base64,...` URL
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }
}

/// Converts a document element into pixels
pub trait Rasterizer: Send + Sync {
    fn rasterize<'a>(
        &'a self,
        document: &'a Document,
        element: NodeId,
        options: &'a RasterOptions,
    ) -> BoxFuture<'a, Result<Canvas>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_capture_configuration() {
        let o = RasterOptions::default();
        assert_eq!(o.scale, 1.0);
        assert!(!o.logging);
        assert!(o.allow_taint);
        assert!(o.use_cors);
    }

    #[test]
    fn data_url_is_base64_png() {
        let c = Canvas::new(1, 1, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(c.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn options_deserialize_with_browser_names() {
        let o: RasterOptions =
            serde_json::from_str(r##"{"backgroundColor":"#fff","useCORS":false}"##).unwrap();
        assert_eq!(o.background_color.as_deref(), Some("#fff"));
        assert!(!o.use_cors);
        assert_eq!(o.scale, 1.0);
    }
}
