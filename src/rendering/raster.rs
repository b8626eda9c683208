/// Wireframe rasterizer: layout, paint and PNG encoding

use super::layout::layout_element;
use super::paint::{paint_layout, text_cells, PaintCommand};
use super::{device_size, Canvas, RasterOptions, Rasterizer};
use crate::color::Rgba;
use crate::dom::{Document, NodeId};
use crate::{Error, Result};
use futures::future::BoxFuture;
use image::{ImageFormat, Rgba as Pixel, RgbaImage};
use std::io::Cursor;

/// Bundled `Rasterizer` producing block wireframes of the element
#[derive(Debug, Clone, Default)]
pub struct BlockRasterizer;

impl BlockRasterizer {
    pub fn new() -> Self {
        BlockRasterizer
    }

    /// Synchronous rendering path behind `Rasterizer::rasterize`
    pub fn render(&self, doc: &Document, element: NodeId, options: &RasterOptions) -> Result<Canvas> {
        if !doc.is_connected(element) {
            return Err(Error::RenderError("element is not attached to the document".into()));
        }
        let background = match options.background_color.as_deref() {
            Some(c) => Some(Rgba::parse(c).ok_or_else(|| {
                Error::RenderError(format!("unsupported background color: {}", c))
            })?),
            None => None,
        };
        device_size(options.window_width, 1, options.scale)?;

        let layout = layout_element(doc, element, options.window_width);
        device_size(layout.width, layout.height, options.scale)?;
        let cmds = paint_layout(&layout, background);
        if options.logging {
            log::debug!(
                "rasterizing {}x{} css px, {} paint commands, scale {}",
                layout.width,
                layout.height,
                cmds.len(),
                options.scale
            );
        }

        let img = rasterize_commands(&cmds, layout.width, layout.height, options.scale);
        let (width, height) = img.dimensions();
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
        Ok(Canvas::new(width, height, png))
    }
}

impl Rasterizer for BlockRasterizer {
    fn rasterize<'a>(
        &'a self,
        document: &'a Document,
        element: NodeId,
        options: &'a RasterOptions,
    ) -> BoxFuture<'a, Result<Canvas>> {
        let result = self.render(document, element, options);
        Box::pin(futures::future::ready(result))
    }
}

/// Execute paint commands into an RGBA buffer at the given scale
pub fn rasterize_commands(cmds: &[PaintCommand], width: u32, height: u32, scale: f32) -> RgbaImage {
    let sx = |v: u32| ((v as f32) * scale).round().max(1.0) as u32;
    let mut img = RgbaImage::new(sx(width), sx(height));

    for cmd in cmds {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill(&mut img, *x, *y, *width, *height, *rgba, scale);
            }
            PaintCommand::Text { x, y, text, scale: text_scale, rgba } => {
                for (cx, cy, cw, ch) in text_cells(*x, *y, text, *text_scale) {
                    fill(&mut img, cx, cy, cw, ch, *rgba, scale);
                }
            }
        }
    }
    img
}

fn fill(img: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, rgba: Rgba, scale: f32) {
    let to_px = |v: f32| (v * scale).round() as i64;
    let (img_w, img_h) = (img.width() as i64, img.height() as i64);
    let x0 = to_px(x as f32).clamp(0, img_w);
    let y0 = to_px(y as f32).clamp(0, img_h);
    let x1 = to_px(x as f32 + w as f32).clamp(0, img_w);
    let y1 = to_px(y as f32 + h as f32).clamp(0, img_h);

    for py in y0..y1 {
        for px in x0..x1 {
            let dst = *img.get_pixel(px as u32, py as u32);
            let out = if dst[3] == 0 || rgba.a == 255 {
                rgba
            } else {
                rgba.blend_over(Rgba::opaque(dst[0], dst[1], dst[2]))
            };
            img.put_pixel(px as u32, py as u32, Pixel([out.r, out.g, out.b, out.a.max(dst[3])]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper() -> (Document, NodeId) {
        let doc = Document::parse("<body><div id=\"paper\"><h1>Title</h1><p>Body text</p></div></body>");
        let id = doc.get_element_by_id("paper").unwrap();
        (doc, id)
    }

    #[test]
    fn renders_png_with_background() {
        let (doc, el) = paper();
        let opts = RasterOptions {
            background_color: Some("#ffffff".into()),
            window_width: 128,
            ..Default::default()
        };
        let canvas = BlockRasterizer::new().render(&doc, el, &opts).unwrap();
        assert_eq!(canvas.width, 128);
        assert_eq!(&canvas.png_data[1..4], b"PNG");
        let decoded = image::load_from_memory(&canvas.png_data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn scale_multiplies_dimensions() {
        let (doc, el) = paper();
        let opts = RasterOptions {
            window_width: 100,
            scale: 2.0,
            ..Default::default()
        };
        let canvas = BlockRasterizer::new().render(&doc, el, &opts).unwrap();
        assert_eq!(canvas.width, 200);
    }

    #[test]
    fn rejects_unparseable_background() {
        let (doc, el) = paper();
        let opts = RasterOptions {
            background_color: Some("not-a-color".into()),
            ..Default::default()
        };
        assert!(matches!(
            BlockRasterizer::new().render(&doc, el, &opts),
            Err(Error::RenderError(_))
        ));
    }

    #[test]
    fn oversized_canvas_is_an_error() {
        let (doc, el) = paper();
        for opts in [
            RasterOptions { scale: 1e9, ..Default::default() },
            RasterOptions { window_width: 40_000, ..Default::default() },
            RasterOptions { scale: 0.0, ..Default::default() },
        ] {
            assert!(matches!(
                BlockRasterizer::new().render(&doc, el, &opts),
                Err(Error::RenderError(_))
            ));
        }
    }

    #[test]
    fn translucent_fill_blends() {
        let cmds = vec![
            PaintCommand::SolidRect { x: 0, y: 0, width: 4, height: 4, rgba: Rgba::WHITE },
            PaintCommand::SolidRect {
                x: 0,
                y: 0,
                width: 2,
                height: 2,
                rgba: Rgba { r: 0, g: 0, b: 0, a: 128 },
            },
        ];
        let img = rasterize_commands(&cmds, 4, 4, 1.0);
        assert_eq!(img.get_pixel(0, 0).0, [127, 127, 127, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }
}
