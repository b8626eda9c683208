//! Image capture of a document element.
//!
//! Code blocks inside the element are temporarily forced to show their full
//! content, an optional watermark is overlaid, the element is rasterized and
//! the PNG is downloaded. Every mutation is recorded in a `CaptureGuard` and
//! undone when the guard is restored or dropped, so the document comes back
//! unchanged whether rasterization succeeds, fails, panics or the capture
//! future is dropped mid-flight.

use crate::dom::{Document, NodeId};
use crate::download::{download_data_url, DownloadSink};
use crate::rendering::{RasterOptions, Rasterizer};
use crate::theme::{watermark_color, ThemeConfig};
use crate::watermark::{watermark_inner_html, watermark_style};
use crate::{Error, ExportConfig, Result, WatermarkConfig};
use chrono::{DateTime, Utc};

/// Parameters of a single capture
#[derive(Debug, Clone)]
pub struct CaptureRequest<'a> {
    pub element_id: &'a str,
    pub background_color: &'a str,
    /// Only honoured when `theme` is set
    pub include_watermark: bool,
    pub theme: Option<&'a ThemeConfig>,
}

impl<'a> CaptureRequest<'a> {
    pub fn new(element_id: &'a str, background_color: &'a str) -> Self {
        Self {
            element_id,
            background_color,
            include_watermark: true,
            theme: None,
        }
    }

    pub fn with_theme(mut self, theme: &'a ThemeConfig) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn without_watermark(mut self) -> Self {
        self.include_watermark = false;
        self
    }
}

/// Prior values of the properties overridden on one code block
#[derive(Debug, Clone)]
struct StyleSnapshot {
    element: NodeId,
    overflow: String,
    white_space: String,
    word_break: String,
}

/// Scoped record of temporary document mutations
pub struct CaptureGuard<'d> {
    doc: &'d mut Document,
    snapshots: Vec<StyleSnapshot>,
    watermark: Option<NodeId>,
    container_position: Option<(NodeId, String)>,
}

impl<'d> CaptureGuard<'d> {
    pub fn new(doc: &'d mut Document) -> Self {
        Self {
            doc,
            snapshots: Vec::new(),
            watermark: None,
            container_position: None,
        }
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    /// Force code blocks under `element` to render their full content
    pub fn expand_code_blocks(&mut self, element: NodeId, tags: &[String]) {
        for tag in tags {
            for block in self.doc.elements_by_tag(element, tag) {
                if self.snapshots.iter().any(|snap| snap.element == block) {
                    continue;
                }
                let Some(style) = self.doc.style_mut(block) else {
                    continue;
                };
                self.snapshots.push(StyleSnapshot {
                    element: block,
                    overflow: style.get_property("overflow").to_string(),
                    white_space: style.get_property("white-space").to_string(),
                    word_break: style.get_property("word-break").to_string(),
                });
                style.set_property("overflow", "visible");
                style.set_property("white-space", "pre-wrap");
                style.set_property("word-break", "break-word");
            }
        }
    }

    /// Overlay the watermark in the bottom right corner of `element`,
    /// making the element a positioning container if it is not one yet
    pub fn attach_watermark(&mut self, element: NodeId, color: &str, config: &WatermarkConfig) {
        if self.watermark.is_some() {
            return;
        }
        let mark = self.doc.create_element("div");
        self.doc.set_attr(mark, "style", &watermark_style("absolute", color, config));
        self.doc.set_inner_html(mark, &watermark_inner_html(config));

        if let Some(style) = self.doc.style_mut(element) {
            let position = style.get_property("position").to_string();
            if position.is_empty() || position.eq_ignore_ascii_case("static") {
                style.set_property("position", "relative");
                self.container_position = Some((element, position));
            }
        }
        self.doc.append_child(element, mark);
        self.watermark = Some(mark);
    }

    /// Undo every recorded mutation. Safe to call more than once; each
    /// mutation is reverted exactly once.
    pub fn restore(&mut self) {
        for snap in self.snapshots.drain(..).rev() {
            if let Some(style) = self.doc.style_mut(snap.element) {
                style.set_property("overflow", &snap.overflow);
                style.set_property("white-space", &snap.white_space);
                style.set_property("word-break", &snap.word_break);
            }
        }
        if let Some(mark) = self.watermark.take() {
            self.doc.remove(mark);
        }
        if let Some((element, position)) = self.container_position.take() {
            if let Some(style) = self.doc.style_mut(element) {
                style.set_property("position", &position);
            }
        }
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// `<prefix>-<unix millis>.png`
pub fn export_filename(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}.png", prefix, now.timestamp_millis())
}

/// Capture `request.element_id` as a PNG and download it.
///
/// Returns `Ok(None)` without touching the document when no element has
/// that id. On success returns the downloaded filename. Rasterization and
/// download errors are logged and returned after the document has been
/// restored; there is no retry.
pub async fn capture_element(
    doc: &mut Document,
    request: &CaptureRequest<'_>,
    rasterizer: &dyn Rasterizer,
    sink: &mut dyn DownloadSink,
    config: &ExportConfig,
) -> Result<Option<String>> {
    let Some(element) = doc.get_element_by_id(request.element_id) else {
        log::debug!("capture skipped: no element with id {:?}", request.element_id);
        return Ok(None);
    };

    let mut guard = CaptureGuard::new(doc);
    guard.expand_code_blocks(element, &config.code_block_tags);
    if request.include_watermark {
        if let Some(theme) = request.theme {
            guard.attach_watermark(element, watermark_color(theme), &config.watermark);
        }
    }

    let options = RasterOptions {
        background_color: Some(request.background_color.to_string()),
        ..config.raster.clone()
    };

    let outcome = async {
        let canvas = rasterizer.rasterize(guard.document(), element, &options).await?;
        let filename = export_filename(&config.filename_prefix, Utc::now());
        download_data_url(sink, &canvas.to_data_url(), &filename)?;
        Ok::<String, Error>(filename)
    }
    .await;

    guard.restore();

    match outcome {
        Ok(filename) => {
            log::debug!("captured #{} as {}", request.element_id, filename);
            Ok(Some(filename))
        }
        Err(err) => {
            log::error!("Export failed: {}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAGE: &str = r#"<body><div id="paper" style="padding: 4px">
        <pre style="overflow: auto; color: red">a</pre>
        <pre style="white-space: nowrap">b</pre>
    </div></body>"#;

    #[test]
    fn guard_restores_styles_on_drop() {
        let mut doc = Document::parse(PAGE);
        let before = doc.clone();
        let paper = doc.get_element_by_id("paper").unwrap();
        {
            let mut guard = CaptureGuard::new(&mut doc);
            guard.expand_code_blocks(paper, &["pre".to_string()]);
            let pres = guard.document().elements_by_tag(paper, "pre");
            for pre in pres {
                let s = guard.document().style(pre).unwrap();
                assert_eq!(s.get_property("overflow"), "visible");
                assert_eq!(s.get_property("white-space"), "pre-wrap");
                assert_eq!(s.get_property("word-break"), "break-word");
            }
        }
        assert_eq!(doc, before);
    }

    #[test]
    fn watermark_sets_and_restores_position() {
        let mut doc = Document::parse(PAGE);
        let paper = doc.get_element_by_id("paper").unwrap();
        let html_before = doc.outer_html(paper);
        let mut guard = CaptureGuard::new(&mut doc);
        guard.attach_watermark(paper, "rgba(0, 0, 0, 0.3)", &WatermarkConfig::default());
        guard.attach_watermark(paper, "rgba(0, 0, 0, 0.3)", &WatermarkConfig::default());
        {
            let d = guard.document();
            assert_eq!(d.style(paper).unwrap().get_property("position"), "relative");
            let html = d.outer_html(paper);
            assert_eq!(html.matches("rendered by").count(), 1);
            assert!(html.contains("position: absolute;"));
        }
        guard.restore();
        guard.restore();
        drop(guard);
        assert_eq!(doc.outer_html(paper), html_before);
    }

    #[test]
    fn repeated_code_block_tags_restore_once() {
        let mut doc = Document::parse(PAGE);
        let before = doc.clone();
        let paper = doc.get_element_by_id("paper").unwrap();
        {
            let mut guard = CaptureGuard::new(&mut doc);
            guard.expand_code_blocks(paper, &["pre".to_string(), "pre".to_string(), "PRE".to_string()]);
            guard.expand_code_blocks(paper, &["pre".to_string()]);
            assert_eq!(guard.snapshots.len(), 2);
        }
        assert_eq!(doc, before);
        let first = doc.elements_by_tag(paper, "pre")[0];
        assert_eq!(doc.style(first).unwrap().css_text(), "overflow: auto; color: red;");
    }

    #[test]
    fn uppercase_static_position_is_overridden() {
        let mut doc = Document::parse(r#"<div id="paper" style="position: STATIC"></div>"#);
        let paper = doc.get_element_by_id("paper").unwrap();
        {
            let mut guard = CaptureGuard::new(&mut doc);
            guard.attach_watermark(paper, "red", &WatermarkConfig::default());
            assert_eq!(guard.document().style(paper).unwrap().get_property("position"), "relative");
        }
        assert_eq!(doc.style(paper).unwrap().get_property("position"), "STATIC");
    }

    #[test]
    fn positioned_container_is_left_alone() {
        let mut doc = Document::parse(r#"<div id="paper" style="position: absolute"></div>"#);
        let paper = doc.get_element_by_id("paper").unwrap();
        let mut guard = CaptureGuard::new(&mut doc);
        guard.attach_watermark(paper, "red", &WatermarkConfig::default());
        assert_eq!(guard.document().style(paper).unwrap().get_property("position"), "absolute");
    }

    #[test]
    fn filename_uses_millisecond_timestamp() {
        let t = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(export_filename("paper", t), "paper-1700000000123.png");
    }
}
