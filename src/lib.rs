//! Paper export utilities
//!
//! Exports a rendered document (a "paper") as a downloadable file:
//!
//! - **Blob download**: arbitrary text wrapped in a transient object URL
//!   ([`download::download_file`])
//! - **Image capture**: a PNG of one element, with code blocks expanded and
//!   an optional watermark ([`capture::capture_element`])
//! - **HTML snapshot**: a standalone HTML document with theme CSS and
//!   metadata ([`html_export::create_html_export`])
//!
//! # Example
//!
//! ```no_run
//! use paperexport::{dom::Document, download::MemorySink, theme, PaperExporter};
//!
//! # async fn run() -> paperexport::Result<()> {
//! let mut doc = Document::parse(r#"<div id="paper"><h1>Notes</h1><pre>fn main() {}</pre></div>"#);
//! let theme = theme::find_theme("nord").unwrap();
//!
//! let mut exporter = PaperExporter::new(MemorySink::new());
//! let html = exporter.create_html_export(&doc.outer_html(doc.root()), "inter", &theme, true);
//! exporter.download_file(&html, "text/html", "notes.html")?;
//! let png = exporter.capture(&mut doc, "paper", &theme.background_color, true, Some(&theme)).await?;
//! assert!(png.is_some());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod color;
pub mod dom;
pub mod download;
pub mod fonts;
pub mod html_export;
pub mod rendering;
pub mod style;
pub mod theme;
pub mod watermark;

pub use capture::{capture_element, CaptureRequest};
pub use download::{download_file, BlobStore, DirectorySink, Download, DownloadSink, MemorySink};
pub use html_export::create_html_export;
pub use rendering::{Canvas, RasterOptions, Rasterizer};
pub use theme::ThemeConfig;

#[cfg(feature = "raster")]
pub use rendering::BlockRasterizer;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by all export operations
///
/// Defaults reproduce the paper.tsbin.tech exports:
///
/// ```
/// let cfg = paperexport::ExportConfig::default();
/// assert_eq!(cfg.default_title, "Paper Export");
/// assert_eq!(cfg.description_limit, 160);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Captured images are named `<prefix>-<millis>.png`
    pub filename_prefix: String,
    /// Tags treated as code blocks during capture
    pub code_block_tags: Vec<String>,
    pub watermark: WatermarkConfig,
    /// `<meta name="generator">` content
    pub generator: String,
    /// `og:site_name` content
    pub site_name: String,
    /// Title used when the content has no plain-text `<h1>`
    pub default_title: String,
    /// Description used when the content has no plain-text `<p>`
    pub default_description: String,
    /// Maximum description length in characters
    pub description_limit: usize,
    /// Syntax-highlighting stylesheet linked from HTML exports
    pub highlight_stylesheet: String,
    /// Base rasterizer options; the background color is set per capture
    pub raster: RasterOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "paper".to_string(),
            code_block_tags: vec!["pre".to_string()],
            watermark: WatermarkConfig::default(),
            generator: "paper.tsbin.tech".to_string(),
            site_name: "paper".to_string(),
            default_title: "Paper Export".to_string(),
            default_description: "Document created with tsbin paper".to_string(),
            description_limit: 160,
            highlight_stylesheet:
                "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css"
                    .to_string(),
            raster: RasterOptions::default(),
        }
    }
}

impl ExportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        download::validate_filename(&format!("{}-0.png", self.filename_prefix))
            .map_err(|_| Error::ConfigError(format!("bad filename_prefix {:?}", self.filename_prefix)))?;
        if self.raster.window_width == 0 {
            return Err(Error::ConfigError("raster.windowWidth must be non-zero".into()));
        }
        rendering::device_size(self.raster.window_width, 1, self.raster.scale)
            .map_err(|e| Error::ConfigError(format!("raster: {}", e)))?;
        Ok(())
    }
}

/// Attribution overlay text and link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub label: String,
    pub link_text: String,
    pub href: String,
    pub font_family: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            label: "rendered by".to_string(),
            link_text: "paper.tsbin.tech".to_string(),
            href: "https://paper.tsbin.tech".to_string(),
            font_family: "system-ui, -apple-system, sans-serif".to_string(),
        }
    }
}

/// Font and theme lookups used by the HTML snapshot builder
pub trait StyleProvider: Send + Sync {
    /// CSS `font-family` value for a font id
    fn font_family(&self, font_id: &str) -> String;

    /// CSS rules for a theme
    fn theme_styles(&self, theme: &ThemeConfig) -> String;
}

/// The built-in font catalog and theme CSS
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyles;

impl StyleProvider for DefaultStyles {
    fn font_family(&self, font_id: &str) -> String {
        fonts::font_family(font_id).to_string()
    }

    fn theme_styles(&self, theme: &ThemeConfig) -> String {
        theme::theme_styles(theme)
    }
}

/// Runs the export operations against one configuration, rasterizer,
/// style provider and download sink
pub struct PaperExporter<S: DownloadSink> {
    config: ExportConfig,
    rasterizer: Box<dyn Rasterizer>,
    styles: Box<dyn StyleProvider>,
    blobs: BlobStore,
    sink: S,
}

impl<S: DownloadSink> PaperExporter<S> {
    /// Exporter with the default configuration and the bundled rasterizer
    #[cfg(feature = "raster")]
    pub fn new(sink: S) -> Self {
        Self::with_rasterizer(sink, Box::new(BlockRasterizer::new()))
    }

    pub fn with_rasterizer(sink: S, rasterizer: Box<dyn Rasterizer>) -> Self {
        Self {
            config: ExportConfig::default(),
            rasterizer,
            styles: Box::new(DefaultStyles),
            blobs: BlobStore::new(),
            sink,
        }
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_styles(mut self, styles: Box<dyn StyleProvider>) -> Self {
        self.styles = styles;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// See [`download::download_file`]
    pub fn download_file(&mut self, content: &str, mime: &str, filename: &str) -> Result<()> {
        download::download_file(&mut self.blobs, &mut self.sink, content, mime, filename)
    }

    /// See [`capture::capture_element`]
    pub async fn capture(
        &mut self,
        doc: &mut dom::Document,
        element_id: &str,
        background_color: &str,
        include_watermark: bool,
        theme: Option<&ThemeConfig>,
    ) -> Result<Option<String>> {
        let request = CaptureRequest {
            element_id,
            background_color,
            include_watermark,
            theme,
        };
        capture::capture_element(doc, &request, self.rasterizer.as_ref(), &mut self.sink, &self.config).await
    }

    /// See [`html_export::create_html_export`]
    pub fn create_html_export(
        &self,
        content: &str,
        font_id: &str,
        theme: &ThemeConfig,
        include_watermark: bool,
    ) -> String {
        html_export::create_html_export(
            content,
            font_id,
            theme,
            include_watermark,
            self.styles.as_ref(),
            &self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.filename_prefix, "paper");
        assert_eq!(config.code_block_tags, vec!["pre".to_string()]);
        assert_eq!(config.raster.scale, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_config() {
        let config = ExportConfig::from_json_str(
            r#"{"filename_prefix":"notes","watermark":{"label":"made with"},"raster":{"windowWidth":640}}"#,
        )
        .unwrap();
        assert_eq!(config.filename_prefix, "notes");
        assert_eq!(config.watermark.label, "made with");
        assert_eq!(config.watermark.href, "https://paper.tsbin.tech");
        assert_eq!(config.raster.window_width, 640);
        assert!(config.raster.use_cors);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ExportConfig::from_json_str(r#"{"filename_prefix":"a/b"}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            ExportConfig::from_json_str(r#"{"raster":{"scale":0}}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(ExportConfig::from_json_str("{"), Err(Error::ConfigError(_))));
        assert!(matches!(
            ExportConfig::from_json_str(r#"{"raster":{"scale":1e9}}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            ExportConfig::from_json_str(r#"{"raster":{"windowWidth":8192,"scale":4}}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(ExportConfig::from_json_str(r#"{"raster":{"windowWidth":1600,"scale":2}}"#).is_ok());
    }
}
