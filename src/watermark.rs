/// Watermark markup shared by image capture and the HTML snapshot builder

use crate::WatermarkConfig;

/// Inline CSS for the watermark. `position` is `absolute` when overlaid on
/// a captured element and `fixed` in exported HTML documents.
pub fn watermark_style(position: &str, color: &str, config: &WatermarkConfig) -> String {
    format!(
        "position: {}; bottom: 8px; right: 12px; font-size: 10px; color: {}; pointer-events: none; font-family: {};",
        position, color, config.font_family
    )
}

/// `rendered by <a ...>site</a>`
pub fn watermark_inner_html(config: &WatermarkConfig) -> String {
    format!(
        "{} <a href=\"{}\" style=\"color: inherit; text-decoration: none;\">{}</a>",
        config.label, config.href, config.link_text
    )
}

/// Complete fixed-position watermark block for standalone documents
pub fn watermark_block(color: &str, config: &WatermarkConfig) -> String {
    format!(
        "<div style=\"{}\">{}</div>",
        watermark_style("fixed", color, config),
        watermark_inner_html(config)
    )
}
