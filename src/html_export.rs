//! Standalone HTML snapshot builder.
//!
//! Wraps rendered paper content in a complete HTML document with metadata,
//! font and theme CSS, and an optional watermark. Title and description are
//! pulled out of the content with regular expressions, not an HTML parser:
//! only a heading or paragraph whose inner content is plain text (no nested
//! tags) is recognised, otherwise the configured fallback is used.

use crate::theme::{watermark_color, ThemeConfig};
use crate::watermark::watermark_block;
use crate::{ExportConfig, StyleProvider};
use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<h1(?:\s[^>]*)?>([^<]+)</h1>").expect("static regex"));
static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p(?:\s[^>]*)?>([^<]+)</p>").expect("static regex"));

const FAVICON: &str = "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='0.9em' font-size='90'>\u{1F4C4}</text></svg>";

/// Inner text of the first plain-text `<h1>`, or `fallback`
pub fn extract_title(content: &str, fallback: &str) -> String {
    TITLE_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Inner text of the first plain-text `<p>`, cut to `limit` characters,
/// or `fallback`
pub fn extract_description(content: &str, limit: usize, fallback: &str) -> String {
    DESCRIPTION_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().chars().take(limit).collect())
        .unwrap_or_else(|| fallback.to_string())
}

/// Escape double quotes for use inside a quoted attribute value
pub fn escape_quotes(s: &str) -> String {
    s.replace('"', "&quot;")
}

/// Build a standalone HTML document for `content`.
///
/// Pure string synthesis: equal inputs always give byte-identical output.
pub fn create_html_export(
    content: &str,
    font_id: &str,
    theme: &ThemeConfig,
    include_watermark: bool,
    styles: &dyn StyleProvider,
    config: &ExportConfig,
) -> String {
    let font_family = styles.font_family(font_id);
    let theme_styles = styles.theme_styles(theme);

    let title = extract_title(content, &config.default_title);
    let description = extract_description(
        content,
        config.description_limit,
        &config.default_description,
    );
    let title_attr = escape_quotes(&title);
    let description_attr = escape_quotes(&description);

    let watermark = if include_watermark {
        watermark_block(watermark_color(theme), &config.watermark)
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="UTF-8">
	<meta name="viewport" content="width=device-width, initial-scale=1.0">
	<meta name="generator" content="{generator}">
	<meta name="description" content="{description_attr}">

	<link rel="icon" href="{FAVICON}">

	<meta property="og:type" content="article">
	<meta property="og:title" content="{title_attr}">
	<meta property="og:description" content="{description_attr}">
	<meta property="og:site_name" content="{site_name}">

	<meta name="twitter:card" content="summary">
	<meta name="twitter:title" content="{title_attr}">
	<meta name="twitter:description" content="{description_attr}">

	<title>{title}</title>
	<link rel="stylesheet" href="{highlight}" />
	<style>
		body {{
			font-family: {font_family};
		}}
		{theme_styles}
	</style>
</head>
<body>
{content}
{watermark}
</body>
</html>"#,
        generator = escape_quotes(&config.generator),
        site_name = escape_quotes(&config.site_name),
        highlight = escape_quotes(&config.highlight_stylesheet),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_extraction() {
        assert_eq!(extract_title("<h1>Hello</h1>", "Paper Export"), "Hello");
        assert_eq!(extract_title("<h1 class=\"t\">Hi</h1><h1>Two</h1>", "F"), "Hi");
        assert_eq!(extract_title("<h2>Nope</h2>", "Paper Export"), "Paper Export");
        // nested markup is not understood
        assert_eq!(extract_title("<h1><em>x</em></h1>", "F"), "F");
        assert_eq!(extract_title("<h10>x</h1>", "F"), "F");
    }

    #[test]
    fn description_extraction_truncates() {
        let long = "a".repeat(200);
        let d = extract_description(&format!("<p>{}</p>", long), 160, "F");
        assert_eq!(d.chars().count(), 160);
        assert_eq!(extract_description("<pre>code</pre>", 160, "F"), "F");
        assert_eq!(extract_description("<p id=\"x\">short</p>", 160, "F"), "short");
        let accented = "é".repeat(170);
        let d = extract_description(&format!("<p>{}</p>", accented), 160, "F");
        assert_eq!(d.chars().count(), 160);
    }

    #[test]
    fn quote_escaping() {
        assert_eq!(escape_quotes("say \"hi\""), "say &quot;hi&quot;");
    }
}
