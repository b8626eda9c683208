//! Theme configuration, dark/light detection and theme CSS generation.
//!
//! Themes are owned by the caller; this module only derives values from
//! them. The dark/light decision is shared by image capture and the HTML
//! snapshot builder so both pick the same watermark color.

use serde::{Deserialize, Serialize};

/// Watermark color used on dark backgrounds
pub const LIGHT_WATERMARK: &str = "rgba(255, 255, 255, 0.3)";
/// Watermark color used on light backgrounds
pub const DARK_WATERMARK: &str = "rgba(0, 0, 0, 0.3)";

/// Theme ids containing any of these are treated as dark when the
/// background color is not a hex value.
pub const DARK_KEYWORDS: [&str; 4] = ["dark", "terminal", "sepia", "nord"];

/// A named set of colors controlling exported appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    /// Semantic identifier, e.g. `"github-dark"`
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Hex color (`#rrggbb`) or a named token
    pub background_color: String,
    /// Body text color
    #[serde(default = "default_text_color")]
    pub text_color: String,
    /// Background for `pre` blocks; derived from the background when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_background: Option<String>,
    /// Explicit darkness flag. Overrides the heuristic when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<bool>,
}

fn default_text_color() -> String {
    "#1f2328".to_string()
}

impl ThemeConfig {
    pub fn new(id: &str, background_color: &str, text_color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            background_color: background_color.to_string(),
            text_color: text_color.to_string(),
            code_background: None,
            dark: None,
        }
    }

    pub fn is_dark(&self) -> bool {
        is_dark_theme(self)
    }

    pub fn watermark_color(&self) -> &'static str {
        watermark_color(self)
    }
}

/// Decide whether a theme is dark.
///
/// An explicit `dark` flag wins. Otherwise a `#`-prefixed background is dark
/// when its red channel (the first two hex digits, parsed as far as they are
/// valid hex) is below 128; a background whose red channel cannot be parsed
/// counts as light. Non-hex backgrounds fall back to keyword matching on the
/// theme id.
pub fn is_dark_theme(theme: &ThemeConfig) -> bool {
    if let Some(dark) = theme.dark {
        return dark;
    }
    match theme.background_color.strip_prefix('#') {
        Some(hex) => red_channel(hex).map(|r| r < 128).unwrap_or(false),
        None => DARK_KEYWORDS.iter().any(|k| theme.id.contains(k)),
    }
}

/// Leading hex digits of the first two characters, e.g. `"1e"` -> 30,
/// `"0g"` -> 0, `"zz"` -> None.
fn red_channel(hex: &str) -> Option<u32> {
    let digits: String = hex
        .chars()
        .take(2)
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    u32::from_str_radix(&digits, 16).ok()
}

/// Semi-transparent white on dark themes, semi-transparent black otherwise
pub fn watermark_color(theme: &ThemeConfig) -> &'static str {
    if is_dark_theme(theme) {
        LIGHT_WATERMARK
    } else {
        DARK_WATERMARK
    }
}

/// CSS for an exported paper in the given theme
pub fn theme_styles(theme: &ThemeConfig) -> String {
    let dark = is_dark_theme(theme);
    let code_bg = theme.code_background.clone().unwrap_or_else(|| {
        if dark { "rgba(255, 255, 255, 0.06)" } else { "rgba(0, 0, 0, 0.04)" }.to_string()
    });
    let border = if dark { "rgba(255, 255, 255, 0.15)" } else { "rgba(0, 0, 0, 0.12)" };
    let muted = if dark { "rgba(255, 255, 255, 0.65)" } else { "rgba(0, 0, 0, 0.6)" };

    format!(
        "body {{ background-color: {bg}; color: {fg}; margin: 0 auto; max-width: 800px; padding: 48px 32px; line-height: 1.6; }}
		h1, h2, h3, h4, h5, h6 {{ color: {fg}; line-height: 1.25; }}
		a {{ color: inherit; text-decoration: underline; }}
		blockquote {{ border-left: 3px solid {border}; color: {muted}; margin: 0; padding-left: 16px; }}
		pre {{ background-color: {code_bg}; border-radius: 6px; padding: 16px; white-space: pre-wrap; word-break: break-word; }}
		code {{ font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 0.9em; }}
		table {{ border-collapse: collapse; }}
		th, td {{ border: 1px solid {border}; padding: 6px 12px; }}
		hr {{ border: none; border-top: 1px solid {border}; }}",
        bg = theme.background_color,
        fg = theme.text_color,
    )
}

/// Themes shipped with the crate
pub fn builtin_themes() -> Vec<ThemeConfig> {
    let mut sepia = ThemeConfig::new("sepia", "#f4ecd8", "#5b4636");
    sepia.name = "Sepia".into();
    let mut terminal = ThemeConfig::new("terminal", "black", "#33ff66");
    terminal.name = "Terminal".into();
    let mut nord = ThemeConfig::new("nord", "#2e3440", "#d8dee9");
    nord.name = "Nord".into();
    nord.code_background = Some("#3b4252".into());
    let mut light = ThemeConfig::new("light", "#ffffff", "#1f2328");
    light.name = "Light".into();
    let mut dark = ThemeConfig::new("dark", "#0d1117", "#e6edf3");
    dark.name = "Dark".into();
    let mut paper = ThemeConfig::new("paper", "ivory", "#222222");
    paper.name = "Paper".into();
    vec![light, dark, sepia, terminal, nord, paper]
}

pub fn find_theme(id: &str) -> Option<ThemeConfig> {
    builtin_themes().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(id: &str, bg: &str) -> ThemeConfig {
        ThemeConfig::new(id, bg, "#000")
    }

    #[test]
    fn hex_background_uses_red_channel() {
        assert!(is_dark_theme(&theme("light", "#7fffff")));
        assert!(!is_dark_theme(&theme("dark", "#80ffff")));
        assert!(is_dark_theme(&theme("x", "#0d1117")));
    }

    #[test]
    fn malformed_hex_counts_as_light() {
        assert!(!is_dark_theme(&theme("dark", "#zz0000")));
        assert!(!is_dark_theme(&theme("dark", "#")));
        // only the valid prefix is parsed
        assert!(is_dark_theme(&theme("x", "#0g0000")));
        assert!(is_dark_theme(&theme("x", "#f")));
    }

    #[test]
    fn named_background_falls_back_to_keywords() {
        for id in ["dark", "solarized-dark", "terminal", "sepia", "nord"] {
            assert!(is_dark_theme(&theme(id, "black")), "{id}");
        }
        assert!(!is_dark_theme(&theme("paper", "black")));
        assert!(!is_dark_theme(&theme("DARK", "black")));
    }

    #[test]
    fn explicit_flag_overrides_heuristic() {
        let mut t = theme("light", "#ffffff");
        t.dark = Some(true);
        assert_eq!(watermark_color(&t), LIGHT_WATERMARK);
        t.dark = Some(false);
        t.id = "dark".into();
        t.background_color = "black".into();
        assert_eq!(watermark_color(&t), DARK_WATERMARK);
    }

    #[test]
    fn theme_styles_embed_colors() {
        let css = theme_styles(&find_theme("nord").unwrap());
        assert!(css.contains("background-color: #2e3440"));
        assert!(css.contains("#3b4252"));
    }

    #[test]
    fn theme_deserializes_from_camel_case_json() {
        let t: ThemeConfig =
            serde_json::from_str(r##"{"id":"midnight","backgroundColor":"#101010"}"##).unwrap();
        assert!(t.is_dark());
        assert_eq!(t.text_color, "#1f2328");
    }
}
