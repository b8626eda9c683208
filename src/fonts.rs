/// Built-in font catalog for exported papers

pub const SYSTEM_STACK: &str =
    "system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";

const FONTS: &[(&str, &str)] = &[
    ("inter", "'Inter', system-ui, -apple-system, sans-serif"),
    ("system", SYSTEM_STACK),
    ("serif", "Georgia, Cambria, 'Times New Roman', serif"),
    ("georgia", "Georgia, serif"),
    ("mono", "ui-monospace, SFMono-Regular, Menlo, Consolas, monospace"),
    ("jetbrains-mono", "'JetBrains Mono', ui-monospace, monospace"),
    ("ibm-plex-mono", "'IBM Plex Mono', ui-monospace, monospace"),
    ("fira-code", "'Fira Code', ui-monospace, monospace"),
];

/// Resolve a font id to a CSS `font-family` value. Unknown ids get the
/// system stack.
pub fn font_family(id: &str) -> &'static str {
    FONTS
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, family)| *family)
        .unwrap_or(SYSTEM_STACK)
}

pub fn font_ids() -> impl Iterator<Item = &'static str> {
    FONTS.iter().map(|(id, _)| *id)
}
