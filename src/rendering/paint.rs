/// Paint command list produced from a page layout

use super::layout::{BlockKind, PageLayout, CHAR_W, LINE_H};
use crate::color::Rgba;

const CODE_TINT: Rgba = Rgba { r: 127, g: 127, b: 127, a: 38 };

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    /// Greeked text: one filled cell per visible character
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
}

/// Build paint commands for `layout` over `background`.
///
/// Text without an explicit color is drawn black on light backgrounds and
/// white on dark or transparent ones.
pub fn paint_layout(layout: &PageLayout, background: Option<Rgba>) -> Vec<PaintCommand> {
    let mut cmds = Vec::new();
    if let Some(bg) = background {
        cmds.push(PaintCommand::SolidRect {
            x: 0,
            y: 0,
            width: layout.width,
            height: layout.height,
            rgba: bg,
        });
    }
    let default_text = match background {
        Some(bg) if bg.a > 0 && bg.luminance() >= 0.5 => Rgba::BLACK,
        _ => Rgba::WHITE,
    };

    for node in &layout.nodes {
        if node.kind == BlockKind::Code {
            cmds.push(PaintCommand::SolidRect {
                x: node.rect.x,
                y: node.rect.y,
                width: node.rect.width,
                height: node.rect.height,
                rgba: CODE_TINT,
            });
        }
        let rgba = node
            .color
            .as_deref()
            .and_then(Rgba::parse)
            .unwrap_or(default_text);
        let line_h = LINE_H * node.scale;
        for (i, line) in node.lines.iter().enumerate() {
            cmds.push(PaintCommand::Text {
                x: node.rect.x + node.padding as i32,
                y: node.rect.y + node.padding as i32 + (i as u32 * line_h) as i32,
                text: line.clone(),
                scale: node.scale,
                rgba,
            });
        }
    }
    cmds
}

/// Cell rectangles covered by a text command, in CSS pixels
pub fn text_cells(x: i32, y: i32, text: &str, scale: u32) -> Vec<(i32, i32, u32, u32)> {
    let cell = (CHAR_W * scale) as i32;
    text.chars()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| {
            (
                x + i as i32 * cell + scale as i32,
                y + scale as i32,
                (CHAR_W - 2) * scale,
                (LINE_H - 2) * scale,
            )
        })
        .collect()
}
