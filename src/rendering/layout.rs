/// Block layout for the wireframe rasterizer
///
/// Stacks leaf blocks (headings, paragraphs, code blocks, list items)
/// vertically using a fixed 8px character cell. Absolutely or fixed
/// positioned children are taken out of flow and anchored to the bottom
/// right of the captured element.

use crate::dom::{Document, NodeData, NodeId};

pub const CHAR_W: u32 = 8;
pub const LINE_H: u32 = 8;
const PAGE_PADDING: u32 = 8;

const LEAF_BLOCKS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "pre", "li", "dt", "dd", "td", "th", "figcaption",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
    Code,
    Overlay,
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub rect: Rect,
    pub padding: u32,
    pub lines: Vec<String>,
    pub kind: BlockKind,
    pub scale: u32,
    /// Inline `color` of the source element, if any
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<LayoutNode>,
}

struct Block {
    node: NodeId,
    kind: BlockKind,
    text: String,
}

/// Lay out `element` at the given CSS width
pub fn layout_element(doc: &Document, element: NodeId, width: u32) -> PageLayout {
    let mut blocks = Vec::new();
    let mut overlays = Vec::new();
    collect_blocks(doc, element, &mut blocks, &mut overlays);

    let content_w = width.saturating_sub(PAGE_PADDING * 2);
    let mut y = PAGE_PADDING;
    let mut nodes = Vec::new();

    for block in blocks {
        let (scale, padding, margin) = match block.kind {
            BlockKind::Heading => (2, 8, 8),
            BlockKind::Code => (1, 8, 8),
            _ => (1, 6, 6),
        };
        let inner_w = content_w.saturating_sub(padding * 2);
        let chars_per_line = ((inner_w / (CHAR_W * scale)) as usize).max(1);

        let lines = if block.kind == BlockKind::Code {
            code_lines(doc, block.node, &block.text, chars_per_line, width)
        } else {
            wrap_words(&block.text, chars_per_line)
        };
        if lines.is_empty() {
            continue;
        }

        let box_h = lines.len() as u32 * LINE_H * scale + padding * 2;
        nodes.push(LayoutNode {
            rect: Rect {
                x: PAGE_PADDING as i32,
                y: y as i32,
                width: content_w,
                height: box_h,
            },
            padding,
            lines,
            kind: block.kind,
            scale,
            color: inline_color(doc, block.node),
        });
        y += box_h + margin;
    }

    let height = (y + PAGE_PADDING).max(LINE_H * 4);

    for overlay in overlays {
        let text = collapse_whitespace(&doc.text_content(overlay));
        if text.is_empty() {
            continue;
        }
        let style = doc.style(overlay);
        let offset = |prop: &str| style.and_then(|s| px(s.get_property(prop))).unwrap_or(0);
        let w = text.chars().count() as u32 * CHAR_W;
        let x = width as i32 - offset("right") as i32 - w as i32;
        let y = height as i32 - offset("bottom") as i32 - LINE_H as i32;
        nodes.push(LayoutNode {
            rect: Rect { x, y, width: w, height: LINE_H },
            padding: 0,
            lines: vec![text],
            kind: BlockKind::Overlay,
            scale: 1,
            color: inline_color(doc, overlay),
        });
    }

    PageLayout { width, height, nodes }
}

fn collect_blocks(doc: &Document, node: NodeId, blocks: &mut Vec<Block>, overlays: &mut Vec<NodeId>) {
    for &child in doc.children(node) {
        match doc.data(child) {
            NodeData::Text(t) => {
                if !t.trim().is_empty() {
                    blocks.push(Block {
                        node,
                        kind: BlockKind::Paragraph,
                        text: t.clone(),
                    });
                }
            }
            NodeData::Element(el) => {
                let position = el.style.get_property("position");
                if position == "absolute" || position == "fixed" {
                    overlays.push(child);
                    continue;
                }
                let tag = el.tag.as_str();
                if matches!(tag, "script" | "style" | "head" | "template") {
                    continue;
                }
                if LEAF_BLOCKS.contains(&tag) {
                    let kind = match tag {
                        "pre" => BlockKind::Code,
                        "h1" | "h2" => BlockKind::Heading,
                        _ => BlockKind::Paragraph,
                    };
                    blocks.push(Block {
                        node: child,
                        kind,
                        text: doc.text_content(child),
                    });
                } else {
                    collect_blocks(doc, child, blocks, overlays);
                }
            }
        }
    }
}

/// Code block lines. Wrapping white-space modes break long lines at the
/// box width; otherwise lines are clipped, at the box when overflow is
/// hidden or scrolled and at the viewport when it is visible.
fn code_lines(doc: &Document, pre: NodeId, text: &str, chars_per_line: usize, page_width: u32) -> Vec<String> {
    let style = doc.style(pre);
    let white_space = style.map(|s| s.get_property("white-space")).unwrap_or("");
    let overflow = style.map(|s| s.get_property("overflow")).unwrap_or("");
    let wraps = matches!(white_space, "pre-wrap" | "pre-line" | "break-spaces" | "normal");

    let mut lines = Vec::new();
    for raw in text.trim_end_matches('\n').split('\n') {
        let chars: Vec<char> = raw.chars().collect();
        if wraps && chars.len() > chars_per_line {
            for chunk in chars.chunks(chars_per_line) {
                lines.push(chunk.iter().collect());
            }
        } else {
            let limit = if overflow == "visible" {
                (page_width / CHAR_W) as usize
            } else {
                chars_per_line
            };
            lines.push(chars.into_iter().take(limit).collect());
        }
    }
    lines
}

fn wrap_words(text: &str, chars_per_line: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.chars().count() + word.chars().count() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(cur);
            cur = word.to_string();
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn inline_color(doc: &Document, node: NodeId) -> Option<String> {
    doc.style(node)
        .map(|s| s.get_property("color"))
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn px(value: &str) -> Option<u32> {
    value.trim().strip_suffix("px")?.trim().parse::<f32>().ok().map(|v| v.max(0.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(html: &str) -> (Document, NodeId) {
        let doc = Document::parse(&format!("<body><div id=\"paper\">{}</div></body>", html));
        let id = doc.get_element_by_id("paper").unwrap();
        (doc, id)
    }

    #[test]
    fn stacks_heading_and_paragraphs() {
        let (doc, el) = paper("<h1>Heading</h1><p>Hello world</p><p>More text</p>");
        let layout = layout_element(&doc, el, 200);
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.nodes[0].kind, BlockKind::Heading);
        assert_eq!(layout.nodes[0].scale, 2);
        assert!(layout.nodes[1].rect.y > layout.nodes[0].rect.y);
        assert!(layout.height > layout.nodes[2].rect.y as u32);
    }

    #[test]
    fn code_blocks_clip_unless_wrapping() {
        let long = "x".repeat(100);
        let (mut doc, el) = paper(&format!("<pre>{}</pre>", long));
        let clipped = layout_element(&doc, el, 200);
        assert_eq!(clipped.nodes[0].lines.len(), 1);
        assert!(clipped.nodes[0].lines[0].len() < 100);

        let pre = doc.elements_by_tag(el, "pre")[0];
        doc.style_mut(pre).unwrap().set_property("white-space", "pre-wrap");
        let wrapped = layout_element(&doc, el, 200);
        assert!(wrapped.nodes[0].lines.len() > 1);
        let total: usize = wrapped.nodes[0].lines.iter().map(|l| l.len()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn positioned_children_anchor_bottom_right() {
        let (doc, el) = paper(
            "<p>Body</p><div style=\"position: absolute; bottom: 8px; right: 12px; color: red\">mark</div>",
        );
        let layout = layout_element(&doc, el, 300);
        let overlay = layout.nodes.iter().find(|n| n.kind == BlockKind::Overlay).unwrap();
        assert_eq!(overlay.rect.x, 300 - 12 - 32);
        assert_eq!(overlay.rect.y, layout.height as i32 - 8 - 8);
        assert_eq!(overlay.color.as_deref(), Some("red"));
    }
}
