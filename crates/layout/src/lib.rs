//! Approximate block-flow geometry for a parsed page.
//!
//! This is not a CSS layout engine: every block stacks vertically at full width, inline
//! content wraps at a fixed character width, and headings use a larger line height. That is
//! enough to decide which headings a scroll position brings into view.
use core_types::Rect;
use html::dom_utils::{heading_level, is_blockish, text_content};
use html::traverse::is_non_rendering_element;
use html::{Id, Node};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutMetrics {
    pub viewport_width: f32,
    pub char_width: f32,
    pub line_height: f32,
    /// Vertical space after paragraphs, headings and other leaf blocks.
    pub block_gap: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            viewport_width: 960.0,
            char_width: 8.0,
            line_height: 24.0,
            block_gap: 16.0,
        }
    }
}

impl LayoutMetrics {
    fn chars_per_line(&self) -> usize {
        ((self.viewport_width / self.char_width.max(1.0)) as usize).max(1)
    }

    fn line_height_for(&self, node: &Node) -> f32 {
        let scale = match heading_level(node) {
            Some(1) => 2.0,
            Some(2) => 1.6,
            Some(3) => 1.3,
            _ => 1.0,
        };
        self.line_height * scale
    }
}

#[derive(Debug, Default, Clone)]
pub struct BlockLayout {
    rects: HashMap<Id, Rect>,
    content_height: f32,
}

impl BlockLayout {
    pub fn rect(&self, id: Id) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

pub fn layout_document(root: &Node, metrics: &LayoutMetrics) -> BlockLayout {
    let mut layout = BlockLayout::default();
    let height = layout_block(root, 0.0, metrics, &mut layout);
    layout.content_height = height;
    log::debug!(
        target: "layout",
        "laid out {} boxes, content height {height}px",
        layout.rects.len()
    );
    layout
}

fn collapsed_len(text: &str) -> usize {
    let mut len = 0;
    for (i, word) in text.split_whitespace().enumerate() {
        if i > 0 {
            len += 1;
        }
        len += word.chars().count();
    }
    len
}

fn is_block(node: &Node) -> bool {
    match node {
        Node::Document { .. } => true,
        Node::Element { name, .. } => is_blockish(name),
        _ => false,
    }
}

/// Lays out a block box at `top` and returns its height.
fn layout_block(node: &Node, top: f32, metrics: &LayoutMetrics, out: &mut BlockLayout) -> f32 {
    if is_non_rendering_element(node) {
        return 0.0;
    }

    let height = if node.is_element("pre") {
        let lines = text_content(node).trim_end_matches('\n').lines().count().max(1);
        let height = lines as f32 * metrics.line_height;
        record_inline_descendants(node, top, height, out);
        height + metrics.block_gap
    } else {
        layout_children(node, top, metrics, out)
    };

    if matches!(node, Node::Element { .. }) {
        out.rects.insert(node.id(), Rect::new(top, height));
    }
    height
}

fn layout_children(node: &Node, top: f32, metrics: &LayoutMetrics, out: &mut BlockLayout) -> f32 {
    let line_height = metrics.line_height_for(node);
    let mut y = top;
    let mut run: Vec<&Node> = Vec::new();
    let mut has_inline = false;

    let flush = |run: &mut Vec<&Node>, y: &mut f32, out: &mut BlockLayout| {
        let chars: usize = run
            .iter()
            .map(|n| collapsed_len(&text_content(n)))
            .sum::<usize>()
            + run.len().saturating_sub(1);
        if chars > 0 {
            let lines = chars.div_ceil(metrics.chars_per_line());
            let height = lines as f32 * line_height;
            for n in run.iter() {
                record_inline_descendants(n, *y, height, out);
            }
            *y += height;
        }
        run.clear();
    };

    for child in node.children() {
        if is_block(child) {
            flush(&mut run, &mut y, out);
            y += layout_block(child, y, metrics, out);
        } else if !matches!(child, Node::Comment { .. }) && !is_non_rendering_element(child) {
            has_inline = true;
            run.push(child);
        }
    }
    flush(&mut run, &mut y, out);

    let mut height = y - top;
    if has_inline && height > 0.0 {
        height += metrics.block_gap;
    }
    height
}

/// Inline boxes share the geometry of the line run that contains them.
fn record_inline_descendants(node: &Node, top: f32, height: f32, out: &mut BlockLayout) {
    if let Node::Element { .. } = node {
        out.rects.insert(node.id(), Rect::new(top, height));
    }
    for c in node.children() {
        record_inline_descendants(c, top, height, out);
    }
}
