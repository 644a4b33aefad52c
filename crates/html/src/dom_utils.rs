use crate::Node;

fn is_heading(name: &str) -> bool {
    let b = name.as_bytes();
    b.len() == 2 && (b[0] | 0x20) == b'h' && (b'1'..=b'6').contains(&b[1])
}

/// Heading level for `h1`..`h6`.
pub fn heading_level(node: &Node) -> Option<u8> {
    let name = node.element_name()?;
    is_heading(name).then(|| name.as_bytes()[1] - b'0')
}

pub fn is_blockish(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "details"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "figure"
            | "footer"
            | "form"
            | "header"
            | "hr"
            | "html"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "tr"
            | "ul"
    ) || is_heading(name)
}

#[inline]
fn is_ascii_ws(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'\t' | b'\r')
}

/// Concatenation of every descendant text node, like the DOM's `textContent`.
pub fn text_content(node: &Node) -> String {
    fn walk(node: &Node, out: &mut String) {
        match node {
            Node::Text { text, .. } => out.push_str(text),
            _ => {
                for c in node.children() {
                    walk(c, out);
                }
            }
        }
    }

    let mut out = String::new();
    walk(node, &mut out);
    out
}

/// Number of whitespace-separated words. Empty or blank text counts as one word, matching
/// how a split of the trimmed text yields a single empty item.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count().max(1)
}

pub fn collect_visible_text(node: &Node, out: &mut String) {
    fn push_block_break(out: &mut String) {
        if out.is_empty() {
            return;
        }
        while out.as_bytes().last().is_some_and(|b| is_ascii_ws(*b)) {
            out.pop();
        }
        out.push_str("\n\n");
    }

    match node {
        Node::Text { text, .. } => {
            let t = text.trim();
            if !t.is_empty() {
                if out.as_bytes().last().is_some_and(|b| !is_ascii_ws(*b)) {
                    out.push(' ');
                }
                out.push_str(t);
            }
        }
        Node::Element { name, children, .. } => {
            if name == "script" || name == "style" {
                return;
            }
            for c in children {
                collect_visible_text(c, out);
            }
            if is_blockish(name) {
                push_block_break(out);
            }
        }
        Node::Document { children, .. } => {
            for c in children {
                collect_visible_text(c, out);
            }
        }
        Node::Comment { .. } => {}
    }
}

/// Visible text with block breaks as `\n\n`, trimmed at both ends.
pub fn collect_visible_text_string(root: &Node) -> String {
    let mut out = String::new();
    collect_visible_text(root, &mut out);
    out.trim_matches(|c: char| c.is_ascii_whitespace()).to_string()
}
