use crate::Node;
use crate::entities::{escape_attr, escape_text};

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr"
    )
}

fn is_rawtext_element(name: &str) -> bool {
    name == "script" || name == "style"
}

/// Serializes a tree back to markup. Inline style declarations are written as a `style`
/// attribute after the other attributes.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

fn write_node(node: &Node, rawtext: bool, out: &mut String) {
    match node {
        Node::Document {
            doctype, children, ..
        } => {
            if let Some(dt) = doctype {
                out.push_str("<!DOCTYPE ");
                out.push_str(if dt.is_empty() { "html" } else { dt });
                out.push('>');
            }
            for c in children {
                write_node(c, false, out);
            }
        }
        Node::Element {
            name,
            attributes,
            style,
            children,
            ..
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                if let Some(value) = value {
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
            }
            if !style.is_empty() {
                let declarations = style
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                out.push_str(" style=\"");
                escape_attr(&declarations, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(name) {
                return;
            }
            let raw = is_rawtext_element(name);
            for c in children {
                write_node(c, raw, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text { text, .. } => {
            if rawtext {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Node::Comment { text, .. } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_dom, tokenize};

    #[test]
    fn serializes_attributes_styles_and_void_elements() {
        let dom = build_dom(&tokenize(
            r#"<p class="x" hidden style="opacity:0">a &lt; b<br></p>"#,
        ));
        assert_eq!(
            to_html(&dom),
            r#"<p class="x" hidden style="opacity: 0">a &lt; b<br></p>"#
        );
    }

    #[test]
    fn script_bodies_are_not_escaped() {
        let input = "<script>if (a < b && c) {}</script>";
        assert_eq!(to_html(&build_dom(&tokenize(input))), input);
    }

    #[test]
    fn doctype_and_comments_survive() {
        let input = "<!DOCTYPE html><!-- generated --><html></html>";
        assert_eq!(to_html(&build_dom(&tokenize(input))), input);
    }
}
