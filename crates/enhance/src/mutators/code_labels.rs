use super::{matching_ids, parse_selector};
use crate::config::CodeLabelsConfig;
use html::traverse::{find_node_by_id, find_node_by_id_mut, find_parent, insert_before, previous_element_sibling};
use html::Node;

const LABEL_CLASS: &str = "code-label";

/// Language named by the first `language-<word>` in a class attribute.
pub fn language_of(class: &str) -> Option<&str> {
    let start = class.find("language-")? + "language-".len();
    let rest = &class[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Labels highlighted code blocks with their language. Returns the number of labels added.
pub fn apply(dom: &mut Node, config: &CodeLabelsConfig) -> usize {
    let Some(selector) = parse_selector(&config.selector) else {
        return 0;
    };

    let mut added = 0;
    for code in matching_ids(dom, &selector) {
        let Some(node) = find_node_by_id(dom, code) else {
            continue;
        };
        let Some(language) = node.attr("class").and_then(language_of) else {
            continue;
        };
        let text = language.to_uppercase();
        if previous_element_sibling(dom, code).is_some_and(|n| n.has_class(LABEL_CLASS)) {
            continue;
        }
        let Some(parent) = find_parent(dom, code).map(|(p, _)| p.id()) else {
            continue;
        };

        let label = Node::element("div")
            .with_attr("class", LABEL_CLASS)
            .with_style("position", "absolute")
            .with_style("top", "0.5rem")
            .with_style("right", "3rem")
            .with_style("font-size", "0.75rem")
            .with_style("color", "var(--md-default-fg-color--light)")
            .with_style("opacity", "0.6")
            .with_child(Node::text(&text));
        if insert_before(dom, code, label).is_none() {
            continue;
        }
        if let Some(parent) = find_node_by_id_mut(dom, parent) {
            parent.set_style("position", "relative");
        }
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{parse_document, query_all, to_html};

    #[test]
    fn language_parsing() {
        assert_eq!(language_of("language-rust"), Some("rust"));
        assert_eq!(language_of("highlight language-py3 extra"), Some("py3"));
        assert_eq!(language_of("language-c++"), Some("c"));
        assert_eq!(language_of("language-"), None);
        assert_eq!(language_of("plain"), None);
    }

    #[test]
    fn labels_are_inserted_before_code() {
        let mut dom = parse_document(
            r#"<pre><code class="language-python">print()</code></pre><pre><code>plain</code></pre>"#,
        );
        assert_eq!(apply(&mut dom, &CodeLabelsConfig::default()), 1);
        let pres = query_all(&dom, "pre");
        assert_eq!(
            to_html(pres[0]),
            r#"<pre style="position: relative"><div class="code-label" style="position: absolute; top: 0.5rem; right: 3rem; font-size: 0.75rem; color: var(--md-default-fg-color--light); opacity: 0.6">PYTHON</div><code class="language-python">print()</code></pre>"#
        );
        assert_eq!(to_html(pres[1]), "<pre><code>plain</code></pre>");
    }

    #[test]
    fn relabeling_is_a_no_op() {
        let mut dom = parse_document(r#"<pre><code class="language-rust">fn x() {}</code></pre>"#);
        let config = CodeLabelsConfig::default();
        apply(&mut dom, &config);
        let once = to_html(&dom);
        assert_eq!(apply(&mut dom, &config), 0);
        assert_eq!(to_html(&dom), once);
    }
}
