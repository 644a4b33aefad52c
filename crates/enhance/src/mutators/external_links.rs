use super::{matching_ids, parse_selector};
use crate::config::ExternalLinksConfig;
use html::traverse::{append_child, find_node_by_id, find_node_by_id_mut};
use html::Node;
use url::Url;

/// Whether `href` points off-site. A link is external when its host does not contain the
/// page host; without a page host every absolute link is external.
pub fn is_external(href: &str, page_host: Option<&str>) -> Option<bool> {
    let url = Url::parse(href).ok()?;
    let host = url.host_str()?;
    Some(match page_host {
        Some(page) if !page.is_empty() => !host.contains(page),
        _ => true,
    })
}

/// Opens external links in a new tab and marks them with an icon. Returns the number of
/// links that gained the icon.
pub fn apply(dom: &mut Node, config: &ExternalLinksConfig, page_host: Option<&str>) -> usize {
    let Some(selector) = parse_selector(&config.selector) else {
        return 0;
    };

    let mut decorated = 0;
    for id in matching_ids(dom, &selector) {
        let Some(link) = find_node_by_id(dom, id) else {
            continue;
        };
        let href = link.attr("href").unwrap_or_default();
        match is_external(href, page_host) {
            Some(true) => {}
            Some(false) => continue,
            None => {
                log::debug!(target: "enhance.links", "leaving unparseable href {href:?}");
                continue;
            }
        }
        let has_icon = link.children().iter().any(|c| c.has_class(&config.icon_class));

        if let Some(link) = find_node_by_id_mut(dom, id) {
            link.set_attr("target", "_blank");
            link.set_attr("rel", "noopener noreferrer");
        }
        if has_icon {
            continue;
        }
        let icon = Node::element("span")
            .with_attr("class", &config.icon_class)
            .with_style("font-size", "0.8em")
            .with_style("vertical-align", "super")
            .with_child(Node::text(&config.icon_text));
        if append_child(dom, id, icon).is_some() {
            decorated += 1;
        }
    }
    if decorated > 0 {
        log::debug!(target: "enhance.links", "decorated {decorated} external links");
    }
    decorated
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{parse_document, query_all, to_html};

    const LINKS: &str = r#"<p>
        <a href="https://github.com/org/repo">GitHub</a>
        <a href="https://docs.example.com/guide/">Same site</a>
        <a href="http://">Broken</a>
        <a href="/relative/">Relative</a>
    </p>"#;

    #[test]
    fn host_check() {
        assert_eq!(is_external("https://github.com/x", Some("docs.example.com")), Some(true));
        assert_eq!(
            is_external("https://docs.example.com/a", Some("docs.example.com")),
            Some(false)
        );
        assert_eq!(is_external("https://github.com/x", None), Some(true));
        assert_eq!(is_external("https://github.com/x", Some("")), Some(true));
        assert_eq!(is_external("http://", Some("x")), None);
    }

    #[test]
    fn only_off_site_links_are_decorated() {
        let mut dom = parse_document(LINKS);
        let n = apply(&mut dom, &ExternalLinksConfig::default(), Some("docs.example.com"));
        assert_eq!(n, 1);

        let links = query_all(&dom, "a");
        assert_eq!(links[0].attr("target"), Some("_blank"));
        assert_eq!(links[0].attr("rel"), Some("noopener noreferrer"));
        assert_eq!(
            to_html(&links[0].children()[1]),
            r#"<span class="external-icon" style="font-size: 0.8em; vertical-align: super"> ↗</span>"#
        );
        assert_eq!(links[1].attr("target"), None);
        assert_eq!(links[2].attr("target"), None);
        assert_eq!(links[3].attr("target"), None);
    }

    #[test]
    fn running_twice_adds_one_icon() {
        let mut dom = parse_document(LINKS);
        let config = ExternalLinksConfig::default();
        apply(&mut dom, &config, Some("docs.example.com"));
        let once = to_html(&dom);
        assert_eq!(apply(&mut dom, &config, Some("docs.example.com")), 0);
        assert_eq!(to_html(&dom), once);
    }
}
