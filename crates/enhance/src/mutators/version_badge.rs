use super::parse_selector;
use crate::config::VersionBadgeConfig;
use html::select::select_first;
use html::traverse::append_child;
use html::Node;

const BADGE_CLASS: &str = "md-version";

/// Appends the version badge to the header title. Returns true when a badge was added.
pub fn apply(dom: &mut Node, config: &VersionBadgeConfig) -> bool {
    let Some(label) = config.label.as_deref() else {
        return false;
    };
    let Some(selector) = parse_selector(&config.target_selector) else {
        return false;
    };
    let Some(title) = select_first(dom, &selector) else {
        log::debug!(target: "enhance.badge", "no header title; skipping version badge");
        return false;
    };
    if title.children().iter().any(|c| c.has_class(BADGE_CLASS)) {
        return false;
    }
    let title = title.id();

    let badge = Node::element("span")
        .with_attr("class", BADGE_CLASS)
        .with_style("margin-left", "0.5rem")
        .with_style("font-size", "0.75rem")
        .with_style("opacity", "0.7")
        .with_child(Node::text(label));
    append_child(dom, title, badge).is_some()
}
