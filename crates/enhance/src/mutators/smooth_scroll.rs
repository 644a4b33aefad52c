use super::{matching_ids, parse_selector};
use crate::config::SmoothScrollConfig;
use bus::HostCommand;
use html::select::closest;
use html::traverse::walk;
use html::{Id, Node};

pub fn count_anchors(dom: &Node, config: &SmoothScrollConfig) -> usize {
    parse_selector(&config.anchor_selector).map_or(0, |selector| matching_ids(dom, &selector).len())
}

/// First element whose `id` equals `fragment`.
pub fn find_fragment_target(dom: &Node, fragment: &str) -> Option<Id> {
    let mut found = None;
    walk(dom, &mut |node| {
        if found.is_none() && node.attr("id") == Some(fragment) {
            found = Some(node.id());
        }
    });
    found
}

/// Handles a click inside an in-page anchor by asking the host for a smooth scroll and a
/// history entry. Returns true when the default navigation was prevented.
pub fn on_click(
    dom: &Node,
    target: Id,
    config: &SmoothScrollConfig,
    commands: &mut Vec<HostCommand>,
) -> bool {
    if !config.enabled {
        return false;
    }
    let Some(selector) = parse_selector(&config.anchor_selector) else {
        return false;
    };
    let Some(anchor) = closest(dom, target, &selector) else {
        return false;
    };
    let href = anchor.attr("href").unwrap_or_default();
    let fragment = href.strip_prefix('#').unwrap_or_default();
    if fragment.is_empty() {
        return false;
    }
    let Some(section) = find_fragment_target(dom, fragment) else {
        log::debug!(target: "enhance.scroll", "no element with id {fragment:?}");
        return false;
    };
    commands.push(HostCommand::ScrollIntoView {
        target: section,
        smooth: true,
    });
    commands.push(HostCommand::PushHistory {
        fragment: href.to_string(),
    });
    true
}
