use super::parse_selector;
use crate::config::ReadingTimeConfig;
use html::dom_utils::{text_content, word_count};
use html::select::{select_first, select_within};
use html::traverse::{insert_before, next_element_sibling};
use html::Node;

const BANNER_CLASS: &str = "reading-time";

/// Whole minutes needed to read `words`, rounded up.
pub fn minutes_for(words: usize, words_per_minute: u32) -> u32 {
    let wpm = words_per_minute.max(1) as usize;
    words.div_ceil(wpm) as u32
}

/// Inserts a reading-time banner right after the content region's first `h1`. Returns the
/// minutes shown, or `None` when nothing was inserted.
pub fn apply(dom: &mut Node, content_selector: &str, config: &ReadingTimeConfig) -> Option<u32> {
    let region = select_first(dom, &parse_selector(content_selector)?)?;
    let h1 = select_within(region, &parse_selector("h1")?).first().map(|n| n.id())?;
    let Some(next) = next_element_sibling(dom, h1) else {
        log::debug!(target: "enhance.reading", "title has no following element; no banner");
        return None;
    };
    if next.has_class(BANNER_CLASS) {
        return None;
    }
    let next = next.id();

    let words = word_count(text_content(region).trim());
    let minutes = minutes_for(words, config.words_per_minute);

    let banner = Node::element("div")
        .with_attr("class", BANNER_CLASS)
        .with_style("color", "var(--md-default-fg-color--light)")
        .with_style("font-size", "0.875rem")
        .with_style("margin-bottom", "1rem")
        .with_child(Node::element("em").with_child(Node::text(&format!("📖 {minutes} min read"))));
    insert_before(dom, next, banner)?;
    log::debug!(target: "enhance.reading", "{words} words, {minutes} min read");
    Some(minutes)
}
