//! One-shot page mutators and the interaction handlers they install.
//!
//! Every mutator is idempotent: running it again over an already enhanced page changes
//! nothing. Missing targets are not errors; the mutator simply does less.
pub mod back_to_top;
pub mod code_labels;
pub mod copy_feedback;
pub mod external_links;
pub mod reading_time;
pub mod shortcuts;
pub mod smooth_scroll;
pub mod version_badge;

use crate::config::EnhanceConfig;
use html::select::select_all;
use html::traverse::path_to;
use html::{Id, Node, Selector};

/// What the ready-time mutators changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationReport {
    pub external_links: usize,
    pub copy_buttons: usize,
    pub smooth_anchors: usize,
    pub version_badge: bool,
    pub code_labels: usize,
    /// Minutes shown in the inserted banner.
    pub reading_minutes: Option<u32>,
    pub back_to_top: Option<Id>,
}

/// Runs the stateless mutators in page order. Stateful ones (copy feedback, back to top) are
/// installed by the page host, which owns their state.
pub fn apply_static(dom: &mut Node, config: &EnhanceConfig, page_host: Option<&str>) -> MutationReport {
    let mut report = MutationReport::default();
    if config.external_links.enabled {
        report.external_links = external_links::apply(dom, &config.external_links, page_host);
    }
    if config.smooth_scroll.enabled {
        report.smooth_anchors = smooth_scroll::count_anchors(dom, &config.smooth_scroll);
    }
    report.version_badge = version_badge::apply(dom, &config.version_badge);
    if config.code_labels.enabled {
        report.code_labels = code_labels::apply(dom, &config.code_labels);
    }
    if config.reading_time.enabled {
        report.reading_minutes =
            reading_time::apply(dom, &config.content_selector, &config.reading_time);
    }
    report
}

pub(crate) fn parse_selector(source: &str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(err) => {
            log::debug!(target: "enhance.mutators", "{err}");
            None
        }
    }
}

/// Ids of every element matching `selector`, in document order.
pub(crate) fn matching_ids(dom: &Node, selector: &Selector) -> Vec<Id> {
    select_all(dom, selector).iter().map(|n| n.id()).collect()
}

/// Whether `target` is `container` or one of its descendants.
pub(crate) fn is_inside(dom: &Node, target: Id, container: Id) -> bool {
    path_to(dom, target).is_some_and(|path| path.iter().any(|n| n.id() == container))
}
