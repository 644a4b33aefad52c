//! Table-of-contents highlighting driven by viewport position.
mod nav_index;
mod observer;
mod registry;
mod sync;

pub use nav_index::{NavEntry, NavigationIndex};
pub use observer::{ObserverTarget, VisibilityObserver};
pub use registry::{Heading, HeadingRegistry};
pub use sync::{ActiveSectionSync, ClassHighlighter, HighlightSwap, Highlighter, SyncState};

use layout::BlockLayout;

/// Observer targets for every registered heading that has geometry, in document order.
pub fn observer_targets(registry: &HeadingRegistry, layout: &BlockLayout) -> Vec<ObserverTarget> {
    registry
        .headings()
        .iter()
        .filter_map(|h| {
            let rect = layout.rect(h.node)?;
            Some(ObserverTarget {
                heading: h.id.clone(),
                rect,
            })
        })
        .collect()
}
