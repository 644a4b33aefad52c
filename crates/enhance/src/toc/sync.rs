//! Active-section resolution.
//!
//! The synchronizer folds visibility batches into the set of headings currently inside the
//! activation band and keeps exactly one navigation entry highlighted: the first such heading
//! in document order that has an entry. When nothing is inside the band the previous choice
//! stays highlighted.
use super::nav_index::NavigationIndex;
use super::registry::HeadingRegistry;
use bus::VisibilityEvent;
use core_types::{DocPos, HeadingId, Millis};
use html::traverse::find_node_by_id_mut;
use html::{Id, Node};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Tracking { active: Option<HeadingId> },
}

/// One change of the highlighted entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSwap {
    pub previous: Option<HeadingId>,
    pub next: HeadingId,
    pub at: Millis,
}

/// Applies the highlight to a navigation anchor.
pub trait Highlighter {
    fn set_active(&mut self, anchor: Id, active: bool);
}

/// Toggles a CSS class on anchors in a document tree.
pub struct ClassHighlighter<'a> {
    dom: &'a mut Node,
    class: &'a str,
}

impl<'a> ClassHighlighter<'a> {
    pub fn new(dom: &'a mut Node, class: &'a str) -> Self {
        Self { dom, class }
    }
}

impl Highlighter for ClassHighlighter<'_> {
    fn set_active(&mut self, anchor: Id, active: bool) {
        let Some(node) = find_node_by_id_mut(self.dom, anchor) else {
            log::debug!(target: "enhance.toc", "anchor {anchor:?} is gone");
            return;
        };
        if active {
            node.add_class(self.class);
        } else {
            node.remove_class(self.class);
        }
    }
}

pub struct ActiveSectionSync {
    registry: HeadingRegistry,
    index: NavigationIndex,
    state: SyncState,
    intersecting: BTreeSet<DocPos>,
    swaps: usize,
}

impl ActiveSectionSync {
    pub fn new(registry: HeadingRegistry, index: NavigationIndex) -> Self {
        Self {
            registry,
            index,
            state: SyncState::Uninitialized,
            intersecting: BTreeSet::new(),
            swaps: 0,
        }
    }

    /// Enters `Tracking` with nothing active, clearing anchors that were marked active in
    /// the source markup. Returns false, and stays uninitialized, when there is nothing to
    /// track.
    pub fn start(&mut self, highlighter: &mut impl Highlighter) -> bool {
        if self.registry.is_empty() {
            log::debug!(target: "enhance.toc", "no headings registered; not tracking");
            return false;
        }
        if self.state != SyncState::Uninitialized {
            return true;
        }
        for anchor in self.index.take_preactive() {
            highlighter.set_active(anchor, false);
        }
        self.state = SyncState::Tracking { active: None };
        log::debug!(
            target: "enhance.toc",
            "tracking {} headings against {} navigation entries",
            self.registry.len(),
            self.index.len()
        );
        true
    }

    /// Folds `batch` into the intersecting set and moves the highlight if the resolved
    /// section changed.
    pub fn apply_batch(
        &mut self,
        batch: &[VisibilityEvent],
        highlighter: &mut impl Highlighter,
    ) -> Option<HighlightSwap> {
        let SyncState::Tracking { active } = &self.state else {
            log::debug!(
                target: "enhance.toc",
                "ignoring {} visibility events before tracking started",
                batch.len()
            );
            return None;
        };
        let previous = active.clone();

        for event in batch {
            let Some(pos) = self.registry.position(&event.heading) else {
                log::trace!(target: "enhance.toc", "unknown heading {}", event.heading);
                continue;
            };
            if event.is_intersecting {
                self.intersecting.insert(pos);
            } else {
                self.intersecting.remove(&pos);
            }
        }

        let resolved = self
            .intersecting
            .iter()
            .map(|&pos| &self.registry.headings()[pos].id)
            .find(|id| self.index.lookup(id).is_some())
            .cloned()
            .or_else(|| previous.clone());

        let next = resolved?;
        if previous.as_ref() == Some(&next) {
            return None;
        }

        if let Some(prev) = &previous
            && let Some(entry) = self.index.lookup_mut(prev)
        {
            entry.active = false;
            highlighter.set_active(entry.node, false);
        }
        if let Some(entry) = self.index.lookup_mut(&next) {
            entry.active = true;
            highlighter.set_active(entry.node, true);
        }

        self.swaps += 1;
        self.state = SyncState::Tracking {
            active: Some(next.clone()),
        };
        let at = batch.iter().map(|e| e.at).max().unwrap_or_default();
        log::debug!(target: "enhance.toc", "active section -> {next}");
        Some(HighlightSwap { previous, next, at })
    }

    pub fn active(&self) -> Option<&HeadingId> {
        match &self.state {
            SyncState::Tracking { active } => active.as_ref(),
            SyncState::Uninitialized => None,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn swap_count(&self) -> usize {
        self.swaps
    }

    pub fn registry(&self) -> &HeadingRegistry {
        &self.registry
    }

    pub fn index(&self) -> &NavigationIndex {
        &self.index
    }

    /// Headings currently inside the band, in document order.
    pub fn intersecting(&self) -> impl Iterator<Item = &HeadingId> {
        self.intersecting
            .iter()
            .map(|&pos| &self.registry.headings()[pos].id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records highlight calls instead of touching a document.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(Id, bool)>,
    }

    impl Highlighter for Recorder {
        fn set_active(&mut self, anchor: Id, active: bool) {
            self.calls.push((anchor, active));
        }
    }

    fn ev(id: &str, on: bool, at: Millis) -> VisibilityEvent {
        VisibilityEvent {
            heading: HeadingId::new(id),
            is_intersecting: on,
            ratio: if on { 1.0 } else { 0.0 },
            at,
        }
    }

    fn sync(ids: &[&str], nav: &[&str]) -> ActiveSectionSync {
        let mut s = ActiveSectionSync::new(
            HeadingRegistry::from_ids(ids.iter().copied()),
            NavigationIndex::from_entries(nav.iter().copied()),
        );
        assert!(s.start(&mut Recorder::default()));
        s
    }

    fn active(s: &ActiveSectionSync) -> Option<&str> {
        s.active().map(HeadingId::as_str)
    }

    #[test]
    fn lowest_document_position_wins() {
        let mut s = sync(&["intro", "setup", "usage"], &["intro", "setup", "usage"]);
        let mut hl = Recorder::default();
        let swap = s
            .apply_batch(&[ev("usage", true, 1), ev("setup", true, 1)], &mut hl)
            .unwrap();
        assert_eq!(swap.next.as_str(), "setup");
        assert_eq!(swap.previous, None);
        assert_eq!(s.index().active_count(), 1);
    }

    #[test]
    fn full_exit_keeps_previous_section() {
        let mut s = sync(&["a", "b"], &["a", "b"]);
        let mut hl = Recorder::default();
        s.apply_batch(&[ev("b", true, 1)], &mut hl);
        assert!(s.apply_batch(&[ev("b", false, 2)], &mut hl).is_none());
        assert_eq!(active(&s), Some("b"));
        assert_eq!(s.intersecting().count(), 0);
    }

    #[test]
    fn swap_clears_previous_before_setting_next() {
        let mut s = sync(&["a", "b"], &["a", "b"]);
        let mut hl = Recorder::default();
        s.apply_batch(&[ev("a", true, 1)], &mut hl);
        hl.calls.clear();
        s.apply_batch(&[ev("a", false, 2), ev("b", true, 2)], &mut hl);
        let a = s.index().lookup(&HeadingId::new("a")).unwrap().node;
        let b = s.index().lookup(&HeadingId::new("b")).unwrap().node;
        assert_eq!(hl.calls, [(a, false), (b, true)]);
        assert_eq!(s.swap_count(), 2);
    }

    #[test]
    fn later_event_in_batch_overrides_earlier() {
        let mut s = sync(&["a", "b"], &["a", "b"]);
        let mut hl = Recorder::default();
        s.apply_batch(&[ev("a", true, 1), ev("b", true, 1), ev("a", false, 1)], &mut hl);
        assert_eq!(active(&s), Some("b"));
    }

    #[test]
    fn headings_without_entries_are_skipped() {
        let mut s = sync(&["a", "b"], &["b"]);
        let mut hl = Recorder::default();
        s.apply_batch(&[ev("a", true, 1), ev("b", true, 1)], &mut hl);
        assert_eq!(active(&s), Some("b"));
    }

    #[test]
    fn unchanged_resolution_does_not_swap() {
        let mut s = sync(&["a", "b"], &["a", "b"]);
        let mut hl = Recorder::default();
        s.apply_batch(&[ev("a", true, 1)], &mut hl);
        assert!(s.apply_batch(&[ev("b", true, 2)], &mut hl).is_none());
        assert_eq!(s.swap_count(), 1);
        assert_eq!(hl.calls.len(), 1);
    }

    #[test]
    fn unknown_headings_are_ignored() {
        let mut s = sync(&["a"], &["a"]);
        let mut hl = Recorder::default();
        assert!(s.apply_batch(&[ev("ghost", true, 1)], &mut hl).is_none());
        assert_eq!(s.state(), &SyncState::Tracking { active: None });
    }

    #[test]
    fn batches_before_start_are_ignored() {
        let mut s = ActiveSectionSync::new(
            HeadingRegistry::from_ids(["a"]),
            NavigationIndex::from_entries(["a"]),
        );
        let mut hl = Recorder::default();
        assert!(s.apply_batch(&[ev("a", true, 1)], &mut hl).is_none());
        assert_eq!(s.state(), &SyncState::Uninitialized);
        assert!(hl.calls.is_empty());
    }

    #[test]
    fn empty_registry_never_tracks() {
        let mut s = ActiveSectionSync::new(HeadingRegistry::default(), NavigationIndex::default());
        assert!(!s.start(&mut Recorder::default()));
        assert_eq!(s.state(), &SyncState::Uninitialized);
    }

    #[test]
    fn class_highlighter_toggles_the_class() {
        let mut dom = html::parse_document("<a class='md-nav__link' href='#x'>x</a>");
        let anchor = html::query_first(&dom, "a").unwrap().id();
        let mut hl = ClassHighlighter::new(&mut dom, "md-nav__link--active");
        hl.set_active(anchor, true);
        hl.set_active(anchor, true);
        assert_eq!(
            html::query_first(&dom, "a").unwrap().attr("class"),
            Some("md-nav__link md-nav__link--active")
        );
        let mut hl = ClassHighlighter::new(&mut dom, "md-nav__link--active");
        hl.set_active(anchor, false);
        assert_eq!(
            html::query_first(&dom, "a").unwrap().attr("class"),
            Some("md-nav__link")
        );
    }
}
