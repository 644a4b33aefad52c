use crate::config::EnhanceConfig;
use core_types::HeadingId;
use html::select::select_all;
use html::{Id, Node, Selector};
use std::collections::HashMap;

/// Table-of-contents anchor for one heading.
#[derive(Clone, Debug, PartialEq)]
pub struct NavEntry {
    pub target: HeadingId,
    /// The anchor element.
    pub node: Id,
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NavigationIndex {
    entries: HashMap<HeadingId, NavEntry>,
    /// Indexed anchors that already carried the active class when the index was built.
    preactive: Vec<Id>,
}

impl NavigationIndex {
    /// Indexes navigation anchors whose `href` is a `#fragment`, keyed by the fragment. The
    /// first anchor in document order wins when several target the same heading.
    pub fn build(dom: &Node, config: &EnhanceConfig) -> Self {
        let Ok(selector) = Selector::parse(&config.toc.nav_link_selector) else {
            return Self::default();
        };

        let mut index = Self::default();
        for anchor in select_all(dom, &selector) {
            let Some(fragment) = anchor.attr("href").and_then(|h| h.strip_prefix('#')) else {
                continue;
            };
            if fragment.is_empty() {
                continue;
            }
            let target = HeadingId::new(fragment);
            if index.entries.contains_key(&target) {
                continue;
            }
            if anchor.has_class(&config.toc.active_class) {
                index.preactive.push(anchor.id());
            }
            index.entries.insert(
                target.clone(),
                NavEntry {
                    target,
                    node: anchor.id(),
                    active: false,
                },
            );
        }
        log::debug!(
            target: "enhance.toc",
            "indexed {} navigation entries",
            index.entries.len()
        );
        index
    }

    /// Index over synthetic anchors, one per id.
    pub fn from_entries<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let target = HeadingId::new(id);
                let entry = NavEntry {
                    target: target.clone(),
                    node: Id(1000 + i as u32),
                    active: false,
                };
                (target, entry)
            })
            .collect();
        Self {
            entries,
            preactive: Vec::new(),
        }
    }

    pub fn lookup(&self, id: &HeadingId) -> Option<&NavEntry> {
        self.entries.get(id)
    }

    pub(crate) fn lookup_mut(&mut self, id: &HeadingId) -> Option<&mut NavEntry> {
        self.entries.get_mut(id)
    }

    pub(crate) fn take_preactive(&mut self) -> Vec<Id> {
        std::mem::take(&mut self.preactive)
    }

    pub fn active_count(&self) -> usize {
        self.entries.values().filter(|e| e.active).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
